use crate::tui::{
    keybindings::KeyBindings,
    Action,
    Event,
};
use color_eyre::Result;
use crossterm::event::{
    KeyEvent,
    MouseEvent,
};
use ratatui::{
    layout::{
        Rect,
        Size,
    },
    Frame,
};
use repo_traffic_config::Config;
use tokio::sync::mpsc::UnboundedSender;

/// A page or overlay of the app.
///
/// Components receive terminal events while focused, every [`Action`] sent
/// through the app loop, and draw themselves while visible.
pub trait Component {
    fn is_visible(&self) -> bool {
        true
    }

    fn is_focused(&self) -> bool {
        false
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        let _ = tx;
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config, keybindings: KeyBindings) -> Result<()> {
        let _ = (config, keybindings);
        Ok(())
    }

    fn init(&mut self, area: Size) -> Result<()> {
        let _ = area;
        Ok(())
    }

    fn handle_events(&mut self, event: Option<Event>) -> Result<Option<Action>> {
        let action = match event {
            Some(Event::Key(key_event)) => self.handle_key_event(key_event)?,
            Some(Event::Mouse(mouse_event)) => self.handle_mouse_event(mouse_event)?,
            _ => None,
        };
        Ok(action)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let _ = key;
        Ok(None)
    }

    fn handle_mouse_event(&mut self, mouse: MouseEvent) -> Result<Option<Action>> {
        let _ = mouse;
        Ok(None)
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let _ = action;
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()>;
}
