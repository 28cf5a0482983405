use crate::{
    logging::{
        log_path,
        QUIET_TARGETS,
    },
    tui::{
        keybindings::{
            KeyBindings,
            Keymap,
        },
        layout::header_and_main_area,
        Action,
        ActivateAction,
        Component,
        FocusedTopLevelComponent,
    },
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
};
use derive_more::Debug;
use eyre::OptionExt as _;
use ratatui::{
    layout::Rect,
    style::{
        Color,
        Style,
    },
    widgets::Widget as _,
    Frame,
};
use repo_traffic_config::Config;
use tui_logger::{
    LevelFilter,
    TuiLoggerLevelOutput,
    TuiLoggerSmartWidget,
    TuiWidgetEvent,
    TuiWidgetState,
};

/// Keys of the smart widget, see
/// https://github.com/gin66/tui-logger?tab=readme-ov-file#smart-widget-key-commands
fn widget_event(code: KeyCode) -> Option<TuiWidgetEvent> {
    let event = match code {
        KeyCode::Char(' ') => TuiWidgetEvent::SpaceKey,
        KeyCode::Esc => TuiWidgetEvent::EscapeKey,
        KeyCode::PageUp => TuiWidgetEvent::PrevPageKey,
        KeyCode::PageDown => TuiWidgetEvent::NextPageKey,
        KeyCode::Up => TuiWidgetEvent::UpKey,
        KeyCode::Down => TuiWidgetEvent::DownKey,
        KeyCode::Left => TuiWidgetEvent::LeftKey,
        KeyCode::Right => TuiWidgetEvent::RightKey,
        KeyCode::Char('+') => TuiWidgetEvent::PlusKey,
        KeyCode::Char('-') => TuiWidgetEvent::MinusKey,
        KeyCode::Char('h') => TuiWidgetEvent::HideKey,
        KeyCode::Char('f') => TuiWidgetEvent::FocusKey,
        _ => return None,
    };
    Some(event)
}

/// Collector output at the configured level, HTTP internals only from warnings up.
fn widget_state(debug: bool) -> TuiWidgetState {
    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    QUIET_TARGETS
        .iter()
        .fold(TuiWidgetState::new().set_default_display_level(level), |state, target| {
            state.set_level_for_target(target, LevelFilter::Warn)
        })
}

#[derive(Debug)]
pub struct Logs {
    active: bool,
    #[debug(skip)]
    state: TuiWidgetState,
    title: String,
    keymap: Keymap,
}

impl Logs {
    pub fn new() -> Self {
        Self {
            active: false,
            state: widget_state(false),
            title: " Collector log ".to_string(),
            keymap: Keymap::default(),
        }
    }
}

impl Component for Logs {
    fn is_visible(&self) -> bool {
        self.active
    }

    fn is_focused(&self) -> bool {
        self.active
    }

    fn register_config_handler(&mut self, config: Config, keybindings: KeyBindings) -> Result<()> {
        self.keymap = keybindings
            .get(&FocusedTopLevelComponent::Logs)
            .cloned()
            .ok_or_eyre("No keymap found for Logs")?;
        self.state = widget_state(config.debug);
        self.title = format!(" Collector log ({}) ", log_path().display());
        Ok(())
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Logs) => {
                self.active = true;
                return Ok(Some(Action::UpdateGlobalKeybindings(self.keymap.clone())));
            }
            Action::Activate(_) => self.active = false,
            _ => {}
        }
        Ok(None)
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(event) = widget_event(key.code) {
            self.state.transition(event);
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [_header_area, area] = header_and_main_area(area)?;

        TuiLoggerSmartWidget::default()
            .title_log(self.title.as_str())
            .title_target(" Targets ")
            .style_error(Style::default().fg(Color::Red))
            .style_debug(Style::default().fg(Color::Green))
            .style_warn(Style::default().fg(Color::Yellow))
            .style_trace(Style::default().fg(Color::Magenta))
            .style_info(Style::default().fg(Color::Cyan))
            .output_separator(':')
            .output_timestamp(Some("%H:%M:%S".to_string()))
            .output_level(Some(TuiLoggerLevelOutput::Abbreviated))
            .output_target(true)
            .output_file(false)
            .output_line(false)
            .state(&self.state)
            .render(area, frame.buffer_mut());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn widget_keys_are_mapped() {
        assert_eq!(widget_event(KeyCode::Char('h')), Some(TuiWidgetEvent::HideKey));
        assert_eq!(widget_event(KeyCode::PageDown), Some(TuiWidgetEvent::NextPageKey));
        assert_eq!(widget_event(KeyCode::Char('q')), None);
        assert_eq!(widget_event(KeyCode::Enter), None);
    }

    #[test]
    fn activation_installs_the_logs_keymap() {
        let mut logs = Logs::new();
        logs.register_config_handler(Config::default(), KeyBindings::new().unwrap()).unwrap();
        assert!(logs.title.contains("repo-traffic-tui.log"));

        let action = logs.update(Action::Activate(ActivateAction::Logs)).unwrap();
        assert_eq!(action, Some(Action::UpdateGlobalKeybindings(logs.keymap.clone())));
        assert!(logs.is_visible());

        logs.update(Action::Activate(ActivateAction::Dashboard)).unwrap();
        assert!(!logs.is_focused());
    }
}
