use crate::tui::{
    layout,
    Action,
    ActivateAction,
    Component,
};
use eyre::Result;
use ratatui::{
    layout::Rect,
    style::{
        Color,
        Modifier,
        Style,
    },
    widgets::{
        Block,
        Borders,
        Tabs,
    },
    Frame,
};

#[derive(Debug, Default)]
pub struct NavTabs {
    screen: Screen,
    fetching: bool,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
enum Screen {
    #[default]
    Fetch,
    Dashboard,
    Logs,
}

impl NavTabs {
    fn titles(&self) -> [String; 3] {
        let fetch = if self.fetching { "Fetch [1] ..." } else { "Fetch [1]" };
        [fetch.to_string(), "Dashboard [2]".to_string(), "Logs [3]".to_string()]
    }
}

impl Component for NavTabs {
    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Fetch) => self.screen = Screen::Fetch,
            Action::Activate(ActivateAction::Dashboard) => self.screen = Screen::Dashboard,
            Action::Activate(ActivateAction::Logs) => self.screen = Screen::Logs,
            Action::FetchAction(ref inner) => {
                if let Some(fetching) = inner.fetching() {
                    self.fetching = fetching;
                }
            }
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let [header_area, _main_area] = layout::header_and_main_area(area)?;

        let selected_tab = match self.screen {
            Screen::Fetch => 0,
            Screen::Dashboard => 1,
            Screen::Logs => 2,
        };

        let tabs = Tabs::new(self.titles())
            .select(selected_tab)
            .style(Style::default().fg(Color::Gray))
            .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
            .block(Block::new().borders(Borders::BOTTOM))
            .divider(" | ");

        frame.render_widget(tabs, header_area);

        Ok(())
    }
}
