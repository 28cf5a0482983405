use ratatui::style::{
    Color,
    Modifier,
    Style,
};

#[derive(Clone, Copy, Debug)]
pub(super) struct Theme {
    pub(super) default: Style,
    pub(super) text_default: Style,
    pub(super) text_selected: Style,
    pub(super) text_error: Style,
    pub(super) text_info: Style,
    pub(super) border_focused: Style,
    pub(super) border_unfocused: Style,
    pub(super) row_selected: Style,
    pub(super) bar_count: Style,
    pub(super) bar_uniques: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            default: Style::default().bg(Color::Black).fg(Color::Gray),
            text_default: Style::default(),
            text_selected: Style::default().fg(Color::Yellow),
            text_error: Style::default().fg(Color::Red),
            text_info: Style::default().fg(Color::Green),
            border_focused: Style::default().fg(Color::White),
            border_unfocused: Style::default().fg(Color::DarkGray),
            row_selected: Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
            bar_count: Style::default().fg(Color::Cyan),
            bar_uniques: Style::default().fg(Color::Magenta),
        }
    }
}

impl Theme {
    pub(super) fn border(&self, focused: bool) -> Style {
        if focused {
            self.border_focused
        } else {
            self.border_unfocused
        }
    }
}
