use crate::tui::theme::Theme;
use ratatui::{
    style::{
        Modifier,
        Style,
    },
    widgets::*,
};

pub(crate) fn button<'a>(label: impl ToString, selected: bool, theme: &Theme) -> Paragraph<'a> {
    let style = if selected {
        theme.text_selected.add_modifier(Modifier::BOLD)
    } else {
        Style::default().add_modifier(Modifier::BOLD)
    };

    Paragraph::new(label.to_string())
        .style(style)
        .block(Block::new().padding(Padding::top(1)))
}
