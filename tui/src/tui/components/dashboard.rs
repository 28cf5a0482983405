use crate::tui::{
    keybindings::{
        KeyBindings,
        Keymap,
    },
    layout::{
        header_and_main_area,
        side_by_side,
    },
    Action,
    ActivateAction,
    Component,
    FocusedTopLevelComponent,
    Theme,
};
use color_eyre::Result;
use crossterm::event::{
    KeyCode,
    KeyEvent,
};
use eyre::OptionExt as _;
use ratatui::{
    prelude::*,
    widgets::*,
};
use repo_traffic_collector::{
    report::{
        format_timestamp,
        sort_by_views_desc,
        summary_rows,
        SummaryRow,
        Totals,
    },
    store::load_aggregate,
    AggregateFile,
};
use repo_traffic_config::Config;
use std::path::PathBuf;
use strum::Display;

#[derive(Debug, Clone, PartialEq, Eq, Display, serde::Serialize, serde::Deserialize)]
pub(crate) enum DashboardAction {
    Reload,
    MoveUp,
    MoveDown,
}

/// What the dashboard shows for one aggregate file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct DashboardData {
    rows: Vec<SummaryRow>,
    totals: Totals,
    last_updated: Option<String>,
}

impl From<AggregateFile> for DashboardData {
    fn from(file: AggregateFile) -> Self {
        let mut rows = summary_rows(&file.data);
        sort_by_views_desc(&mut rows);
        let totals = Totals::from_rows(&rows);
        Self {
            rows,
            totals,
            last_updated: file.last_updated,
        }
    }
}

#[derive(Debug, Default)]
enum Content {
    #[default]
    NotLoaded,
    Loaded(DashboardData),
    Failed(String),
}

#[derive(Debug)]
pub struct Dashboard {
    focused: bool,
    path: PathBuf,
    content: Content,
    table_state: TableState,
    keymap: Keymap,
}

impl Dashboard {
    pub fn new() -> Self {
        Self {
            focused: false,
            path: PathBuf::new(),
            content: Content::NotLoaded,
            table_state: TableState::default(),
            keymap: Keymap::default(),
        }
    }

    fn reload(&mut self) {
        self.content = match load_aggregate(&self.path) {
            Ok(file) => {
                let data = DashboardData::from(file);
                debug!(path = %self.path.display(), repositories = data.rows.len(), "Dashboard loaded");
                Content::Loaded(data)
            }
            Err(err) => {
                warn!("Failed to load dashboard: {err:#}");
                Content::Failed(format!("Error loading traffic data: {err:#}"))
            }
        };
        let rows = self.row_count();
        if rows == 0 {
            self.table_state.select(None);
        } else if self.table_state.selected().map_or(true, |i| i >= rows) {
            self.table_state.select(Some(0));
        }
    }

    fn row_count(&self) -> usize {
        match &self.content {
            Content::Loaded(data) => data.rows.len(),
            _ => 0,
        }
    }

    fn move_selection(&mut self, up: bool) {
        let rows = self.row_count();
        if rows == 0 {
            return;
        }
        let next = match self.table_state.selected() {
            Some(i) if up => i.saturating_sub(1),
            Some(i) => (i + 1).min(rows - 1),
            None => 0,
        };
        self.table_state.select(Some(next));
    }
}

fn metrics<'a>(data: &DashboardData) -> Paragraph<'a> {
    let totals = &data.totals;
    let last_updated = data
        .last_updated
        .as_deref()
        .map(format_timestamp)
        .unwrap_or_else(|| "unknown".to_string());
    Paragraph::new(vec![
        Line::from(format!(
            "Total views: {}   Unique visitors: {}   Total stars: {}   Repositories: {}",
            totals.views, totals.unique_visitors, totals.stars, totals.repositories
        )),
        Line::from(format!("Last updated: {last_updated}")),
    ])
    .block(Block::default().borders(Borders::ALL).title("Summary"))
}

fn table<'a>(data: &DashboardData, focused: bool, theme: &Theme) -> Table<'a> {
    let header = ["Repository", "Views", "Unique visitors", "Clones", "Unique cloners", "Stars"]
        .into_iter()
        .map(Cell::from)
        .collect::<Row>()
        .style(Style::default().add_modifier(Modifier::BOLD))
        .bottom_margin(1);

    let rows = data.rows.iter().map(|row| {
        Row::new(vec![
            Cell::from(row.repository.clone()),
            Cell::from(Text::from(row.views.to_string()).right_aligned()),
            Cell::from(Text::from(row.unique_visitors.to_string()).right_aligned()),
            Cell::from(Text::from(row.clones.to_string()).right_aligned()),
            Cell::from(Text::from(row.unique_cloners.to_string()).right_aligned()),
            Cell::from(Text::from(row.stars.to_string()).right_aligned()),
        ])
    });

    Table::new(rows, [
        Constraint::Min(24),
        Constraint::Length(8),
        Constraint::Length(16),
        Constraint::Length(8),
        Constraint::Length(15),
        Constraint::Length(8),
    ])
    .header(header)
    .row_highlight_style(theme.row_selected)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(focused))
            .title("Repositories")
            .title_bottom(Line::from(" <up>/<down> to select, <r> to reload ").centered()),
    )
}

/// Rows plus borders, header and header margin.
fn table_height(rows: usize) -> u16 {
    u16::try_from(rows).unwrap_or(u16::MAX).saturating_add(4)
}

fn per_repository_chart<'a>(title: &'a str, rows: &'a [SummaryRow], value: fn(&SummaryRow) -> u64, style: Style) -> BarChart<'a> {
    let bars: Vec<Bar> = rows
        .iter()
        .map(|row| {
            Bar::default()
                .label(Line::from(row.repository.as_str()))
                .value(value(row))
                .style(style)
        })
        .collect();
    BarChart::default()
        .block(Block::default().borders(Borders::ALL).title(title))
        .direction(Direction::Horizontal)
        .bar_width(1)
        .bar_gap(0)
        .data(BarGroup::default().bars(&bars))
}

impl Component for Dashboard {
    fn is_visible(&self) -> bool {
        self.focused
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn register_config_handler(&mut self, config: Config, keybindings: KeyBindings) -> Result<()> {
        self.keymap = keybindings
            .get(&FocusedTopLevelComponent::Dashboard)
            .cloned()
            .ok_or_eyre("No keymap found for Dashboard")?;
        self.path = config.aggregate_path();
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        let action = match key.code {
            KeyCode::Up => Some(DashboardAction::MoveUp),
            KeyCode::Down => Some(DashboardAction::MoveDown),
            _ => None,
        };
        Ok(action.map(Action::DashboardAction))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        match action {
            Action::Activate(ActivateAction::Dashboard) => {
                self.focused = true;
                self.reload();
                return Ok(Some(Action::UpdateGlobalKeybindings(self.keymap.clone())));
            }
            Action::Activate(_) => self.focused = false,
            Action::AggregateUpdated if self.focused => self.reload(),
            Action::AggregateUpdated => self.content = Content::NotLoaded,
            Action::DashboardAction(DashboardAction::Reload) => self.reload(),
            Action::DashboardAction(DashboardAction::MoveUp) => self.move_selection(true),
            Action::DashboardAction(DashboardAction::MoveDown) => self.move_selection(false),
            _ => {}
        }
        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [_, area] = header_and_main_area(area)?;

        let data = match &self.content {
            Content::Loaded(data) => data,
            Content::Failed(message) => {
                let error = Paragraph::new(message.as_str())
                    .style(theme.text_error)
                    .wrap(Wrap { trim: false })
                    .block(Block::default().borders(Borders::ALL).title("Dashboard"));
                frame.render_widget(error, area);
                return Ok(());
            }
            Content::NotLoaded => {
                frame.render_widget(Block::default().borders(Borders::ALL).title("Loading..."), area);
                return Ok(());
            }
        };

        let table_height = table_height(data.rows.len());
        let [metrics_area, table_area, charts_area] = Layout::vertical([
            Constraint::Length(4),
            Constraint::Max(table_height),
            Constraint::Min(0),
        ])
        .areas(area);

        frame.render_widget(metrics(data), metrics_area);
        frame.render_stateful_widget(table(data, self.focused, &theme), table_area, &mut self.table_state);

        let [views_area, stars_area] = side_by_side(charts_area);
        frame.render_widget(
            per_repository_chart("Views per repository", &data.rows, |row| row.views, theme.bar_count),
            views_area,
        );
        frame.render_widget(
            per_repository_chart("Stars per repository", &data.rows, |row| row.stars, theme.bar_uniques),
            stars_area,
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repo_traffic_collector::store::parse_aggregate;
    use temp_dir::TempDir;

    const FIXTURE: &str = r#"{
        "last_updated": "2024-05-01T10:00:00",
        "data": [
            {"repository": "org/alpha", "views": {"count": 120, "uniques": 40}, "stars": 15},
            {"repository": "org/beta", "views": {"count": 300, "uniques": 90}, "stars": 2},
            {"repository": "org/gamma", "views": {"count": 45, "uniques": 12}}
        ]
    }"#;

    fn dashboard(path: PathBuf) -> Dashboard {
        Dashboard {
            path,
            ..Dashboard::new()
        }
    }

    #[test]
    fn data_is_sorted_and_totalled() {
        let data = DashboardData::from(parse_aggregate(FIXTURE).unwrap());
        let order: Vec<_> = data.rows.iter().map(|r| r.repository.as_str()).collect();
        assert_eq!(order, ["org/beta", "org/alpha", "org/gamma"]);
        assert_eq!(data.totals.views, 465);
        assert_eq!(data.totals.unique_visitors, 142);
        assert_eq!(data.totals.stars, 17);
        assert_eq!(data.last_updated.as_deref(), Some("2024-05-01T10:00:00"));
    }

    #[test]
    fn table_height_saturates() {
        assert_eq!(table_height(0), 4);
        assert_eq!(table_height(3), 7);
        assert_eq!(table_height(70_000), u16::MAX);
        assert_eq!(table_height(usize::from(u16::MAX) - 2), u16::MAX);
    }

    #[test]
    fn activation_loads_the_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daily.json");
        std::fs::write(&path, FIXTURE).unwrap();

        let mut dashboard = dashboard(path);
        let action = dashboard.update(Action::Activate(ActivateAction::Dashboard)).unwrap();
        assert!(matches!(action, Some(Action::UpdateGlobalKeybindings(_))));
        assert_eq!(dashboard.row_count(), 3);
        assert_eq!(dashboard.table_state.selected(), Some(0));
    }

    #[test]
    fn missing_file_becomes_an_error_message() {
        let dir = TempDir::new().unwrap();
        let mut dashboard = dashboard(dir.path().join("missing.json"));
        dashboard.update(Action::Activate(ActivateAction::Dashboard)).unwrap();
        match &dashboard.content {
            Content::Failed(message) => assert!(message.starts_with("Error loading traffic data")),
            other => panic!("expected an error, got {other:?}"),
        }
        assert_eq!(dashboard.table_state.selected(), None);
    }

    #[test]
    fn single_snapshot_file_is_not_an_empty_dashboard() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, r#"{"repository": "org/alpha", "views": {"count": 120, "uniques": 40}, "stars": 15}"#).unwrap();
        let mut dashboard = dashboard(path);
        dashboard.update(Action::Activate(ActivateAction::Dashboard)).unwrap();
        assert!(matches!(dashboard.content, Content::Failed(_)));
    }

    #[test]
    fn selection_is_clamped() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daily.json");
        std::fs::write(&path, FIXTURE).unwrap();
        let mut dashboard = dashboard(path);
        dashboard.update(Action::Activate(ActivateAction::Dashboard)).unwrap();

        dashboard.update(Action::DashboardAction(DashboardAction::MoveUp)).unwrap();
        assert_eq!(dashboard.table_state.selected(), Some(0));
        for _ in 0..5 {
            dashboard.update(Action::DashboardAction(DashboardAction::MoveDown)).unwrap();
        }
        assert_eq!(dashboard.table_state.selected(), Some(2));
    }

    #[test]
    fn reload_picks_up_changes() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daily.json");
        std::fs::write(&path, FIXTURE).unwrap();
        let mut dashboard = dashboard(path.clone());
        dashboard.update(Action::Activate(ActivateAction::Dashboard)).unwrap();

        std::fs::write(&path, r#"[{"repository": "org/solo", "stars": 1}]"#).unwrap();
        dashboard.update(Action::AggregateUpdated).unwrap();
        assert_eq!(dashboard.row_count(), 1);
    }
}
