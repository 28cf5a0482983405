use crate::tui::{
    keybindings::{
        KeyBindings,
        Keymap,
    },
    layout::{
        header_and_two_main_areas,
        side_by_side,
    },
    widgets,
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
        daily_series,
        format_timestamp,
    },
    store::record_snapshot,
    DailyCount,
    TrafficClient,
    TrafficSnapshot,
};
use repo_traffic_config::{
    Config,
    RepoRef,
    Token,
};
use strum::Display;
use tokio::sync::mpsc::UnboundedSender;

const REQUIRED_FIELDS: &str = "Please provide all required fields.";
const FORM_HEIGHT: u16 = 8;

#[derive(Debug)]
struct EditingState {
    field: SelectedField,
    editor: widgets::TextInput,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
enum SelectedField {
    #[default]
    Token,
    Owner,
    Repository,
    Fetch,
}

impl SelectedField {
    fn selected_help(&self) -> &'static str {
        match self {
            SelectedField::Token => " Personal access token with push access. <enter> to edit, <del> to clear. ",
            SelectedField::Owner => " Owner of the repository. <enter> to edit, <del> to clear. ",
            SelectedField::Repository => " Repository name. <enter> to edit, <del> to clear. ",
            SelectedField::Fetch => " Fetch traffic for this repository. <enter> to fetch, <s> to save. ",
        }
    }

    fn up(self) -> Self {
        match self {
            SelectedField::Token | SelectedField::Owner => SelectedField::Token,
            SelectedField::Repository => SelectedField::Owner,
            SelectedField::Fetch => SelectedField::Repository,
        }
    }

    fn down(self) -> Self {
        match self {
            SelectedField::Token => SelectedField::Owner,
            SelectedField::Owner => SelectedField::Repository,
            SelectedField::Repository | SelectedField::Fetch => SelectedField::Fetch,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Display, serde::Serialize, serde::Deserialize)]
pub(crate) enum FetchAction {
    MoveUp,
    MoveDown,
    StartEdit,
    DeleteSelectedField,
    Submit,
    Started,
    Collected(Box<TrafficSnapshot>),
    Failed(String),
    SaveToAggregate,
}

impl FetchAction {
    /// Whether a fetch is running after this action, if the action changes that.
    pub(crate) fn fetching(&self) -> Option<bool> {
        match self {
            FetchAction::Started => Some(true),
            FetchAction::Collected(_) | FetchAction::Failed(_) => Some(false),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
enum Status {
    #[default]
    Idle,
    Info(String),
    Error(String),
}

/// The values of the form, checked before a fetch is started.
fn validate(token: &str, owner: &str, repo: &str) -> Result<(Token, RepoRef), String> {
    let owner = owner.trim();
    let repo = repo.trim();
    let token = match Token::new(token) {
        Some(token) if !owner.is_empty() && !repo.is_empty() => token,
        _ => return Err(REQUIRED_FIELDS.to_string()),
    };
    let repo = format!("{owner}/{repo}").parse::<RepoRef>().map_err(|err| err.to_string())?;
    Ok((token, repo))
}

fn mask(token: &str) -> String {
    if token.is_empty() {
        "<empty>".to_string()
    } else {
        "\u{2022}".repeat(token.chars().count().min(24))
    }
}

// -=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-=-

#[derive(Debug)]
pub struct Fetch {
    focused: bool,
    visible: bool,
    command_tx: Option<UnboundedSender<Action>>,
    config: Config,
    keymap: Keymap,
    token: String,
    selected: SelectedField,
    editing: Option<EditingState>,
    pending: bool,
    status: Status,
    snapshot: Option<TrafficSnapshot>,
}

impl Fetch {
    pub fn new() -> Self {
        Self {
            focused: true,
            visible: true,
            command_tx: None,
            config: Config::default(),
            keymap: Keymap::default(),
            token: String::new(),
            selected: SelectedField::Token,
            editing: None,
            pending: false,
            status: Status::Idle,
            snapshot: None,
        }
    }

    fn save_config(&self) {
        if let Err(e) = self.config.save() {
            error!(?e, "Failed to save config after edit");
        }
    }

    fn start_fetch(&mut self) -> Option<Action> {
        if self.pending {
            debug!("Fetch already in progress");
            return None;
        }
        let (token, repo) = match validate(&self.token, &self.config.owner, &self.config.repo) {
            Ok(valid) => valid,
            Err(message) => {
                self.status = Status::Error(message);
                return None;
            }
        };
        let Some(tx) = self.command_tx.clone() else {
            warn!("No action handler registered, cannot fetch");
            return None;
        };

        self.pending = true;
        self.status = Status::Info("Fetching traffic data...".to_string());
        // Queued ahead of anything the worker sends.
        if tx.send(Action::FetchAction(FetchAction::Started)).is_err() {
            debug!("App closed before the fetch started");
            return None;
        }

        let api_url = self.config.api_url();
        tokio::task::spawn_blocking(move || {
            let action = match TrafficClient::new(&api_url, &token) {
                Ok(client) => FetchAction::Collected(Box::new(client.get_repo_traffic(&repo))),
                Err(err) => FetchAction::Failed(format!("{err:#}")),
            };
            if tx.send(Action::FetchAction(action)).is_err() {
                debug!("App closed before the fetch finished");
            }
        });

        None
    }

    fn save_to_aggregate(&mut self) -> Option<Action> {
        let Some(snapshot) = self.snapshot.clone() else {
            self.status = Status::Error("Nothing fetched yet.".to_string());
            return None;
        };
        let path = self.config.aggregate_path();
        match record_snapshot(&path, snapshot) {
            Ok(file) => {
                info!(path = %path.display(), entries = file.data.len(), "Snapshot recorded");
                self.status = Status::Info(format!("Saved to {}", path.display()));
                Some(Action::AggregateUpdated)
            }
            Err(err) => {
                error!("Failed to record snapshot: {err:#}");
                self.status = Status::Error(format!("{err:#}"));
                None
            }
        }
    }

    /// Keys go to the open editor until it is confirmed or cancelled.
    fn handle_editing_key(&mut self, mut editing: EditingState, key: KeyEvent) -> Option<Action> {
        match key.code {
            KeyCode::Enter => {
                let content = editing.editor.finish();
                match editing.field {
                    SelectedField::Token => self.token = content,
                    SelectedField::Owner => {
                        self.config.owner = content;
                        self.save_config();
                    }
                    SelectedField::Repository => {
                        self.config.repo = content;
                        self.save_config();
                    }
                    SelectedField::Fetch => {}
                }
                Some(Action::Activate(ActivateAction::Fetch))
            }
            KeyCode::Esc => Some(Action::Activate(ActivateAction::Fetch)),
            _ => {
                editing.editor.handle_key_event(key);
                self.editing = Some(editing);
                None
            }
        }
    }

    fn draw_form(&self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border(self.focused))
            .title("Repository")
            .title_bottom(Line::from(self.selected.selected_help()).centered());
        frame.render_widget(&block, area);
        let area = block.inner(area);

        let [token_row, owner_row, repo_row, button_row, status_row] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Length(1),
        ])
        .areas(area);

        let labels = ["Token:", "Owner:", "Repository:"];
        let width = labels.iter().map(|s| s.len()).max().unwrap_or(0) + 1;
        let selected = |field: SelectedField| self.focused && self.selected == field;
        let or_empty = |value: &str| {
            if value.is_empty() {
                "<empty>".to_string()
            } else {
                value.to_string()
            }
        };

        frame.render_widget(
            widgets::label_and_text(labels[0], mask(&self.token), width, selected(SelectedField::Token), theme),
            token_row,
        );
        frame.render_widget(
            widgets::label_and_text(
                labels[1],
                or_empty(&self.config.owner),
                width,
                selected(SelectedField::Owner),
                theme,
            ),
            owner_row,
        );
        frame.render_widget(
            widgets::label_and_text(
                labels[2],
                or_empty(&self.config.repo),
                width,
                selected(SelectedField::Repository),
                theme,
            ),
            repo_row,
        );

        let label = if self.pending { "Fetching..." } else { "Fetch" };
        frame.render_widget(widgets::button(label, selected(SelectedField::Fetch), theme), button_row);

        let status = match &self.status {
            Status::Idle => Paragraph::new(""),
            Status::Info(message) => Paragraph::new(message.as_str()).style(theme.text_info),
            Status::Error(message) => Paragraph::new(message.as_str()).style(theme.text_error),
        };
        frame.render_widget(status, status_row);
    }

    fn draw_results(&self, frame: &mut Frame<'_>, area: Rect, theme: &Theme) {
        let Some(snapshot) = &self.snapshot else {
            let empty = Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border(false))
                .title("No traffic fetched");
            frame.render_widget(empty, area);
            return;
        };

        let [summary_area, charts_area] =
            Layout::vertical([Constraint::Length(5), Constraint::Min(0)]).areas(area);
        frame.render_widget(summary(snapshot, theme), summary_area);

        let [views_area, clones_area] = side_by_side(charts_area);
        let views = snapshot.views.as_ref().map(|v| v.views.as_slice());
        let clones = snapshot.clones.as_ref().map(|c| c.clones.as_slice());
        render_daily_chart(frame, views_area, "Daily views", views, theme);
        render_daily_chart(frame, clones_area, "Daily clones", clones, theme);
    }
}

fn summary<'a>(snapshot: &TrafficSnapshot, theme: &Theme) -> Paragraph<'a> {
    let pair = |label: &str, value: Option<(u64, u64)>, unique: &str| match value {
        Some((count, uniques)) => Line::from(format!("{label}: {count}   {unique}: {uniques}")),
        None => Line::from(vec![
            Span::raw(format!("{label}: ")),
            Span::styled("unavailable", theme.text_error),
        ]),
    };
    let stars = match snapshot.stars {
        Some(stars) => Line::from(format!("Stars: {stars}")),
        None => Line::from(vec![Span::raw("Stars: "), Span::styled("unavailable", theme.text_error)]),
    };

    Paragraph::new(vec![
        pair("Views", snapshot.views.as_ref().map(|v| (v.count, v.uniques)), "Unique visitors"),
        pair("Clones", snapshot.clones.as_ref().map(|c| (c.count, c.uniques)), "Unique cloners"),
        stars,
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(format!(
                "{} ({})",
                snapshot.repository,
                format_timestamp(&snapshot.collected_at)
            )),
    )
}

/// One group per day, with a count bar and a uniques bar.
fn daily_groups(series: &[DailyCount], theme: &Theme) -> Vec<BarGroup<'static>> {
    daily_series(series)
        .into_iter()
        .map(|(day, count, uniques)| {
            // Only month and day fit under a bar.
            let label = day.get(5..).unwrap_or(&day).to_string();
            BarGroup::default().label(Line::from(label)).bars(&[
                Bar::default().value(count).style(theme.bar_count),
                Bar::default().value(uniques).style(theme.bar_uniques),
            ])
        })
        .collect()
}

fn render_daily_chart(frame: &mut Frame<'_>, area: Rect, title: &str, series: Option<&[DailyCount]>, theme: &Theme) {
    let block = Block::default().borders(Borders::ALL).title(Line::from(vec![
        Span::raw(format!(" {title} ")),
        Span::styled("\u{25a0} total ", theme.bar_count),
        Span::styled("\u{25a0} unique ", theme.bar_uniques),
    ]));

    let Some(series) = series.filter(|s| !s.is_empty()) else {
        frame.render_widget(Paragraph::new("No data").block(block), area);
        return;
    };

    let mut chart = BarChart::default().block(block).bar_width(2).bar_gap(0).group_gap(2);
    for group in daily_groups(series, theme) {
        chart = chart.data(group);
    }
    frame.render_widget(chart, area);
}

impl Component for Fetch {
    fn is_visible(&self) -> bool {
        self.visible
    }

    fn is_focused(&self) -> bool {
        self.focused
    }

    fn register_action_handler(&mut self, tx: UnboundedSender<Action>) -> Result<()> {
        self.command_tx = Some(tx);
        Ok(())
    }

    fn register_config_handler(&mut self, config: Config, keybindings: KeyBindings) -> Result<()> {
        self.keymap = keybindings
            .get(&FocusedTopLevelComponent::Fetch)
            .cloned()
            .ok_or_eyre("No keymap found for Fetch")?;
        self.token = config.token.clone().unwrap_or_default();
        self.config = config;
        Ok(())
    }

    fn handle_key_event(&mut self, key: KeyEvent) -> Result<Option<Action>> {
        if let Some(editing) = self.editing.take() {
            return Ok(self.handle_editing_key(editing, key));
        }

        let action = match key.code {
            KeyCode::Delete | KeyCode::Backspace => Some(FetchAction::DeleteSelectedField),
            KeyCode::Up => Some(FetchAction::MoveUp),
            KeyCode::Down => Some(FetchAction::MoveDown),
            KeyCode::Enter if self.selected == SelectedField::Fetch => Some(FetchAction::Submit),
            KeyCode::Enter => Some(FetchAction::StartEdit),
            KeyCode::Char('s') => Some(FetchAction::SaveToAggregate),
            _ => None,
        };

        Ok(action.map(Action::FetchAction))
    }

    fn update(&mut self, action: Action) -> Result<Option<Action>> {
        let action = match action {
            Action::Activate(ActivateAction::Fetch) => {
                self.focused = true;
                self.visible = true;
                return Ok(Some(Action::UpdateGlobalKeybindings(self.keymap.clone())));
            }
            Action::Activate(_) => {
                self.focused = false;
                self.visible = false;
                return Ok(None);
            }

            Action::FetchAction(action) => action,

            _ => return Ok(None),
        };

        match action {
            FetchAction::MoveUp => self.selected = self.selected.up(),
            FetchAction::MoveDown => self.selected = self.selected.down(),

            FetchAction::StartEdit if self.editing.is_none() => {
                let editor = match self.selected {
                    SelectedField::Token => {
                        widgets::TextInput::new("Edit token", "GitHub personal access token", &self.token).masked()
                    }
                    SelectedField::Owner => {
                        widgets::TextInput::new("Edit owner", "User or organization", &self.config.owner)
                    }
                    SelectedField::Repository => {
                        widgets::TextInput::new("Edit repository", "Repository name", &self.config.repo)
                    }
                    SelectedField::Fetch => return Ok(None),
                };
                self.editing = Some(EditingState {
                    field: self.selected,
                    editor,
                });
                return Ok(Some(Action::UpdateGlobalKeybindings(Keymap::default())));
            }
            FetchAction::StartEdit => {}

            FetchAction::DeleteSelectedField => match self.selected {
                SelectedField::Token => self.token.clear(),
                SelectedField::Owner => {
                    self.config.owner.clear();
                    self.save_config();
                }
                SelectedField::Repository => {
                    self.config.repo.clear();
                    self.save_config();
                }
                SelectedField::Fetch => {}
            },

            FetchAction::Submit => return Ok(self.start_fetch()),
            // Only the tabs react to this, the form is already pending.
            FetchAction::Started => {}
            FetchAction::Collected(snapshot) => {
                self.pending = false;
                self.status = Status::Info(format!(
                    "Collected traffic for {}. <s> saves it to the dashboard.",
                    snapshot.repository
                ));
                self.snapshot = Some(*snapshot);
            }
            FetchAction::Failed(message) => {
                self.pending = false;
                error!("Fetch failed: {message}");
                self.status = Status::Error(message);
            }
            FetchAction::SaveToAggregate => return Ok(self.save_to_aggregate()),
        }

        Ok(None)
    }

    fn draw(&mut self, frame: &mut Frame<'_>, area: Rect) -> Result<()> {
        let theme = Theme::default();
        let [_, form_area, results_area] = header_and_two_main_areas(area, FORM_HEIGHT)?;

        self.draw_form(frame, form_area, &theme);
        self.draw_results(frame, results_area, &theme);

        if let Some(editing) = &mut self.editing {
            editing.editor.draw(frame)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use repo_traffic_collector::ViewsTraffic;
    use temp_dir::TempDir;
    use tokio::sync::mpsc::{
        unbounded_channel,
        UnboundedReceiver,
    };

    fn fetch() -> Fetch {
        let mut fetch = Fetch::new();
        fetch.config.owner = String::new();
        fetch.config.repo = String::new();
        fetch
    }

    fn day(timestamp: &str, count: u64, uniques: u64) -> DailyCount {
        DailyCount {
            timestamp: timestamp.to_string(),
            count,
            uniques,
        }
    }

    #[test]
    fn all_fields_are_required() {
        assert_eq!(validate("", "octocat", "hello").unwrap_err(), REQUIRED_FIELDS);
        assert_eq!(validate("t", " ", "hello").unwrap_err(), REQUIRED_FIELDS);
        assert_eq!(validate("t", "octocat", "").unwrap_err(), REQUIRED_FIELDS);
        assert!(validate("t", "a/b", "hello").is_err());
        assert!(validate("t", "octocat", "..").is_err());
        assert!(validate("t", "octocat", "hello?per=1").is_err());

        let (token, repo) = validate("t", " octocat ", "hello").unwrap();
        assert_eq!(token.expose(), "t");
        assert_eq!(repo, RepoRef::new("octocat", "hello"));
    }

    #[test]
    fn submit_with_empty_fields_sets_status() {
        let mut fetch = fetch();
        let action = fetch.update(Action::FetchAction(FetchAction::Submit)).unwrap();
        assert_eq!(action, None);
        assert_eq!(fetch.status, Status::Error(REQUIRED_FIELDS.to_string()));
        assert!(!fetch.pending);
    }

    fn ready_to_fetch() -> (Fetch, UnboundedReceiver<Action>) {
        let (tx, rx) = unbounded_channel();
        let mut fetch = fetch();
        fetch.register_action_handler(tx).unwrap();
        fetch.token = "t".to_string();
        fetch.config.owner = "octocat".to_string();
        fetch.config.repo = "hello".to_string();
        (fetch, rx)
    }

    #[tokio::test]
    async fn submit_marks_pending_before_the_worker_reports() {
        let (mut fetch, mut rx) = ready_to_fetch();
        // Not a valid header value, so the client fails before any request.
        fetch.token = "bad\u{7f}token".to_string();
        assert_eq!(fetch.update(Action::FetchAction(FetchAction::Submit)).unwrap(), None);
        assert!(fetch.pending);
        assert_eq!(fetch.status, Status::Info("Fetching traffic data...".to_string()));

        assert_eq!(rx.recv().await, Some(Action::FetchAction(FetchAction::Started)));
        assert!(matches!(rx.recv().await, Some(Action::FetchAction(FetchAction::Failed(_)))));
    }

    #[test]
    fn submit_is_ignored_while_pending() {
        let (mut fetch, mut rx) = ready_to_fetch();
        fetch.pending = true;
        assert_eq!(fetch.update(Action::FetchAction(FetchAction::Submit)).unwrap(), None);
        assert!(fetch.pending);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn late_started_does_not_block_the_form() {
        let (mut fetch, _rx) = ready_to_fetch();
        fetch.pending = true;
        fetch
            .update(Action::FetchAction(FetchAction::Failed("bad token".into())))
            .unwrap();
        fetch.update(Action::FetchAction(FetchAction::Started)).unwrap();
        assert!(!fetch.pending);
        assert_eq!(fetch.status, Status::Error("bad token".to_string()));
    }

    #[test]
    fn collected_snapshot_is_kept() {
        let mut fetch = fetch();
        fetch.pending = true;
        let snapshot = TrafficSnapshot::new("octocat/hello", chrono::Utc::now());
        fetch
            .update(Action::FetchAction(FetchAction::Collected(Box::new(snapshot.clone()))))
            .unwrap();
        assert!(!fetch.pending);
        assert_eq!(fetch.snapshot, Some(snapshot));
    }

    #[test]
    fn failure_is_shown_in_status() {
        let mut fetch = fetch();
        fetch
            .update(Action::FetchAction(FetchAction::Failed("bad token".into())))
            .unwrap();
        assert_eq!(fetch.status, Status::Error("bad token".to_string()));
    }

    #[test]
    fn save_without_snapshot_is_an_error() {
        let mut fetch = fetch();
        assert_eq!(fetch.update(Action::FetchAction(FetchAction::SaveToAggregate)).unwrap(), None);
        assert!(matches!(fetch.status, Status::Error(_)));
    }

    #[test]
    fn save_records_into_aggregate() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("daily.json");
        let mut fetch = fetch();
        fetch.config.aggregate_file = Some(path.clone());
        fetch.snapshot = Some(TrafficSnapshot {
            views: Some(ViewsTraffic {
                count: 3,
                uniques: 2,
                views: Vec::new(),
            }),
            ..TrafficSnapshot::new("octocat/hello", chrono::Utc::now())
        });

        let action = fetch.update(Action::FetchAction(FetchAction::SaveToAggregate)).unwrap();
        assert_eq!(action, Some(Action::AggregateUpdated));
        let file = repo_traffic_collector::store::load_aggregate(&path).unwrap();
        assert_eq!(file.data.len(), 1);
    }

    #[test]
    fn selection_stays_within_the_form() {
        assert_eq!(SelectedField::Token.up(), SelectedField::Token);
        assert_eq!(SelectedField::Token.down(), SelectedField::Owner);
        assert_eq!(SelectedField::Fetch.down(), SelectedField::Fetch);
        assert_eq!(SelectedField::Fetch.up(), SelectedField::Repository);
    }

    #[test]
    fn token_is_masked() {
        assert_eq!(mask(""), "<empty>");
        assert_eq!(mask("abc"), "\u{2022}\u{2022}\u{2022}");
        assert!(!mask("ghp_secret").contains("ghp"));
    }

    #[test]
    fn daily_groups_use_month_and_day() {
        let theme = Theme::default();
        let groups = daily_groups(
            &[day("2024-05-01T00:00:00Z", 4, 2), day("2024-05-02T00:00:00Z", 0, 0)],
            &theme,
        );
        assert_eq!(groups.len(), 2);
    }
}
