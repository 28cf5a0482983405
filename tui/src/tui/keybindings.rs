use super::{
    components::dashboard::DashboardAction,
    Action,
    ActivateAction,
    FocusedTopLevelComponent,
};
use crossterm::event::{
    KeyCode,
    KeyEvent,
    KeyModifiers,
};
use derive_more::{
    Deref,
    DerefMut,
};
use eyre::{
    bail,
    eyre,
    Result,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::collections::HashMap;

/// Key sequence to action, for whichever page currently has focus.
#[derive(Clone, Debug, Default, Deref, DerefMut, PartialEq, Eq, Serialize, Deserialize)]
pub struct Keymap(pub HashMap<Vec<KeyEvent>, Action>);

#[derive(Clone, Debug, Default, Deref, DerefMut)]
pub struct KeyBindings(pub HashMap<FocusedTopLevelComponent, Keymap>);

fn global_bindings() -> [(&'static str, Action); 6] {
    [
        ("<q>", Action::Quit),
        ("<Ctrl-c>", Action::Quit),
        ("<Ctrl-z>", Action::Suspend),
        ("<1>", Action::Activate(ActivateAction::Fetch)),
        ("<2>", Action::Activate(ActivateAction::Dashboard)),
        ("<3>", Action::Activate(ActivateAction::Logs)),
    ]
}

impl KeyBindings {
    pub fn new() -> Result<Self> {
        let mut bindings = HashMap::new();
        for page in [
            FocusedTopLevelComponent::Fetch,
            FocusedTopLevelComponent::Dashboard,
            FocusedTopLevelComponent::Logs,
        ] {
            let mut keymap = Keymap::default();
            for (keys, action) in global_bindings() {
                keymap.insert(parse_key_sequence(keys)?, action);
            }
            if page == FocusedTopLevelComponent::Dashboard {
                keymap.insert(
                    parse_key_sequence("<r>")?,
                    Action::DashboardAction(DashboardAction::Reload),
                );
            }
            bindings.insert(page, keymap);
        }
        Ok(Self(bindings))
    }
}

/// Parse `<q>`, `<Ctrl-c>` or `<g><g>` into the key events they stand for.
pub fn parse_key_sequence(raw: &str) -> Result<Vec<KeyEvent>> {
    let raw = raw.trim();
    if !raw.starts_with('<') || !raw.ends_with('>') {
        bail!("Key sequence must be written as <key>: {raw}");
    }
    raw[1..raw.len() - 1]
        .split("><")
        .map(parse_key_event)
        .collect()
}

pub fn parse_key_event(raw: &str) -> Result<KeyEvent> {
    let (modifiers, rest) = extract_modifiers(raw);
    let code = parse_key_code(rest).ok_or_else(|| eyre!("Unknown key: {raw}"))?;
    // Shifted letters arrive as uppercase characters.
    let code = match code {
        KeyCode::Char(c) if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::Char(c.to_ascii_uppercase()),
        code => code,
    };
    Ok(KeyEvent::new(code, modifiers))
}

fn extract_modifiers(raw: &str) -> (KeyModifiers, &str) {
    let mut modifiers = KeyModifiers::empty();
    let mut current = raw;
    loop {
        let lower = current.to_ascii_lowercase();
        let (modifier, len) = if lower.starts_with("ctrl-") {
            (KeyModifiers::CONTROL, 5)
        } else if lower.starts_with("alt-") {
            (KeyModifiers::ALT, 4)
        } else if lower.starts_with("shift-") {
            (KeyModifiers::SHIFT, 6)
        } else {
            break;
        };
        modifiers.insert(modifier);
        current = &current[len..];
    }
    (modifiers, current)
}

fn parse_key_code(raw: &str) -> Option<KeyCode> {
    let code = match raw.to_ascii_lowercase().as_str() {
        "esc" => KeyCode::Esc,
        "enter" => KeyCode::Enter,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pageup" => KeyCode::PageUp,
        "pagedown" => KeyCode::PageDown,
        "backtab" => KeyCode::BackTab,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "insert" => KeyCode::Insert,
        "tab" => KeyCode::Tab,
        "space" => KeyCode::Char(' '),
        "hyphen" | "minus" => KeyCode::Char('-'),
        lower => {
            if let Some(n) = lower.strip_prefix('f').and_then(|n| n.parse::<u8>().ok()) {
                return (1..=12).contains(&n).then_some(KeyCode::F(n));
            }
            let mut chars = raw.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(code)
}
