use super::components::{
    dashboard,
    fetch,
};
use crate::tui::keybindings::Keymap;
use serde::{
    Deserialize,
    Serialize,
};
use serde_yml::with::singleton_map_recursive;
use strum::Display;

#[derive(Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum Action {
    Tick,
    Render,
    Resize(u16, u16),
    Suspend,
    Resume,
    Quit,
    ClearScreen,
    Error(String),
    UpdateGlobalKeybindings(Keymap),

    Activate(ActivateAction),

    #[allow(clippy::enum_variant_names)]
    #[serde(with = "singleton_map_recursive")]
    #[allow(private_interfaces)]
    FetchAction(fetch::FetchAction),

    #[allow(clippy::enum_variant_names)]
    #[serde(with = "singleton_map_recursive")]
    #[allow(private_interfaces)]
    DashboardAction(dashboard::DashboardAction),

    /// The aggregate file was rewritten and should be reloaded.
    AggregateUpdated,
}

#[derive(Display, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ActivateAction {
    Fetch,
    Dashboard,
    Logs,
}
