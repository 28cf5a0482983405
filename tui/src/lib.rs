#[macro_use]
extern crate tracing;

mod errors;
pub mod logging;
mod tui;

pub use errors::init_errors;
use repo_traffic_config::Config;
pub use tui::Tui;

pub async fn start_tui(config: Config) -> eyre::Result<()> {
    logging::log_init(config.debug)?;

    tui::App::new(config)?.run().await
}
