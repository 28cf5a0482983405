#[macro_use]
extern crate tracing;

pub mod commands;

use eyre::{
    eyre,
    Result,
};
use tracing_subscriber::{
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Layer,
};

/// Log to stderr for the non-interactive commands. `RUST_LOG` overrides the level.
pub fn init_logging(debug: bool) -> Result<()> {
    let level = if debug { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().or_else(|_| EnvFilter::try_new(format!("{level},reqwest=warn")))?;

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).with_filter(filter))
        .with(tracing_error::ErrorLayer::default())
        .try_init()
        .map_err(|err| eyre!("Failed to initialize tracing subscriber: {err}"))
}
