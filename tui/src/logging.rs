use eyre::{
    Context as _,
    OptionExt as _,
    Result,
};
use repo_traffic_config::get_data_dir;
use std::path::PathBuf;
use tracing_subscriber::prelude::*;
use tui_logger::{
    LevelFilter,
    TuiLoggerFile,
};

lazy_static::lazy_static! {
    static ref LOG_FILE: String = format!("{}.log", env!("CARGO_PKG_NAME"));
}

/// Targets that only matter when something goes wrong.
pub(crate) const QUIET_TARGETS: [&str; 3] = ["reqwest", "hyper_util", "rustls"];

/// The file the logs page is mirrored to, recreated on every start.
pub fn log_path() -> PathBuf {
    get_data_dir().join(LOG_FILE.as_str())
}

/// Route `tracing` into the logs page and mirror it to a file in the data dir.
pub fn log_init(debug: bool) -> Result<()> {
    let directory = get_data_dir();
    std::fs::create_dir_all(directory.clone()).context("Failed to create directory")?;
    let log_path = log_path();
    if log_path.exists() {
        std::fs::remove_file(&log_path).context("Failed to remove existing log file")?;
    }

    let level = if debug { LevelFilter::Debug } else { LevelFilter::Info };
    tui_logger::init_logger(LevelFilter::Trace).context("Failed to initialize tui logger")?;
    tui_logger::set_default_level(level);
    for target in QUIET_TARGETS {
        tui_logger::set_level_for_target(target, LevelFilter::Warn);
    }
    tui_logger::set_log_file(TuiLoggerFile::new(
        log_path.to_str().ok_or_eyre("Log path is not valid UTF-8")?,
    ));

    tracing_subscriber::registry()
        .with(tracing_error::ErrorLayer::default())
        .with(tui_logger::TuiTracingSubscriberLayer)
        .try_init()
        .context("Failed to initialize tracing subscriber")
}
