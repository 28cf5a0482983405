use clap::Parser;
use color_eyre::Result;
use repo_traffic::{
    commands,
    init_logging,
};
use repo_traffic_config::{
    Args,
    Command,
    Config,
};
use repo_traffic_tui::{
    init_errors,
    start_tui,
};

// Not `#[tokio::main]`: the collector uses a blocking HTTP client, which must
// not run on an async runtime thread.
fn main() -> Result<()> {
    init_errors()?;
    let args = Args::parse();
    let command = args.command.clone().unwrap_or_default();
    let config = Config::new(args)?;

    match command {
        Command::Tui => tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?
            .block_on(start_tui(config)),
        Command::Collect(collect) => {
            init_logging(config.debug)?;
            commands::collect(&config, &collect)
        }
        Command::Summary(summary) => {
            init_logging(config.debug)?;
            commands::summary(&config, &summary)
        }
    }
}
