use eyre::Result;
use repo_traffic_collector::{
    format::format_summary,
    store::load_aggregate,
};
use repo_traffic_config::{
    Config,
    SummaryArgs,
};

pub fn summary(config: &Config, args: &SummaryArgs) -> Result<()> {
    let path = args.file.clone().unwrap_or_else(|| config.aggregate_path());
    debug!(path = %path.display(), "Summarizing aggregate file");
    let file = load_aggregate(&path)?;
    println!("{}", format_summary(&file));
    Ok(())
}
