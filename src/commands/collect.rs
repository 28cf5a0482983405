use eyre::{
    bail,
    Result,
};
use repo_traffic_collector::{
    format::format_snapshot,
    store::{
        record_snapshot,
        save_snapshot,
    },
    TrafficClient,
};
use repo_traffic_config::{
    get_config_dir,
    resolve_token,
    CollectArgs,
    Config,
    Prompt,
    RepoRef,
};

/// Repositories named on the command line, else `repositories` from the
/// config file, else the configured `owner`/`repo`.
pub fn repositories_to_collect(config: &Config, args: &CollectArgs) -> Result<Vec<RepoRef>> {
    let repositories = if !args.repositories.is_empty() {
        args.repositories.clone()
    } else if !config.repositories.is_empty() {
        config.repositories.clone()
    } else {
        config.form_repo().into_iter().collect()
    };

    if repositories.is_empty() {
        bail!(
            "No repositories to collect. Pass OWNER/REPO or set `repositories` in {}",
            get_config_dir().join("config.yaml").display()
        );
    }
    if args.output_file.is_some() && repositories.len() > 1 {
        bail!("--output-file can only be used with a single repository");
    }
    Ok(repositories)
}

/// Fetch every repository, write one snapshot file per repository and record
/// each snapshot in the aggregate file.
pub fn collect(config: &Config, args: &CollectArgs) -> Result<()> {
    let repositories = repositories_to_collect(config, args)?;
    let token = resolve_token(config, Prompt::IfInteractive)?;
    let client = TrafficClient::new(&config.api_url(), &token)?;

    let output_dir = config.output_dir();
    let aggregate = config.aggregate_path();

    for repo in &repositories {
        let snapshot = client.get_repo_traffic(repo);
        save_snapshot(&snapshot, &output_dir, args.output_file.as_deref())?;

        if args.print {
            println!("{}", format_snapshot(&snapshot));
        }
        if !args.no_aggregate {
            record_snapshot(&aggregate, snapshot)?;
        }
    }

    if !args.no_aggregate {
        info!("Aggregate file updated: {}", aggregate.display());
    }
    info!("Collected traffic for {} repositories", repositories.len());
    Ok(())
}
