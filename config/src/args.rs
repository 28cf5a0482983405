use crate::RepoRef;
use clap::{
    Parser,
    Subcommand,
};
use std::path::PathBuf;

/// Repository traffic collector and dashboard
#[derive(Parser, Debug, Clone, Default)]
#[command(author, version = version(), about, long_about = None)]
pub struct Args {
    /// Personal access token used for the `Authorization` header.
    #[clap(long, env = "GITHUB_TOKEN", hide_env_values = true, value_name = "TOKEN", global = true)]
    pub token: Option<String>,

    /// Base URL of the statistics API.
    #[clap(long, env = "REPO_TRAFFIC_API_URL", value_name = "URL", global = true)]
    pub api_url: Option<String>,

    /// Aggregate file read by the dashboard and extended by `collect`.
    #[clap(long, value_name = "FILE", global = true)]
    pub aggregate_file: Option<PathBuf>,

    /// Enables debug logging.
    #[clap(long = "debug", action, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Default)]
pub enum Command {
    /// Interactive dashboard (the default).
    #[default]
    Tui,
    /// Fetch traffic for one or more repositories and write JSON snapshots.
    Collect(CollectArgs),
    /// Print the totals of an aggregate file.
    Summary(SummaryArgs),
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct CollectArgs {
    /// Repositories as `owner/name`. Falls back to `repositories` from the config file.
    #[clap(value_name = "OWNER/REPO")]
    pub repositories: Vec<RepoRef>,

    /// Directory for the per-run snapshot files.
    #[clap(long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Explicit snapshot filename. Only valid with a single repository.
    #[clap(long, value_name = "FILE")]
    pub output_file: Option<PathBuf>,

    /// Do not record the snapshots into the aggregate file.
    #[clap(long, action)]
    pub no_aggregate: bool,

    /// Print a summary of each snapshot after collecting it.
    #[clap(long, action)]
    pub print: bool,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct SummaryArgs {
    /// Aggregate file to summarize. Defaults to the configured aggregate file.
    #[clap(long, value_name = "FILE")]
    pub file: Option<PathBuf>,
}

impl Args {
    /// Whether any option replaces a value that `Config::save` writes.
    pub(crate) fn replaces_saved_settings(&self) -> bool {
        let output_dir = matches!(&self.command, Some(Command::Collect(collect)) if collect.output_dir.is_some());
        self.api_url.is_some() || self.aggregate_file.is_some() || output_dir
    }
}

mod config_ext {
    use super::*;
    use config::{
        Map,
        Source,
        Value,
    };
    use std::collections::HashMap;

    impl Source for Args {
        fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
            Box::new((*self).clone())
        }

        fn collect(&self) -> Result<Map<String, Value>, config::ConfigError> {
            let mut cache = HashMap::<String, Value>::new();
            if let Some(token) = &self.token {
                cache.insert("token".to_string(), token.clone().into());
            }
            if let Some(api_url) = &self.api_url {
                cache.insert("api_url".to_string(), api_url.clone().into());
            }
            if let Some(path) = &self.aggregate_file {
                cache.insert("aggregate_file".to_string(), path.display().to_string().into());
            }
            if let Some(Command::Collect(collect)) = &self.command {
                if let Some(dir) = &collect.output_dir {
                    cache.insert("output_dir".to_string(), dir.display().to_string().into());
                }
            }
            if self.debug {
                cache.insert("debug".to_string(), true.into());
            }
            Ok(cache)
        }
    }
}

pub fn version() -> String {
    let author = clap::crate_authors!();
    let config_dir_path = crate::get_config_dir().display().to_string();
    let data_dir_path = crate::get_data_dir().display().to_string();

    format!(
        "\
Authors: {author}

Config directory: {config_dir_path}
Data directory: {data_dir_path}"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collect_takes_repositories() {
        let args = Args::try_parse_from(["repo-traffic", "collect", "a/b", "c/d", "--no-aggregate"]).unwrap();
        let Some(Command::Collect(collect)) = args.command else {
            panic!("expected collect subcommand");
        };
        assert_eq!(collect.repositories, vec![RepoRef::new("a", "b"), RepoRef::new("c", "d")]);
        assert!(collect.no_aggregate);
    }

    #[test]
    fn global_options_after_subcommand() {
        let args = Args::try_parse_from(["repo-traffic", "summary", "--debug", "--api-url", "http://localhost"]).unwrap();
        assert!(args.debug);
        assert_eq!(args.api_url.as_deref(), Some("http://localhost"));
        assert!(matches!(args.command, Some(Command::Summary(_))));
    }

    #[test]
    fn bad_repository_is_a_parse_error() {
        assert!(Args::try_parse_from(["repo-traffic", "collect", "not-a-repo"]).is_err());
    }
}
