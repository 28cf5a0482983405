#[macro_use]
extern crate tracing;

mod app_config;
mod args;
mod credential;
mod repo_ref;

use app_config::AppConfig;
pub use app_config::{
    get_config_dir,
    get_data_dir,
};
pub use args::{
    Args,
    CollectArgs,
    Command,
    SummaryArgs,
};
use color_eyre::Result;
pub use credential::{
    resolve_token,
    Prompt,
    Token,
};
use eyre::Context as _;
pub use repo_ref::RepoRef;
use serde::{
    Deserialize,
    Serialize,
};
use std::{
    collections::HashMap,
    path::{
        Path,
        PathBuf,
    },
};
use url::Url;

/// Filename of the aggregate file inside the data directory.
pub const AGGREGATE_FILE_NAME: &str = "github_traffic_daily.json";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    #[serde(flatten, skip_serializing)]
    app_config: AppConfig,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<Url>,
    #[serde(default, skip_serializing)]
    pub token: Option<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub owner: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub repo: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub repositories: Vec<RepoRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregate_file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
    #[serde(default, skip_serializing)]
    pub debug: bool,
    /// The config as read without command line options, when those replaced
    /// something that `save` would otherwise write.
    #[serde(skip)]
    without_args: Option<Box<Config>>,
}

const DEFAULT_CONFIG: &str = include_str!("default-config.yaml");
const DEFAULT_API_URL: &str = "https://api.github.com";

impl Default for Config {
    fn default() -> Self {
        serde_yml::from_str(DEFAULT_CONFIG).expect("Failed to parse default config")
    }
}

impl config::Source for Config {
    fn clone_into_box(&self) -> Box<dyn config::Source + Send + Sync> {
        Box::new((*self).clone())
    }

    fn collect(&self) -> Result<config::Map<String, config::Value>, config::ConfigError> {
        let mut cache = HashMap::<String, config::Value>::new();
        if let Some(api_url) = &self.api_url {
            cache.insert("api_url".to_string(), api_url.to_string().into());
        }
        cache.insert("owner".to_string(), self.owner.clone().into());
        cache.insert("repo".to_string(), self.repo.clone().into());
        cache.insert(
            "repositories".to_string(),
            self.repositories
                .iter()
                .map(|repo| repo.to_string())
                .collect::<Vec<_>>()
                .into(),
        );
        Ok(cache)
    }
}

impl Config {
    pub fn new(args: Args) -> Result<Self, config::ConfigError> {
        let replaces_saved = args.replaces_saved_settings();
        let mut cfg: Self = Self::layers()?.add_source(args).build()?.try_deserialize()?;

        if replaces_saved {
            let without_args: Self = Self::layers()?.build()?.try_deserialize()?;
            cfg.without_args = Some(Box::new(without_args));
        }

        Ok(cfg)
    }

    /// Embedded defaults, then `config.yaml` from the config directory.
    fn layers() -> Result<config::builder::ConfigBuilder<config::builder::DefaultState>, config::ConfigError> {
        let data_dir = get_data_dir();
        let config_dir = get_config_dir();
        let mut builder = config::Config::builder()
            .set_default("data_dir", data_dir.to_string_lossy().to_string())?
            .set_default("config_dir", config_dir.to_string_lossy().to_string())?;

        builder = builder.add_source(Config::default());

        let config_files = [("config.yaml", config::FileFormat::Yaml)];

        for (file, format) in &config_files {
            let source = config::File::from(config_dir.join(file))
                .format(*format)
                .required(false);
            builder = builder.add_source(source);
        }

        Ok(builder)
    }

    /// Base URL of the statistics API.
    pub fn api_url(&self) -> Url {
        match &self.api_url {
            Some(url) => url.clone(),
            None => Url::parse(DEFAULT_API_URL).expect("Failed to parse default API URL"),
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.app_config.data_dir
    }

    /// The aggregate file read by the dashboard.
    pub fn aggregate_path(&self) -> PathBuf {
        match &self.aggregate_file {
            Some(path) => path.clone(),
            None => self.data_dir().join(AGGREGATE_FILE_NAME),
        }
    }

    /// Directory the per-run snapshot files are written to.
    pub fn output_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(|| self.data_dir().to_path_buf())
    }

    /// The form defaults as a repository, if both parts are set and valid.
    pub fn form_repo(&self) -> Option<RepoRef> {
        if self.owner.trim().is_empty() || self.repo.trim().is_empty() {
            return None;
        }
        format!("{}/{}", self.owner.trim(), self.repo.trim()).parse().ok()
    }

    /// What `save` writes to `config.yaml`.
    fn to_saved_yaml(&self) -> Result<String> {
        // Only save the parts that have changed from the default.
        let default = Self::default();
        let mut clone = self.clone();

        // Command line options only apply to this run.
        if let Some(without_args) = &self.without_args {
            clone.api_url = without_args.api_url.clone();
            clone.aggregate_file = without_args.aggregate_file.clone();
            clone.output_dir = without_args.output_dir.clone();
        }

        if clone.api_url == default.api_url {
            clone.api_url = None;
        }
        if clone.owner == default.owner {
            clone.owner = String::new();
        }
        if clone.repo == default.repo {
            clone.repo = String::new();
        }
        if clone.repositories == default.repositories {
            clone.repositories = Vec::new();
        }
        if clone.aggregate_file == default.aggregate_file {
            clone.aggregate_file = None;
        }

        serde_yml::to_string(&clone).context("Failed to serialize config")
    }

    pub fn save(&self) -> Result<()> {
        std::fs::create_dir_all(&self.app_config.config_dir).context("Failed to create config directory")?;
        let path = self.app_config.config_dir.join("config.yaml");
        let content = self.to_saved_yaml()?;
        debug!(?path, "Saving config");
        std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write config to {:?}", path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use temp_dir::TempDir;

    #[test]
    fn default_config_parses() {
        let config = Config::default();
        assert_eq!(config.api_url().as_str(), "https://api.github.com/");
        assert_eq!(config.form_repo(), Some(RepoRef::new("mongodb-partners", "maap-framework")));
        assert!(config.repositories.is_empty());
        assert!(config.token.is_none());
    }

    #[test]
    fn form_repo_needs_valid_parts() {
        let mut config = Config::default();
        config.owner = "a/b".to_string();
        assert_eq!(config.form_repo(), None);
        config.owner = " octocat ".to_string();
        config.repo = String::new();
        assert_eq!(config.form_repo(), None);
        config.repo = "hello".to_string();
        assert_eq!(config.form_repo(), Some(RepoRef::new("octocat", "hello")));
    }

    #[test]
    fn aggregate_path_defaults_to_data_dir() {
        let mut config = Config::default();
        config.app_config.data_dir = PathBuf::from("/tmp/traffic");
        assert_eq!(config.aggregate_path(), PathBuf::from("/tmp/traffic").join(AGGREGATE_FILE_NAME));
        assert_eq!(config.output_dir(), PathBuf::from("/tmp/traffic"));

        config.aggregate_file = Some(PathBuf::from("custom.json"));
        assert_eq!(config.aggregate_path(), PathBuf::from("custom.json"));
    }

    #[test]
    fn token_is_never_serialized() {
        let config = Config {
            token: Some("ghp_secret".to_string()),
            ..Config::default()
        };
        let yaml = serde_yml::to_string(&config).unwrap();
        assert!(!yaml.contains("ghp_secret"));
    }

    #[test]
    fn args_override_defaults() {
        let args = Args {
            token: Some("from-args".to_string()),
            api_url: Some("http://127.0.0.1:9/".to_string()),
            ..Args::default()
        };
        let config = Config::new(args).unwrap();
        assert_eq!(config.token.as_deref(), Some("from-args"));
        assert_eq!(config.api_url().as_str(), "http://127.0.0.1:9/");
    }

    fn saved_in(dir: &TempDir, mut config: Config) -> String {
        config.app_config.config_dir = dir.path().to_path_buf();
        config.save().unwrap();
        std::fs::read_to_string(dir.path().join("config.yaml")).unwrap()
    }

    #[test]
    fn defaults_are_not_saved() {
        let dir = TempDir::new().unwrap();
        let yaml = saved_in(&dir, Config::default());
        for key in ["api_url", "owner", "repo", "repositories", "aggregate_file", "output_dir", "token", "debug"] {
            assert!(!yaml.contains(key), "{key} should not be saved:\n{yaml}");
        }
    }

    #[test]
    fn changed_form_values_are_saved() {
        let dir = TempDir::new().unwrap();
        let mut config = Config::default();
        config.owner = "octocat".to_string();
        config.repositories = vec![RepoRef::new("a", "b")];

        let saved: serde_yml::Value = serde_yml::from_str(&saved_in(&dir, config)).unwrap();
        assert_eq!(saved["owner"].as_str(), Some("octocat"));
        assert_eq!(saved["repositories"][0].as_str(), Some("a/b"));
        assert!(saved.get("repo").is_none());
        assert!(saved.get("api_url").is_none());
    }

    #[test]
    fn command_line_overrides_are_not_saved() {
        let dir = TempDir::new().unwrap();
        let args = Args {
            api_url: Some("http://127.0.0.1:9/".to_string()),
            aggregate_file: Some(PathBuf::from("/tmp/one-off.json")),
            ..Args::default()
        };
        let mut config = Config::new(args).unwrap();
        assert_eq!(config.aggregate_path(), PathBuf::from("/tmp/one-off.json"));
        config.owner = "octocat".to_string();

        let yaml = saved_in(&dir, config);
        assert!(yaml.contains("octocat"));
        assert!(!yaml.contains("127.0.0.1"), "{yaml}");
        assert!(!yaml.contains("one-off"), "{yaml}");
    }
}
