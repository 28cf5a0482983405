use directories::ProjectDirs;
use serde::Deserialize;
use std::{
    env,
    ffi::OsString,
    path::PathBuf,
};

/// Overrides the directory holding the aggregate file, snapshots and the log.
pub const DATA_DIR_ENV: &str = "REPO_TRAFFIC_DATA_DIR";
/// Overrides the directory holding `config.yaml`.
pub const CONFIG_DIR_ENV: &str = "REPO_TRAFFIC_CONFIG_DIR";

/// Directories resolved before the config layers are read.
#[derive(Clone, Debug, Deserialize, Default)]
pub(super) struct AppConfig {
    #[serde(default)]
    pub(super) data_dir: PathBuf,
    #[serde(default)]
    pub(super) config_dir: PathBuf,
}

lazy_static::lazy_static! {
    static ref PROJECT_DIRS: Option<ProjectDirs> = ProjectDirs::from("dev", "repo-traffic", "repo-traffic");
}

/// An explicit, non-empty override wins over the platform directory.
fn resolve_dir(from_env: Option<OsString>, platform: Option<PathBuf>, fallback: &str) -> PathBuf {
    from_env
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or(platform)
        .unwrap_or_else(|| PathBuf::from(".").join(fallback))
}

pub fn get_data_dir() -> PathBuf {
    resolve_dir(
        env::var_os(DATA_DIR_ENV),
        PROJECT_DIRS.as_ref().map(|dirs| dirs.data_local_dir().to_path_buf()),
        ".data",
    )
}

pub fn get_config_dir() -> PathBuf {
    resolve_dir(
        env::var_os(CONFIG_DIR_ENV),
        PROJECT_DIRS.as_ref().map(|dirs| dirs.config_local_dir().to_path_buf()),
        ".config",
    )
}
