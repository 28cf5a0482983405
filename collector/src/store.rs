//! Reading and writing snapshot and aggregate JSON files.
//!
//! Per-run snapshot files are written once and never touched again. The
//! aggregate file is always rewritten in full: a snapshot for a repository that
//! is already present replaces that entry in place, anything else is appended.

use crate::models::{
    AggregateFile,
    TrafficSnapshot,
};
use chrono::{
    DateTime,
    Local,
    Utc,
};
use eyre::{
    Context as _,
    Result,
};
use repo_traffic_config::RepoRef;
use serde::Deserialize;
use std::{
    io::ErrorKind,
    path::{
        Path,
        PathBuf,
    },
};

/// `github_traffic_{owner}_{repo}_{YYYYmmdd_HHMMSS}.json`
pub fn snapshot_filename(repo: &RepoRef, at: DateTime<Local>) -> String {
    format!("github_traffic_{}_{}.json", repo.slug(), at.format("%Y%m%d_%H%M%S"))
}

/// Write `snapshot` into `dir`, using `filename` or a dated default name.
pub fn save_snapshot(snapshot: &TrafficSnapshot, dir: &Path, filename: Option<&Path>) -> Result<PathBuf> {
    let path = match filename {
        Some(filename) => dir.join(filename),
        None => {
            let repo: RepoRef = snapshot.repository.parse()?;
            dir.join(snapshot_filename(&repo, Local::now()))
        }
    };
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).wrap_err_with(|| format!("Failed to create directory {parent:?}"))?;
    }

    let content = serde_json::to_string(snapshot).context("Failed to serialize snapshot")?;
    std::fs::write(&path, content).wrap_err_with(|| format!("Failed to write snapshot to {path:?}"))?;
    info!("Traffic data saved to {}", path.display());
    Ok(path)
}

/// Both shapes the aggregate file has had on disk.
#[derive(Deserialize)]
#[serde(untagged)]
enum AggregateFileShape {
    Legacy(Vec<TrafficSnapshot>),
    Wrapped(WrappedAggregate),
}

/// `{last_updated, data}` with `data` required, so a lone snapshot or any
/// other object is not mistaken for an empty aggregate.
#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct WrappedAggregate {
    #[serde(default)]
    last_updated: Option<String>,
    data: Vec<TrafficSnapshot>,
}

impl From<AggregateFileShape> for AggregateFile {
    fn from(shape: AggregateFileShape) -> Self {
        match shape {
            AggregateFileShape::Legacy(data) => AggregateFile {
                last_updated: None,
                data,
            },
            AggregateFileShape::Wrapped(WrappedAggregate { last_updated, data }) => AggregateFile { last_updated, data },
        }
    }
}

/// Parse an aggregate file, accepting the wrapped object and the bare list.
pub fn parse_aggregate(content: &str) -> Result<AggregateFile> {
    let shape: AggregateFileShape =
        serde_json::from_str(content).context("Aggregate file is neither a list of snapshots nor {last_updated, data}")?;
    Ok(shape.into())
}

pub fn load_aggregate(path: &Path) -> Result<AggregateFile> {
    let content = std::fs::read_to_string(path).wrap_err_with(|| format!("Failed to read {}", path.display()))?;
    parse_aggregate(&content).wrap_err_with(|| format!("Failed to parse {}", path.display()))
}

pub fn write_aggregate(path: &Path, file: &AggregateFile) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).wrap_err_with(|| format!("Failed to create directory {parent:?}"))?;
    }
    let content = serde_json::to_string(file).context("Failed to serialize aggregate file")?;
    std::fs::write(path, content).wrap_err_with(|| format!("Failed to write aggregate file to {path:?}"))
}

/// Replace the entry for the same repository, or append.
pub fn upsert(file: &mut AggregateFile, snapshot: TrafficSnapshot) {
    match file.data.iter_mut().find(|ea| ea.repository == snapshot.repository) {
        Some(existing) => *existing = snapshot,
        None => file.data.push(snapshot),
    }
}

/// Load (a missing file counts as empty), upsert, stamp and rewrite.
pub fn record_snapshot(path: &Path, snapshot: TrafficSnapshot) -> Result<AggregateFile> {
    let mut file = match load_aggregate(path) {
        Ok(file) => file,
        Err(err) if is_not_found(&err) => AggregateFile::default(),
        Err(err) => return Err(err),
    };
    upsert(&mut file, snapshot);
    file.last_updated = Some(Utc::now().to_rfc3339());
    write_aggregate(path, &file)?;
    debug!(path = %path.display(), entries = file.data.len(), "Aggregate file updated");
    Ok(file)
}

fn is_not_found(err: &eyre::Report) -> bool {
    err.chain()
        .filter_map(|cause| cause.downcast_ref::<std::io::Error>())
        .any(|io| io.kind() == ErrorKind::NotFound)
}
