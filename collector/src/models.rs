//! Payloads returned by the traffic endpoints and the snapshot assembled from them.
//!
//! Every facet of a [`TrafficSnapshot`] is optional: a facet whose request
//! failed is `null` in the written JSON, and a facet whose key is missing in a
//! file on disk loads as `None`.

use chrono::{
    DateTime,
    Utc,
};
use serde::{
    Deserialize,
    Serialize,
};

/// One day of a views or clones series.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCount {
    pub timestamp: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
}

/// `GET /repos/{owner}/{repo}/traffic/views`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewsTraffic {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default)]
    pub views: Vec<DailyCount>,
}

/// `GET /repos/{owner}/{repo}/traffic/clones`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClonesTraffic {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
    #[serde(default)]
    pub clones: Vec<DailyCount>,
}

/// One entry of `GET /repos/{owner}/{repo}/traffic/popular/referrers`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Referrer {
    pub referrer: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
}

/// One entry of `GET /repos/{owner}/{repo}/traffic/popular/paths`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopularPath {
    pub path: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub uniques: u64,
}

/// The part of `GET /repos/{owner}/{repo}` we care about.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RepoMetadata {
    pub stargazers_count: u64,
}

/// One collector run for one repository.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrafficSnapshot {
    pub repository: String,
    #[serde(default)]
    pub collected_at: String,
    #[serde(default)]
    pub views: Option<ViewsTraffic>,
    #[serde(default)]
    pub clones: Option<ClonesTraffic>,
    #[serde(default)]
    pub stars: Option<u64>,
    #[serde(default)]
    pub referrers: Option<Vec<Referrer>>,
    #[serde(default)]
    pub paths: Option<Vec<PopularPath>>,
}

impl TrafficSnapshot {
    /// An empty snapshot for `repository`, stamped with `collected_at`.
    pub fn new(repository: impl ToString, collected_at: DateTime<Utc>) -> Self {
        Self {
            repository: repository.to_string(),
            collected_at: collected_at.to_rfc3339(),
            views: None,
            clones: None,
            stars: None,
            referrers: None,
            paths: None,
        }
    }
}

/// The on-disk collection of snapshots the dashboard reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateFile {
    #[serde(default)]
    pub last_updated: Option<String>,
    #[serde(default)]
    pub data: Vec<TrafficSnapshot>,
}
