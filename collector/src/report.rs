use crate::models::{
    DailyCount,
    TrafficSnapshot,
};
use chrono::{
    DateTime,
    NaiveDateTime,
};
use serde::Serialize;

/// Per-repository totals shown by the dashboard. Absent facets count as zero.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SummaryRow {
    pub repository: String,
    pub views: u64,
    pub unique_visitors: u64,
    pub clones: u64,
    pub unique_cloners: u64,
    pub stars: u64,
}

impl From<&TrafficSnapshot> for SummaryRow {
    fn from(snapshot: &TrafficSnapshot) -> Self {
        let views = snapshot.views.as_ref();
        let clones = snapshot.clones.as_ref();
        Self {
            repository: snapshot.repository.clone(),
            views: views.map(|v| v.count).unwrap_or_default(),
            unique_visitors: views.map(|v| v.uniques).unwrap_or_default(),
            clones: clones.map(|c| c.count).unwrap_or_default(),
            unique_cloners: clones.map(|c| c.uniques).unwrap_or_default(),
            stars: snapshot.stars.unwrap_or_default(),
        }
    }
}

pub fn summary_rows(snapshots: &[TrafficSnapshot]) -> Vec<SummaryRow> {
    snapshots.iter().map(SummaryRow::from).collect()
}

/// Stable: rows with equal views keep their input order.
pub fn sort_by_views_desc(rows: &mut [SummaryRow]) {
    rows.sort_by(|a, b| b.views.cmp(&a.views));
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
    pub repositories: usize,
    pub views: u64,
    pub unique_visitors: u64,
    pub clones: u64,
    pub unique_cloners: u64,
    pub stars: u64,
}

impl Totals {
    pub fn from_rows(rows: &[SummaryRow]) -> Self {
        rows.iter().fold(
            Self {
                repositories: rows.len(),
                ..Self::default()
            },
            |acc, row| Self {
                views: acc.views + row.views,
                unique_visitors: acc.unique_visitors + row.unique_visitors,
                clones: acc.clones + row.clones,
                unique_cloners: acc.unique_cloners + row.unique_cloners,
                stars: acc.stars + row.stars,
                ..acc
            },
        )
    }
}

fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// `%Y-%m-%d %H:%M:%S`, or `raw` unchanged if it cannot be parsed.
pub fn format_timestamp(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

/// `%Y-%m-%d`, or `raw` unchanged if it cannot be parsed.
pub fn format_day(raw: &str) -> String {
    match parse_timestamp(raw) {
        Some(dt) => dt.format("%Y-%m-%d").to_string(),
        None => raw.to_string(),
    }
}

/// Day label and `(count, uniques)` for each entry of a daily series.
pub fn daily_series(series: &[DailyCount]) -> Vec<(String, u64, u64)> {
    series
        .iter()
        .map(|day| (format_day(&day.timestamp), day.count, day.uniques))
        .collect()
}
