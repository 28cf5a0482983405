//! # Repository Traffic Collector
//!
//! Fetches the traffic facets of a repository (views, clones, stars,
//! referrers and popular paths) from the statistics API, stores them as JSON
//! snapshots and aggregates them for display.
//!
//! ## Architecture
//!
//! - **`client`**: blocking API client, one request per facet
//! - **`models`**: payloads and the assembled [`TrafficSnapshot`]
//! - **`store`**: per-run snapshot files and the aggregate file
//! - **`report`**: per-repository rows, totals and timestamp formatting
//! - **`format`**: terminal tables for a snapshot or an aggregate file
//!
//! ## Usage
//!
//! ```bash
//! # Collect two repositories and record them into the aggregate file
//! repo-traffic collect octocat/hello-world octocat/spoon-knife --print
//!
//! # Print the totals of the aggregate file
//! repo-traffic summary
//! ```

#[macro_use]
extern crate tracing;

pub mod client;
pub mod error;
pub mod format;
pub mod models;
pub mod report;
pub mod store;

pub use client::TrafficClient;
pub use error::FetchError;
pub use models::*;
