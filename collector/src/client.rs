use crate::{
    error::FetchError,
    models::*,
};
use chrono::Utc;
use eyre::{
    Context as _,
    Result,
};
use repo_traffic_config::{
    RepoRef,
    Token,
};
use reqwest::{
    blocking::Client,
    header::{
        HeaderMap,
        HeaderValue,
        ACCEPT,
        AUTHORIZATION,
    },
    StatusCode,
};
use serde::de::DeserializeOwned;
use url::Url;

const ACCEPT_V3: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Blocking client for the repository traffic endpoints.
///
/// Each facet is fetched with its own request. A facet that cannot be fetched
/// is logged and comes back as `None`; nothing is retried.
#[derive(Debug, Clone)]
pub struct TrafficClient {
    http_client: Client,
    base_url: Url,
}

impl TrafficClient {
    pub fn new(api_url: &Url, token: &Token) -> Result<Self> {
        let mut auth = HeaderValue::from_str(&format!("token {}", token.expose()))
            .context("Token contains characters that are not allowed in a header")?;
        auth.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth);
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_V3));

        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(headers)
            .build()
            .context("Failed to build HTTP client")?;

        // `Url::join` drops the last path segment unless it ends with a slash.
        let mut base_url = api_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        Ok(Self { http_client, base_url })
    }

    fn endpoint(&self, repo: &RepoRef, suffix: &str) -> Result<Url, FetchError> {
        let mut path = format!("repos/{}/{}", repo.owner, repo.name);
        if !suffix.is_empty() {
            path.push('/');
            path.push_str(suffix);
        }
        Ok(self.base_url.join(&path)?)
    }

    fn fetch<T: DeserializeOwned>(&self, repo: &RepoRef, suffix: &str) -> Result<T, FetchError> {
        let url = self.endpoint(repo, suffix)?;
        debug!(%url, "GET");

        let response = self.http_client.get(url).send().map_err(FetchError::Transport)?;
        let status = response.status();
        let body = response.text().map_err(FetchError::Transport)?;

        if status != StatusCode::OK {
            return Err(FetchError::Status { status, body });
        }
        serde_json::from_str(&body).map_err(FetchError::Decode)
    }

    pub fn get_views(&self, repo: &RepoRef) -> Option<ViewsTraffic> {
        absorb("views", self.fetch(repo, "traffic/views"))
    }

    pub fn get_clones(&self, repo: &RepoRef) -> Option<ClonesTraffic> {
        absorb("clones", self.fetch(repo, "traffic/clones"))
    }

    pub fn get_stars(&self, repo: &RepoRef) -> Option<u64> {
        absorb("stars", self.fetch::<RepoMetadata>(repo, "")).map(|metadata| metadata.stargazers_count)
    }

    pub fn get_referrers(&self, repo: &RepoRef) -> Option<Vec<Referrer>> {
        absorb("referrers", self.fetch(repo, "traffic/popular/referrers"))
    }

    pub fn get_popular_paths(&self, repo: &RepoRef) -> Option<Vec<PopularPath>> {
        absorb("popular paths", self.fetch(repo, "traffic/popular/paths"))
    }

    /// Collect every facet for `repo`, one request after the other.
    #[instrument(level = "debug", skip(self), fields(repository = %repo))]
    pub fn get_repo_traffic(&self, repo: &RepoRef) -> TrafficSnapshot {
        info!("Collecting traffic data for {repo}");
        let mut snapshot = TrafficSnapshot::new(repo, Utc::now());
        snapshot.views = self.get_views(repo);
        snapshot.clones = self.get_clones(repo);
        snapshot.stars = self.get_stars(repo);
        snapshot.referrers = self.get_referrers(repo);
        snapshot.paths = self.get_popular_paths(repo);
        snapshot
    }
}

fn absorb<T>(facet: &str, result: Result<T, FetchError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Error fetching {facet}: {err}");
            None
        }
    }
}
