use reqwest::StatusCode;

/// Why a single facet could not be fetched. Logged and turned into an absent
/// facet by [`crate::TrafficClient`], never returned to callers.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("{status} - {body}")]
    Status { status: StatusCode, body: String },
    #[error("request failed: {0}")]
    Transport(#[source] reqwest::Error),
    #[error("invalid response body: {0}")]
    Decode(#[source] serde_json::Error),
    #[error("invalid endpoint url: {0}")]
    Url(#[from] url::ParseError),
}
