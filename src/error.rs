use thiserror::Error;

#[derive(Error, Debug)]
pub enum NearbyError {
    #[error("unknown list '{0}'")]
    UnknownListKind(String),

    #[error("invalid filter '{0}': expected key=value")]
    InvalidFilter(String),

    #[error("list '{0}' requires filter '{1}' (pass --filter {1}=<value>)")]
    MissingFilter(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML parse error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("authentication error: {0}")]
    Auth(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("request rejected: {0}")]
    Rejected(String),

    #[error("rate limited, retry after {0}s")]
    RateLimited(u64),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("malformed list response: {0}")]
    InvalidEnvelope(String),

    #[error("list controller has shut down")]
    ControllerClosed,

    #[error("{0}")]
    Other(String),
}

impl NearbyError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            NearbyError::RateLimited(_) | NearbyError::Api(_) | NearbyError::Io(_) => true,
            NearbyError::Http(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error())
            }
            _ => false,
        }
    }
}

pub type Result<T> = std::result::Result<T, NearbyError>;
