use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScraperError {
    #[error("invalid store URL \"{input}\": {reason}")]
    InvalidInput { input: String, reason: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by {domain} (retry after {retry_after_secs}s)")]
    RateLimited {
        domain: String,
        retry_after_secs: u64,
    },

    #[error("endpoint not found: {url}")]
    NotFound { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("response for {context} has no \"{field}\" field")]
    MissingField { context: String, field: String },

    #[error("membership fetch failed for collection \"{handle}\": {source}")]
    CollectionMembership {
        handle: String,
        #[source]
        source: Box<ScraperError>,
    },
}

/// Coarse failure classes callers and log lines branch on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The storefront address is unusable. The only class that reaches callers.
    InvalidInput,
    /// A request failed, timed out, or returned a non-success status.
    UpstreamUnavailable,
    /// A response arrived but lacked the expected shape.
    MalformedUpstreamResponse,
    /// One collection's membership could not be fetched.
    PartialAssociationFailure,
}

impl ScraperError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::Http(_)
            | Self::RateLimited { .. }
            | Self::NotFound { .. }
            | Self::UnexpectedStatus { .. } => ErrorKind::UpstreamUnavailable,
            Self::Deserialize { .. } | Self::MissingField { .. } => {
                ErrorKind::MalformedUpstreamResponse
            }
            Self::CollectionMembership { .. } => ErrorKind::PartialAssociationFailure,
        }
    }
}
