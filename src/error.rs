// ABOUTME: Typed failures raised by the sync engine
// ABOUTME: Separates transport, remote status, decode and storage errors so the orchestrator can decide what is fatal

use thiserror::Error;

pub type Result<T, E = SyncError> = std::result::Result<T, E>;

/// Unauthorized, forbidden and rate limited.
const CREDENTIAL_STATUSES: [u16; 3] = [401, 403, 429];

#[derive(Debug, Error)]
pub enum SyncError {
    /// The remote service could not be reached or the body could not be read.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The remote service answered outside the 2xx-3xx range.
    #[error("{url} responded with status {status}")]
    Remote { url: String, status: u16 },

    #[error("failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("invalid API url: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl SyncError {
    /// HTTP status carried by a `Remote` error.
    pub fn status(&self) -> Option<u16> {
        match self {
            SyncError::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether a failed category-month lookup may be skipped instead of
    /// aborting the run. Only remote status failures about that one pair
    /// qualify; 401, 403 and 429 apply to the whole token.
    pub fn is_skippable_lookup(&self) -> bool {
        match self {
            SyncError::Remote { status, .. } => !CREDENTIAL_STATUSES.contains(status),
            _ => false,
        }
    }
}
