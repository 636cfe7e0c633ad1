use thiserror::Error;

/// The primary error type for all fallible operations in this crate.
///
/// Missing data (no prior filing, empty snapshot, unresolved sector, zero portfolio value)
/// is never reported through this type; each of those has a defined fallback.
#[derive(Debug, Error)]
pub enum FwError {
    /// An error occurred during an HTTP request to a remote store.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The store returned an unexpected or unsuccessful HTTP status code.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// A store payload could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The data received from the store was malformed or missing a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// An adapter-specific upstream failure (store unreachable, closed, etc.).
    #[error("Store error: {0}")]
    Store(String),

    /// A filing that was explicitly requested does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The caller supplied an invalid parameter.
    #[error("invalid parameters: {0}")]
    InvalidParams(String),

    /// A security identifier could not be normalized.
    #[error("invalid security id: {0:?}")]
    InvalidSecurityId(String),

    /// An inverted date range was provided.
    #[error("invalid date range: start is after end")]
    InvalidDates,
}
