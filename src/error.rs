//! Fetch error taxonomy.
//!
//! Callers of [`IndicatorFetcher::fetch`](crate::IndicatorFetcher::fetch) never see
//! these; they are logged and collapsed into an empty series. `try_fetch` exposes them.

use thiserror::Error;

/// Result type for fetch operations.
pub type Result<T> = std::result::Result<T, FetchError>;

/// Why a fetch produced no series.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Country or indicator code was empty.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Connection failure, timeout, or a body that could not be read.
    #[error("network error: {0}")]
    Network(String),

    /// Non-2xx HTTP status.
    #[error("request failed with HTTP {0}")]
    Status(u16),

    /// The provider answered with its `[{"message": ...}]` error payload.
    #[error("world bank api error: {0}")]
    Provider(String),

    /// The body did not have the `[meta, records]` shape.
    #[error("malformed payload: {0}")]
    Malformed(String),
}

/// Coarse classification for operators: "provider is down" vs "provider changed its schema".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Transient,
    Malformed,
    Invalid,
}

impl FetchError {
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::Network(_) | Self::Status(_) => FailureKind::Transient,
            Self::Provider(_) | Self::Malformed(_) => FailureKind::Malformed,
            Self::InvalidRequest(_) => FailureKind::Invalid,
        }
    }
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}

/// Invalid alignment request.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AlignError {
    #[error("derived column references input {index}, but only {inputs} series were given")]
    UnknownColumn { index: usize, inputs: usize },
}
