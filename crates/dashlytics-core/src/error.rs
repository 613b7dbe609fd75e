//! Error types for `Dashlytics`.
//!
//! The engine itself never fails on dirty data: malformed fields are skipped and
//! empty inputs produce zero-valued results. These errors only surface at call
//! boundaries (spec validation, configuration, cache fetchers).

use thiserror::Error;

/// Result type alias for `Dashlytics` operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in `Dashlytics` operations.
///
/// Error codes follow the pattern `DASH-XXX`.
#[derive(Error, Debug)]
pub enum Error {
    /// Aggregation or time-series spec rejected by strict validation (DASH-001).
    #[error("[DASH-001] Invalid spec: {0}")]
    InvalidSpec(String),

    /// Argument outside its accepted domain (DASH-002).
    #[error("[DASH-002] Invalid argument '{name}': {message}")]
    InvalidArgument {
        /// Argument name.
        name: String,
        /// Why it was rejected.
        message: String,
    },

    /// Input larger than the configured engine limit (DASH-003).
    #[error("[DASH-003] Too many records: {actual} exceeds limit of {limit}")]
    TooManyRecords {
        /// Configured limit.
        limit: usize,
        /// Records supplied.
        actual: usize,
    },

    /// Configuration error (DASH-004).
    #[error("[DASH-004] Configuration error: {0}")]
    Config(String),

    /// Serialization error (DASH-005).
    #[error("[DASH-005] Serialization error: {0}")]
    Serialization(String),

    /// Internal error (DASH-006).
    ///
    /// Indicates an unexpected internal error. Please report if encountered.
    #[error("[DASH-006] Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Returns the error code (e.g., "DASH-001").
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSpec(_) => "DASH-001",
            Self::InvalidArgument { .. } => "DASH-002",
            Self::TooManyRecords { .. } => "DASH-003",
            Self::Config(_) => "DASH-004",
            Self::Serialization(_) => "DASH-005",
            Self::Internal(_) => "DASH-006",
        }
    }

    /// Returns the variant name (e.g., "InvalidSpec").
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidSpec(_) => "InvalidSpec",
            Self::InvalidArgument { .. } => "InvalidArgument",
            Self::TooManyRecords { .. } => "TooManyRecords",
            Self::Config(_) => "Config",
            Self::Serialization(_) => "Serialization",
            Self::Internal(_) => "Internal",
        }
    }

    /// Returns true if the caller can fix the request and retry.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSpec(_) | Self::InvalidArgument { .. } | Self::TooManyRecords { .. }
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<crate::config::ConfigError> for Error {
    fn from(err: crate::config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}
