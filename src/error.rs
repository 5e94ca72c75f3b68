//! Error types for the dashboard data layer.
//!
//! Two layers of errors exist:
//!
//! - [`Error`] is the internal, detailed error. Store faults carry the driver
//!   message so operators can see what went wrong.
//! - [`DashboardError`] is what crosses the public boundary. Store detail is
//!   replaced by a generic, entity-specific message before it gets there.

use crate::input::ValidationError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use std::fmt;

/// Result type for data layer operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Result type of public query operations.
pub type DashboardResult<T> = std::result::Result<T, DashboardError>;

/// Internal error type.
///
/// Never returned from a public [`Dashboard`](crate::Dashboard) operation
/// directly; see [`Error::surface`].
#[derive(Debug, Clone)]
pub enum Error {
    /// Caller input was malformed. Detected before any store access.
    Validation(ValidationError),

    /// The requested record does not exist.
    NotFound {
        /// Entity name, e.g. `"Product"`
        entity: &'static str,
        /// The id the caller asked for, as given
        id: String,
    },

    /// The store failed: connection lost, constraint violation, driver fault.
    ///
    /// Carries the underlying message. Logged, never shown to callers.
    StoreError(String),

    /// Serializing a cached view failed.
    SerializationError(String),

    /// Cached view bytes could not be decoded.
    DeserializationError(String),

    /// Cached view bytes did not start with the expected magic.
    InvalidCacheEntry(String),

    /// Cached view was written by a different schema version.
    VersionMismatch {
        /// Expected schema version (from compiled code)
        expected: u32,
        /// Found schema version (from cached entry)
        found: u32,
    },

    /// View cache backend error.
    BackendError(String),

    /// Missing or invalid configuration.
    ConfigError(String),

    /// Generic error with custom message.
    Other(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Validation(reason) => write!(f, "Validation error: {}", reason),
            Error::NotFound { entity, id } => write!(f, "{} with ID {} not found.", entity, id),
            Error::StoreError(msg) => write!(f, "Store error: {}", msg),
            Error::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Error::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Error::InvalidCacheEntry(msg) => write!(f, "Invalid cache entry: {}", msg),
            Error::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Cache version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            Error::BackendError(msg) => write!(f, "Backend error: {}", msg),
            Error::ConfigError(msg) => write!(f, "Config error: {}", msg),
            Error::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for Error {}

impl Error {
    /// Classify this error for the public boundary.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Validation(_) => ErrorKind::Validation,
            Error::NotFound { .. } => ErrorKind::NotFound,
            _ => ErrorKind::Store,
        }
    }

    /// Convert into a boundary error whose message is `message`.
    ///
    /// Store-side detail is logged here and dropped. Validation errors keep
    /// their own user-facing message since they contain nothing internal.
    pub fn surface(self, message: impl Into<String>) -> DashboardError {
        match self {
            Error::Validation(_) => DashboardError::new(ErrorKind::Validation, INVALID_PRODUCT_DATA),
            Error::NotFound { entity, id } => {
                debug!("{} {} not found", entity, id);
                DashboardError::new(ErrorKind::NotFound, message)
            }
            other => {
                error!("Database Error: {}", other);
                DashboardError::new(ErrorKind::Store, message)
            }
        }
    }
}

/// Message returned for every form validation failure.
pub const INVALID_PRODUCT_DATA: &str = "Invalid product data. Please check the form fields.";

// ============================================================================
// Conversions from other error types
// ============================================================================

impl From<ValidationError> for Error {
    fn from(e: ValidationError) -> Self {
        Error::Validation(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_syntax() || e.is_eof() {
            Error::DeserializationError(e.to_string())
        } else {
            Error::SerializationError(e.to_string())
        }
    }
}

impl From<String> for Error {
    fn from(e: String) -> Self {
        Error::Other(e)
    }
}

impl From<&str> for Error {
    fn from(e: &str) -> Self {
        Error::Other(e.to_string())
    }
}

#[cfg(feature = "postgres")]
impl From<sqlx::Error> for Error {
    fn from(e: sqlx::Error) -> Self {
        Error::StoreError(format!("Postgres error: {}", e))
    }
}

// ============================================================================
// Boundary error
// ============================================================================

/// Coarse classification of a boundary error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller input was rejected before the store was touched.
    Validation,
    /// The requested record does not exist.
    NotFound,
    /// Anything the store or its surroundings did wrong.
    Store,
}

/// Error value returned to callers of public operations.
///
/// The message is safe to render to end users. Serializes as
/// `{"error": "<message>"}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardError {
    kind: ErrorKind,
    message: String,
}

impl DashboardError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        DashboardError {
            kind,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl fmt::Display for DashboardError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for DashboardError {}

impl Serialize for DashboardError {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("error", &self.message)?;
        map.end()
    }
}
