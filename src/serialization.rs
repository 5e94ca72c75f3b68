//! Postcard encoding for cached page views.
//!
//! Every cached view is wrapped in an envelope:
//!
//! ```text
//! ┌─────────────────┬─────────────────┬──────────────────────────┐
//! │  MAGIC (4 bytes)│VERSION (u32)    │POSTCARD PAYLOAD (N bytes)│
//! └─────────────────┴─────────────────┴──────────────────────────┘
//! ```
//!
//! A view written by an older build (different [`VIEW_SCHEMA_VERSION`]) or
//! bytes that were never a view are rejected; [`PageCache`](crate::pages::PageCache)
//! treats that as a miss and reloads from the store.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Magic header for cached views.
pub const VIEW_MAGIC: [u8; 4] = *b"DKVW";

/// Bump when any cached view type changes shape.
pub const VIEW_SCHEMA_VERSION: u32 = 1;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ViewEnvelope<T> {
    pub magic: [u8; 4],
    pub version: u32,
    pub payload: T,
}

impl<T> ViewEnvelope<T> {
    pub fn new(payload: T) -> Self {
        Self {
            magic: VIEW_MAGIC,
            version: VIEW_SCHEMA_VERSION,
            payload,
        }
    }
}

/// Encode a view for the page cache.
///
/// # Errors
///
/// Returns `Error::SerializationError` if Postcard serialization fails.
pub fn encode_view<T: Serialize>(view: &T) -> Result<Vec<u8>> {
    postcard::to_allocvec(&ViewEnvelope::new(view)).map_err(|e| {
        error!("View serialization failed: {}", e);
        Error::SerializationError(e.to_string())
    })
}

/// Decode a cached view, validating magic and schema version.
///
/// # Errors
///
/// - `Error::DeserializationError`: payload is corrupt
/// - `Error::InvalidCacheEntry`: wrong magic
/// - `Error::VersionMismatch`: written by another schema version
pub fn decode_view<'de, T: Deserialize<'de>>(bytes: &'de [u8]) -> Result<T> {
    let envelope: ViewEnvelope<T> = postcard::from_bytes(bytes)
        .map_err(|e| Error::DeserializationError(e.to_string()))?;

    if envelope.magic != VIEW_MAGIC {
        return Err(Error::InvalidCacheEntry(format!(
            "expected magic {:?}, got {:?}",
            VIEW_MAGIC, envelope.magic
        )));
    }

    if envelope.version != VIEW_SCHEMA_VERSION {
        return Err(Error::VersionMismatch {
            expected: VIEW_SCHEMA_VERSION,
            found: envelope.version,
        });
    }

    Ok(envelope.payload)
}
