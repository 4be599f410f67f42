//! Error types for the Archiv Kompakt client.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for client operations.
pub type ArchivResult<T> = Result<T, ArchivError>;

/// Errors that can occur while talking to the archive service.
///
/// A document that does not exist is not an error: [`crate::ArchivKompakt::document`]
/// returns `Ok(None)` for a 404.
#[derive(Debug, Error)]
pub enum ArchivError {
    /// Token exchange was rejected or returned no usable token.
    #[error("authentication failed: {0}")]
    Auth(String),

    /// The service answered with an unexpected status code.
    #[error("archive service returned HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// A download descriptor could not be used.
    #[error("invalid download descriptor: {0}")]
    Descriptor(#[from] DescriptorError),

    /// Downloaded content does not match the checksum embedded in the descriptor.
    ///
    /// The file is left at `path`.
    #[error(
        "checksum mismatch for {}: expected {expected}, got {actual}",
        .path.display()
    )]
    ChecksumMismatch {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    /// The request never produced a response.
    #[error("request to {url} failed: {reason}")]
    Transport { url: String, reason: String },

    /// Network timeout.
    #[error("request to {url} timed out after {timeout_secs}s")]
    Timeout { url: String, timeout_secs: u64 },

    /// A response body was not the JSON the endpoint promises.
    #[error("failed to decode response from {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Failed to read a local file.
    #[error("failed to read {}: {source}", .path.display())]
    ReadFailed { path: PathBuf, source: io::Error },

    /// Failed to write a local file.
    #[error("failed to write {}: {source}", .path.display())]
    WriteFailed { path: PathBuf, source: io::Error },

    /// Failed to create a directory.
    #[error("failed to create directory {}: {source}", .path.display())]
    CreateDirFailed { path: PathBuf, source: io::Error },

    /// A download was cancelled before it completed.
    #[error("download cancelled")]
    Cancelled,

    /// Invalid client configuration.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// A creation date in `/Date(ms+zone)/` form could not be parsed.
    #[error("invalid creation date: {0}")]
    InvalidDate(String),
}

impl ArchivError {
    /// Map a reqwest failure for `url` onto `Timeout` or `Transport`.
    pub(crate) fn from_reqwest(url: &str, timeout_secs: u64, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
                timeout_secs,
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                reason: err.to_string(),
            }
        }
    }

    /// Whether a caller may reasonably try the same call again.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Transport { .. } | Self::Timeout { .. })
    }
}

/// Reasons a download descriptor cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DescriptorError {
    /// The descriptor is not valid base64.
    #[error("not valid base64: {0}")]
    Base64(String),

    /// The decoded descriptor has fewer lines than the field layout needs.
    #[error("missing line {index} (descriptor has {found} lines)")]
    MissingLine { index: usize, found: usize },

    /// A field line is not valid UTF-8.
    #[error("descriptor fields are not valid UTF-8")]
    Unusable,
}
