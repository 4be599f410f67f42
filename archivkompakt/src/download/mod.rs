//! File download with integrity verification.
//!
//! A download is driven entirely by its descriptor:
//!
//! ```text
//! descriptor ──decode──► DownloadDescriptor (expected MD5)
//!     │
//!     └──► GET {base}/v1/files/{descriptor} ──stream──► local file
//!                                                           │
//!                                               MD5(file) == expected ?
//! ```
//!
//! The descriptor is decoded before anything touches the network or the
//! filesystem. The body is streamed through a fixed 64KB buffer. A checksum
//! mismatch fails the download but leaves the file on disk; removing it is
//! up to the caller.

mod checksum;
mod stream;

use std::path::{Path, PathBuf};

use reqwest::StatusCode;
use tokio_util::sync::CancellationToken;

pub use checksum::{calculate_file_md5, verify_checksum};

use crate::client::ArchivKompakt;
use crate::descriptor::DownloadDescriptor;
use crate::error::{ArchivError, ArchivResult, DescriptorError};
use stream::{copy_to_file, create_destination};

/// A verified download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadReport {
    /// Where the file was written.
    pub path: PathBuf,
    /// Bytes written.
    pub bytes: u64,
    /// MD5 of the written file, lowercase hex. Equals the descriptor's.
    pub checksum: String,
    /// Content type announced by the descriptor.
    pub content_type: String,
    /// Archive item id announced by the descriptor.
    pub archive_item_id: String,
}

impl ArchivKompakt {
    /// Download the file behind `descriptor` to `local_path` and verify it.
    ///
    /// Succeeds only if the service answers 200 and the MD5 of the written
    /// file equals the descriptor's checksum (case-insensitive). An existing
    /// file at `local_path` is overwritten.
    ///
    /// # Errors
    ///
    /// - [`ArchivError::Descriptor`]: the descriptor is unusable; nothing was
    ///   requested or written.
    /// - [`ArchivError::Api`]: non-200 answer; nothing was written.
    /// - [`ArchivError::ChecksumMismatch`]: the file is kept at `local_path`.
    pub fn download_file(
        &self,
        descriptor: &str,
        local_path: impl AsRef<Path>,
    ) -> ArchivResult<DownloadReport> {
        self.download_file_with_cancel(descriptor, local_path, &CancellationToken::new())
    }

    /// [`download_file`](Self::download_file) that stops with
    /// [`ArchivError::Cancelled`] once `cancel` fires. Bytes already written
    /// stay on disk.
    pub fn download_file_with_cancel(
        &self,
        descriptor: &str,
        local_path: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> ArchivResult<DownloadReport> {
        let local_path = local_path.as_ref();
        let descriptor = descriptor.trim();
        let fields = DownloadDescriptor::decode(descriptor)?.ok_or(DescriptorError::Unusable)?;

        if cancel.is_cancelled() {
            return Err(ArchivError::Cancelled);
        }

        let url = self.file_url(descriptor);
        let request = self
            .session
            .get(&url)
            .header("access_token", self.session.token());
        let response = self.session.send(&url, request)?;

        let status = response.status();
        if status != StatusCode::OK {
            tracing::warn!(
                status = status.as_u16(),
                item = %fields.archive_item_id,
                "File download rejected"
            );
            return Err(self.session.rejected(&url, response));
        }

        let file = create_destination(local_path)?;
        let bytes = copy_to_file(&url, response, file, local_path, cancel)?;

        let checksum = match verify_checksum(local_path, &fields.checksum) {
            Ok(checksum) => checksum,
            Err(e) => {
                if let ArchivError::ChecksumMismatch {
                    expected, actual, ..
                } = &e
                {
                    tracing::warn!(
                        path = %local_path.display(),
                        expected = %expected,
                        actual = %actual,
                        "Downloaded file failed checksum verification"
                    );
                }
                return Err(e);
            }
        };

        tracing::info!(
            path = %local_path.display(),
            bytes,
            item = %fields.archive_item_id,
            "Downloaded file"
        );

        Ok(DownloadReport {
            path: local_path.to_path_buf(),
            bytes,
            checksum,
            content_type: fields.content_type,
            archive_item_id: fields.archive_item_id,
        })
    }

    /// `{base}/v1/files/{descriptor}`.
    ///
    /// The descriptor is inserted unescaped. A `/` from the base64 alphabet
    /// therefore splits it into extra path segments.
    pub fn file_url(&self, descriptor: &str) -> String {
        self.session.url(&format!("v1/files/{}", descriptor))
    }
}
