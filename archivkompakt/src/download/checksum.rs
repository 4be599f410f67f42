//! MD5 checksum calculation for downloaded files.
//!
//! MD5 is what the archive embeds in download descriptors; it is used for
//! transfer integrity only.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use md5::{Digest, Md5};

use crate::error::{ArchivError, ArchivResult};

/// Buffer size for reading files during checksum calculation (64KB).
const BUFFER_SIZE: usize = 64 * 1024;

/// Calculate the MD5 checksum of a file.
///
/// # Returns
///
/// The lowercase hexadecimal MD5 hash of the file contents.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn calculate_file_md5(path: &Path) -> ArchivResult<String> {
    let mut file = File::open(path).map_err(|e| ArchivError::ReadFailed {
        path: path.to_path_buf(),
        source: e,
    })?;

    let mut hasher = Md5::new();
    let mut buffer = vec![0u8; BUFFER_SIZE];

    loop {
        let bytes_read = file
            .read(&mut buffer)
            .map_err(|e| ArchivError::ReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;

        if bytes_read == 0 {
            break;
        }

        hasher.update(&buffer[..bytes_read]);
    }

    Ok(format!("{:x}", hasher.finalize()))
}

/// Verify that a file matches an expected MD5 checksum, ignoring case.
///
/// Returns the computed checksum on success. On mismatch the file is left
/// untouched.
pub fn verify_checksum(path: &Path, expected: &str) -> ArchivResult<String> {
    let actual = calculate_file_md5(path)?;
    if !actual.eq_ignore_ascii_case(expected.trim()) {
        return Err(ArchivError::ChecksumMismatch {
            path: path.to_path_buf(),
            expected: expected.to_string(),
            actual,
        });
    }
    Ok(actual)
}
