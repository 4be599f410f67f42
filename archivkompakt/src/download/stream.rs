//! Bounded-memory copy of a response body to disk.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use tokio_util::sync::CancellationToken;

use crate::error::{ArchivError, ArchivResult};

/// Buffer size for reading/writing during downloads (64KB).
pub(crate) const BUFFER_SIZE: usize = 64 * 1024;

/// Create (or truncate) `dest`, creating missing parent directories.
pub(crate) fn create_destination(dest: &Path) -> ArchivResult<File> {
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ArchivError::CreateDirFailed {
            path: parent.to_path_buf(),
            source: e,
        })?;
    }
    File::create(dest).map_err(|e| ArchivError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })
}

/// Copy `body` into `file` chunk by chunk, reusing one buffer.
///
/// The cancellation token is checked before every read. Whatever was written
/// before a cancellation or error stays on disk.
pub(crate) fn copy_to_file<R: Read>(
    url: &str,
    mut body: R,
    file: File,
    dest: &Path,
    cancel: &CancellationToken,
) -> ArchivResult<u64> {
    let mut writer = BufWriter::new(file);
    let mut buffer = vec![0u8; BUFFER_SIZE];
    let mut written = 0u64;

    loop {
        if cancel.is_cancelled() {
            if let Err(e) = writer.flush() {
                tracing::debug!(path = %dest.display(), error = %e, "Flush after cancel failed");
            }
            return Err(ArchivError::Cancelled);
        }

        let bytes_read = body
            .read(&mut buffer)
            .map_err(|e| ArchivError::Transport {
                url: url.to_string(),
                reason: format!("read error: {}", e),
            })?;

        if bytes_read == 0 {
            break;
        }

        writer
            .write_all(&buffer[..bytes_read])
            .map_err(|e| ArchivError::WriteFailed {
                path: dest.to_path_buf(),
                source: e,
            })?;

        written += bytes_read as u64;
    }

    writer.flush().map_err(|e| ArchivError::WriteFailed {
        path: dest.to_path_buf(),
        source: e,
    })?;

    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};
    use tempfile::TempDir;

    /// Hands out at most 16 bytes per read and cancels after the first one.
    struct CancellingReader {
        data: Cursor<Vec<u8>>,
        cancel: CancellationToken,
    }

    impl Read for CancellingReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            let len = 16usize.min(buf.len());
            let n = self.data.read(&mut buf[..len])?;
            self.cancel.cancel();
            Ok(n)
        }
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    #[test]
    fn test_copy_larger_than_buffer() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("out.bin");
        let data: Vec<u8> = (0..BUFFER_SIZE * 3 + 17).map(|i| (i % 251) as u8).collect();

        let file = create_destination(&dest).unwrap();
        let written = copy_to_file(
            "http://host/file",
            Cursor::new(data.clone()),
            file,
            &dest,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(written, data.len() as u64);
        assert_eq!(fs::read(&dest).unwrap(), data);
    }

    #[test]
    fn test_create_destination_makes_parents_and_truncates() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("a/b/out.bin");

        fs::create_dir_all(dest.parent().unwrap()).unwrap();
        fs::write(&dest, b"old content that is longer").unwrap();

        let file = create_destination(&dest).unwrap();
        copy_to_file(
            "http://host/file",
            Cursor::new(b"new".to_vec()),
            file,
            &dest,
            &CancellationToken::new(),
        )
        .unwrap();

        assert_eq!(fs::read(&dest).unwrap(), b"new");
    }

    #[test]
    fn test_cancel_keeps_partial_file() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("partial.bin");
        let cancel = CancellationToken::new();
        let reader = CancellingReader {
            data: Cursor::new(vec![7u8; 1024]),
            cancel: cancel.clone(),
        };

        let file = create_destination(&dest).unwrap();
        let result = copy_to_file("http://host/file", reader, file, &dest, &cancel);

        assert!(matches!(result, Err(ArchivError::Cancelled)));
        assert_eq!(fs::read(&dest).unwrap().len(), 16);
    }

    #[test]
    fn test_read_error_is_transport() {
        let temp = TempDir::new().unwrap();
        let dest = temp.path().join("broken.bin");

        let file = create_destination(&dest).unwrap();
        let result = copy_to_file(
            "http://host/file",
            FailingReader,
            file,
            &dest,
            &CancellationToken::new(),
        );

        assert!(matches!(result, Err(ArchivError::Transport { .. })));
    }
}
