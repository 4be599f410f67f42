//! Download descriptors.
//!
//! The archive identifies a downloadable file by an opaque descriptor: base64
//! of a newline separated block of lines. Only three of them matter to a
//! client:
//!
//! ```text
//! line 0   (unused)
//! line 1   archive item id
//! line 2   content type
//! line 3   (unused)
//! line 4   (unused)
//! line 5   MD5 checksum of the file, hex
//! ```
//!
//! The same string is placed verbatim in the download URL.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::DescriptorError;

const ITEM_ID_LINE: usize = 1;
const CONTENT_TYPE_LINE: usize = 2;
const CHECKSUM_LINE: usize = 5;

/// Number of lines written by [`DownloadDescriptor::encode`].
pub const DESCRIPTOR_LINES: usize = 6;

/// Decoded fields of a download descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadDescriptor {
    /// Archive item id.
    pub archive_item_id: String,
    /// Content type of the file, e.g. `application/pdf`.
    pub content_type: String,
    /// Expected MD5 checksum, lowercase hex.
    pub checksum: String,
}

impl DownloadDescriptor {
    /// Create a descriptor from its fields. The checksum is lower-cased.
    pub fn new(
        archive_item_id: impl Into<String>,
        content_type: impl Into<String>,
        checksum: impl Into<String>,
    ) -> Self {
        Self {
            archive_item_id: archive_item_id.into(),
            content_type: content_type.into(),
            checksum: checksum.into().to_lowercase(),
        }
    }

    /// Decode a base64 descriptor.
    ///
    /// Returns `Ok(None)` when one of the field lines is not valid UTF-8: the
    /// descriptor is well formed but unusable. Bad base64 or a descriptor with
    /// fewer than six lines is an error.
    pub fn decode(descriptor: &str) -> Result<Option<Self>, DescriptorError> {
        let raw = STANDARD
            .decode(descriptor.trim())
            .map_err(|e| DescriptorError::Base64(e.to_string()))?;

        let lines = split_lines(&raw);
        if let Some(index) = [ITEM_ID_LINE, CONTENT_TYPE_LINE, CHECKSUM_LINE]
            .into_iter()
            .find(|&index| index >= lines.len())
        {
            return Err(DescriptorError::MissingLine {
                index,
                found: lines.len(),
            });
        }

        let field = |index: usize| std::str::from_utf8(lines[index]).ok();
        let (Some(archive_item_id), Some(content_type), Some(checksum)) = (
            field(ITEM_ID_LINE),
            field(CONTENT_TYPE_LINE),
            field(CHECKSUM_LINE),
        ) else {
            return Ok(None);
        };

        Ok(Some(Self::new(archive_item_id, content_type, checksum)))
    }

    /// Encode the fields back into descriptor form.
    ///
    /// Unused lines are left empty and every line is terminated, so an empty
    /// checksum still yields six lines. Fields must not contain line breaks.
    pub fn encode(&self) -> String {
        let mut lines = vec![""; DESCRIPTOR_LINES];
        lines[ITEM_ID_LINE] = self.archive_item_id.as_str();
        lines[CONTENT_TYPE_LINE] = self.content_type.as_str();
        lines[CHECKSUM_LINE] = self.checksum.as_str();
        let mut raw = lines.join("\n");
        raw.push('\n');
        STANDARD.encode(raw)
    }
}

/// Split on `\n`, `\r\n` or `\r`. A trailing terminator does not start a new
/// line.
fn split_lines(data: &[u8]) -> Vec<&[u8]> {
    let mut lines = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < data.len() {
        match data[i] {
            b'\n' => {
                lines.push(&data[start..i]);
                start = i + 1;
            }
            b'\r' => {
                lines.push(&data[start..i]);
                if data.get(i + 1) == Some(&b'\n') {
                    i += 1;
                }
                start = i + 1;
            }
            _ => {}
        }
        i += 1;
    }

    if start < data.len() {
        lines.push(&data[start..]);
    }
    lines
}
