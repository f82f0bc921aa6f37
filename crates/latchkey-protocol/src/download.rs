//! `downloadFile` payload format.
//!
//! The command's `data` field is a JSON document:
//!
//! ```json
//! {"fileName": "export.json", "blobData": "...", "blobOptions": {"type": "text/plain"}}
//! ```
//!
//! `blobData` is literal UTF-8 text when `blobOptions.type` is exactly
//! `text/plain`; for every other type, and when `blobOptions` is absent, it
//! is padded standard Base64.

use serde::{Deserialize, Serialize};
use zeroize::Zeroizing;

use crate::error::ProtocolError;

/// MIME type whose blob is written verbatim instead of Base64-decoded.
pub const TEXT_PLAIN: &str = "text/plain";

/// Decoded `downloadFile` request.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DownloadFileMessage {
    /// File name suggested in the save dialog.
    pub file_name: String,
    /// Blob contents, text or Base64 depending on [`BlobOptions::mime_type`].
    #[serde(default)]
    pub blob_data: Option<String>,
    /// Blob options as passed to the browser `Blob` constructor.
    #[serde(default)]
    pub blob_options: Option<BlobOptions>,
}

/// Subset of the browser `BlobPropertyBag` the bridge understands.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlobOptions {
    /// Declared MIME type.
    #[serde(rename = "type", default)]
    pub mime_type: Option<String>,
}

impl DownloadFileMessage {
    /// Parse the JSON carried in the command's `data` field.
    ///
    /// # Errors
    ///
    /// Returns [`ProtocolError::InvalidDownload`] if the text is not JSON of
    /// the expected shape (`fileName` is required).
    pub fn parse(json: &str) -> Result<Self, ProtocolError> {
        serde_json::from_str(json).map_err(|e| ProtocolError::InvalidDownload(e.to_string()))
    }

    /// Whether the blob is declared as plain text.
    #[must_use]
    pub fn is_plain_text(&self) -> bool {
        self.blob_options
            .as_ref()
            .and_then(|o| o.mime_type.as_deref())
            == Some(TEXT_PLAIN)
    }

    /// Bytes to write to disk. Zeroized when dropped.
    ///
    /// # Errors
    ///
    /// - [`ProtocolError::EmptyBlob`] if `blobData` is absent.
    /// - [`ProtocolError::InvalidBase64`] if a non-text blob does not decode.
    pub fn blob_bytes(&self) -> Result<Zeroizing<Vec<u8>>, ProtocolError> {
        let blob = self.blob_data.as_deref().ok_or(ProtocolError::EmptyBlob)?;
        if self.is_plain_text() {
            return Ok(Zeroizing::new(blob.as_bytes().to_vec()));
        }
        data_encoding::BASE64
            .decode(blob.as_bytes())
            .map(Zeroizing::new)
            .map_err(|e| ProtocolError::InvalidBase64(e.to_string()))
    }
}

impl std::fmt::Debug for DownloadFileMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DownloadFileMessage")
            .field("file_name", &self.file_name)
            .field("blob_data", &self.blob_data.as_ref().map(|_| "***"))
            .field("blob_options", &self.blob_options)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
