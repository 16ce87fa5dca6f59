use std::fmt;
use std::path::Path;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::constants::{DEFAULT_MAX_DIMENSION, DEFAULT_QUALITY, FALLBACK_MIME_TYPE};

/// Opaque identifier of one upload record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UploadId(Uuid);

impl UploadId {
    /// Generates a fresh random identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UploadId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UploadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// An in-memory file: display name plus payload.
///
/// Cloning is cheap; the payload is reference counted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub data: Bytes,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Payload length in bytes.
    pub fn size(&self) -> u64 {
        self.data.len() as u64
    }

    /// MIME type guessed from the file extension.
    pub fn mime_type(&self) -> &'static str {
        let ext = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("jpg" | "jpeg") => "image/jpeg",
            Some("png") => "image/png",
            Some("gif") => "image/gif",
            Some("webp") => "image/webp",
            _ => FALLBACK_MIME_TYPE,
        }
    }
}

/// Lifecycle state of an upload record.
///
/// `Pending` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Succeeded,
    Failed,
    Canceled,
}

impl UploadStatus {
    /// Returns `true` for `Succeeded`, `Failed` and `Canceled`.
    pub fn is_terminal(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for UploadStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Pending => "pending",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Canceled => "canceled",
        };
        f.write_str(label)
    }
}

/// Target parameters for the compression stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// Encoder quality, 1-100. Out-of-range values are clamped on use.
    pub quality: u8,
}

impl CompressOptions {
    /// Quality clamped to the encoder's accepted range.
    pub fn clamped_quality(&self) -> u8 {
        self.quality.clamp(1, 100)
    }
}

impl Default for CompressOptions {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_DIMENSION,
            max_height: DEFAULT_MAX_DIMENSION,
            quality: DEFAULT_QUALITY,
        }
    }
}

/// Body returned by the upload endpoint on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub url: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upload_ids_are_unique() {
        let a = UploadId::new();
        let b = UploadId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn upload_id_serializes_as_plain_string() {
        let id = UploadId::new();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{id}\""));
    }

    #[test]
    fn source_file_size_and_mime() {
        let file = SourceFile::new("Photo.JPEG", vec![0u8; 2048]);
        assert_eq!(file.size(), 2048);
        assert_eq!(file.mime_type(), "image/jpeg");

        let other = SourceFile::new("notes", Vec::new());
        assert_eq!(other.size(), 0);
        assert_eq!(other.mime_type(), FALLBACK_MIME_TYPE);
    }

    #[test]
    fn terminal_statuses() {
        assert!(!UploadStatus::Pending.is_terminal());
        assert!(UploadStatus::Succeeded.is_terminal());
        assert!(UploadStatus::Failed.is_terminal());
        assert!(UploadStatus::Canceled.is_terminal());
    }

    #[test]
    fn upload_status_serialization() {
        assert_eq!(
            serde_json::to_string(&UploadStatus::Canceled).unwrap(),
            "\"canceled\""
        );
        let parsed: UploadStatus = serde_json::from_str("\"succeeded\"").unwrap();
        assert_eq!(parsed, UploadStatus::Succeeded);
    }

    #[test]
    fn compress_options_defaults_and_clamp() {
        let opts = CompressOptions::default();
        assert_eq!(opts.max_width, 1000);
        assert_eq!(opts.max_height, 1000);
        assert_eq!(opts.quality, 80);

        let zero = CompressOptions { quality: 0, ..opts };
        assert_eq!(zero.clamped_quality(), 1);
        let high = CompressOptions { quality: 250, ..opts };
        assert_eq!(high.clamped_quality(), 100);
    }

    #[test]
    fn compress_options_field_names() {
        let json = serde_json::to_string(&CompressOptions::default()).unwrap();
        assert!(json.contains("maxWidth"));
        assert!(json.contains("maxHeight"));
    }

    #[test]
    fn upload_response_parses() {
        let resp: UploadResponse =
            serde_json::from_str(r#"{"url":"https://cdn.example/a.jpg"}"#).unwrap();
        assert_eq!(resp.url, "https://cdn.example/a.jpg");
    }
}
