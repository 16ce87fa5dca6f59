//! Data types for upload records.

use tokio_util::sync::CancellationToken;

use pixdrop_protocol::{SourceFile, UploadId, UploadStatus};

use crate::progress::percentage;

/// Tracked state for one submitted file.
///
/// Values handed out by the store are snapshots; changing them has no
/// effect on the engine.
#[derive(Debug, Clone)]
pub struct UploadRecord {
    pub id: UploadId,
    /// Original file name, for display.
    pub name: String,
    /// The uncompressed payload as submitted.
    pub source: SourceFile,
    pub status: UploadStatus,
    pub original_size_bytes: u64,
    /// Cumulative bytes acknowledged by the transmission stage.
    pub transmitted_size_bytes: u64,
    /// Size of the compressed file, once compression has finished.
    pub compressed_size_bytes: Option<u64>,
    /// Locator of the stored artifact, set on success.
    pub remote_url: Option<String>,
    /// Failure reason, set when the record ends `Failed`.
    pub error: Option<String>,
    pub(crate) cancel: CancellationToken,
}

impl UploadRecord {
    pub(crate) fn new(id: UploadId, source: SourceFile) -> Self {
        Self {
            id,
            name: source.name.clone(),
            original_size_bytes: source.size(),
            source,
            status: UploadStatus::Pending,
            transmitted_size_bytes: 0,
            compressed_size_bytes: None,
            remote_url: None,
            error: None,
            cancel: CancellationToken::new(),
        }
    }

    pub fn is_pending(&self) -> bool {
        self.status == UploadStatus::Pending
    }

    /// Transmission progress, 0-100.
    ///
    /// A `Succeeded` record is always complete; compressed uploads send
    /// fewer bytes than the original size.
    pub fn progress_percent(&self) -> u8 {
        if self.status == UploadStatus::Succeeded {
            return 100;
        }
        percentage(self.transmitted_size_bytes, self.original_size_bytes)
    }

    /// How much smaller the compressed file is, in whole percent.
    ///
    /// Negative when compression grew the file. `None` until compression
    /// finishes, or for empty sources.
    pub fn size_reduction_percent(&self) -> Option<i64> {
        let compressed = self.compressed_size_bytes?;
        if self.original_size_bytes == 0 {
            return None;
        }
        let ratio = compressed as f64 / self.original_size_bytes as f64;
        Some(((1.0 - ratio) * 100.0).round() as i64)
    }
}

/// A partial update merged into an existing record.
///
/// Only `Some` fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub status: Option<UploadStatus>,
    pub transmitted_size_bytes: Option<u64>,
    pub compressed_size_bytes: Option<u64>,
    pub remote_url: Option<String>,
    pub error: Option<String>,
}

impl RecordPatch {
    pub fn transmitted(bytes: u64) -> Self {
        Self {
            transmitted_size_bytes: Some(bytes),
            ..Self::default()
        }
    }

    pub fn compressed(bytes: u64) -> Self {
        Self {
            compressed_size_bytes: Some(bytes),
            ..Self::default()
        }
    }

    pub fn status(status: UploadStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    pub fn succeeded(remote_url: impl Into<String>) -> Self {
        Self {
            status: Some(UploadStatus::Succeeded),
            remote_url: Some(remote_url.into()),
            ..Self::default()
        }
    }

    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            status: Some(UploadStatus::Failed),
            error: Some(error.into()),
            ..Self::default()
        }
    }

    /// Merges the patch into `record`, returning whether anything changed.
    ///
    /// The transmitted byte count never moves backwards.
    pub(crate) fn apply_to(self, record: &mut UploadRecord) -> bool {
        let mut changed = false;

        if let Some(bytes) = self.transmitted_size_bytes
            && bytes > record.transmitted_size_bytes
        {
            record.transmitted_size_bytes = bytes;
            changed = true;
        }
        if let Some(bytes) = self.compressed_size_bytes
            && record.compressed_size_bytes != Some(bytes)
        {
            record.compressed_size_bytes = Some(bytes);
            changed = true;
        }
        if let Some(url) = self.remote_url {
            record.remote_url = Some(url);
            changed = true;
        }
        if let Some(error) = self.error {
            record.error = Some(error);
            changed = true;
        }
        if let Some(status) = self.status
            && status != record.status
        {
            record.status = status;
            changed = true;
        }

        changed
    }
}

/// Aggregate view over every record in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    /// `true` while at least one record is `Pending`.
    pub has_pending_uploads: bool,
    /// Number of `Pending` records.
    pub pending: usize,
    /// Overall transmission progress of the pending records, 0-100.
    pub percentage: u8,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(size: usize) -> UploadRecord {
        UploadRecord::new(UploadId::new(), SourceFile::new("a.png", vec![0u8; size]))
    }

    #[test]
    fn new_record_is_pending_with_no_progress() {
        let rec = record(2048);
        assert!(rec.is_pending());
        assert_eq!(rec.name, "a.png");
        assert_eq!(rec.original_size_bytes, 2048);
        assert_eq!(rec.transmitted_size_bytes, 0);
        assert_eq!(rec.progress_percent(), 0);
        assert!(!rec.cancel.is_cancelled());
    }

    #[test]
    fn progress_percent_halfway_and_clamped() {
        let mut rec = record(2048);
        rec.transmitted_size_bytes = 1024;
        assert_eq!(rec.progress_percent(), 50);

        rec.transmitted_size_bytes = 4096;
        assert_eq!(rec.progress_percent(), 100);
    }

    #[test]
    fn succeeded_record_is_complete_after_compression() {
        let mut rec = record(1000);
        rec.compressed_size_bytes = Some(60);
        rec.transmitted_size_bytes = 60;
        assert_eq!(rec.progress_percent(), 6);

        rec.status = UploadStatus::Succeeded;
        assert_eq!(rec.progress_percent(), 100);

        rec.status = UploadStatus::Failed;
        assert_eq!(rec.progress_percent(), 6);
    }

    #[test]
    fn size_reduction() {
        let mut rec = record(1000);
        assert_eq!(rec.size_reduction_percent(), None);

        rec.compressed_size_bytes = Some(60);
        assert_eq!(rec.size_reduction_percent(), Some(94));

        rec.compressed_size_bytes = Some(1500);
        assert_eq!(rec.size_reduction_percent(), Some(-50));

        let mut empty = record(0);
        empty.compressed_size_bytes = Some(10);
        assert_eq!(empty.size_reduction_percent(), None);
    }

    #[test]
    fn patch_never_rewinds_transmitted_bytes() {
        let mut rec = record(100);
        assert!(RecordPatch::transmitted(40).apply_to(&mut rec));
        assert!(!RecordPatch::transmitted(10).apply_to(&mut rec));
        assert!(!RecordPatch::transmitted(40).apply_to(&mut rec));
        assert_eq!(rec.transmitted_size_bytes, 40);
    }

    #[test]
    fn patch_applies_only_present_fields() {
        let mut rec = record(100);
        rec.transmitted_size_bytes = 30;

        assert!(RecordPatch::failed("disk full").apply_to(&mut rec));
        assert_eq!(rec.status, UploadStatus::Failed);
        assert_eq!(rec.error.as_deref(), Some("disk full"));
        assert_eq!(rec.transmitted_size_bytes, 30);
        assert_eq!(rec.remote_url, None);
    }

    #[test]
    fn empty_patch_changes_nothing() {
        let mut rec = record(100);
        assert!(!RecordPatch::default().apply_to(&mut rec));
    }
}
