//! Upload orchestration engine.
//!
//! Owns the record store, launches one pipeline task per submitted file
//! and exposes the read-side projections. Submission never waits on the
//! network: records are visible as soon as `submit` returns.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::info;

use pixdrop_protocol::{CompressOptions, SourceFile, UploadId, UploadStatus};

use crate::collaborators::{Compressor, Transmitter};
use crate::pipeline::RecordPipeline;
use crate::store::RecordStore;
use crate::types::{UploadRecord, UploadSummary};

/// Drives batches of files through compress-then-transmit.
///
/// All submitted records start immediately and run concurrently; there is
/// no queue and no concurrency limit.
pub struct UploadEngine {
    store: Arc<RecordStore>,
    compressor: Arc<dyn Compressor>,
    transmitter: Arc<dyn Transmitter>,
    options: CompressOptions,
}

impl UploadEngine {
    /// Creates an engine with default compression options.
    pub fn new(compressor: Arc<dyn Compressor>, transmitter: Arc<dyn Transmitter>) -> Self {
        Self {
            store: Arc::new(RecordStore::new()),
            compressor,
            transmitter,
            options: CompressOptions::default(),
        }
    }

    /// Sets the compression target used for every pipeline started later.
    pub fn with_options(mut self, options: CompressOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> CompressOptions {
        self.options
    }

    /// Creates one record per file and starts its pipeline.
    ///
    /// Returns the new ids in submission order. Must be called from within
    /// a Tokio runtime; pipelines are spawned onto it.
    pub fn submit(&self, files: impl IntoIterator<Item = SourceFile>) -> Vec<UploadId> {
        files
            .into_iter()
            .map(|file| {
                let (id, cancel) = self.store.create_with_token(file.clone());
                info!(upload = %id, name = %file.name, bytes = file.size(), "upload submitted");

                let pipeline = RecordPipeline {
                    store: Arc::clone(&self.store),
                    compressor: Arc::clone(&self.compressor),
                    transmitter: Arc::clone(&self.transmitter),
                    options: self.options,
                };
                tokio::spawn(pipeline.run(id, file, cancel));
                id
            })
            .collect()
    }

    /// Requests cancellation of a pending record.
    ///
    /// The record becomes `Canceled` once its pipeline observes the token.
    /// Returns `false` (and changes nothing) for unknown or terminal ids,
    /// or when the record was already asked to cancel.
    pub fn cancel(&self, id: UploadId) -> bool {
        let fired = self.store.cancel(id);
        if fired {
            info!(upload = %id, "cancel requested");
        }
        fired
    }

    /// Requests cancellation of every pending record; returns how many fired.
    pub fn cancel_all(&self) -> usize {
        self.store
            .pending_ids()
            .into_iter()
            .filter(|&id| self.cancel(id))
            .count()
    }

    /// Resubmits the source file of a `Failed` or `Canceled` record.
    ///
    /// The old record is left untouched; the retry gets a fresh record and
    /// pipeline. Returns `None` for unknown, pending or succeeded records.
    pub fn retry(&self, id: UploadId) -> Option<UploadId> {
        let record = self.store.get(id)?;
        if !matches!(record.status, UploadStatus::Failed | UploadStatus::Canceled) {
            return None;
        }
        info!(upload = %id, name = %record.name, "retrying upload");
        self.submit([record.source]).pop()
    }

    /// Point lookup; returns a snapshot.
    pub fn get(&self, id: UploadId) -> Option<UploadRecord> {
        self.store.get(id)
    }

    /// Snapshot of every record in submission order.
    pub fn all(&self) -> Vec<UploadRecord> {
        self.store.all()
    }

    /// Aggregate progress over the pending records.
    pub fn summary(&self) -> UploadSummary {
        self.store.summary()
    }

    /// Receiver notified after every store change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.store.subscribe()
    }

    /// Resolves once no record is `Pending`.
    pub async fn wait_idle(&self) {
        let mut changes = self.store.subscribe();
        while self.store.summary().has_pending_uploads {
            if changes.changed().await.is_err() {
                break;
            }
        }
    }
}
