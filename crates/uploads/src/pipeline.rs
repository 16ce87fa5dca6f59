//! Per-record pipeline: compress, then transmit, then resolve.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use pixdrop_protocol::{CompressOptions, SourceFile, UploadId, UploadStatus};

use crate::collaborators::{Compressor, ProgressFn, Transmitter};
use crate::error::UploadError;
use crate::store::RecordStore;
use crate::types::RecordPatch;

/// Everything one pipeline task needs, moved into the task.
pub(crate) struct RecordPipeline {
    pub(crate) store: Arc<RecordStore>,
    pub(crate) compressor: Arc<dyn Compressor>,
    pub(crate) transmitter: Arc<dyn Transmitter>,
    pub(crate) options: CompressOptions,
}

impl RecordPipeline {
    /// Runs the pipeline to completion and writes the terminal status.
    ///
    /// Errors never escape: they become `Failed` or `Canceled`.
    pub(crate) async fn run(self, id: UploadId, source: SourceFile, cancel: CancellationToken) {
        let outcome = self.drive(id, source, &cancel).await;

        let patch = match outcome {
            Ok(url) => {
                info!(upload = %id, url = %url, "upload succeeded");
                RecordPatch::succeeded(url)
            }
            Err(e) if e.is_cancelled() => {
                info!(upload = %id, "upload canceled");
                RecordPatch::status(UploadStatus::Canceled)
            }
            Err(e) => {
                warn!(upload = %id, error = %e, "upload failed");
                RecordPatch::failed(e.to_string())
            }
        };

        self.store.resolve(id, patch);
    }

    async fn drive(
        &self,
        id: UploadId,
        source: SourceFile,
        cancel: &CancellationToken,
    ) -> Result<String, UploadError> {
        // 1. Compress
        check_cancelled(cancel)?;
        debug!(upload = %id, bytes = source.size(), "compressing");

        let compressed = self
            .compressor
            .compress(source, self.options, cancel.clone())
            .await?;
        self.store
            .update(id, RecordPatch::compressed(compressed.size()));

        // 2. Transmit
        check_cancelled(cancel)?;
        debug!(upload = %id, bytes = compressed.size(), "transmitting");

        let store = Arc::clone(&self.store);
        let on_progress: ProgressFn = Arc::new(move |sent| {
            store.update(id, RecordPatch::transmitted(sent));
        });

        self.transmitter
            .transmit(compressed, cancel.clone(), on_progress)
            .await
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<(), UploadError> {
    if cancel.is_cancelled() {
        Err(UploadError::Cancelled)
    } else {
        Ok(())
    }
}
