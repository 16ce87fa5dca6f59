//! Insertion-ordered record store with a single mutation API.
//!
//! All writes go through [`RecordStore::update`] (or its terminal variant
//! [`RecordStore::resolve`]). Writes to a record that has left `Pending`
//! are rejected, which is what serializes racing callbacks for one id.
//! Each effective write bumps a revision published on a watch channel.

use std::collections::HashMap;

use parking_lot::RwLock;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use pixdrop_protocol::{SourceFile, UploadId, UploadStatus};

use crate::progress::summarize;
use crate::types::{RecordPatch, UploadRecord, UploadSummary};

/// Single source of truth for upload records.
pub struct RecordStore {
    inner: RwLock<StoreInner>,
    revision: watch::Sender<u64>,
}

#[derive(Default)]
struct StoreInner {
    order: Vec<UploadId>,
    records: HashMap<UploadId, UploadRecord>,
}

impl Default for RecordStore {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordStore {
    pub fn new() -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            inner: RwLock::new(StoreInner::default()),
            revision,
        }
    }

    /// Inserts a new `Pending` record for `file` and returns its id.
    pub fn create(&self, file: SourceFile) -> UploadId {
        self.create_with_token(file).0
    }

    /// Like [`create`](Self::create), also returning the record's token.
    pub(crate) fn create_with_token(&self, file: SourceFile) -> (UploadId, CancellationToken) {
        let mut id = UploadId::new();
        let token = {
            let mut inner = self.inner.write();
            while inner.records.contains_key(&id) {
                id = UploadId::new();
            }
            let record = UploadRecord::new(id, file);
            let token = record.cancel.clone();
            inner.order.push(id);
            inner.records.insert(id, record);
            token
        };
        self.bump();
        (id, token)
    }

    /// Merges `patch` into a pending record.
    ///
    /// Returns `false` when the id is unknown, the record is terminal, or
    /// the patch changes nothing.
    pub fn update(&self, id: UploadId, patch: RecordPatch) -> bool {
        self.mutate(id, |record| patch.apply_to(record))
    }

    /// Applies a pipeline's final patch.
    ///
    /// If the record's token has fired, the record resolves as `Canceled`
    /// whatever the patch says: a cancel accepted while `Pending` wins over
    /// a success or failure that lands afterwards.
    pub(crate) fn resolve(&self, id: UploadId, patch: RecordPatch) -> bool {
        self.mutate(id, |record| {
            let patch = if record.cancel.is_cancelled() {
                RecordPatch::status(UploadStatus::Canceled)
            } else {
                patch
            };
            patch.apply_to(record)
        })
    }

    /// Fires the token of a pending record.
    ///
    /// Returns `false` for unknown ids, terminal records and records whose
    /// token already fired, so each token is fired at most once.
    pub(crate) fn cancel(&self, id: UploadId) -> bool {
        let inner = self.inner.read();
        match inner.records.get(&id) {
            Some(record) if record.is_pending() && !record.cancel.is_cancelled() => {
                record.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Point lookup; returns a snapshot.
    pub fn get(&self, id: UploadId) -> Option<UploadRecord> {
        self.inner.read().records.get(&id).cloned()
    }

    /// Snapshot of every record in insertion order.
    pub fn all(&self) -> Vec<UploadRecord> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.records.get(id).cloned())
            .collect()
    }

    /// Ids of the records still `Pending`, in insertion order.
    pub fn pending_ids(&self) -> Vec<UploadId> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter(|id| inner.records.get(*id).is_some_and(UploadRecord::is_pending))
            .copied()
            .collect()
    }

    /// Aggregate projection over the current records.
    pub fn summary(&self) -> UploadSummary {
        let inner = self.inner.read();
        summarize(inner.records.values())
    }

    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current revision number; increases on every effective write.
    pub fn revision(&self) -> u64 {
        *self.revision.borrow()
    }

    /// Receiver notified after every effective write.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    fn mutate(&self, id: UploadId, f: impl FnOnce(&mut UploadRecord) -> bool) -> bool {
        let changed = {
            let mut inner = self.inner.write();
            match inner.records.get_mut(&id) {
                Some(record) if record.is_pending() => f(record),
                _ => false,
            }
        };
        if changed {
            self.bump();
        }
        changed
    }

    fn bump(&self) {
        self.revision.send_modify(|rev| *rev += 1);
    }
}
