//! Upload orchestration engine.
//!
//! Tracks one record per submitted file and drives each through its own
//! pipeline task. The engine has no transport or image dependencies: the
//! application supplies [`Compressor`] and [`Transmitter`] implementations.
//!
//! # Pipeline
//!
//! 1. **Compress**: shrink the source image to the configured bounds
//! 2. **Transmit**: send the compressed file, reporting cumulative bytes
//! 3. **Resolve**: move the record to `Succeeded`, `Failed` or `Canceled`
//!
//! Every record carries its own cancellation token; both stages observe it.

pub mod collaborators;
pub mod engine;
pub mod error;
mod pipeline;
pub mod progress;
pub mod store;
pub mod types;

// Re-export primary types for convenience.
pub use collaborators::{Compressor, ProgressFn, Transmitter};
pub use engine::UploadEngine;
pub use error::UploadError;
pub use progress::{percentage, summarize};
pub use store::RecordStore;
pub use types::{RecordPatch, UploadRecord, UploadSummary};

pub use pixdrop_protocol::{CompressOptions, SourceFile, UploadId, UploadStatus};
