//! Shared value types for the pixdrop upload pipeline.
//!
//! Everything here is plain data: no I/O, no async. The engine, the
//! collaborators and the front end all agree on these definitions.

pub mod constants;
pub mod format;
pub mod types;

// Re-export primary types for convenience.
pub use format::format_bytes;
pub use types::{CompressOptions, SourceFile, UploadId, UploadResponse, UploadStatus};
