//! Contracts for the two pipeline stages.
//!
//! The application implements these on top of the real image and HTTP
//! crates. Using traits keeps the engine decoupled from both and testable
//! with scripted mocks.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use pixdrop_protocol::{CompressOptions, SourceFile};

use crate::error::UploadError;

/// Receives the cumulative number of bytes transmitted.
pub type ProgressFn = Arc<dyn Fn(u64) + Send + Sync>;

/// Produces a smaller derived file from a source image.
pub trait Compressor: Send + Sync {
    /// Compresses `file` within `options`.
    ///
    /// Must return [`UploadError::Cancelled`] promptly once `cancel` fires.
    fn compress(
        &self,
        file: SourceFile,
        options: CompressOptions,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<SourceFile, UploadError>> + Send + '_>>;
}

/// Sends one file to the remote store.
pub trait Transmitter: Send + Sync {
    /// Transmits `file` and resolves with the remote locator.
    ///
    /// `on_progress` is called zero or more times with a non-decreasing
    /// byte count, always before the returned future resolves. Must return
    /// [`UploadError::Cancelled`] when `cancel` fires mid-transfer.
    fn transmit(
        &self,
        file: SourceFile,
        cancel: CancellationToken,
        on_progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + '_>>;
}
