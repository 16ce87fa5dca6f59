//! Bridges the image and HTTP crates to the engine's stage traits.

use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use pixdrop_compress::CompressError;
use pixdrop_transfer::{HttpTransmitter, TransferError};
use pixdrop_uploads::{
    CompressOptions, Compressor, ProgressFn, SourceFile, Transmitter, UploadError,
};

/// [`Compressor`] backed by `pixdrop_compress`.
pub struct ImageCompressor;

impl Compressor for ImageCompressor {
    fn compress(
        &self,
        file: SourceFile,
        options: CompressOptions,
        cancel: CancellationToken,
    ) -> Pin<Box<dyn Future<Output = Result<SourceFile, UploadError>> + Send + '_>> {
        Box::pin(async move {
            pixdrop_compress::compress(&file, options, &cancel)
                .await
                .map_err(compress_error)
        })
    }
}

/// [`Transmitter`] backed by [`HttpTransmitter`].
pub struct HttpUploader {
    inner: HttpTransmitter,
}

impl HttpUploader {
    pub fn new(inner: HttpTransmitter) -> Self {
        Self { inner }
    }
}

impl Transmitter for HttpUploader {
    fn transmit(
        &self,
        file: SourceFile,
        cancel: CancellationToken,
        on_progress: ProgressFn,
    ) -> Pin<Box<dyn Future<Output = Result<String, UploadError>> + Send + '_>> {
        Box::pin(async move {
            let resp = self
                .inner
                .transmit(&file, &cancel, move |sent| on_progress(sent))
                .await
                .map_err(transfer_error)?;
            Ok(resp.url)
        })
    }
}

fn compress_error(e: CompressError) -> UploadError {
    if e.is_cancelled() {
        UploadError::Cancelled
    } else {
        UploadError::Compress(e.to_string())
    }
}

fn transfer_error(e: TransferError) -> UploadError {
    if e.is_cancelled() {
        UploadError::Cancelled
    } else {
        UploadError::Transfer(e.to_string())
    }
}
