//! Multipart upload client.
//!
//! Async HTTP client using `reqwest`. The payload is streamed in slices so
//! the client can report how much of the body has been handed off.

use std::sync::Arc;

use bytes::Bytes;
use futures_util::{StreamExt, stream};
use reqwest::multipart::{Form, Part};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use pixdrop_protocol::constants::{DEFAULT_CHUNK_SIZE, UPLOAD_FIELD_NAME};
use pixdrop_protocol::{SourceFile, UploadResponse};

use crate::TransferError;
use crate::progress::ProgressCounter;

/// Posts files to an upload endpoint.
pub struct HttpTransmitter {
    http: reqwest::Client,
    endpoint: String,
    chunk_size: usize,
}

impl HttpTransmitter {
    /// Creates a transmitter for the given endpoint URL.
    pub fn new(endpoint: impl Into<String>) -> Result<Self, TransferError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self::with_client(http, endpoint))
    }

    /// Creates a transmitter on top of an existing `reqwest` client.
    pub fn with_client(http: reqwest::Client, endpoint: impl Into<String>) -> Self {
        Self {
            http,
            endpoint: endpoint.into(),
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Sets the body slice size. Zero is treated as one byte.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Uploads `file` and returns the server's locator for it.
    ///
    /// `on_progress` receives the cumulative number of bytes handed to the
    /// HTTP stack, never decreasing. If `cancel` fires before the response
    /// is fully read the request is dropped and `TransferError::Cancelled`
    /// is returned.
    pub async fn transmit<F>(
        &self,
        file: &SourceFile,
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<UploadResponse, TransferError>
    where
        F: Fn(u64) + Send + Sync + 'static,
    {
        if cancel.is_cancelled() {
            return Err(TransferError::Cancelled);
        }

        let counter = Arc::new(ProgressCounter::new(on_progress));
        let body = body_stream(file.data.clone(), self.chunk_size, Arc::clone(&counter));
        let part = Part::stream_with_length(body, file.size())
            .file_name(file.name.clone())
            .mime_str(file.mime_type())?;
        let form = Form::new().part(UPLOAD_FIELD_NAME, part);

        debug!(file = %file.name, bytes = file.size(), endpoint = %self.endpoint, "sending file");

        let request = self.http.post(&self.endpoint).multipart(form).send();
        let resp = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(file = %file.name, sent = counter.current(), "transfer aborted");
                return Err(TransferError::Cancelled);
            }
            resp = request => resp?,
        };

        let status = resp.status();
        if !status.is_success() {
            let body = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(TransferError::Cancelled),
                body = resp.text() => body?,
            };
            return Err(TransferError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let body = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Err(TransferError::Cancelled),
            body = resp.bytes() => body?,
        };
        let parsed: UploadResponse = serde_json::from_slice(&body)?;

        debug!(file = %file.name, url = %parsed.url, "file stored");
        Ok(parsed)
    }
}

/// Splits `data` into slices and counts each slice as it is pulled.
fn body_stream(data: Bytes, chunk_size: usize, counter: Arc<ProgressCounter>) -> reqwest::Body {
    let len = data.len();
    let slices: Vec<Bytes> = (0..len)
        .step_by(chunk_size)
        .map(|start| data.slice(start..(start + chunk_size).min(len)))
        .collect();

    let stream = stream::iter(slices).map(move |slice| {
        counter.advance(slice.len() as u64);
        Ok::<_, std::io::Error>(slice)
    });
    reqwest::Body::wrap_stream(stream)
}
