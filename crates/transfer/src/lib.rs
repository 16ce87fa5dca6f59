//! Single-file HTTP transmission with byte progress and cancellation.
//!
//! One call to [`HttpTransmitter::transmit`] posts one file as a multipart
//! form and reports cumulative bytes as the body is streamed out.

mod client;
mod progress;

pub use client::HttpTransmitter;
pub use progress::ProgressCounter;

/// Errors produced by the transfer crate.
#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("server error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("invalid response body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cancelled")]
    Cancelled,
}

impl TransferError {
    /// Returns `true` when the transfer stopped because its token fired.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
