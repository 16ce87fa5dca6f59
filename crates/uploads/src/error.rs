//! Pipeline error types.

/// Errors surfaced by a record's pipeline stages.
///
/// Collaborator adapters must map their own cancellation errors to
/// [`UploadError::Cancelled`]; everything else becomes a stage failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UploadError {
    #[error("compression failed: {0}")]
    Compress(String),

    #[error("transfer failed: {0}")]
    Transfer(String),

    #[error("cancelled")]
    Cancelled,
}

impl UploadError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
