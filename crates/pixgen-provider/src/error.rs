//! Provider error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider could not be reached, or did not answer within the
    /// submission timeout. Nothing was enqueued as far as we know.
    #[error("provider unavailable: {0}")]
    Unavailable(String),

    /// The provider answered but refused the submission.
    #[error("provider rejected submission ({status}): {reason}")]
    Rejected { status: u16, reason: String },

    /// The provider answered with a body we could not interpret.
    #[error("invalid provider response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ProviderError::Unavailable("submission timed out".to_string())
        } else if err.is_decode() {
            ProviderError::InvalidResponse(err.to_string())
        } else {
            ProviderError::Unavailable(err.to_string())
        }
    }
}
