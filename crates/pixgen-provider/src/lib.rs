//! Generative provider gateway.
//!
//! The provider is an opaque external service reached over HTTP: both
//! calls here only *enqueue* work and return an opaque job handle. The
//! actual model/image production happens out-of-band and is reported
//! back through the webhook contract consumed by the completion
//! reconciler.

mod error;
mod fal;

use async_trait::async_trait;
use pixgen_models::ModelAttributes;

pub use error::ProviderError;
pub use fal::{FalClient, FalConfig};

/// A training job submission.
#[derive(Debug, Clone)]
pub struct TrainingSubmission {
    /// URL of the photo archive to train on
    pub asset_url: String,
    /// Model display name, used as the trigger word
    pub model_name: String,
    pub attributes: ModelAttributes,
}

/// Handle returned by a successful queue submission.
#[derive(Debug, Clone)]
pub struct SubmittedJob {
    /// Opaque provider job handle correlating the completion callback
    pub request_id: String,
    /// URL the provider exposes for polling this submission, if any
    pub response_url: Option<String>,
}

/// Abstraction over the external generative provider.
///
/// Object-safe so orchestration code can run against test doubles.
#[async_trait]
pub trait GenerativeProvider: Send + Sync {
    /// Enqueue a model training run. Fire-and-forget: the trained
    /// artifact arrives later via the training webhook.
    async fn submit_training(
        &self,
        submission: &TrainingSubmission,
    ) -> Result<SubmittedJob, ProviderError>;

    /// Enqueue generation of a single image against a trained artifact.
    /// One call per requested image; batching is the orchestrator's job.
    async fn submit_image_generation(
        &self,
        prompt: &str,
        artifact_path: &str,
    ) -> Result<SubmittedJob, ProviderError>;
}
