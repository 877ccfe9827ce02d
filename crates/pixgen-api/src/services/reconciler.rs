//! Completion reconciliation.
//!
//! Provider callbacks are delivered at-least-once, so every transition
//! here is idempotent: a duplicate for an already-terminal row is a
//! no-op and an unknown handle is logged and discarded (it may belong
//! to a submission whose batch was aborted before commit).

use pixgen_store::Store;
use tracing::{debug, info, warn};

use crate::error::ApiResult;

/// Outcome reported by the provider for a finished job.
#[derive(Debug, Clone)]
pub enum CallbackOutcome {
    Success { result_url: String },
    Failure { reason: String },
}

/// Applies provider completion callbacks to the job store.
#[derive(Clone)]
pub struct CompletionReconciler {
    store: Store,
}

impl CompletionReconciler {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Reconcile a training completion: writes the artifact path on
    /// success so the model becomes usable for generation.
    pub async fn on_training_callback(
        &self,
        request_id: &str,
        outcome: CallbackOutcome,
    ) -> ApiResult<()> {
        let repo = self.store.models();
        let applied = match &outcome {
            CallbackOutcome::Success { result_url } => {
                repo.mark_trained(request_id, result_url).await?
            }
            CallbackOutcome::Failure { reason } => {
                info!(request_id, reason, "training failed at provider");
                repo.mark_failed(request_id).await?
            }
        };

        if applied {
            info!(request_id, "training callback reconciled");
        } else if repo.find_by_request_id(request_id).await?.is_some() {
            debug!(request_id, "duplicate training callback ignored");
        } else {
            warn!(request_id, "training callback for unknown handle discarded");
        }
        Ok(())
    }

    /// Reconcile an image completion: writes the image URL on success.
    pub async fn on_image_callback(
        &self,
        request_id: &str,
        outcome: CallbackOutcome,
    ) -> ApiResult<()> {
        let repo = self.store.images();
        let applied = match &outcome {
            CallbackOutcome::Success { result_url } => {
                repo.mark_generated(request_id, result_url).await?
            }
            CallbackOutcome::Failure { reason } => {
                info!(request_id, reason, "generation failed at provider");
                repo.mark_failed(request_id).await?
            }
        };

        if applied {
            info!(request_id, "image callback reconciled");
        } else if repo.find_by_request_id(request_id).await?.is_some() {
            debug!(request_id, "duplicate image callback ignored");
        } else {
            warn!(request_id, "image callback for unknown handle discarded");
        }
        Ok(())
    }
}
