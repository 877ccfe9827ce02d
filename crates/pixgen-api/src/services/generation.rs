//! Generation orchestration: the credit-gated submission pipeline.
//!
//! Every submission follows the same shape:
//!
//! 1. resolve the referenced model (and pack, for batches),
//! 2. advisory balance check, so an underfunded request never reaches
//!    the provider,
//! 3. dispatch to the provider (one call per image),
//! 4. commit the debit and the pending rows in one transaction.
//!
//! The debit inside the transaction is conditional again, so two
//! requests racing on the same balance serialize at the storage layer:
//! the loser gets `InsufficientCredits` and nothing is persisted. A
//! submission already enqueued at the provider by an aborted request is
//! left to the reconciler's unknown-handle discard.

use std::sync::Arc;

use chrono::Utc;
use futures_util::future::try_join_all;
use pixgen_models::{
    pack_generation_cost, Credits, GeneratedImage, JobStatus, ModelAttributes, TrainedModel,
    IMAGE_GEN_CREDITS, TRAIN_MODEL_CREDITS,
};
use pixgen_provider::{GenerativeProvider, TrainingSubmission};
use pixgen_store::{CreditLedger, GeneratedImageRepository, Store, TrainedModelRepository};
use tracing::{info, warn};

use crate::error::{ApiError, ApiResult};

/// Coordinates training and generation submissions against the ledger,
/// the provider and the job store.
#[derive(Clone)]
pub struct GenerationOrchestrator {
    store: Store,
    provider: Arc<dyn GenerativeProvider>,
}

impl GenerationOrchestrator {
    pub fn new(store: Store, provider: Arc<dyn GenerativeProvider>) -> Self {
        Self { store, provider }
    }

    /// Submit a model training run. Costs [`TRAIN_MODEL_CREDITS`].
    ///
    /// Returns the new model's id; the artifact arrives later via the
    /// training webhook.
    pub async fn train_model(
        &self,
        user_id: &str,
        name: String,
        asset_url: String,
        attributes: ModelAttributes,
    ) -> ApiResult<String> {
        self.ensure_balance(user_id, TRAIN_MODEL_CREDITS).await?;

        let job = self
            .provider
            .submit_training(&TrainingSubmission {
                asset_url: asset_url.clone(),
                model_name: name.clone(),
                attributes: attributes.clone(),
            })
            .await?;

        let now = Utc::now();
        let model = TrainedModel {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            name,
            attributes,
            asset_url,
            request_id: job.request_id,
            artifact_path: None,
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.store.begin().await?;
        CreditLedger::debit_in(&mut tx, user_id, TRAIN_MODEL_CREDITS).await?;
        TrainedModelRepository::insert_in(&mut tx, &model).await?;
        tx.commit().await.map_err(pixgen_store::StoreError::from)?;

        info!(
            user_id,
            model_id = %model.id,
            request_id = %model.request_id,
            "training submitted"
        );
        Ok(model.id)
    }

    /// Submit a single image generation. Costs one credit.
    pub async fn generate_image(
        &self,
        user_id: &str,
        model_id: &str,
        prompt: &str,
    ) -> ApiResult<String> {
        let model = self.resolve_ready_model(model_id).await?;
        let artifact = model.artifact_path.as_deref().unwrap_or_default();
        let cost = IMAGE_GEN_CREDITS;
        self.ensure_balance(user_id, cost).await?;

        let job = self
            .provider
            .submit_image_generation(prompt, artifact)
            .await?;
        let image = GeneratedImage::pending(user_id, &model.id, prompt, job.request_id);

        let mut tx = self.store.begin().await?;
        CreditLedger::debit_in(&mut tx, user_id, cost).await?;
        GeneratedImageRepository::insert_in(&mut tx, &image).await?;
        tx.commit().await.map_err(pixgen_store::StoreError::from)?;

        info!(user_id, image_id = %image.id, request_id = %image.request_id, "image submitted");
        Ok(image.id)
    }

    /// Submit one generation per prompt in the pack, all-or-nothing.
    ///
    /// The N submissions dispatch concurrently; the N-credit debit and
    /// the N pending rows commit as one unit only after every dispatch
    /// returned a handle.
    pub async fn generate_from_pack(
        &self,
        user_id: &str,
        pack_id: &str,
        model_id: &str,
    ) -> ApiResult<Vec<String>> {
        let model = self.resolve_ready_model(model_id).await?;
        let artifact = model.artifact_path.as_deref().unwrap_or_default();

        let prompts = self.store.packs().prompts_for_pack(pack_id).await?;
        if prompts.is_empty() {
            return Ok(Vec::new());
        }

        let cost = pack_generation_cost(prompts.len());
        self.ensure_balance(user_id, cost).await?;

        let submissions = try_join_all(
            prompts
                .iter()
                .map(|p| self.provider.submit_image_generation(&p.prompt, artifact)),
        )
        .await?;

        // Every dispatched prompt must have come back with a handle;
        // a hole here would persist a row we can never reconcile.
        if submissions.len() != prompts.len()
            || submissions.iter().any(|s| s.request_id.is_empty())
        {
            warn!(
                user_id,
                pack_id,
                expected = prompts.len(),
                got = submissions.len(),
                "aborting batch: dispatch results incomplete"
            );
            return Err(ApiError::DispatchMismatch(format!(
                "expected {} handles, got {}",
                prompts.len(),
                submissions.len()
            )));
        }

        let images: Vec<GeneratedImage> = prompts
            .iter()
            .zip(submissions)
            .map(|(p, job)| GeneratedImage::pending(user_id, &model.id, &p.prompt, job.request_id))
            .collect();

        let mut tx = self.store.begin().await?;
        CreditLedger::debit_in(&mut tx, user_id, cost).await?;
        for image in &images {
            GeneratedImageRepository::insert_in(&mut tx, image).await?;
        }
        tx.commit().await.map_err(pixgen_store::StoreError::from)?;

        info!(user_id, pack_id, count = images.len(), "pack submitted");
        Ok(images.into_iter().map(|i| i.id).collect())
    }

    /// Resolve a model that is ready to generate: it exists and its
    /// trained artifact is present.
    async fn resolve_ready_model(&self, model_id: &str) -> ApiResult<TrainedModel> {
        let model = self
            .store
            .models()
            .find_by_id(model_id)
            .await?
            .ok_or(ApiError::ModelNotFound)?;
        if !model.is_ready() {
            return Err(ApiError::ModelNotFound);
        }
        Ok(model)
    }

    /// Advisory gate: reject before any provider call when the balance
    /// is plainly short. The authoritative check is the conditional
    /// debit inside the commit transaction.
    async fn ensure_balance(&self, user_id: &str, needed: Credits) -> ApiResult<()> {
        let available = self.store.ledger().get_balance(user_id).await?;
        if available < needed {
            return Err(ApiError::InsufficientCredits);
        }
        Ok(())
    }
}
