//! Shared fixtures for in-crate tests: a scripted provider double and
//! seed helpers over an in-memory store.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use pixgen_models::{
    Ethnicity, EyeColor, GeneratedImage, JobStatus, ModelAttributes, ModelType, Pack, TrainedModel,
};
use pixgen_provider::{GenerativeProvider, ProviderError, SubmittedJob, TrainingSubmission};
use pixgen_store::Store;

/// Provider double that hands out deterministic handles and can be
/// scripted to fail from a given generation call onward.
pub struct StubProvider {
    training: AtomicUsize,
    generation: AtomicUsize,
    fail_generation_from: AtomicUsize,
}

impl Default for StubProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl StubProvider {
    pub fn new() -> Self {
        Self {
            training: AtomicUsize::new(0),
            generation: AtomicUsize::new(0),
            fail_generation_from: AtomicUsize::new(usize::MAX),
        }
    }

    /// Make the nth generation call (zero-based) and every later one
    /// return an error.
    pub fn fail_generation_from(&self, n: usize) {
        self.fail_generation_from.store(n, Ordering::SeqCst);
    }

    pub fn training_calls(&self) -> usize {
        self.training.load(Ordering::SeqCst)
    }

    pub fn generation_calls(&self) -> usize {
        self.generation.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GenerativeProvider for StubProvider {
    async fn submit_training(
        &self,
        _submission: &TrainingSubmission,
    ) -> Result<SubmittedJob, ProviderError> {
        let n = self.training.fetch_add(1, Ordering::SeqCst);
        Ok(SubmittedJob {
            request_id: format!("train-{n}"),
            response_url: None,
        })
    }

    async fn submit_image_generation(
        &self,
        _prompt: &str,
        _artifact_path: &str,
    ) -> Result<SubmittedJob, ProviderError> {
        let n = self.generation.fetch_add(1, Ordering::SeqCst);
        if n >= self.fail_generation_from.load(Ordering::SeqCst) {
            return Err(ProviderError::Unavailable("scripted outage".to_string()));
        }
        Ok(SubmittedJob {
            request_id: format!("gen-{n}"),
            response_url: None,
        })
    }
}

pub fn attributes() -> ModelAttributes {
    ModelAttributes {
        model_type: ModelType::Woman,
        age: 31,
        ethnicity: Ethnicity::Hispanic,
        eye_color: EyeColor::Green,
        bald: false,
    }
}

fn model_row(user_id: &str, status: JobStatus, artifact: Option<&str>) -> TrainedModel {
    let now = Utc::now();
    TrainedModel {
        id: uuid::Uuid::new_v4().to_string(),
        user_id: user_id.to_string(),
        name: "fixture model".to_string(),
        attributes: attributes(),
        asset_url: "https://cdn.example.com/photos.zip".to_string(),
        request_id: uuid::Uuid::new_v4().to_string(),
        artifact_path: artifact.map(str::to_string),
        status,
        created_at: now,
        updated_at: now,
    }
}

/// Seed a model whose training already completed; returns its id.
pub async fn seed_ready_model(store: &Store, user_id: &str) -> String {
    let model = model_row(
        user_id,
        JobStatus::Generated,
        Some("loras/fixture.safetensors"),
    );
    store.models().create(&model).await.unwrap();
    model.id
}

/// Seed a model still waiting on its training callback; returns its id.
pub async fn seed_pending_model(store: &Store, user_id: &str) -> String {
    let model = model_row(user_id, JobStatus::Pending, None);
    store.models().create(&model).await.unwrap();
    model.id
}

/// Seed a pending image row with a known provider handle; returns its id.
pub async fn seed_pending_image(
    store: &Store,
    user_id: &str,
    model_id: &str,
    request_id: &str,
) -> String {
    let image = GeneratedImage::pending(user_id, model_id, "fixture prompt", request_id.to_string());
    store.images().create(&image).await.unwrap();
    image.id
}

/// Seed a pack with `prompt_count` prompts.
pub async fn seed_pack(store: &Store, pack_id: &str, prompt_count: usize) {
    let pack = Pack {
        id: pack_id.to_string(),
        name: format!("pack {pack_id}"),
        description: String::new(),
        cover_url: String::new(),
    };
    let prompts: Vec<String> = (0..prompt_count).map(|i| format!("prompt {i}")).collect();
    store.packs().seed_pack(&pack, &prompts).await.unwrap();
}
