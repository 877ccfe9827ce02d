//! fal.ai queue API client.
//!
//! Submissions go to the queue endpoint and return immediately with a
//! `request_id`; results are delivered to the webhook passed via the
//! `fal_webhook` query parameter.

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, info};

use crate::{GenerativeProvider, ProviderError, SubmittedJob, TrainingSubmission};

/// Default queue endpoint.
const DEFAULT_BASE_URL: &str = "https://queue.fal.run";

/// Queue path for LoRA training runs.
const TRAINING_PATH: &str = "fal-ai/flux-lora-fast-training";

/// Queue path for image generation against a trained LoRA.
const GENERATION_PATH: &str = "fal-ai/flux-lora";

/// Default submission timeout. A submission that has not been accepted
/// by then is treated as provider-unavailable.
const DEFAULT_SUBMIT_TIMEOUT: Duration = Duration::from_secs(30);

/// fal.ai client configuration.
#[derive(Debug, Clone)]
pub struct FalConfig {
    pub api_key: String,
    pub base_url: String,
    /// Public base URL of this service; when set, completion webhooks
    /// are requested at `{webhook_base}/fal-ai/webhook/{train,image}`.
    pub webhook_base: Option<String>,
    pub timeout: Duration,
}

impl FalConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            webhook_base: None,
            timeout: DEFAULT_SUBMIT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_webhook_base(mut self, webhook_base: impl Into<String>) -> Self {
        self.webhook_base = Some(webhook_base.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Queue submission acknowledgement.
#[derive(Debug, Deserialize)]
struct QueueResponse {
    request_id: String,
    #[serde(default)]
    response_url: Option<String>,
}

/// Training submission payload.
#[derive(Debug, Serialize)]
struct TrainingPayload<'a> {
    images_data_url: &'a str,
    trigger_word: &'a str,
    subject_type: &'a str,
    age: u8,
    ethnicity: &'a str,
    eye_color: &'a str,
    bald: bool,
}

/// fal.ai implementation of [`GenerativeProvider`].
pub struct FalClient {
    http: Client,
    config: FalConfig,
}

impl FalClient {
    pub fn new(config: FalConfig) -> Result<Self, ProviderError> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ProviderError::Unavailable(e.to_string()))?;
        Ok(Self { http, config })
    }

    fn webhook_url(&self, kind: &str) -> Option<String> {
        self.config
            .webhook_base
            .as_ref()
            .map(|base| format!("{}/fal-ai/webhook/{}", base.trim_end_matches('/'), kind))
    }

    async fn submit(
        &self,
        path: &str,
        webhook_kind: &str,
        body: serde_json::Value,
    ) -> Result<SubmittedJob, ProviderError> {
        let url = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let mut request = self
            .http
            .post(&url)
            .header("Authorization", format!("Key {}", self.config.api_key))
            .json(&body);

        if let Some(webhook) = self.webhook_url(webhook_kind) {
            request = request.query(&[("fal_webhook", webhook)]);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(ProviderError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        let ack: QueueResponse = response.json().await?;
        if ack.request_id.is_empty() {
            return Err(ProviderError::InvalidResponse(
                "queue acknowledgement missing request_id".to_string(),
            ));
        }

        debug!(path, request_id = %ack.request_id, "queued provider submission");
        Ok(SubmittedJob {
            request_id: ack.request_id,
            response_url: ack.response_url,
        })
    }
}

#[async_trait::async_trait]
impl GenerativeProvider for FalClient {
    async fn submit_training(
        &self,
        submission: &TrainingSubmission,
    ) -> Result<SubmittedJob, ProviderError> {
        info!(model_name = %submission.model_name, "submitting training run");
        let payload = TrainingPayload {
            images_data_url: &submission.asset_url,
            trigger_word: &submission.model_name,
            subject_type: submission.attributes.model_type.as_str(),
            age: submission.attributes.age,
            ethnicity: submission.attributes.ethnicity.as_str(),
            eye_color: submission.attributes.eye_color.as_str(),
            bald: submission.attributes.bald,
        };
        self.submit(
            TRAINING_PATH,
            "train",
            serde_json::to_value(payload)
                .map_err(|e| ProviderError::InvalidResponse(e.to_string()))?,
        )
        .await
    }

    async fn submit_image_generation(
        &self,
        prompt: &str,
        artifact_path: &str,
    ) -> Result<SubmittedJob, ProviderError> {
        let body = json!({
            "prompt": prompt,
            "loras": [{ "path": artifact_path, "scale": 1.0 }],
        });
        self.submit(GENERATION_PATH, "image", body).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixgen_models::{Ethnicity, EyeColor, ModelAttributes, ModelType};
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn submission() -> TrainingSubmission {
        TrainingSubmission {
            asset_url: "https://cdn.example.com/photos.zip".to_string(),
            model_name: "casual portraits".to_string(),
            attributes: ModelAttributes {
                model_type: ModelType::Man,
                age: 40,
                ethnicity: Ethnicity::EastAsian,
                eye_color: EyeColor::Brown,
                bald: false,
            },
        }
    }

    async fn client_for(server: &MockServer) -> FalClient {
        FalClient::new(
            FalConfig::new("test-key")
                .with_base_url(server.uri())
                .with_webhook_base("https://api.pixgen.example")
                .with_timeout(Duration::from_millis(250)),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_training_submission_queued() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/flux-lora-fast-training"))
            .and(header("Authorization", "Key test-key"))
            .and(query_param(
                "fal_webhook",
                "https://api.pixgen.example/fal-ai/webhook/train",
            ))
            .and(body_partial_json(serde_json::json!({
                "trigger_word": "casual portraits"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "req-42",
                "response_url": "https://queue.fal.run/requests/req-42"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let job = client_for(&server)
            .await
            .submit_training(&submission())
            .await
            .unwrap();
        assert_eq!(job.request_id, "req-42");
        assert!(job.response_url.is_some());
    }

    #[tokio::test]
    async fn test_generation_submission_sends_lora_path() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/flux-lora"))
            .and(body_partial_json(serde_json::json!({
                "loras": [{ "path": "loras/m.safetensors", "scale": 1.0 }]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "request_id": "req-7"
            })))
            .mount(&server)
            .await;

        let job = client_for(&server)
            .await
            .submit_image_generation("astronaut on mars", "loras/m.safetensors")
            .await
            .unwrap();
        assert_eq!(job.request_id, "req-7");
        assert!(job.response_url.is_none());
    }

    #[tokio::test]
    async fn test_non_success_maps_to_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/flux-lora"))
            .respond_with(ResponseTemplate::new(422).set_body_string("bad lora"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .submit_image_generation("p", "bad")
            .await
            .unwrap_err();
        match err {
            ProviderError::Rejected { status, reason } => {
                assert_eq!(status, 422);
                assert_eq!(reason, "bad lora");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_slow_provider_maps_to_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/flux-lora"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "request_id": "late" }))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .submit_image_generation("p", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_missing_request_id_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/fal-ai/flux-lora"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "request_id": "" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .await
            .submit_image_generation("p", "a")
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }
}
