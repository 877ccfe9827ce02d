//! Provider completion webhooks.
//!
//! The provider retries undelivered callbacks, so these endpoints always
//! answer 200 once the payload parses; idempotency lives in the
//! reconciler. Malformed or unknown handles are logged and dropped.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiResult;
use crate::services::CallbackOutcome;
use crate::state::AppState;

/// Completion callback body posted by the fal.ai queue.
#[derive(Debug, Deserialize)]
pub struct FalWebhookPayload {
    pub request_id: String,
    /// "OK" for success, "ERROR" otherwise.
    pub status: String,
    #[serde(default)]
    pub payload: Option<Value>,
    #[serde(default)]
    pub error: Option<Value>,
}

impl FalWebhookPayload {
    fn failure_reason(&self) -> String {
        self.error
            .as_ref()
            .map(Value::to_string)
            .unwrap_or_else(|| format!("provider status {}", self.status))
    }

    /// Interpret the callback with an extractor for the success URL.
    /// A success status without a result URL is treated as a failure.
    fn outcome(&self, extract_url: impl Fn(&Value) -> Option<String>) -> CallbackOutcome {
        if self.status == "OK" {
            if let Some(url) = self.payload.as_ref().and_then(extract_url) {
                return CallbackOutcome::Success { result_url: url };
            }
            return CallbackOutcome::Failure {
                reason: "success callback missing result payload".to_string(),
            };
        }
        CallbackOutcome::Failure {
            reason: self.failure_reason(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub message: &'static str,
}

const ACK: WebhookAck = WebhookAck { message: "ok" };

/// POST /fal-ai/webhook/train
pub async fn training_webhook(
    State(state): State<AppState>,
    Json(body): Json<FalWebhookPayload>,
) -> ApiResult<Json<WebhookAck>> {
    let outcome = body.outcome(|payload| {
        payload["diffusers_lora_file"]["url"]
            .as_str()
            .map(str::to_string)
    });
    record_outcome("train", &outcome);
    state
        .reconciler
        .on_training_callback(&body.request_id, outcome)
        .await?;
    Ok(Json(ACK))
}

/// POST /fal-ai/webhook/image
pub async fn image_webhook(
    State(state): State<AppState>,
    Json(body): Json<FalWebhookPayload>,
) -> ApiResult<Json<WebhookAck>> {
    let outcome = body.outcome(|payload| payload["images"][0]["url"].as_str().map(str::to_string));
    record_outcome("image", &outcome);
    state
        .reconciler
        .on_image_callback(&body.request_id, outcome)
        .await?;
    Ok(Json(ACK))
}

fn record_outcome(kind: &'static str, outcome: &CallbackOutcome) {
    let result = match outcome {
        CallbackOutcome::Success { .. } => "success",
        CallbackOutcome::Failure { .. } => "failure",
    };
    crate::metrics::record_webhook(kind, result);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(status: &str, payload: Option<Value>, error: Option<Value>) -> FalWebhookPayload {
        FalWebhookPayload {
            request_id: "req-1".to_string(),
            status: status.to_string(),
            payload,
            error,
        }
    }

    #[test]
    fn test_ok_with_lora_url_is_success() {
        let body = payload(
            "OK",
            Some(serde_json::json!({
                "diffusers_lora_file": { "url": "https://fal/loras/a.safetensors" }
            })),
            None,
        );
        let outcome = body.outcome(|p| {
            p["diffusers_lora_file"]["url"].as_str().map(str::to_string)
        });
        assert!(matches!(
            outcome,
            CallbackOutcome::Success { result_url } if result_url.ends_with(".safetensors")
        ));
    }

    #[test]
    fn test_ok_without_result_is_failure() {
        let body = payload("OK", Some(serde_json::json!({})), None);
        let outcome = body.outcome(|p| p["images"][0]["url"].as_str().map(str::to_string));
        assert!(matches!(outcome, CallbackOutcome::Failure { .. }));
    }

    #[test]
    fn test_error_status_carries_provider_detail() {
        let body = payload(
            "ERROR",
            None,
            Some(serde_json::json!({"detail": "nsfw filter"})),
        );
        let outcome = body.outcome(|p| p["images"][0]["url"].as_str().map(str::to_string));
        match outcome {
            CallbackOutcome::Failure { reason } => assert!(reason.contains("nsfw filter")),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}
