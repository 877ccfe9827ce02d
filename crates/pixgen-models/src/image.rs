//! Generated image jobs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobStatus;

/// A single requested image, created one-per-prompt at submission time.
///
/// The row is written in `pending` state together with the credit debit;
/// `image_url` stays empty until the provider's completion callback is
/// reconciled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedImage {
    /// Internal identifier (UUID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Model the image was generated against
    pub model_id: String,
    /// Prompt text sent to the provider
    pub prompt: String,
    /// Opaque provider job handle, unique across the system
    pub request_id: String,
    /// Result URL, empty until the job completes
    pub image_url: String,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GeneratedImage {
    /// Create a new pending image row for a dispatched prompt.
    pub fn pending(
        user_id: impl Into<String>,
        model_id: impl Into<String>,
        prompt: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: user_id.into(),
            model_id: model_id.into(),
            prompt: prompt.into(),
            request_id: request_id.into(),
            image_url: String::new(),
            status: JobStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_image_starts_empty() {
        let image = GeneratedImage::pending("u-1", "m-1", "astronaut portrait", "req-9");
        assert_eq!(image.status, JobStatus::Pending);
        assert!(image.image_url.is_empty());
        assert!(!image.id.is_empty());
    }

    #[test]
    fn test_pending_images_get_distinct_ids() {
        let a = GeneratedImage::pending("u", "m", "p", "r1");
        let b = GeneratedImage::pending("u", "m", "p", "r2");
        assert_ne!(a.id, b.id);
    }
}
