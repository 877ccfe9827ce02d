//! Trained personalization models.
//!
//! A `TrainedModel` is created when a user submits a training job. The
//! descriptive attributes are forwarded verbatim to the generative
//! provider; the artifact path stays empty until training completes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::JobStatus;

/// Subject type the model is trained for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    Man,
    Woman,
    Other,
}

impl ModelType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelType::Man => "man",
            ModelType::Woman => "woman",
            ModelType::Other => "other",
        }
    }
}

/// Subject ethnicity tag passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ethnicity {
    White,
    Black,
    AsianAmerican,
    EastAsian,
    SouthEastAsian,
    SouthAsian,
    MiddleEastern,
    Pacific,
    Hispanic,
}

impl Ethnicity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Ethnicity::White => "white",
            Ethnicity::Black => "black",
            Ethnicity::AsianAmerican => "asian_american",
            Ethnicity::EastAsian => "east_asian",
            Ethnicity::SouthEastAsian => "south_east_asian",
            Ethnicity::SouthAsian => "south_asian",
            Ethnicity::MiddleEastern => "middle_eastern",
            Ethnicity::Pacific => "pacific",
            Ethnicity::Hispanic => "hispanic",
        }
    }
}

/// Subject eye color tag passed to the provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EyeColor {
    Brown,
    Blue,
    Hazel,
    Gray,
    Green,
}

impl EyeColor {
    pub fn as_str(&self) -> &'static str {
        match self {
            EyeColor::Brown => "brown",
            EyeColor::Blue => "blue",
            EyeColor::Hazel => "hazel",
            EyeColor::Gray => "gray",
            EyeColor::Green => "green",
        }
    }
}

/// Error returned when parsing an unrecognized attribute value.
#[derive(Debug, thiserror::Error)]
#[error("unknown attribute value: {0}")]
pub struct UnknownValue(pub String);

impl std::str::FromStr for ModelType {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "man" => Ok(ModelType::Man),
            "woman" => Ok(ModelType::Woman),
            "other" => Ok(ModelType::Other),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl std::str::FromStr for Ethnicity {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "white" => Ok(Ethnicity::White),
            "black" => Ok(Ethnicity::Black),
            "asian_american" => Ok(Ethnicity::AsianAmerican),
            "east_asian" => Ok(Ethnicity::EastAsian),
            "south_east_asian" => Ok(Ethnicity::SouthEastAsian),
            "south_asian" => Ok(Ethnicity::SouthAsian),
            "middle_eastern" => Ok(Ethnicity::MiddleEastern),
            "pacific" => Ok(Ethnicity::Pacific),
            "hispanic" => Ok(Ethnicity::Hispanic),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

impl std::str::FromStr for EyeColor {
    type Err = UnknownValue;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "brown" => Ok(EyeColor::Brown),
            "blue" => Ok(EyeColor::Blue),
            "hazel" => Ok(EyeColor::Hazel),
            "gray" => Ok(EyeColor::Gray),
            "green" => Ok(EyeColor::Green),
            other => Err(UnknownValue(other.to_string())),
        }
    }
}

/// Descriptive attributes forwarded to the provider with a training job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelAttributes {
    #[serde(rename = "type")]
    pub model_type: ModelType,
    pub age: u8,
    pub ethnicity: Ethnicity,
    pub eye_color: EyeColor,
    pub bald: bool,
}

/// A user's custom personalization model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainedModel {
    /// Internal identifier (UUID)
    pub id: String,
    /// Owning user
    pub user_id: String,
    /// Display name, also used as the trigger word for training
    pub name: String,
    /// Descriptive attributes passed to the provider
    #[serde(flatten)]
    pub attributes: ModelAttributes,
    /// URL of the source photo archive used for training
    pub asset_url: String,
    /// Opaque provider job handle correlating the training callback
    pub request_id: String,
    /// Path of the trained artifact; `None` until training completes
    pub artifact_path: Option<String>,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TrainedModel {
    /// A model can serve generation requests once its artifact exists.
    pub fn is_ready(&self) -> bool {
        self.artifact_path.as_deref().is_some_and(|p| !p.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_model(artifact: Option<&str>) -> TrainedModel {
        TrainedModel {
            id: "m-1".into(),
            user_id: "u-1".into(),
            name: "portrait".into(),
            attributes: ModelAttributes {
                model_type: ModelType::Woman,
                age: 30,
                ethnicity: Ethnicity::Hispanic,
                eye_color: EyeColor::Green,
                bald: false,
            },
            asset_url: "https://example.com/photos.zip".into(),
            request_id: "req-1".into(),
            artifact_path: artifact.map(String::from),
            status: JobStatus::Pending,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_readiness_requires_artifact() {
        assert!(!sample_model(None).is_ready());
        assert!(!sample_model(Some("")).is_ready());
        assert!(sample_model(Some("loras/abc.safetensors")).is_ready());
    }

    #[test]
    fn test_attributes_serialize_with_type_key() {
        let model = sample_model(None);
        let value = serde_json::to_value(&model).unwrap();
        assert_eq!(value["type"], "woman");
        assert_eq!(value["eye_color"], "green");
    }
}
