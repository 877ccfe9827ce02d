//! Shared data models for the Pixgen backend.
//!
//! This crate provides Serde-serializable types for:
//! - Trained personalization models and their attributes
//! - Generated image jobs and the job status state machine
//! - Prompt packs
//! - Credit cost constants

pub mod credit_cost;
pub mod image;
pub mod job_status;
pub mod model;
pub mod pack;

// Re-export common types
pub use credit_cost::{pack_generation_cost, Credits, IMAGE_GEN_CREDITS, TRAIN_MODEL_CREDITS};
pub use image::GeneratedImage;
pub use job_status::JobStatus;
pub use model::{Ethnicity, EyeColor, ModelAttributes, ModelType, TrainedModel};
pub use pack::{Pack, PackPrompt};
