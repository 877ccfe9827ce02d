//! Prompt packs.
//!
//! A pack is a named bundle of prompt templates. Packs are read-only
//! reference data for the generation pipeline: a pack request fans out
//! into one generation job per prompt.

use serde::{Deserialize, Serialize};

/// A named, preconfigured bundle of prompt templates.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pack {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Preview image shown in pack listings
    #[serde(default)]
    pub cover_url: String,
}

/// A single prompt template belonging to a pack.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackPrompt {
    pub id: String,
    pub pack_id: String,
    pub prompt: String,
}
