//! HTTP handlers.

pub mod credits;
pub mod generate;
pub mod health;
pub mod images;
pub mod packs;
pub mod training;
pub mod webhooks;
