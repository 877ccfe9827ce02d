//! Domain services.

pub mod generation;
pub mod reconciler;

pub use generation::GenerationOrchestrator;
pub use reconciler::{CallbackOutcome, CompletionReconciler};
