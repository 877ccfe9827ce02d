//! SQLite persistence for the Pixgen backend.
//!
//! This crate owns the two money-like concerns of the system:
//!
//! - the **credit ledger**, a single-row-per-account balance mutated only
//!   through atomic conditional updates, and
//! - the **job repositories** (trained models, generated images, packs),
//!   whose pending rows are keyed by internal UUID and by the provider's
//!   unique request id.
//!
//! Callers that need a debit and row inserts to commit as one unit open a
//! transaction with [`Store::begin`] and use the `*_in` variants.

mod credits;
mod error;
mod images_repo;
mod models_repo;
mod packs_repo;
mod store;

pub use credits::CreditLedger;
pub use error::StoreError;
pub use images_repo::{GeneratedImageRepository, ImageListQuery};
pub use models_repo::TrainedModelRepository;
pub use packs_repo::PackRepository;
pub use store::Store;
