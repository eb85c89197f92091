//! Quest Reward Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits, pure reward math
//! - `application/` - Use cases (claim, submit, review, identity binding)
//! - `verifier/` - Pluggable per-quest-type verification
//! - `infra/` - Database implementations and provider adapters
//! - `presentation/` - HTTP handlers
//!
//! ## Integrity Model
//! - One action per (user, quest), enforced by a storage-level unique
//!   constraint; a duplicate claim returns the existing action
//! - A reward is granted at most once per action; the grant re-reads the
//!   action under lock inside the same transaction that writes it
//! - For identity-bound quest types, one rewarded action per
//!   (quest, external identity) worldwide
//! - Commission cascade runs inside the grant but can never fail it

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod notify;
pub mod presentation;
pub mod verifier;

// Re-exports for convenience
pub use application::config::QuestConfig;
pub use error::{QuestError, QuestResult};
pub use infra::postgres::PgQuestRepository;
pub use notify::Notifier;
pub use presentation::router::quests_router;
pub use verifier::registry::VerifierRegistry;

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult, OptionExt, ResultExt},
    kind::ErrorKind,
};
