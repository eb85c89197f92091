//! Risk Engine Module
//!
//! Admission control for the quest reward pipeline:
//! - `domain/` - Risk scoring, blacklist, rate windows, repository traits
//! - `application/` - Use cases (gatekeeper, evaluation, tracking)
//! - `infra/` - PostgreSQL implementations
//! - `presentation/` - HTTP handlers (fingerprint reporting, admin surface)
//!
//! ## Trust Model
//! - Visitor ids and fingerprint attributes are client-reported telemetry,
//!   never authorization
//! - Blacklist entries are explicit human decisions and dominate any
//!   computed score
//! - A denial is a typed decision, not an error

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::{ClaimRateConfig, RiskConfig};
pub use application::gatekeeper::{AdmissionContext, GatekeeperUseCase};
pub use domain::value_objects::{AdmissionDecision, DenialReason, RiskScore};
pub use error::{RiskError, RiskResult};
pub use infra::postgres::PgRiskRepository;
pub use presentation::router::risk_router;

#[cfg(test)]
mod tests;
