//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (SHA-256)
//! - Client identification (IP extraction, visitor id, fingerprint hashing)
//! - Rate limiting infrastructure

pub mod client;
pub mod crypto;
pub mod rate_limit;
