//! # docvault-core
//!
//! Core crate for DocVault. Contains the unified error system, the closed
//! deny-reason taxonomy, configuration schemas, security-event structures,
//! and the collaborator traits (cache, plan/quota, object signer,
//! telemetry sink).
//!
//! This crate has **no** internal dependencies on other DocVault crates.

pub mod config;
pub mod deny;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use deny::DenyReason;
pub use error::AppError;
pub use result::AppResult;
