//! # docvault-api
//!
//! HTTP layer for DocVault built on Axum: router, shared state,
//! client-metadata extraction, handlers, request logging, and the single
//! place deny reasons and domain errors collapse into HTTP statuses.

pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
