//! # docvault-service
//!
//! The access pipeline: resolve a token or alias, evaluate the ordered
//! policy gate, consume a view, mint a redemption ticket. Rate limiting,
//! abuse detection, and telemetry live alongside as supporting services.

pub mod abuse;
pub mod access;
pub mod telemetry;
pub mod ticket;

pub use access::{AccessService, AuthorizeOutcome};
pub use ticket::{NavigationSignals, TicketService};
