//! # docvault-database
//!
//! PostgreSQL connection management, schema capability detection, and
//! concrete repository implementations for all DocVault entities.

pub mod capabilities;
pub mod connection;
pub mod migration;
pub mod repositories;

pub use capabilities::SchemaCapabilities;
pub use connection::DatabasePool;
