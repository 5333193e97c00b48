//! # docvault-entity
//!
//! Domain entity models for DocVault: share records, aliases, documents
//! with their safety classification, and ephemeral access tickets.

pub mod alias;
pub mod document;
pub mod share;
pub mod ticket;

pub use alias::AliasRecord;
pub use document::Document;
pub use share::{ShareRecord, ShareToken};
pub use ticket::AccessTicket;
