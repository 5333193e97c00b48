//! Token resolution, policy evaluation, and the authorize pipeline.

pub mod ledger;
pub mod policy;
pub mod resolver;
mod service;

pub use ledger::ViewLedger;
pub use policy::{AccessContext, QuotaSnapshot};
pub use resolver::{ResolvedAccess, ResolvedSubject, Resolution, Resolver};
pub use service::{AccessService, AuthorizeOutcome, RawRequest};
