//! Repository implementations for DocVault entities.

pub mod alias;
pub mod document;
pub mod quota;
pub mod security_event;
pub mod share;

pub use alias::AliasRepository;
pub use document::DocumentRepository;
pub use quota::QuotaRepository;
pub use security_event::SecurityEventRepository;
pub use share::{ShareRepository, ViewConsumption};
