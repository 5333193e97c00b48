//! # docvault-storage
//!
//! Presigned object URL providers. The rest of the system never sees a
//! raw bucket or key on the wire; the signer turns a pointer into a
//! time-limited URL at ticket redemption and nowhere else.

pub mod manager;
pub mod providers;

pub use manager::StorageManager;
