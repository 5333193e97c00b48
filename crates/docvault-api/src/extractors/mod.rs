//! Request extractors.

pub mod client;

pub use client::ClientMeta;
