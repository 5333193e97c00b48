//! In-memory cache backend built on moka.

mod store;

pub use store::MemoryCacheProvider;
