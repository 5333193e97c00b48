//! Redis cache backend.

mod client;
mod operations;

pub use client::{mask_redis_url, RedisClient};
pub use operations::RedisCacheProvider;
