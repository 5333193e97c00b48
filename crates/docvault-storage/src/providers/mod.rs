//! Concrete URL signer implementations.

pub mod local;
pub mod s3;

pub use local::LocalUrlSigner;
pub use s3::S3UrlSigner;
