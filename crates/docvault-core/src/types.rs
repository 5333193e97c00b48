//! Shared primitive types used across crate boundaries.

use serde::{Deserialize, Serialize};

/// Location of a stored object: bucket plus key.
///
/// This is the value the whole pipeline exists to hide; it only ever
/// leaves the process inside a presigned URL minted by the object signer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectPointer {
    /// Bucket (or local root) holding the object.
    pub bucket: String,
    /// Object key within the bucket.
    pub key: String,
}

impl ObjectPointer {
    /// Create a pointer from owned parts.
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            key: key.into(),
        }
    }
}
