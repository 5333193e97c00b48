//! Argon2id password hashing and verification.

mod hasher;

pub use hasher::PasswordHasher;
