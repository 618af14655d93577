//! Authentication primitives.
//!
//! - [`password`] -- Argon2id password hashing and verification.
//! - [`claims`] -- session claims payload and its signed-token codec.
//! - [`cookie`] -- session cookie issuance and removal.
//! - [`validator`] -- per-request session validation middleware.

pub mod claims;
pub mod cookie;
pub mod password;
pub mod validator;
