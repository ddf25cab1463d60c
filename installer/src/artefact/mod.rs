//! Archive identity, retrieval, verification, and extraction.
//!
//! # Sub-modules
//!
//! - [`error`] — Semantic error types for validation failures.
//! - [`platform`] — Target triple validation (`Platform`).
//! - [`sha256_digest`] — SHA-256 digest newtype (`Sha256Digest`).
//! - [`download`] — Archive download trait and HTTP implementation.
//! - [`verification`] — Checksum computation and comparison.
//! - [`extraction`] — Archive extraction with path traversal protection.

pub mod download;
pub mod error;
pub mod extraction;
pub mod platform;
pub mod sha256_digest;
pub mod verification;
