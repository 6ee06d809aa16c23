//! Vault REST API integration.
//!
//! This module handles all communication with the note vault:
//! - Typed HTTP client with bearer auth, TLS policy, and timeouts
//! - Note, search, and periodic-note operations
//! - Classification of every failure into a small error taxonomy

pub mod client;
pub mod errors;

pub use client::{FileListing, VaultClient};
pub use errors::VaultError;
