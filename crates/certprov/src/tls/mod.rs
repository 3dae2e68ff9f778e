//! TLS credential assembly for mutual TLS sessions.
//!
//! - Credential configurations (server and client) and their rustls builders
//! - Verifiers used when peer verification is skipped

pub mod config;
pub mod verifier;

pub use config::{ClientCredentialConfig, ServerCredentialConfig};
