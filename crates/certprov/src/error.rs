//! Error types for certificate providers.
//!
//! Construction either fully succeeds or fails with one of these variants.
//! Nothing here is retried internally; callers wanting retries wrap the
//! whole constructor call.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur within the `certprov` crate.
#[derive(Debug, Error)]
pub enum ProviderError {
    // --- I/O ---
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // --- Format ---
    #[error("malformed PEM: {0}")]
    Pem(String),

    #[error("private key does not match certificate public key")]
    KeyMismatch,

    #[error("failed to parse certificate: {0}")]
    CertificateParse(String),

    // --- Trust pool ---
    #[error("no valid certificates present")]
    NoValidCertificates,

    #[error("failed to load system trust store: {0}")]
    SystemTrustStore(String),

    // --- Dynamic generation ---
    #[error("failed to generate RSA keypair: {0}")]
    KeyGeneration(String),

    #[error("failed to generate X.509 certificate: {0}")]
    CertificateGeneration(String),

    #[error("failed to PEM-encode generated material: {0}")]
    PemEncoding(String),

    // --- TLS / Verification ---
    #[error("TLS configuration error: {0}")]
    TlsConfiguration(String),

    #[error("invalid server name {0:?}")]
    InvalidServerName(String),

    #[error("certificate verification failed: {0}")]
    CertificateVerification(String),

    // --- Settings ---
    #[error("invalid settings: {0}")]
    Settings(String),
}

impl ProviderError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias using [`ProviderError`].
pub type Result<T> = std::result::Result<T, ProviderError>;
