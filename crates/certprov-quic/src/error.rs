//! Error types for the QUIC adapter.

use thiserror::Error;

/// Errors that can occur while setting up or using QUIC endpoints.
#[derive(Debug, Error)]
pub enum QuicError {
    #[error("endpoint bind failed: {0}")]
    Bind(String),

    #[error("endpoint is closed")]
    Closed,

    #[error("connection failed: {0}")]
    Connection(#[from] quinn::ConnectionError),

    #[error("connect error: {0}")]
    Connect(#[from] quinn::ConnectError),

    #[error("TLS configuration error: {0}")]
    TlsConfig(String),

    #[error("failed to extract peer identity: {0}")]
    PeerIdentity(String),

    #[error("provider error: {0}")]
    Provider(#[from] certprov::ProviderError),
}

pub type Result<T> = std::result::Result<T, QuicError>;
