//! quinn configurations built from a provider's credentials.
//!
//! QUIC mandates TLS 1.3, so the version floor of the assembled credentials
//! is raised to TLS 1.3 here regardless of the provider configuration.

use std::sync::Arc;

use certprov::{CertificateProvider, TlsVersion};
use quinn::crypto::rustls::{QuicClientConfig, QuicServerConfig};
use tracing::debug;

use crate::error::{QuicError, Result};

/// ALPN protocol identifier negotiated by both endpoints.
pub const ALPN_CERTPROV: &[u8] = b"certprov";

/// Build a quinn server config from the provider's server credentials.
pub fn server_config(provider: &dyn CertificateProvider) -> Result<quinn::ServerConfig> {
    let mut creds = provider.server_credentials();
    creds.min_version = quic_version(creds.min_version);
    creds.alpn_protocols = vec![ALPN_CERTPROV.to_vec()];

    let rustls_config = creds.build()?;
    let quic_server_config = QuicServerConfig::try_from(rustls_config)
        .map_err(|e| QuicError::TlsConfig(format!("rustls→quinn: {e}")))?;

    Ok(quinn::ServerConfig::with_crypto(Arc::new(quic_server_config)))
}

/// Build a quinn client config for dialing `server_name`.
pub fn client_config(
    provider: &dyn CertificateProvider,
    server_name: &str,
) -> Result<quinn::ClientConfig> {
    let mut creds = provider.client_credentials(server_name);
    creds.server_name()?;
    creds.min_version = quic_version(creds.min_version);
    creds.alpn_protocols = vec![ALPN_CERTPROV.to_vec()];

    let rustls_config = creds.build()?;
    let quic_client_config = QuicClientConfig::try_from(rustls_config)
        .map_err(|e| QuicError::TlsConfig(format!("rustls→quinn: {e}")))?;

    Ok(quinn::ClientConfig::new(Arc::new(quic_client_config)))
}

fn quic_version(configured: TlsVersion) -> TlsVersion {
    if configured < TlsVersion::Tls13 {
        debug!(configured = %configured, "QUIC requires TLS1.3, raising version floor");
    }
    TlsVersion::Tls13
}
