//! Credential configurations assembled by a provider, and the rustls
//! configs built from them.
//!
//! A [`ServerCredentialConfig`] or [`ClientCredentialConfig`] is a plain
//! description of one side of a mutual TLS session: identity, trust pool,
//! version floor and verification policy. `build()` turns it into a
//! `rustls::ServerConfig` / `rustls::ClientConfig` on the ring crypto
//! provider.

use std::sync::Arc;

use rustls::SupportedProtocolVersion;
use rustls::client::danger::ServerCertVerifier;
use rustls::server::WebPkiClientVerifier;
use rustls::server::danger::ClientCertVerifier;
use rustls_pki_types::ServerName;
use tracing::debug;

use crate::error::{ProviderError, Result};
use crate::identity::IdentityCert;
use crate::options::TlsVersion;
use crate::tls::verifier::{AcceptAnyClientCert, AcceptAnyServerCert};
use crate::trust::TrustPool;

/// Server side of a mutual TLS session.
///
/// Clients must always present a certificate.
#[derive(Debug, Clone)]
pub struct ServerCredentialConfig {
    /// Roots client certificates must chain to.
    pub client_cas: Arc<TrustPool>,
    /// Certificate chain and key presented to clients.
    pub identity: Arc<IdentityCert>,
    pub min_version: TlsVersion,
    /// Accept any client certificate without checking its chain.
    pub insecure_skip_verify: bool,
    pub alpn_protocols: Vec<Vec<u8>>,
}

impl ServerCredentialConfig {
    /// Build a `rustls::ServerConfig` from this description.
    ///
    /// Fails with [`ProviderError::TlsConfiguration`] when client
    /// verification is enabled over an empty trust pool, or when the
    /// identity is rejected by rustls.
    pub fn build(&self) -> Result<rustls::ServerConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let verifier: Arc<dyn ClientCertVerifier> =
            if self.insecure_skip_verify {
                debug!("client certificate chains will not be verified");
                Arc::new(AcceptAnyClientCert::new())
            } else {
                WebPkiClientVerifier::builder_with_provider(
                    Arc::new(self.client_cas.root_store().clone()),
                    provider.clone(),
                )
                .build()
                .map_err(|e| ProviderError::TlsConfiguration(format!("client verifier: {e}")))?
            };

        let mut config = rustls::ServerConfig::builder_with_provider(provider)
            .with_protocol_versions(protocol_versions(self.min_version))
            .map_err(|e| ProviderError::TlsConfiguration(format!("TLS version config: {e}")))?
            .with_client_cert_verifier(verifier)
            .with_single_cert(
                self.identity.chain().to_vec(),
                self.identity.private_key().clone_key(),
            )
            .map_err(|e| ProviderError::TlsConfiguration(format!("server cert config: {e}")))?;

        config.alpn_protocols = self.alpn_protocols.clone();

        Ok(config)
    }
}

/// Client side of a mutual TLS session.
#[derive(Debug, Clone)]
pub struct ClientCredentialConfig {
    /// Name the server certificate must be valid for.
    pub server_name: String,
    /// Roots the server certificate must chain to.
    pub root_cas: Arc<TrustPool>,
    /// Certificate chain and key presented to the server.
    pub identity: Arc<IdentityCert>,
    pub min_version: TlsVersion,
    /// Accept any server certificate.
    pub insecure_skip_verify: bool,
    pub alpn_protocols: Vec<Vec<u8>>,
}

impl ClientCredentialConfig {
    /// The expected peer name as a rustls `ServerName`.
    pub fn server_name(&self) -> Result<ServerName<'static>> {
        ServerName::try_from(self.server_name.clone())
            .map_err(|_| ProviderError::InvalidServerName(self.server_name.clone()))
    }

    /// Build a `rustls::ClientConfig` from this description.
    pub fn build(&self) -> Result<rustls::ClientConfig> {
        let provider = Arc::new(rustls::crypto::ring::default_provider());

        let builder = rustls::ClientConfig::builder_with_provider(provider)
            .with_protocol_versions(protocol_versions(self.min_version))
            .map_err(|e| ProviderError::TlsConfiguration(format!("TLS version config: {e}")))?;

        let builder = if self.insecure_skip_verify {
            debug!(server_name = %self.server_name, "server certificate will not be verified");
            let verifier: Arc<dyn ServerCertVerifier> = Arc::new(AcceptAnyServerCert::new());
            builder
                .dangerous()
                .with_custom_certificate_verifier(verifier)
        } else {
            builder.with_root_certificates(self.root_cas.root_store().clone())
        };

        let mut config = builder
            .with_client_auth_cert(
                self.identity.chain().to_vec(),
                self.identity.private_key().clone_key(),
            )
            .map_err(|e| ProviderError::TlsConfiguration(format!("client cert config: {e}")))?;

        config.alpn_protocols = self.alpn_protocols.clone();

        Ok(config)
    }
}

static TLS13_ONLY: &[&SupportedProtocolVersion] = &[&rustls::version::TLS13];

/// Protocol versions at or above `min`.
///
/// rustls implements TLS 1.2 and 1.3 only, so older floors enable both.
pub fn protocol_versions(min: TlsVersion) -> &'static [&'static SupportedProtocolVersion] {
    match min {
        TlsVersion::Tls13 => TLS13_ONLY,
        TlsVersion::Tls12 => rustls::ALL_VERSIONS,
        TlsVersion::Tls10 | TlsVersion::Tls11 => {
            debug!(requested = %min, "raising TLS version floor to TLS1.2");
            rustls::ALL_VERSIONS
        }
    }
}

#[cfg(test)]
mod tests {
    use rcgen::{CertificateParams, KeyPair};

    use super::*;

    fn identity() -> (Arc<IdentityCert>, String) {
        let key = KeyPair::generate().unwrap();
        let params = CertificateParams::new(vec!["localhost".to_string()]).unwrap();
        let cert = params.self_signed(&key).unwrap();
        let identity =
            IdentityCert::from_pem(cert.pem().as_bytes(), key.serialize_pem().as_bytes()).unwrap();
        (Arc::new(identity), cert.pem())
    }

    fn pool_with(pem: &str) -> Arc<TrustPool> {
        let mut pool = TrustPool::new();
        assert!(pool.append_certs_from_pem(pem.as_bytes()));
        Arc::new(pool)
    }

    fn server(identity: Arc<IdentityCert>, pool: Arc<TrustPool>) -> ServerCredentialConfig {
        ServerCredentialConfig {
            client_cas: pool,
            identity,
            min_version: TlsVersion::Tls13,
            insecure_skip_verify: false,
            alpn_protocols: Vec::new(),
        }
    }

    fn client(identity: Arc<IdentityCert>, pool: Arc<TrustPool>) -> ClientCredentialConfig {
        ClientCredentialConfig {
            server_name: "localhost".into(),
            root_cas: pool,
            identity,
            min_version: TlsVersion::Tls13,
            insecure_skip_verify: false,
            alpn_protocols: Vec::new(),
        }
    }

    #[test]
    fn server_config_builds_successfully() {
        let (id, pem) = identity();
        assert!(server(id, pool_with(&pem)).build().is_ok());
    }

    #[test]
    fn client_config_builds_successfully() {
        let (id, pem) = identity();
        assert!(client(id, pool_with(&pem)).build().is_ok());
    }

    #[test]
    fn server_with_empty_pool_fails_when_verifying() {
        let (id, _) = identity();
        let result = server(id, Arc::new(TrustPool::new())).build();
        assert!(matches!(result, Err(ProviderError::TlsConfiguration(_))));
    }

    #[test]
    fn server_with_empty_pool_builds_when_skipping_verification() {
        let (id, _) = identity();
        let mut config = server(id, Arc::new(TrustPool::new()));
        config.insecure_skip_verify = true;
        assert!(config.build().is_ok());
    }

    #[test]
    fn client_with_empty_pool_still_builds() {
        let (id, _) = identity();
        assert!(client(id, Arc::new(TrustPool::new())).build().is_ok());
    }

    #[test]
    fn alpn_is_carried_through() {
        let (id, pem) = identity();
        let mut s = server(id.clone(), pool_with(&pem));
        s.alpn_protocols = vec![b"certprov".to_vec()];
        assert_eq!(s.build().unwrap().alpn_protocols, vec![b"certprov".to_vec()]);

        let mut c = client(id, pool_with(&pem));
        c.alpn_protocols = vec![b"certprov".to_vec()];
        assert_eq!(c.build().unwrap().alpn_protocols, vec![b"certprov".to_vec()]);
    }

    #[test]
    fn server_name_parses() {
        let (id, pem) = identity();
        let mut c = client(id, pool_with(&pem));
        assert!(c.server_name().is_ok());
        c.server_name = "not a valid name!".into();
        assert!(matches!(
            c.server_name(),
            Err(ProviderError::InvalidServerName(_))
        ));
    }

    #[test]
    fn version_floor_maps_to_rustls_versions() {
        assert_eq!(protocol_versions(TlsVersion::Tls13).len(), 1);
        assert_eq!(protocol_versions(TlsVersion::Tls12).len(), 2);
        assert_eq!(protocol_versions(TlsVersion::Tls10).len(), 2);
        assert_eq!(protocol_versions(TlsVersion::Tls13)[0].version, rustls::ProtocolVersion::TLSv1_3);
    }
}
