//! Provider whose identity is generated in memory at construction.

use std::fmt;
use std::sync::Arc;

use time::OffsetDateTime;
use tracing::info;

use crate::error::{ProviderError, Result};
use crate::identity::{IdentityCert, RsaKeypair, self_signed};
use crate::options::{Config, ConfigOption};
use crate::provider::CertificateProvider;
use crate::tls::{ClientCredentialConfig, ServerCredentialConfig};
use crate::trust::TrustPool;

/// Identity backed by a freshly generated RSA key and self-signed
/// certificate.
///
/// The trust pool contains the provider's own certificate (plus system roots
/// if requested), so two endpoints built from the same provider verify each
/// other. Distinct providers only interoperate when their PEMs are shared
/// out of band or verification is skipped.
pub struct DynamicProvider {
    config: Config,
    cert_pem: String,
    key_pem: String,
    identity: Arc<IdentityCert>,
    ca_pool: Arc<TrustPool>,
}

impl DynamicProvider {
    /// Generate a key and certificate according to `options`.
    ///
    /// RSA generation is CPU-bound; call from a blocking context.
    pub fn new(options: impl IntoIterator<Item = ConfigOption>) -> Result<Self> {
        let config = Config::build(options);

        let keypair = RsaKeypair::generate(config.dynamic_cert_key_size())?;
        let generated = self_signed::generate(
            &keypair,
            config.dynamic_cert_lifetime(),
            config.dynamic_cert_hosts(),
            OffsetDateTime::now_utc(),
        )?;

        let identity =
            IdentityCert::from_pem(generated.cert_pem.as_bytes(), generated.key_pem.as_bytes())?;

        let mut ca_pool = TrustPool::for_policy(config.load_system_ca())?;
        if !ca_pool.append_certs_from_pem(generated.cert_pem.as_bytes()) {
            return Err(ProviderError::NoValidCertificates);
        }

        info!(
            bits = keypair.bits(),
            hosts = ?config.dynamic_cert_hosts(),
            not_after = %identity.leaf().not_after(),
            "generated dynamic certificate provider"
        );

        Ok(Self {
            config,
            cert_pem: generated.cert_pem,
            key_pem: generated.key_pem,
            identity: Arc::new(identity),
            ca_pool: Arc::new(ca_pool),
        })
    }

    /// The generated certificate as a PEM block.
    pub fn cert_pem(&self) -> &str {
        &self.cert_pem
    }

    /// The generated private key as a PKCS#1 PEM block.
    pub fn key_pem(&self) -> &str {
        &self.key_pem
    }
}

impl CertificateProvider for DynamicProvider {
    fn identity_cert(&self) -> &IdentityCert {
        &self.identity
    }

    fn ca_pool(&self) -> &TrustPool {
        &self.ca_pool
    }

    fn server_credentials(&self) -> ServerCredentialConfig {
        super::server_credentials(
            &self.identity,
            &self.ca_pool,
            &self.config,
            self.config.server_insecure_skip_verify(),
        )
    }

    fn client_credentials(&self, server_name: &str) -> ClientCredentialConfig {
        super::client_credentials(
            server_name,
            &self.identity,
            &self.ca_pool,
            &self.config,
            self.config.dial_insecure_skip_verify(),
        )
    }

    fn key_pair(&self) -> Result<IdentityCert> {
        IdentityCert::from_pem(self.cert_pem.as_bytes(), self.key_pem.as_bytes())
    }

    fn config(&self) -> &Config {
        &self.config
    }
}

impl fmt::Debug for DynamicProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynamicProvider")
            .field("config", &self.config)
            .field("identity", &self.identity)
            .field("roots", &self.ca_pool.len())
            .finish_non_exhaustive()
    }
}
