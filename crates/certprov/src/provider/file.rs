//! Provider backed by PEM files on disk.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ProviderError, Result};
use crate::identity::IdentityCert;
use crate::options::{Config, ConfigOption};
use crate::provider::CertificateProvider;
use crate::search_path::expand_env;
use crate::tls::{ClientCredentialConfig, ServerCredentialConfig};
use crate::trust::TrustPool;

/// Identity and trust pool loaded from PEM files.
///
/// The root directory is the first search path entry; options may add more.
/// The certificate and key must both resolve and match. The CA file is
/// optional, but when it resolves it must hold at least one certificate.
#[derive(Debug)]
pub struct FileProvider {
    config: Config,
    cert_dir: PathBuf,
    cert_path: PathBuf,
    key_path: PathBuf,
    identity: Arc<IdentityCert>,
    ca_pool: Arc<TrustPool>,
}

impl FileProvider {
    /// Load the identity pair and trust pool rooted at `cert_dir`.
    ///
    /// `cert_dir` may reference environment variables.
    pub fn new(cert_dir: &str, options: impl IntoIterator<Item = ConfigOption>) -> Result<Self> {
        let cert_dir = PathBuf::from(expand_env(cert_dir));
        let config = Config::build(
            std::iter::once(ConfigOption::AddSearchPath(cert_dir.clone())).chain(options),
        );

        let cert_path = config.cert_path();
        let key_path = config.key_path();
        let identity = IdentityCert::load(&cert_path, &key_path)?;
        let ca_pool = load_trust_pool(&config)?;

        info!(
            cert = %cert_path.display(),
            key = %key_path.display(),
            subject = identity.leaf().subject(),
            not_after = %identity.leaf().not_after(),
            roots = ca_pool.len(),
            "loaded file certificate provider"
        );

        Ok(Self {
            config,
            cert_dir,
            cert_path,
            key_path,
            identity: Arc::new(identity),
            ca_pool: Arc::new(ca_pool),
        })
    }

    /// The root directory after environment expansion.
    pub fn cert_dir(&self) -> &Path {
        &self.cert_dir
    }

    /// Resolved path of the certificate file.
    pub fn cert_path(&self) -> &Path {
        &self.cert_path
    }

    /// Resolved path of the private key file.
    pub fn key_path(&self) -> &Path {
        &self.key_path
    }
}

impl CertificateProvider for FileProvider {
    fn identity_cert(&self) -> &IdentityCert {
        &self.identity
    }

    fn ca_pool(&self) -> &TrustPool {
        &self.ca_pool
    }

    fn server_credentials(&self) -> ServerCredentialConfig {
        super::server_credentials(&self.identity, &self.ca_pool, &self.config, false)
    }

    fn client_credentials(&self, server_name: &str) -> ClientCredentialConfig {
        super::client_credentials(server_name, &self.identity, &self.ca_pool, &self.config, false)
    }

    /// Re-reads both files, so this reflects their current contents.
    fn key_pair(&self) -> Result<IdentityCert> {
        IdentityCert::load(&self.cert_path, &self.key_path)
    }

    fn config(&self) -> &Config {
        &self.config
    }
}

/// System roots if configured, plus the CA file when it resolves.
fn load_trust_pool(config: &Config) -> Result<TrustPool> {
    let mut pool = TrustPool::for_policy(config.load_system_ca())?;

    let Some(ca_path) = config.ca_path() else {
        debug!(ca_file = config.ca_file(), "no CA file found, skipping");
        return Ok(pool);
    };

    let pem = std::fs::read(&ca_path).map_err(|e| ProviderError::io(&ca_path, e))?;
    if !pool.append_certs_from_pem(&pem) {
        return Err(ProviderError::NoValidCertificates);
    }
    debug!(
        ca = %ca_path.display(),
        appended = pool.appended().len(),
        "loaded CA certificates"
    );

    Ok(pool)
}
