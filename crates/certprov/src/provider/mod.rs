//! Certificate providers.
//!
//! A provider owns one identity certificate and one trust pool, and derives
//! server and client credential configurations from them. Two
//! implementations exist:
//!
//! - [`FileProvider`]: PEM files resolved through a search path
//! - [`DynamicProvider`]: an RSA key and self-signed certificate generated
//!   at construction
//!
//! Both are immutable after construction and can be shared across threads.

pub mod dynamic;
pub mod file;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use dynamic::DynamicProvider;
pub use file::FileProvider;

use crate::error::{ProviderError, Result};
use crate::identity::IdentityCert;
use crate::options::{Config, ConfigOption};
use crate::tls::{ClientCredentialConfig, ServerCredentialConfig};
use crate::trust::TrustPool;

/// Capabilities shared by every provider.
pub trait CertificateProvider: Send + Sync {
    /// The identity presented in handshakes.
    fn identity_cert(&self) -> &IdentityCert;

    /// Roots used to validate peers.
    fn ca_pool(&self) -> &TrustPool;

    /// Credentials for accepting mutual TLS connections.
    fn server_credentials(&self) -> ServerCredentialConfig;

    /// Credentials for dialing `server_name` with mutual TLS.
    fn client_credentials(&self, server_name: &str) -> ClientCredentialConfig;

    /// A freshly parsed copy of the identity pair.
    fn key_pair(&self) -> Result<IdentityCert>;

    /// The configuration the provider was built with.
    fn config(&self) -> &Config;
}

/// Bundle of default file names a provider is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// `ca.pem`, `server.pem`, `server-key.pem`.
    Server,
    /// `ca.pem`, `client.pem`, `client-key.pem`, with the system CA pool.
    Client,
    /// `ca.pem`, `cert.pem`, `key.pem`.
    Cert,
}

impl FromStr for ProviderKind {
    type Err = ProviderError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "server" | "serverprovider" => Ok(Self::Server),
            "client" | "clientprovider" => Ok(Self::Client),
            "cert" | "certprovider" => Ok(Self::Cert),
            other => Err(ProviderError::Settings(format!(
                "unknown provider kind {other:?}"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Server => "server",
            Self::Client => "client",
            Self::Cert => "cert",
        };
        f.write_str(name)
    }
}

/// Either provider implementation.
#[derive(Debug)]
pub enum Provider {
    File(FileProvider),
    Dynamic(DynamicProvider),
}

impl Provider {
    /// Load a file-backed provider rooted at `cert_dir`.
    pub fn file(cert_dir: &str, options: impl IntoIterator<Item = ConfigOption>) -> Result<Self> {
        FileProvider::new(cert_dir, options).map(Self::File)
    }

    /// Generate a dynamic provider.
    pub fn dynamic(options: impl IntoIterator<Item = ConfigOption>) -> Result<Self> {
        DynamicProvider::new(options).map(Self::Dynamic)
    }

    fn inner(&self) -> &dyn CertificateProvider {
        match self {
            Self::File(p) => p,
            Self::Dynamic(p) => p,
        }
    }
}

impl CertificateProvider for Provider {
    fn identity_cert(&self) -> &IdentityCert {
        self.inner().identity_cert()
    }

    fn ca_pool(&self) -> &TrustPool {
        self.inner().ca_pool()
    }

    fn server_credentials(&self) -> ServerCredentialConfig {
        self.inner().server_credentials()
    }

    fn client_credentials(&self, server_name: &str) -> ClientCredentialConfig {
        self.inner().client_credentials(server_name)
    }

    fn key_pair(&self) -> Result<IdentityCert> {
        self.inner().key_pair()
    }

    fn config(&self) -> &Config {
        self.inner().config()
    }
}

impl From<FileProvider> for Provider {
    fn from(provider: FileProvider) -> Self {
        Self::File(provider)
    }
}

impl From<DynamicProvider> for Provider {
    fn from(provider: DynamicProvider) -> Self {
        Self::Dynamic(provider)
    }
}

pub(crate) fn server_credentials(
    identity: &Arc<IdentityCert>,
    pool: &Arc<TrustPool>,
    config: &Config,
    insecure_skip_verify: bool,
) -> ServerCredentialConfig {
    ServerCredentialConfig {
        client_cas: Arc::clone(pool),
        identity: Arc::clone(identity),
        min_version: config.min_tls_version(),
        insecure_skip_verify,
        alpn_protocols: Vec::new(),
    }
}

pub(crate) fn client_credentials(
    server_name: &str,
    identity: &Arc<IdentityCert>,
    pool: &Arc<TrustPool>,
    config: &Config,
    insecure_skip_verify: bool,
) -> ClientCredentialConfig {
    ClientCredentialConfig {
        server_name: server_name.to_string(),
        root_cas: Arc::clone(pool),
        identity: Arc::clone(identity),
        min_version: config.min_tls_version(),
        insecure_skip_verify,
        alpn_protocols: Vec::new(),
    }
}
