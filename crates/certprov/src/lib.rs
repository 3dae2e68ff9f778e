//! TLS identity providers for mutual TLS.
//!
//! A provider produces one identity certificate and one trust pool, and
//! derives server and client credential configurations from them:
//!
//! - [`FileProvider`]: PEM certificate, key and CA bundle resolved through an
//!   ordered search path
//! - [`DynamicProvider`]: RSA key and self-signed certificate generated in
//!   memory, trusting itself
//!
//! ```no_run
//! use certprov::{CertificateProvider, ConfigOption, Provider};
//!
//! let provider = Provider::file("$HOME/.myapp/tls", [ConfigOption::ServerProvider])?;
//! let server = provider.server_credentials().build()?;
//! # let _ = server;
//! # Ok::<(), certprov::ProviderError>(())
//! ```

pub mod error;
pub mod identity;
pub mod options;
pub mod provider;
pub mod search_path;
pub mod settings;
pub mod tls;
pub mod trust;

pub use error::{ProviderError, Result};
pub use identity::{IdentityCert, ParsedCertificate};
pub use options::{Config, ConfigOption, TlsVersion};
pub use provider::{CertificateProvider, DynamicProvider, FileProvider, Provider, ProviderKind};
pub use settings::Settings;
pub use tls::{ClientCredentialConfig, ServerCredentialConfig};
pub use trust::TrustPool;
