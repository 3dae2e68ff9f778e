//! Provider configuration and the options that build it.
//!
//! A [`Config`] starts from documented defaults and is transformed by an
//! ordered list of [`ConfigOption`]s. Each option is a pure
//! `Config -> Config` step: later options win for scalar fields, while
//! [`ConfigOption::AddSearchPath`] appends.
//!
//! ```
//! use certprov::options::{Config, ConfigOption, TlsVersion};
//!
//! let config = Config::build([
//!     ConfigOption::ServerProvider,
//!     ConfigOption::AddSearchPath("/etc/myapp/tls".into()),
//!     ConfigOption::MinTlsVersion(0x0303),
//! ]);
//! assert_eq!(config.cert_file(), "server.pem");
//! assert_eq!(config.min_tls_version(), TlsVersion::Tls12);
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::provider::ProviderKind;
use crate::search_path;

/// Default lifetime of a dynamically generated certificate.
pub const DEFAULT_DYNAMIC_CERT_LIFETIME: Duration = Duration::from_secs(60 * 60);

/// Default RSA modulus size for dynamically generated keys, in bits.
pub const DEFAULT_DYNAMIC_CERT_KEY_SIZE: usize = 2048;

/// Default subject alternative names of a dynamically generated certificate.
pub const DEFAULT_DYNAMIC_CERT_HOST: &str = "localhost";

/// Minimum TLS protocol version accepted by assembled credentials.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TlsVersion {
    Tls10,
    Tls11,
    Tls12,
    #[default]
    Tls13,
}

impl TlsVersion {
    /// Map a TLS wire version (`0x0301`..=`0x0304`) to a [`TlsVersion`].
    ///
    /// Returns `None` for anything else.
    pub fn from_wire(version: u16) -> Option<Self> {
        match version {
            0x0301 => Some(Self::Tls10),
            0x0302 => Some(Self::Tls11),
            0x0303 => Some(Self::Tls12),
            0x0304 => Some(Self::Tls13),
            _ => None,
        }
    }

    /// The TLS wire value of this version.
    pub fn to_wire(self) -> u16 {
        match self {
            Self::Tls10 => 0x0301,
            Self::Tls11 => 0x0302,
            Self::Tls12 => 0x0303,
            Self::Tls13 => 0x0304,
        }
    }

    /// Parse a dotted version such as `"1.2"` or `"TLS1.3"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_ascii_lowercase();
        let name = name.strip_prefix("tls").unwrap_or(&name);
        match name.trim_start_matches(['v', ' ', '_']) {
            "1.0" | "10" => Some(Self::Tls10),
            "1.1" | "11" => Some(Self::Tls11),
            "1.2" | "12" => Some(Self::Tls12),
            "1.3" | "13" => Some(Self::Tls13),
            _ => None,
        }
    }
}

impl fmt::Display for TlsVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Tls10 => "TLS1.0",
            Self::Tls11 => "TLS1.1",
            Self::Tls12 => "TLS1.2",
            Self::Tls13 => "TLS1.3",
        };
        f.write_str(name)
    }
}

/// All tunables of a certificate provider.
///
/// Built once by the provider's constructor and only exposed by shared
/// reference afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    cert_file: String,
    key_file: String,
    ca_file: String,
    search_path: Vec<PathBuf>,
    load_system_ca: bool,
    min_tls_version: TlsVersion,
    dial_insecure_skip_verify: bool,
    server_insecure_skip_verify: bool,
    dynamic_cert_lifetime: Duration,
    dynamic_cert_key_size: usize,
    dynamic_cert_hosts: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cert_file: String::new(),
            key_file: String::new(),
            ca_file: String::new(),
            search_path: Vec::new(),
            load_system_ca: false,
            min_tls_version: TlsVersion::Tls13,
            dial_insecure_skip_verify: false,
            server_insecure_skip_verify: false,
            dynamic_cert_lifetime: DEFAULT_DYNAMIC_CERT_LIFETIME,
            dynamic_cert_key_size: DEFAULT_DYNAMIC_CERT_KEY_SIZE,
            dynamic_cert_hosts: vec![DEFAULT_DYNAMIC_CERT_HOST.to_string()],
        }
    }
}

impl Config {
    /// Apply `options` in order to the default configuration.
    pub fn build(options: impl IntoIterator<Item = ConfigOption>) -> Self {
        Self::default().with_options(options)
    }

    /// Apply `options` in order on top of this configuration.
    pub fn with_options(self, options: impl IntoIterator<Item = ConfigOption>) -> Self {
        options
            .into_iter()
            .fold(self, |config, option| option.apply(config))
    }

    pub fn cert_file(&self) -> &str {
        &self.cert_file
    }

    pub fn key_file(&self) -> &str {
        &self.key_file
    }

    pub fn ca_file(&self) -> &str {
        &self.ca_file
    }

    /// Search directories in insertion order.
    pub fn search_path(&self) -> &[PathBuf] {
        &self.search_path
    }

    pub fn load_system_ca(&self) -> bool {
        self.load_system_ca
    }

    pub fn min_tls_version(&self) -> TlsVersion {
        self.min_tls_version
    }

    pub fn dial_insecure_skip_verify(&self) -> bool {
        self.dial_insecure_skip_verify
    }

    pub fn server_insecure_skip_verify(&self) -> bool {
        self.server_insecure_skip_verify
    }

    pub fn dynamic_cert_lifetime(&self) -> Duration {
        self.dynamic_cert_lifetime
    }

    pub fn dynamic_cert_key_size(&self) -> usize {
        self.dynamic_cert_key_size
    }

    pub fn dynamic_cert_hosts(&self) -> &[String] {
        &self.dynamic_cert_hosts
    }

    /// Resolve the configured certificate file against the search path.
    ///
    /// An unresolved name is returned as-is so the subsequent read reports
    /// the missing file.
    pub fn cert_path(&self) -> PathBuf {
        search_path::resolve(&self.cert_file, &self.search_path).0
    }

    /// Resolve the configured key file against the search path.
    pub fn key_path(&self) -> PathBuf {
        search_path::resolve(&self.key_file, &self.search_path).0
    }

    /// Resolve the configured CA file. `None` when it does not exist anywhere.
    pub fn ca_path(&self) -> Option<PathBuf> {
        match search_path::resolve(&self.ca_file, &self.search_path) {
            (path, true) => Some(path),
            (_, false) => None,
        }
    }
}

/// A single configuration step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOption {
    /// `ca.pem`, `client.pem`, `client-key.pem`, and load the system CA pool.
    ClientProvider,
    /// `ca.pem`, `server.pem`, `server-key.pem`.
    ServerProvider,
    /// `ca.pem`, `cert.pem`, `key.pem`.
    CertProvider,
    CertFilename(String),
    KeyFilename(String),
    CaFilename(String),
    /// Append a directory to the search path.
    AddSearchPath(PathBuf),
    UseSystemCaPool(bool),
    /// Minimum TLS wire version. Values outside `0x0301..=0x0304` are ignored.
    MinTlsVersion(u16),
    InsecureSkipVerifyOnDial(bool),
    InsecureSkipVerifyOnServer(bool),
    DynamicCertLifetime(Duration),
    DynamicCertKeySize(usize),
    /// Subject alternative names for a dynamically generated certificate.
    DynamicCertHosts(Vec<String>),
}

impl ConfigOption {
    /// The bundle option for a provider kind.
    pub fn for_kind(kind: ProviderKind) -> Self {
        match kind {
            ProviderKind::Server => Self::ServerProvider,
            ProviderKind::Client => Self::ClientProvider,
            ProviderKind::Cert => Self::CertProvider,
        }
    }

    /// Select a file-name bundle by name, falling back to `default`.
    ///
    /// Accepts `server`, `client`, `cert` and their `*provider` spellings,
    /// case-insensitively.
    pub fn from_provider_name(name: &str, default: ConfigOption) -> Self {
        match name.parse::<ProviderKind>() {
            Ok(kind) => Self::for_kind(kind),
            Err(_) => default,
        }
    }

    /// Apply this option to `config`.
    pub fn apply(self, mut config: Config) -> Config {
        match self {
            Self::ClientProvider => {
                config = set_file_names(config, "client.pem", "client-key.pem");
                config.load_system_ca = true;
            }
            Self::ServerProvider => config = set_file_names(config, "server.pem", "server-key.pem"),
            Self::CertProvider => config = set_file_names(config, "cert.pem", "key.pem"),
            Self::CertFilename(name) => config.cert_file = name,
            Self::KeyFilename(name) => config.key_file = name,
            Self::CaFilename(name) => config.ca_file = name,
            Self::AddSearchPath(dir) => config.search_path.push(dir),
            Self::UseSystemCaPool(enable) => config.load_system_ca = enable,
            Self::MinTlsVersion(version) => {
                if let Some(version) = TlsVersion::from_wire(version) {
                    config.min_tls_version = version;
                }
            }
            Self::InsecureSkipVerifyOnDial(skip) => config.dial_insecure_skip_verify = skip,
            Self::InsecureSkipVerifyOnServer(skip) => config.server_insecure_skip_verify = skip,
            Self::DynamicCertLifetime(lifetime) => config.dynamic_cert_lifetime = lifetime,
            Self::DynamicCertKeySize(bits) => config.dynamic_cert_key_size = bits,
            Self::DynamicCertHosts(hosts) => config.dynamic_cert_hosts = hosts,
        }
        config
    }
}

impl From<TlsVersion> for ConfigOption {
    fn from(version: TlsVersion) -> Self {
        Self::MinTlsVersion(version.to_wire())
    }
}

/// Shorthand for [`ConfigOption::AddSearchPath`].
pub fn add_search_path(dir: impl AsRef<Path>) -> ConfigOption {
    ConfigOption::AddSearchPath(dir.as_ref().to_path_buf())
}

fn set_file_names(mut config: Config, cert: &str, key: &str) -> Config {
    config.ca_file = "ca.pem".to_string();
    config.cert_file = cert.to_string();
    config.key_file = key.to_string();
    config
}
