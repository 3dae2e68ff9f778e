//! TOML settings mapped onto provider options.
//!
//! ```toml
//! provider = "server"
//! search_path = ["/etc/myapp/tls", "$HOME/.myapp/tls"]
//! min_tls_version = "1.2"
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use crate::error::{ProviderError, Result};
use crate::options::{ConfigOption, TlsVersion};
use crate::provider::ProviderKind;

/// Provider settings as read from a file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// File-name bundle: `server`, `client` or `cert`.
    pub provider: Option<String>,
    pub cert_file: Option<String>,
    pub key_file: Option<String>,
    pub ca_file: Option<String>,
    /// Extra search directories, appended in order.
    pub search_path: Vec<PathBuf>,
    pub use_system_ca: Option<bool>,
    /// Dotted version such as `"1.2"`. Unrecognized values are ignored.
    pub min_tls_version: Option<String>,
    pub insecure_skip_verify_on_dial: Option<bool>,
    pub insecure_skip_verify_on_server: Option<bool>,
    pub dynamic_cert_lifetime_secs: Option<u64>,
    pub dynamic_cert_key_size: Option<usize>,
    pub dynamic_cert_hosts: Option<Vec<String>>,
}

impl Settings {
    /// Parse settings from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(content).map_err(|e| ProviderError::Settings(e.to_string()))?;
        if let Some(provider) = &settings.provider {
            provider.parse::<ProviderKind>()?;
        }
        Ok(settings)
    }

    /// Load settings from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            let content =
                std::fs::read_to_string(path).map_err(|e| ProviderError::io(path, e))?;
            Self::from_toml_str(&content)
        } else {
            Ok(Self::default())
        }
    }

    /// The equivalent option list.
    ///
    /// The provider bundle comes first so explicit file names override it.
    pub fn to_options(&self) -> Vec<ConfigOption> {
        let mut options = Vec::new();

        if let Some(provider) = &self.provider {
            options.push(ConfigOption::from_provider_name(
                provider,
                ConfigOption::CertProvider,
            ));
        }
        if let Some(name) = &self.cert_file {
            options.push(ConfigOption::CertFilename(name.clone()));
        }
        if let Some(name) = &self.key_file {
            options.push(ConfigOption::KeyFilename(name.clone()));
        }
        if let Some(name) = &self.ca_file {
            options.push(ConfigOption::CaFilename(name.clone()));
        }
        options.extend(
            self.search_path
                .iter()
                .cloned()
                .map(ConfigOption::AddSearchPath),
        );
        if let Some(enable) = self.use_system_ca {
            options.push(ConfigOption::UseSystemCaPool(enable));
        }
        if let Some(version) = self
            .min_tls_version
            .as_deref()
            .and_then(TlsVersion::from_name)
        {
            options.push(ConfigOption::from(version));
        }
        if let Some(skip) = self.insecure_skip_verify_on_dial {
            options.push(ConfigOption::InsecureSkipVerifyOnDial(skip));
        }
        if let Some(skip) = self.insecure_skip_verify_on_server {
            options.push(ConfigOption::InsecureSkipVerifyOnServer(skip));
        }
        if let Some(secs) = self.dynamic_cert_lifetime_secs {
            options.push(ConfigOption::DynamicCertLifetime(Duration::from_secs(secs)));
        }
        if let Some(bits) = self.dynamic_cert_key_size {
            options.push(ConfigOption::DynamicCertKeySize(bits));
        }
        if let Some(hosts) = &self.dynamic_cert_hosts {
            options.push(ConfigOption::DynamicCertHosts(hosts.clone()));
        }

        options
    }
}
