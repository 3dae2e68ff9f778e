//! Integration tests: environment variables in provider paths.
//!
//! The process environment is modified here, so these tests live in their
//! own binary.

mod common;

use std::path::Path;
use std::sync::OnceLock;

use certprov::{CertificateProvider, ConfigOption, FileProvider};

use common::{TestCa, write_identity};

/// Export `CERTPROV_ENV_TEST_DIR` pointing at a directory with one identity.
fn exported_cert_dir() -> &'static Path {
    static CERT_DIR: OnceLock<tempfile::TempDir> = OnceLock::new();
    CERT_DIR
        .get_or_init(|| {
            let dir = tempfile::tempdir().unwrap();
            let ca = TestCa::new("env ca");
            write_identity(dir.path(), &ca, "cert.pem", "key.pem", "env.test");
            // SAFETY: set once, before any reader in this binary.
            unsafe { std::env::set_var("CERTPROV_ENV_TEST_DIR", dir.path()) };
            dir
        })
        .path()
}

#[test]
fn cert_dir_expands_environment_variables() {
    let dir = exported_cert_dir();

    let provider =
        FileProvider::new("${CERTPROV_ENV_TEST_DIR}", [ConfigOption::CertProvider]).unwrap();
    assert_eq!(provider.cert_dir(), dir);
    assert_eq!(
        provider.identity_cert().leaf().dns_names(),
        &["env.test".to_string()]
    );
}

#[test]
fn file_names_expand_environment_variables() {
    let dir = exported_cert_dir();
    let other = tempfile::tempdir().unwrap();

    let provider = FileProvider::new(
        other.path().to_str().unwrap(),
        [
            ConfigOption::CertProvider,
            ConfigOption::CertFilename("$CERTPROV_ENV_TEST_DIR/cert.pem".into()),
            ConfigOption::KeyFilename("$CERTPROV_ENV_TEST_DIR/key.pem".into()),
        ],
    )
    .unwrap();
    assert_eq!(provider.cert_path(), dir.join("cert.pem"));
}
