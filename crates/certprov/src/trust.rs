//! Trust pools: the certificates a provider treats as authoritative when
//! validating a peer.
//!
//! A [`TrustPool`] wraps a `rustls::RootCertStore`, optionally seeded from
//! the platform trust store via `rustls-native-certs`, and remembers which
//! certificates the application appended itself.
//!
//! Chain verification is delegated to `rustls-webpki` with the ring
//! signature algorithms, the same path rustls takes during a handshake.

use rustls::RootCertStore;
use rustls_pki_types::{CertificateDer, UnixTime};
use tracing::{debug, warn};

use crate::error::{ProviderError, Result};
use crate::identity::certificate::pem_certificates;
use crate::tls::verifier::ring_signature_algorithms;

/// A set of trusted root certificates.
#[derive(Debug, Clone)]
pub struct TrustPool {
    roots: RootCertStore,
    appended: Vec<CertificateDer<'static>>,
    system_roots: usize,
}

impl TrustPool {
    /// An empty pool.
    pub fn new() -> Self {
        Self {
            roots: RootCertStore::empty(),
            appended: Vec::new(),
            system_roots: 0,
        }
    }

    /// A pool seeded with the platform's trusted roots.
    ///
    /// Individual unreadable entries are logged and skipped. Fails only when
    /// the platform store produced errors and no usable certificate at all.
    pub fn system() -> Result<Self> {
        let native = rustls_native_certs::load_native_certs();
        for err in &native.errors {
            warn!(error = %err, "skipping system trust store entry");
        }

        let mut roots = RootCertStore::empty();
        let (added, ignored) = roots.add_parsable_certificates(native.certs);
        if added == 0 && !native.errors.is_empty() {
            return Err(ProviderError::SystemTrustStore(
                native
                    .errors
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; "),
            ));
        }

        debug!(added, ignored, "loaded system trust store");
        Ok(Self {
            roots,
            appended: Vec::new(),
            system_roots: added,
        })
    }

    /// The system pool when `load_system_ca` is set, else an empty pool.
    pub fn for_policy(load_system_ca: bool) -> Result<Self> {
        if load_system_ca {
            Self::system()
        } else {
            Ok(Self::new())
        }
    }

    /// Append every parsable `CERTIFICATE` block of `pem`.
    ///
    /// Returns `true` if at least one certificate was added. Blocks that do
    /// not parse as trust anchors are skipped.
    pub fn append_certs_from_pem(&mut self, pem: &[u8]) -> bool {
        let mut added = 0usize;
        for der in pem_certificates(pem) {
            match self.roots.add(der.clone()) {
                Ok(()) => {
                    self.appended.push(der);
                    added += 1;
                }
                Err(e) => debug!(error = %e, "skipping unparsable CA certificate"),
            }
        }
        added > 0
    }

    /// Total number of trusted roots, system and appended.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Number of roots taken from the platform trust store.
    pub fn system_roots(&self) -> usize {
        self.system_roots
    }

    /// Certificates appended by the application, in order.
    pub fn appended(&self) -> &[CertificateDer<'static>] {
        &self.appended
    }

    /// The underlying rustls root store.
    pub fn root_store(&self) -> &RootCertStore {
        &self.roots
    }

    /// Verify `end_entity` as a server-auth leaf chaining to this pool.
    pub fn verify(&self, end_entity: &CertificateDer<'_>, now: UnixTime) -> Result<()> {
        let cert = webpki::EndEntityCert::try_from(end_entity)
            .map_err(|e| ProviderError::CertificateVerification(format!("end entity: {e}")))?;

        cert.verify_for_usage(
            ring_signature_algorithms().all,
            &self.roots.roots,
            &[],
            now,
            webpki::KeyUsage::server_auth(),
            None,
            None,
        )
        .map(|_| ())
        .map_err(|e| ProviderError::CertificateVerification(format!("{e:?}")))
    }
}

impl Default for TrustPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use rcgen::{
        BasicConstraints, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa, KeyPair,
    };

    use super::*;

    struct Chain {
        ca_pem: String,
        leaf_der: CertificateDer<'static>,
    }

    fn ca_and_leaf() -> Chain {
        let ca_key = KeyPair::generate().unwrap();
        let mut ca_params = CertificateParams::new(Vec::<String>::new()).unwrap();
        ca_params
            .distinguished_name
            .push(DnType::CommonName, "test ca");
        ca_params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let ca = ca_params.self_signed(&ca_key).unwrap();

        let leaf_key = KeyPair::generate().unwrap();
        let mut leaf_params = CertificateParams::new(vec!["leaf.test".to_string()]).unwrap();
        leaf_params.extended_key_usages = vec![ExtendedKeyUsagePurpose::ServerAuth];
        let leaf = leaf_params.signed_by(&leaf_key, &ca, &ca_key).unwrap();

        Chain {
            ca_pem: ca.pem(),
            leaf_der: leaf.der().clone(),
        }
    }

    #[test]
    fn new_pool_is_empty() {
        let pool = TrustPool::new();
        assert!(pool.is_empty());
        assert_eq!(pool.len(), 0);
        assert_eq!(pool.system_roots(), 0);
    }

    #[test]
    fn append_reports_success() {
        let chain = ca_and_leaf();
        let mut pool = TrustPool::new();
        assert!(pool.append_certs_from_pem(chain.ca_pem.as_bytes()));
        assert_eq!(pool.len(), 1);
        assert_eq!(pool.appended().len(), 1);
    }

    #[test]
    fn append_of_garbage_reports_failure() {
        let mut pool = TrustPool::new();
        assert!(!pool.append_certs_from_pem(b"no certificates here"));
        assert!(!pool.append_certs_from_pem(b""));
        assert!(pool.is_empty());
    }

    #[test]
    fn corrupt_block_before_valid_certificate_is_skipped() {
        let chain = ca_and_leaf();
        let bundle = format!(
            "-----BEGIN CERTIFICATE-----\n!!!!notbase64!!!!\n-----END CERTIFICATE-----\n{}",
            chain.ca_pem
        );
        let mut pool = TrustPool::new();
        assert!(pool.append_certs_from_pem(bundle.as_bytes()));
        assert_eq!(pool.len(), 1);
        assert!(pool.verify(&chain.leaf_der, UnixTime::now()).is_ok());
    }

    #[test]
    fn leaf_verifies_against_its_ca() {
        let chain = ca_and_leaf();
        let mut pool = TrustPool::new();
        pool.append_certs_from_pem(chain.ca_pem.as_bytes());
        assert!(pool.verify(&chain.leaf_der, UnixTime::now()).is_ok());
    }

    #[test]
    fn leaf_fails_against_empty_pool() {
        let chain = ca_and_leaf();
        let result = TrustPool::new().verify(&chain.leaf_der, UnixTime::now());
        assert!(matches!(
            result,
            Err(ProviderError::CertificateVerification(_))
        ));
    }

    #[test]
    fn leaf_fails_against_unrelated_ca() {
        let chain = ca_and_leaf();
        let other = ca_and_leaf();
        let mut pool = TrustPool::new();
        pool.append_certs_from_pem(other.ca_pem.as_bytes());
        assert!(pool.verify(&chain.leaf_der, UnixTime::now()).is_err());
    }

    #[test]
    fn policy_without_system_ca_is_empty() {
        let pool = TrustPool::for_policy(false).unwrap();
        assert!(pool.is_empty());
    }
}
