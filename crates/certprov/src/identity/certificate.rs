//! Identity certificates: a certificate chain, its private key, and the
//! parsed leaf.
//!
//! PEM decoding uses `rustls-pemfile`, leaf parsing uses `x509-parser`, and
//! the private key is checked against the leaf's public key through the ring
//! signer that rustls would use for the handshake.

use std::fmt;
use std::path::Path;
use std::time::Duration;

use rustls_pemfile::Item;
use rustls_pki_types::{CertificateDer, PrivateKeyDer};
use time::OffsetDateTime;
use tracing::debug;
use x509_parser::prelude::{FromDer, GeneralName, X509Certificate};

use crate::error::{ProviderError, Result};

/// Owned view of the fields of a parsed X.509 certificate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCertificate {
    der: CertificateDer<'static>,
    subject: String,
    issuer: String,
    serial: Vec<u8>,
    organizations: Vec<String>,
    dns_names: Vec<String>,
    not_before: OffsetDateTime,
    not_after: OffsetDateTime,
    is_ca: bool,
    public_key_der: Vec<u8>,
    public_key_bits: Option<usize>,
}

impl ParsedCertificate {
    /// Parse a DER-encoded certificate.
    pub fn from_der(der: &[u8]) -> Result<Self> {
        let (_, cert) = X509Certificate::from_der(der)
            .map_err(|e| ProviderError::CertificateParse(format!("X.509 parse error: {e}")))?;

        let organizations = cert
            .subject()
            .iter_organization()
            .filter_map(|attr| attr.as_str().ok())
            .map(str::to_owned)
            .collect();

        let dns_names = match cert.subject_alternative_name() {
            Ok(Some(san)) => san
                .value
                .general_names
                .iter()
                .filter_map(|name| match name {
                    GeneralName::DNSName(dns) => Some((*dns).to_owned()),
                    _ => None,
                })
                .collect(),
            Ok(None) => Vec::new(),
            Err(e) => {
                return Err(ProviderError::CertificateParse(format!(
                    "subject alternative name: {e}"
                )));
            }
        };

        let public_key_bits = match cert.public_key().parsed() {
            Ok(x509_parser::public_key::PublicKey::RSA(rsa)) => Some(rsa.key_size()),
            _ => None,
        };

        Ok(Self {
            der: CertificateDer::from(der.to_vec()),
            subject: cert.subject().to_string(),
            issuer: cert.issuer().to_string(),
            serial: cert.serial.to_bytes_be(),
            organizations,
            dns_names,
            not_before: cert.validity().not_before.to_datetime(),
            not_after: cert.validity().not_after.to_datetime(),
            is_ca: cert.is_ca(),
            public_key_der: cert.public_key().raw.to_vec(),
            public_key_bits,
        })
    }

    /// The raw DER bytes this view was parsed from.
    pub fn der(&self) -> &CertificateDer<'static> {
        &self.der
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn issuer(&self) -> &str {
        &self.issuer
    }

    /// Big-endian serial number without leading zero bytes.
    pub fn serial(&self) -> &[u8] {
        &self.serial
    }

    /// Subject organization (`O=`) values.
    pub fn organizations(&self) -> &[String] {
        &self.organizations
    }

    /// DNS subject alternative names.
    pub fn dns_names(&self) -> &[String] {
        &self.dns_names
    }

    pub fn not_before(&self) -> OffsetDateTime {
        self.not_before
    }

    pub fn not_after(&self) -> OffsetDateTime {
        self.not_after
    }

    /// Length of the validity window. Zero if `not_after` precedes
    /// `not_before`.
    pub fn validity(&self) -> Duration {
        Duration::try_from(self.not_after - self.not_before).unwrap_or_default()
    }

    pub fn is_ca(&self) -> bool {
        self.is_ca
    }

    /// DER-encoded SubjectPublicKeyInfo.
    pub fn public_key_der(&self) -> &[u8] {
        &self.public_key_der
    }

    /// RSA modulus size in bits; `None` for non-RSA keys.
    pub fn public_key_bits(&self) -> Option<usize> {
        self.public_key_bits
    }
}

/// A certificate chain with its private key and parsed leaf.
///
/// Immutable after construction. The leaf is always populated.
pub struct IdentityCert {
    chain: Vec<CertificateDer<'static>>,
    key: PrivateKeyDer<'static>,
    leaf: ParsedCertificate,
}

impl IdentityCert {
    /// Build an identity from a PEM certificate chain and a PEM private key.
    ///
    /// Fails if either input has no usable PEM block, if the leaf does not
    /// parse, or if the key does not belong to the leaf.
    pub fn from_pem(cert_pem: &[u8], key_pem: &[u8]) -> Result<Self> {
        let chain = rustls_pemfile::certs(&mut &cert_pem[..])
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| ProviderError::Pem(format!("certificate: {e}")))?;
        if chain.is_empty() {
            return Err(ProviderError::Pem(
                "certificate: no CERTIFICATE block found".into(),
            ));
        }

        let key = rustls_pemfile::private_key(&mut &key_pem[..])
            .map_err(|e| ProviderError::Pem(format!("private key: {e}")))?
            .ok_or_else(|| ProviderError::Pem("private key: no PRIVATE KEY block found".into()))?;

        // rustls-pemfile only frames the blocks; the leaf is parsed here.
        let leaf = ParsedCertificate::from_der(&chain[0])?;
        check_key_matches(&key, &leaf)?;

        Ok(Self { chain, key, leaf })
    }

    /// Read and parse a PEM certificate file and a PEM key file.
    pub fn load(cert_path: &Path, key_path: &Path) -> Result<Self> {
        let cert_pem =
            std::fs::read(cert_path).map_err(|e| ProviderError::io(cert_path, e))?;
        let key_pem = std::fs::read(key_path).map_err(|e| ProviderError::io(key_path, e))?;
        Self::from_pem(&cert_pem, &key_pem)
    }

    /// Certificate chain, leaf first.
    pub fn chain(&self) -> &[CertificateDer<'static>] {
        &self.chain
    }

    pub fn private_key(&self) -> &PrivateKeyDer<'static> {
        &self.key
    }

    /// The parsed first certificate of the chain.
    pub fn leaf(&self) -> &ParsedCertificate {
        &self.leaf
    }
}

impl Clone for IdentityCert {
    fn clone(&self) -> Self {
        Self {
            chain: self.chain.clone(),
            key: self.key.clone_key(),
            leaf: self.leaf.clone(),
        }
    }
}

impl fmt::Debug for IdentityCert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityCert")
            .field("subject", &self.leaf.subject)
            .field("chain_len", &self.chain.len())
            .field("not_after", &self.leaf.not_after)
            .finish_non_exhaustive()
    }
}

/// Reject a private key whose public half differs from the leaf's.
fn check_key_matches(key: &PrivateKeyDer<'_>, leaf: &ParsedCertificate) -> Result<()> {
    let signing_key = rustls::crypto::ring::sign::any_supported_type(key)
        .map_err(|e| ProviderError::Pem(format!("private key: {e}")))?;

    match signing_key.public_key() {
        Some(spki) if spki.as_ref() != leaf.public_key_der() => Err(ProviderError::KeyMismatch),
        _ => Ok(()),
    }
}

/// Collect all `CERTIFICATE` blocks of a PEM bundle.
///
/// A malformed block is skipped and scanning resumes after its `-----END`
/// line.
pub(crate) fn pem_certificates(pem: &[u8]) -> Vec<CertificateDer<'static>> {
    let mut certs = Vec::new();
    let mut rest = pem;
    loop {
        let before = rest;
        match rustls_pemfile::read_one(&mut rest) {
            Ok(Some(Item::X509Certificate(der))) => certs.push(der),
            Ok(Some(_)) => {}
            Ok(None) => break,
            Err(e) => {
                debug!(error = %e, "skipping malformed PEM block");
                let consumed = &before[..before.len() - rest.len()];
                if find(consumed, END_MARKER).is_none() {
                    match skip_past_end_line(rest) {
                        Some(next) => rest = next,
                        None => break,
                    }
                }
            }
        }
    }
    certs
}

const END_MARKER: &[u8] = b"-----END";

/// The input following the first line that contains an `-----END` marker.
fn skip_past_end_line(input: &[u8]) -> Option<&[u8]> {
    let end = find(input, END_MARKER)?;
    let after = &input[end..];
    Some(match after.iter().position(|&b| b == b'\n') {
        Some(newline) => &after[newline + 1..],
        None => &[],
    })
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}
