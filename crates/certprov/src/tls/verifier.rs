//! Verifiers used when a provider is told to skip peer verification.
//!
//! `AcceptAnyServerCert` (client-side) and `AcceptAnyClientCert`
//! (server-side) accept any well-formed X.509 end-entity certificate without
//! building a chain to the trust pool. Handshake signatures are still
//! verified with the ring crypto provider, so the peer must hold the private
//! key of the certificate it presents.

use std::sync::LazyLock;

use rustls::client::danger::{HandshakeSignatureValid, ServerCertVerified, ServerCertVerifier};
use rustls::crypto::WebPkiSupportedAlgorithms;
use rustls::server::danger::{ClientCertVerified, ClientCertVerifier};
use rustls::{DigitallySignedStruct, Error as TlsError, SignatureScheme};
use rustls_pki_types::{CertificateDer, ServerName, UnixTime};
use tracing::debug;

/// The ring provider's supported signature verification algorithms.
pub(crate) fn ring_signature_algorithms() -> &'static WebPkiSupportedAlgorithms {
    static ALGORITHMS: LazyLock<WebPkiSupportedAlgorithms> = LazyLock::new(|| {
        rustls::crypto::ring::default_provider().signature_verification_algorithms
    });
    &ALGORITHMS
}

/// Reject anything that is not a parsable end-entity certificate.
fn check_well_formed(end_entity: &CertificateDer<'_>) -> Result<(), TlsError> {
    webpki::EndEntityCert::try_from(end_entity)
        .map(|_| ())
        .map_err(|e| TlsError::General(format!("malformed peer certificate: {e}")))
}

// ---------------------------------------------------------------------------
// Client-side: accepts the server's certificate
// ---------------------------------------------------------------------------

/// Server certificate verifier that skips chain and name validation.
#[derive(Debug, Default)]
pub struct AcceptAnyServerCert;

impl AcceptAnyServerCert {
    pub fn new() -> Self {
        Self
    }
}

impl ServerCertVerifier for AcceptAnyServerCert {
    fn verify_server_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        server_name: &ServerName<'_>,
        _ocsp_response: &[u8],
        _now: UnixTime,
    ) -> Result<ServerCertVerified, TlsError> {
        check_well_formed(end_entity)?;
        debug!(server_name = ?server_name, "accepting server certificate without verification");
        Ok(ServerCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, ring_signature_algorithms())
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, ring_signature_algorithms())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        ring_signature_algorithms().supported_schemes()
    }
}

// ---------------------------------------------------------------------------
// Server-side: accepts the client's certificate
// ---------------------------------------------------------------------------

/// Client certificate verifier that requires a certificate but skips chain
/// validation.
#[derive(Debug, Default)]
pub struct AcceptAnyClientCert;

impl AcceptAnyClientCert {
    pub fn new() -> Self {
        Self
    }
}

impl ClientCertVerifier for AcceptAnyClientCert {
    fn client_auth_mandatory(&self) -> bool {
        true
    }

    fn root_hint_subjects(&self) -> &[rustls::DistinguishedName] {
        &[]
    }

    fn verify_client_cert(
        &self,
        end_entity: &CertificateDer<'_>,
        _intermediates: &[CertificateDer<'_>],
        _now: UnixTime,
    ) -> Result<ClientCertVerified, TlsError> {
        check_well_formed(end_entity)?;
        debug!("accepting client certificate without verification");
        Ok(ClientCertVerified::assertion())
    }

    fn verify_tls12_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        rustls::crypto::verify_tls12_signature(message, cert, dss, ring_signature_algorithms())
    }

    fn verify_tls13_signature(
        &self,
        message: &[u8],
        cert: &CertificateDer<'_>,
        dss: &DigitallySignedStruct,
    ) -> Result<HandshakeSignatureValid, TlsError> {
        rustls::crypto::verify_tls13_signature(message, cert, dss, ring_signature_algorithms())
    }

    fn supported_verify_schemes(&self) -> Vec<SignatureScheme> {
        ring_signature_algorithms().supported_schemes()
    }
}

#[cfg(test)]
mod tests {
    use rcgen::{CertificateParams, KeyPair};

    use super::*;

    fn self_signed_der() -> CertificateDer<'static> {
        let key = KeyPair::generate().unwrap();
        let params = CertificateParams::new(vec!["peer.test".to_string()]).unwrap();
        params.self_signed(&key).unwrap().der().clone()
    }

    #[test]
    fn server_verifier_accepts_untrusted_cert() {
        let verifier = AcceptAnyServerCert::new();
        let name = ServerName::try_from("unrelated.test").unwrap();
        let result =
            verifier.verify_server_cert(&self_signed_der(), &[], &name, &[], UnixTime::now());
        assert!(result.is_ok());
    }

    #[test]
    fn client_verifier_accepts_untrusted_cert() {
        let verifier = AcceptAnyClientCert::new();
        let result = verifier.verify_client_cert(&self_signed_der(), &[], UnixTime::now());
        assert!(result.is_ok());
    }

    #[test]
    fn client_verifier_still_requires_a_cert() {
        let verifier = AcceptAnyClientCert::new();
        assert!(verifier.offer_client_auth());
        assert!(verifier.client_auth_mandatory());
    }

    #[test]
    fn garbage_cert_rejected() {
        let cert = CertificateDer::from(vec![0u8; 10]);
        let name = ServerName::try_from("peer.test").unwrap();
        assert!(
            AcceptAnyServerCert::new()
                .verify_server_cert(&cert, &[], &name, &[], UnixTime::now())
                .is_err()
        );
        assert!(
            AcceptAnyClientCert::new()
                .verify_client_cert(&cert, &[], UnixTime::now())
                .is_err()
        );
    }

    #[test]
    fn signature_schemes_come_from_ring() {
        assert!(!AcceptAnyServerCert::new().supported_verify_schemes().is_empty());
        assert!(
            AcceptAnyClientCert::new()
                .supported_verify_schemes()
                .contains(&SignatureScheme::RSA_PKCS1_SHA256)
        );
    }
}
