//! Verified QUIC connection wrapper.
//!
//! After the TLS handshake succeeds, `PeerConnection` wraps the raw
//! `quinn::Connection` and caches the peer's parsed leaf certificate.

use std::net::SocketAddr;

use certprov::ParsedCertificate;
use rustls_pki_types::CertificateDer;

use crate::error::{QuicError, Result};

/// A QUIC connection whose peer presented a certificate.
pub struct PeerConnection {
    inner: quinn::Connection,
    peer_certificate: ParsedCertificate,
}

impl PeerConnection {
    /// Wrap a raw quinn connection, parsing the peer's leaf certificate.
    pub fn from_quinn(conn: quinn::Connection) -> Result<Self> {
        let peer_certificate = extract_peer_certificate(&conn)?;
        Ok(Self {
            inner: conn,
            peer_certificate,
        })
    }

    /// The leaf certificate presented by the peer.
    pub fn peer_certificate(&self) -> &ParsedCertificate {
        &self.peer_certificate
    }

    pub fn remote_address(&self) -> SocketAddr {
        self.inner.remote_address()
    }

    /// Access the underlying quinn connection.
    pub fn inner(&self) -> &quinn::Connection {
        &self.inner
    }

    /// Close the connection with application error code 0.
    pub fn close(&self) {
        self.inner.close(0u32.into(), b"done");
    }
}

fn extract_peer_certificate(conn: &quinn::Connection) -> Result<ParsedCertificate> {
    let identity = conn
        .peer_identity()
        .ok_or_else(|| QuicError::PeerIdentity("no peer identity available".into()))?;

    let certs = identity
        .downcast::<Vec<CertificateDer<'static>>>()
        .map_err(|_| QuicError::PeerIdentity("failed to downcast peer identity".into()))?;

    let leaf = certs
        .first()
        .ok_or_else(|| QuicError::PeerIdentity("peer certificate chain is empty".into()))?;

    ParsedCertificate::from_der(leaf)
        .map_err(|e| QuicError::PeerIdentity(format!("leaf certificate: {e}")))
}
