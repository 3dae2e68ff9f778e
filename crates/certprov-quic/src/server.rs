//! QUIC server endpoint.
//!
//! `ServerEndpoint` wraps a quinn server endpoint, binding to a local address
//! and accepting incoming connections with mutual TLS.

use std::net::SocketAddr;

use certprov::CertificateProvider;
use tracing::info;

use crate::config::server_config;
use crate::connection::PeerConnection;
use crate::error::{QuicError, Result};

/// A QUIC server endpoint presenting a provider's identity.
pub struct ServerEndpoint {
    endpoint: quinn::Endpoint,
}

impl ServerEndpoint {
    /// Bind a QUIC server to the given address.
    ///
    /// Clients must present a certificate accepted by the provider's server
    /// credentials. Must be called within a tokio runtime.
    pub fn bind(addr: SocketAddr, provider: &dyn CertificateProvider) -> Result<Self> {
        let config = server_config(provider)?;

        let endpoint =
            quinn::Endpoint::server(config, addr).map_err(|e| QuicError::Bind(e.to_string()))?;

        info!(
            %addr,
            subject = provider.identity_cert().leaf().subject(),
            "server endpoint bound"
        );

        Ok(Self { endpoint })
    }

    /// Accept the next incoming connection and complete the handshake.
    pub async fn accept(&self) -> Result<PeerConnection> {
        let incoming = self.endpoint.accept().await.ok_or(QuicError::Closed)?;

        let conn = PeerConnection::from_quinn(incoming.await?)?;

        info!(
            peer = conn.peer_certificate().subject(),
            remote = %conn.remote_address(),
            "accepted connection"
        );

        Ok(conn)
    }

    /// Returns the local address this endpoint is bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.endpoint
            .local_addr()
            .map_err(|e| QuicError::Bind(e.to_string()))
    }

    /// Gracefully shut down the endpoint.
    pub fn close(&self) {
        self.endpoint.close(0u32.into(), b"shutdown");
    }
}
