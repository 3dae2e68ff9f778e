//! QUIC client endpoint.
//!
//! `ClientEndpoint` wraps a quinn client endpoint that dials servers under a
//! fixed expected name.

use std::net::{Ipv4Addr, SocketAddr};

use certprov::CertificateProvider;
use tracing::info;

use crate::config::client_config;
use crate::connection::PeerConnection;
use crate::error::{QuicError, Result};

/// A QUIC client endpoint presenting a provider's identity.
pub struct ClientEndpoint {
    endpoint: quinn::Endpoint,
    server_name: String,
}

impl ClientEndpoint {
    /// Create a client endpoint bound to an ephemeral port.
    ///
    /// Server certificates must be valid for `server_name` unless the
    /// provider skips verification on dial. Must be called within a tokio
    /// runtime.
    pub fn new(provider: &dyn CertificateProvider, server_name: &str) -> Result<Self> {
        let config = client_config(provider, server_name)?;

        let bind_addr = SocketAddr::from((Ipv4Addr::UNSPECIFIED, 0));
        let mut endpoint =
            quinn::Endpoint::client(bind_addr).map_err(|e| QuicError::Bind(e.to_string()))?;
        endpoint.set_default_client_config(config);

        Ok(Self {
            endpoint,
            server_name: server_name.to_string(),
        })
    }

    /// Connect to a server and complete the handshake.
    pub async fn connect(&self, addr: SocketAddr) -> Result<PeerConnection> {
        let connecting = self.endpoint.connect(addr, &self.server_name)?;

        let conn = PeerConnection::from_quinn(connecting.await?)?;

        info!(
            peer = conn.peer_certificate().subject(),
            %addr,
            "connected to server"
        );

        Ok(conn)
    }

    /// The name server certificates are checked against.
    pub fn server_name(&self) -> &str {
        &self.server_name
    }

    /// Gracefully shut down the endpoint.
    pub fn close(&self) {
        self.endpoint.close(0u32.into(), b"shutdown");
    }
}
