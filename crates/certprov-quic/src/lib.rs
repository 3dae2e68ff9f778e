//! QUIC endpoints secured by `certprov` identity providers.
//!
//! Turns a provider's credential configurations into quinn configs and
//! wraps quinn endpoints for mutual-TLS connections:
//!
//! - `server_config` / `client_config`: rustls to quinn conversion, ALPN `certprov`
//! - `ServerEndpoint`: binds and accepts connections
//! - `ClientEndpoint`: dials a server under an expected name
//! - `PeerConnection`: a connection with the peer's parsed certificate

pub mod client;
pub mod config;
pub mod connection;
pub mod error;
pub mod server;

pub use client::ClientEndpoint;
pub use config::{ALPN_CERTPROV, client_config, server_config};
pub use connection::PeerConnection;
pub use error::{QuicError, Result};
pub use server::ServerEndpoint;
