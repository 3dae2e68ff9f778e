//! Shared fixtures for the integration tests.
//!
//! Certificates are generated with rcgen at test time and written into
//! temporary directories.

#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use rcgen::{
    BasicConstraints, Certificate, CertificateParams, DnType, ExtendedKeyUsagePurpose, IsCa,
    KeyPair,
};
use rustls_pki_types::ServerName;

/// A CA certificate and its key.
pub struct TestCa {
    pub cert: Certificate,
    pub key: KeyPair,
}

impl TestCa {
    pub fn new(name: &str) -> Self {
        let key = KeyPair::generate().expect("CA key");
        let mut params = CertificateParams::new(Vec::<String>::new()).expect("CA params");
        params.distinguished_name.push(DnType::CommonName, name);
        params.is_ca = IsCa::Ca(BasicConstraints::Unconstrained);
        let cert = params.self_signed(&key).expect("CA cert");
        Self { cert, key }
    }

    pub fn pem(&self) -> String {
        self.cert.pem()
    }

    /// Issue a leaf for `host` usable for both server and client auth.
    /// Returns `(cert_pem, key_pem)`.
    pub fn issue(&self, host: &str) -> (String, String) {
        let key = KeyPair::generate().expect("leaf key");
        let mut params = CertificateParams::new(vec![host.to_string()]).expect("leaf params");
        params.distinguished_name.push(DnType::CommonName, host);
        params.extended_key_usages = vec![
            ExtendedKeyUsagePurpose::ServerAuth,
            ExtendedKeyUsagePurpose::ClientAuth,
        ];
        let cert = params
            .signed_by(&key, &self.cert, &self.key)
            .expect("leaf cert");
        (cert.pem(), key.serialize_pem())
    }
}

pub fn write(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write fixture");
}

/// Write `ca.pem` plus a leaf pair under the given file names.
pub fn write_identity(dir: &Path, ca: &TestCa, cert_name: &str, key_name: &str, host: &str) {
    let (cert_pem, key_pem) = ca.issue(host);
    write(dir, "ca.pem", &ca.pem());
    write(dir, cert_name, &cert_pem);
    write(dir, key_name, &key_pem);
}

/// Drive a client and server connection to completion in memory.
pub fn handshake(
    client: rustls::ClientConfig,
    server: rustls::ServerConfig,
    server_name: ServerName<'static>,
) -> Result<(), rustls::Error> {
    let mut client: rustls::Connection =
        rustls::ClientConnection::new(Arc::new(client), server_name)?.into();
    let mut server: rustls::Connection = rustls::ServerConnection::new(Arc::new(server))?.into();

    for _ in 0..20 {
        if !client.is_handshaking() && !server.is_handshaking() {
            return Ok(());
        }
        transfer(&mut client, &mut server)?;
        transfer(&mut server, &mut client)?;
    }

    Err(rustls::Error::General("handshake did not complete".into()))
}

fn transfer(from: &mut rustls::Connection, to: &mut rustls::Connection) -> Result<(), rustls::Error> {
    let mut buf = Vec::new();
    while from.wants_write() {
        from.write_tls(&mut buf)
            .map_err(|e| rustls::Error::General(e.to_string()))?;
    }
    if buf.is_empty() {
        return Ok(());
    }

    let mut rd = &buf[..];
    while !rd.is_empty() {
        to.read_tls(&mut rd)
            .map_err(|e| rustls::Error::General(e.to_string()))?;
        to.process_new_packets()?;
    }
    Ok(())
}
