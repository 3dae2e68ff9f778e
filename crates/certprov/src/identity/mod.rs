//! Identity material: RSA keys, self-signed generation, and certificate
//! chains with their parsed leaf.
//!
//! A provider owns exactly one [`IdentityCert`], either loaded from PEM files
//! or produced by [`self_signed::generate`] from a fresh [`RsaKeypair`].

pub mod certificate;
pub mod keypair;
pub mod self_signed;

pub use certificate::{IdentityCert, ParsedCertificate};
pub use keypair::RsaKeypair;
