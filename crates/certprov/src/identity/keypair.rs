//! RSA keypair generation for dynamically generated identities.
//!
//! Key generation is delegated to the `rsa` crate (RustCrypto) using the OS
//! CSPRNG. The key is exported as PKCS#8 DER for `rcgen` to sign with and as
//! a PKCS#1 PEM block (`RSA PRIVATE KEY`) for the identity pair.

use rand::rngs::OsRng;
use rsa::RsaPrivateKey;
use rsa::pkcs1::{EncodeRsaPrivateKey, LineEnding};
use rsa::pkcs8::EncodePrivateKey;
use rsa::traits::PublicKeyParts;

use crate::error::{ProviderError, Result};

/// Smallest modulus accepted for generation. The ring signer used for
/// self-signing rejects anything smaller.
pub const MIN_KEY_SIZE: usize = 2048;

/// Largest modulus accepted for generation.
pub const MAX_KEY_SIZE: usize = 8192;

/// An RSA private key used as a dynamic identity.
pub struct RsaKeypair {
    key: RsaPrivateKey,
}

impl RsaKeypair {
    /// Generate a new RSA key with a modulus of `bits` bits.
    ///
    /// This is CPU-bound and can take tens of milliseconds at 2048 bits and
    /// considerably longer for larger keys.
    pub fn generate(bits: usize) -> Result<Self> {
        if !(MIN_KEY_SIZE..=MAX_KEY_SIZE).contains(&bits) {
            return Err(ProviderError::KeyGeneration(format!(
                "unsupported RSA key size {bits}: expected {MIN_KEY_SIZE}..={MAX_KEY_SIZE} bits"
            )));
        }

        let key = RsaPrivateKey::new(&mut OsRng, bits)
            .map_err(|e| ProviderError::KeyGeneration(e.to_string()))?;
        Ok(Self { key })
    }

    /// Modulus size in bits.
    pub fn bits(&self) -> usize {
        self.key.size() * 8
    }

    /// Returns the PKCS#8 DER encoding of the key (input for `rcgen`).
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>> {
        let doc = self
            .key
            .to_pkcs8_der()
            .map_err(|e| ProviderError::PemEncoding(format!("PKCS#8: {e}")))?;
        Ok(doc.as_bytes().to_vec())
    }

    /// Returns the key as a PKCS#1 `RSA PRIVATE KEY` PEM block.
    pub fn to_pkcs1_pem(&self) -> Result<String> {
        let pem = self
            .key
            .to_pkcs1_pem(LineEnding::LF)
            .map_err(|e| ProviderError::PemEncoding(format!("PKCS#1: {e}")))?;
        Ok(pem.to_string())
    }
}
