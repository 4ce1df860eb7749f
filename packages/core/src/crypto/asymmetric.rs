//! RSA encryption and PKCS#1 v1.5 signatures.

use crate::crypto::algorithms::{DigestAlgorithm, SignatureAlgorithm};
use crate::crypto::digest;
use crate::crypto::keys::{PrivateKey, PublicKey};
use crate::crypto::random::{os_random, RandomSource, RngAdapter};
use crate::error::{CryptoError, Result};
use rsa::traits::PublicKeyParts;
use rsa::{Pkcs1v15Encrypt, Pkcs1v15Sign, RsaPrivateKey, RsaPublicKey};
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

// PKCS#1 v1.5 encryption padding overhead
const PKCS1_OVERHEAD: usize = 11;

fn rsa_public(key: &PublicKey) -> Result<&RsaPublicKey> {
    key.as_rsa().ok_or_else(|| {
        CryptoError::InvalidArgument(format!("{} public key cannot be used with RSA", key.algorithm()))
    })
}

fn rsa_private(key: &PrivateKey) -> Result<&RsaPrivateKey> {
    key.as_rsa().ok_or_else(|| {
        CryptoError::InvalidArgument(format!("{} private key cannot be used with RSA", key.algorithm()))
    })
}

/// RSA with PKCS#1 v1.5 padding.
#[derive(Clone)]
pub struct RsaCipher {
    random: Arc<dyn RandomSource>,
}

impl Default for RsaCipher {
    fn default() -> Self {
        Self::new(os_random())
    }
}

impl fmt::Debug for RsaCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RsaCipher").finish_non_exhaustive()
    }
}

impl RsaCipher {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// Largest plaintext `public` can encrypt.
    pub fn max_plaintext_len(public: &RsaPublicKey) -> usize {
        public.size().saturating_sub(PKCS1_OVERHEAD)
    }

    pub fn encrypt(&self, plaintext: &[u8], public: &PublicKey) -> Result<Vec<u8>> {
        let key = rsa_public(public)?;
        let capacity = Self::max_plaintext_len(key);
        if plaintext.len() > capacity {
            return Err(CryptoError::InvalidArgument(format!(
                "plaintext of {} bytes exceeds the {}-byte capacity of RSA-{}",
                plaintext.len(),
                capacity,
                key.size() * 8
            )));
        }
        debug!(modulus_bits = key.size() * 8, len = plaintext.len(), "RSA encrypt");
        key.encrypt(&mut RngAdapter(self.random.as_ref()), Pkcs1v15Encrypt, plaintext)
            .map_err(|e| CryptoError::InvalidArgument(format!("RSA encryption failed: {}", e)))
    }

    pub fn decrypt(&self, ciphertext: &[u8], private: &PrivateKey) -> Result<Vec<u8>> {
        let key = rsa_private(private)?;
        debug!(modulus_bits = key.size() * 8, len = ciphertext.len(), "RSA decrypt");
        key.decrypt(Pkcs1v15Encrypt, ciphertext)
            .map_err(|e| CryptoError::DecryptionFailure(format!("RSA decryption failed: {}", e)))
    }
}

/// `SHA*withRSA` signatures. Deterministic for a given key and message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RsaSign {
    algorithm: SignatureAlgorithm,
}

impl RsaSign {
    /// `algorithm` must be a `SHA*withRSA` name.
    pub fn new(algorithm: &str) -> Result<Self> {
        Ok(Self::with_algorithm(algorithm.parse()?))
    }

    pub fn with_algorithm(algorithm: SignatureAlgorithm) -> Self {
        Self { algorithm }
    }

    pub fn algorithm(&self) -> SignatureAlgorithm {
        self.algorithm
    }

    pub fn sign(&self, data: &[u8], private: &PrivateKey) -> Result<Vec<u8>> {
        let key = rsa_private(private)?;
        let hashed = digest::hash(data, self.algorithm.digest());
        debug!(algorithm = %self.algorithm, modulus_bits = key.size() * 8, "RSA sign");
        key.sign(self.scheme()?, &hashed)
            .map_err(|e| CryptoError::InvalidArgument(format!("{}: {}", self.algorithm, e)))
    }

    /// `false` on any mismatch, including a non-RSA key.
    pub fn verify(&self, signature: &[u8], data: &[u8], public: &PublicKey) -> bool {
        let Ok(key) = rsa_public(public) else {
            return false;
        };
        let Ok(scheme) = self.scheme() else {
            return false;
        };
        let hashed = digest::hash(data, self.algorithm.digest());
        key.verify(scheme, &hashed, signature).is_ok()
    }

    fn scheme(&self) -> Result<Pkcs1v15Sign> {
        match self.algorithm.digest() {
            DigestAlgorithm::Sha1 => Ok(Pkcs1v15Sign::new::<Sha1>()),
            DigestAlgorithm::Sha224 => Ok(Pkcs1v15Sign::new::<Sha224>()),
            DigestAlgorithm::Sha256 => Ok(Pkcs1v15Sign::new::<Sha256>()),
            DigestAlgorithm::Sha384 => Ok(Pkcs1v15Sign::new::<Sha384>()),
            DigestAlgorithm::Sha512 => Ok(Pkcs1v15Sign::new::<Sha512>()),
            DigestAlgorithm::Md5 => Err(CryptoError::UnsupportedAlgorithm(
                "MD5withRSA".to_string(),
            )),
        }
    }
}
