// Ключевой материал
// Генерация, восстановление и кодирование ключей

use crate::config::Config;
use crate::crypto::algorithms::{AesKeySize, HmacAlgorithm, KeyAlgorithm, KeyPairAlgorithm, PbeAlgorithm};
use crate::crypto::dh::{DhGroup, DhPrivateKey, DhPublicKey, DiffieHellman};
use crate::crypto::password;
use crate::crypto::random::{os_random, RandomSource, RngAdapter};
use crate::crypto::symmetric::CBC_IV_LENGTH;
use crate::error::{CryptoError, Result};
use crate::utils::pem;
use rsa::pkcs8::{DecodePrivateKey, DecodePublicKey, EncodePrivateKey, EncodePublicKey};
use rsa::{RsaPrivateKey, RsaPublicKey};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// Секретный ключ: байты + алгоритм
///
/// Immutable once built. The bytes are cleared on drop and never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct SymmetricKey {
    bytes: Vec<u8>,
    algorithm: KeyAlgorithm,
}

impl SymmetricKey {
    pub fn new(bytes: Vec<u8>, algorithm: KeyAlgorithm) -> Self {
        Self { bytes, algorithm }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn format(&self) -> &'static str {
        "RAW"
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SymmetricKey")
            .field("algorithm", &self.algorithm)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl Drop for SymmetricKey {
    fn drop(&mut self) {
        self.bytes.zeroize();
    }
}

/// Публичный ключ (X.509)
#[derive(Debug, Clone, PartialEq)]
pub enum PublicKey {
    Rsa(RsaPublicKey),
    Dh(DhPublicKey),
}

impl PublicKey {
    pub fn algorithm(&self) -> KeyPairAlgorithm {
        match self {
            PublicKey::Rsa(_) => KeyPairAlgorithm::Rsa,
            PublicKey::Dh(_) => KeyPairAlgorithm::Dh,
        }
    }

    /// DER `SubjectPublicKeyInfo`.
    pub fn encoded(&self) -> Result<Vec<u8>> {
        match self {
            PublicKey::Rsa(key) => key
                .to_public_key_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| CryptoError::MalformedKey(format!("RSA public key: {}", e))),
            PublicKey::Dh(key) => key.to_der(),
        }
    }

    pub fn format(&self) -> &'static str {
        "X.509"
    }

    pub fn to_pem(&self) -> Result<String> {
        Ok(pem::encode("PUBLIC KEY", &self.encoded()?))
    }

    pub fn as_rsa(&self) -> Option<&RsaPublicKey> {
        match self {
            PublicKey::Rsa(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_dh(&self) -> Option<&DhPublicKey> {
        match self {
            PublicKey::Dh(key) => Some(key),
            _ => None,
        }
    }
}

/// Приватный ключ (PKCS#8)
#[derive(Clone)]
pub enum PrivateKey {
    Rsa(RsaPrivateKey),
    Dh(DhPrivateKey),
}

impl PrivateKey {
    pub fn algorithm(&self) -> KeyPairAlgorithm {
        match self {
            PrivateKey::Rsa(_) => KeyPairAlgorithm::Rsa,
            PrivateKey::Dh(_) => KeyPairAlgorithm::Dh,
        }
    }

    /// DER `PrivateKeyInfo`.
    pub fn encoded(&self) -> Result<Vec<u8>> {
        match self {
            PrivateKey::Rsa(key) => key
                .to_pkcs8_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| CryptoError::MalformedKey(format!("RSA private key: {}", e))),
            PrivateKey::Dh(key) => key.to_der(),
        }
    }

    pub fn format(&self) -> &'static str {
        "PKCS#8"
    }

    pub fn to_pem(&self) -> Result<String> {
        let der = Zeroizing::new(self.encoded()?);
        Ok(pem::encode("PRIVATE KEY", &der))
    }

    pub fn as_rsa(&self) -> Option<&RsaPrivateKey> {
        match self {
            PrivateKey::Rsa(key) => Some(key),
            _ => None,
        }
    }

    pub fn as_dh(&self) -> Option<&DhPrivateKey> {
        match self {
            PrivateKey::Dh(key) => Some(key),
            _ => None,
        }
    }
}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PrivateKey({}, [REDACTED])", self.algorithm())
    }
}

/// Пара ключей одного алгоритма
#[derive(Debug, Clone)]
pub struct KeyPair {
    pub public: PublicKey,
    pub private: PrivateKey,
}

impl KeyPair {
    pub fn algorithm(&self) -> KeyPairAlgorithm {
        self.public.algorithm()
    }
}

/// Генерация и восстановление ключей
#[derive(Clone)]
pub struct KeyMaterial {
    random: Arc<dyn RandomSource>,
}

impl Default for KeyMaterial {
    fn default() -> Self {
        Self::new(os_random())
    }
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial").finish_non_exhaustive()
    }
}

impl KeyMaterial {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    pub fn generate_bytes(&self, size: usize) -> Vec<u8> {
        let mut bytes = vec![0u8; size];
        self.random.fill_bytes(&mut bytes);
        bytes
    }

    pub fn generate_default_bytes(&self) -> Vec<u8> {
        self.generate_bytes(Config::global().random_bytes_length)
    }

    /// Random IV for CBC (and 16-byte GCM nonces).
    pub fn generate_iv(&self) -> Vec<u8> {
        self.generate_bytes(CBC_IV_LENGTH)
    }

    /// `size_bits == 0` selects the algorithm default.
    pub fn generate_key(&self, size_bits: usize, algorithm: KeyAlgorithm) -> Result<SymmetricKey> {
        if size_bits % 8 != 0 {
            return Err(CryptoError::InvalidArgument(format!(
                "key size must be a multiple of 8 bits, got {}",
                size_bits
            )));
        }
        let len = match algorithm {
            KeyAlgorithm::Aes => {
                let bits = if size_bits == 0 {
                    Config::global().aes_key_size_bits
                } else {
                    size_bits
                };
                AesKeySize::from_bits(bits)?.key_len()
            }
            KeyAlgorithm::Hmac(hmac) if size_bits == 0 => hmac.default_key_len(),
            KeyAlgorithm::Hmac(_) => size_bits / 8,
            KeyAlgorithm::Pbe(_) => {
                return Err(CryptoError::InvalidArgument(
                    "PBE keys are derived from a password, use generate_pbe_key".to_string(),
                ))
            }
        };

        debug!(algorithm = %algorithm, len, "generating secret key");
        Ok(SymmetricKey::new(self.generate_bytes(len), algorithm))
    }

    /// PBKDF2 key for a `PBEWith...` algorithm name.
    pub fn generate_pbe_key(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
        algorithm: &str,
    ) -> Result<SymmetricKey> {
        let algorithm: PbeAlgorithm = algorithm.parse()?;
        self.derive_pbe_key(password, salt, iterations, algorithm)
    }

    pub fn derive_pbe_key(
        &self,
        password: &str,
        salt: &[u8],
        iterations: u32,
        algorithm: PbeAlgorithm,
    ) -> Result<SymmetricKey> {
        if iterations == 0 {
            return Err(CryptoError::InvalidArgument(
                "iteration count must be at least 1".to_string(),
            ));
        }
        let secret = Zeroizing::new(password.as_bytes().to_vec());
        let derived = password::derive(
            algorithm.prf(),
            &secret,
            salt,
            iterations,
            algorithm.key_size().key_len(),
        );
        debug!(algorithm = %algorithm, iterations, "derived PBE key");
        Ok(SymmetricKey::new(derived.to_vec(), KeyAlgorithm::Pbe(algorithm)))
    }

    /// Random key of the HMAC variant's default length.
    pub fn generate_hmac_key(&self, algorithm: &str) -> Result<SymmetricKey> {
        let algorithm: HmacAlgorithm = algorithm.parse()?;
        self.generate_key(0, KeyAlgorithm::Hmac(algorithm))
    }

    /// Wraps raw bytes. No strength checks.
    pub fn restore_key(&self, bytes: &[u8], algorithm: KeyAlgorithm) -> SymmetricKey {
        SymmetricKey::new(bytes.to_vec(), algorithm)
    }

    /// `size_bits == 0` selects the configured default (RSA modulus or DH prime length).
    pub fn generate_key_pair(&self, size_bits: usize, algorithm: KeyPairAlgorithm) -> Result<KeyPair> {
        let config = Config::global();
        match algorithm {
            KeyPairAlgorithm::Rsa => {
                let bits = if size_bits == 0 { config.rsa_key_size_bits } else { size_bits };
                debug!(bits, "generating RSA key pair");
                let private = RsaPrivateKey::new(&mut RngAdapter(self.random.as_ref()), bits)
                    .map_err(|e| CryptoError::KeyGenerationError(format!("RSA-{}: {}", bits, e)))?;
                let public = RsaPublicKey::from(&private);
                Ok(KeyPair {
                    public: PublicKey::Rsa(public),
                    private: PrivateKey::Rsa(private),
                })
            }
            KeyPairAlgorithm::Dh => {
                let bits = if size_bits == 0 { config.dh_prime_length_bits } else { size_bits };
                let group = DhGroup::standard(bits)?;
                let party = DiffieHellman::new(Arc::clone(&self.random)).generate(group)?;
                Ok(party.into())
            }
        }
    }

    pub fn restore_public_key(&self, der: &[u8], algorithm: KeyPairAlgorithm) -> Result<PublicKey> {
        match algorithm {
            KeyPairAlgorithm::Rsa => RsaPublicKey::from_public_key_der(der)
                .map(PublicKey::Rsa)
                .map_err(|e| CryptoError::MalformedKey(format!("RSA public key: {}", e))),
            KeyPairAlgorithm::Dh => DhPublicKey::from_der(der).map(PublicKey::Dh),
        }
    }

    pub fn restore_private_key(&self, der: &[u8], algorithm: KeyPairAlgorithm) -> Result<PrivateKey> {
        match algorithm {
            KeyPairAlgorithm::Rsa => RsaPrivateKey::from_pkcs8_der(der)
                .map(PrivateKey::Rsa)
                .map_err(|e| CryptoError::MalformedKey(format!("RSA private key: {}", e))),
            KeyPairAlgorithm::Dh => DhPrivateKey::from_der(der).map(PrivateKey::Dh),
        }
    }

    pub fn restore_public_key_pem(&self, text: &str, algorithm: KeyPairAlgorithm) -> Result<PublicKey> {
        self.restore_public_key(&pem::decode(text)?, algorithm)
    }

    pub fn restore_private_key_pem(&self, text: &str, algorithm: KeyPairAlgorithm) -> Result<PrivateKey> {
        let der = Zeroizing::new(pem::decode(text)?);
        self.restore_private_key(&der, algorithm)
    }
}
