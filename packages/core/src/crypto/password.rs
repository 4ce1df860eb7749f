// PBKDF2 хеширование паролей
// Self-describing blob: parameters + salt + derived key

use crate::config::Config;
use crate::crypto::algorithms::{DigestAlgorithm, Pbkdf2Algorithm};
use crate::error::{CryptoError, Result};
use md5::Md5;
use pbkdf2::pbkdf2_hmac;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use tracing::debug;
use zeroize::Zeroizing;

const HEADER_LENGTH: usize = 12;

/// Parsed form of a blob produced by [`Pbkdf2Digest::hash`].
///
/// ```text
/// u32_be(iterations) || u32_be(key_length_bits) || u32_be(salt_len) || salt || derived_key
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pbkdf2Hash {
    pub iterations: u32,
    pub key_length_bits: u32,
    pub salt: Vec<u8>,
    pub derived_key: Vec<u8>,
}

impl Pbkdf2Hash {
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let salt_len = u32::try_from(self.salt.len()).map_err(|_| {
            CryptoError::InvalidArgument(format!(
                "salt of {} bytes does not fit a u32 length field",
                self.salt.len()
            ))
        })?;
        let mut blob = Vec::with_capacity(HEADER_LENGTH + self.salt.len() + self.derived_key.len());
        blob.extend_from_slice(&self.iterations.to_be_bytes());
        blob.extend_from_slice(&self.key_length_bits.to_be_bytes());
        blob.extend_from_slice(&salt_len.to_be_bytes());
        blob.extend_from_slice(&self.salt);
        blob.extend_from_slice(&self.derived_key);
        Ok(blob)
    }

    pub fn from_bytes(blob: &[u8]) -> Result<Self> {
        let malformed = |reason: String| CryptoError::MalformedInput(format!("PBKDF2 hash: {}", reason));

        if blob.len() < HEADER_LENGTH {
            return Err(malformed(format!("{} bytes is shorter than the header", blob.len())));
        }
        let field = |i: usize| {
            let mut bytes = [0u8; 4];
            bytes.copy_from_slice(&blob[i * 4..i * 4 + 4]);
            u32::from_be_bytes(bytes)
        };
        let iterations = field(0);
        let key_length_bits = field(1);
        let salt_len = field(2) as usize;
        if iterations == 0 {
            return Err(malformed("iteration count is zero".to_string()));
        }
        if key_length_bits == 0 {
            return Err(malformed("key length is zero".to_string()));
        }

        let rest = &blob[HEADER_LENGTH..];
        if salt_len > rest.len() {
            return Err(malformed(format!(
                "salt length {} exceeds the {} remaining bytes",
                salt_len,
                rest.len()
            )));
        }
        let (salt, derived_key) = rest.split_at(salt_len);
        if key_length_bits % 8 != 0 || derived_key.len() != (key_length_bits / 8) as usize {
            return Err(malformed(format!(
                "derived key is {} bytes but the header declares {} bits",
                derived_key.len(),
                key_length_bits
            )));
        }

        Ok(Self {
            iterations,
            key_length_bits,
            salt: salt.to_vec(),
            derived_key: derived_key.to_vec(),
        })
    }
}

/// Password hashing with PBKDF2 and a self-describing output.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pbkdf2Digest {
    algorithm: Pbkdf2Algorithm,
    iterations: u32,
    key_length_bits: u32,
}

impl Default for Pbkdf2Digest {
    fn default() -> Self {
        Self::new(Pbkdf2Algorithm::default())
    }
}

impl Pbkdf2Digest {
    /// Iteration count and key length come from [`Config`].
    pub fn new(algorithm: Pbkdf2Algorithm) -> Self {
        let config = Config::global();
        Self {
            algorithm,
            iterations: config.pbkdf2_iterations,
            key_length_bits: config.pbkdf2_key_length_bits,
        }
    }

    pub fn with_params(
        algorithm: Pbkdf2Algorithm,
        iterations: u32,
        key_length_bits: u32,
    ) -> Result<Self> {
        if iterations == 0 {
            return Err(CryptoError::InvalidArgument(
                "iteration count must be at least 1".to_string(),
            ));
        }
        if key_length_bits == 0 || key_length_bits % 8 != 0 {
            return Err(CryptoError::InvalidArgument(format!(
                "key length must be a positive multiple of 8 bits, got {}",
                key_length_bits
            )));
        }
        Ok(Self {
            algorithm,
            iterations,
            key_length_bits,
        })
    }

    pub fn algorithm(&self) -> Pbkdf2Algorithm {
        self.algorithm
    }

    pub fn hash(&self, password: &str, salt: &[u8]) -> Result<Vec<u8>> {
        debug!(
            algorithm = %self.algorithm,
            iterations = self.iterations,
            key_length_bits = self.key_length_bits,
            "PBKDF2 hash"
        );
        let derived = derive(
            self.algorithm.prf(),
            password.as_bytes(),
            salt,
            self.iterations,
            (self.key_length_bits / 8) as usize,
        );
        Pbkdf2Hash {
            iterations: self.iterations,
            key_length_bits: self.key_length_bits,
            salt: salt.to_vec(),
            derived_key: derived.to_vec(),
        }
        .to_bytes()
    }

    pub fn decode(&self, blob: &[u8]) -> Result<Pbkdf2Hash> {
        Pbkdf2Hash::from_bytes(blob)
    }

    /// Re-derives with the blob's salt, iteration count and length.
    /// Malformed blobs verify as `false`.
    pub fn verify(&self, blob: &[u8], password: &str) -> bool {
        let parsed = match Pbkdf2Hash::from_bytes(blob) {
            Ok(parsed) => parsed,
            Err(err) => {
                debug!(%err, "PBKDF2 verify on malformed hash");
                return false;
            }
        };
        let derived = derive(
            self.algorithm.prf(),
            password.as_bytes(),
            &parsed.salt,
            parsed.iterations,
            parsed.derived_key.len(),
        );
        derived.as_slice() == parsed.derived_key.as_slice()
    }
}

/// PBKDF2-HMAC with the given PRF digest, `len` output bytes.
pub(crate) fn derive(
    prf: DigestAlgorithm,
    password: &[u8],
    salt: &[u8],
    iterations: u32,
    len: usize,
) -> Zeroizing<Vec<u8>> {
    let mut out = Zeroizing::new(vec![0u8; len]);
    match prf {
        DigestAlgorithm::Md5 => pbkdf2_hmac::<Md5>(password, salt, iterations, &mut out),
        DigestAlgorithm::Sha1 => pbkdf2_hmac::<Sha1>(password, salt, iterations, &mut out),
        DigestAlgorithm::Sha224 => pbkdf2_hmac::<Sha224>(password, salt, iterations, &mut out),
        DigestAlgorithm::Sha256 => pbkdf2_hmac::<Sha256>(password, salt, iterations, &mut out),
        DigestAlgorithm::Sha384 => pbkdf2_hmac::<Sha384>(password, salt, iterations, &mut out),
        DigestAlgorithm::Sha512 => pbkdf2_hmac::<Sha512>(password, salt, iterations, &mut out),
    }
    out
}
