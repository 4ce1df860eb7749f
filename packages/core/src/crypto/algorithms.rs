//! Closed sets of algorithm identifiers.
//!
//! Names are parsed once, at the API boundary, into these types. Parsing
//! follows the conventional provider names (`"SHA-256"`, `"HmacSHA256"`,
//! `"PBEWithHmacSHA256AndAES_128"`, `"PBKDF2WithHmacSHA256"`,
//! `"SHA256withRSA"`, `"RSA"`, `"DH"`), case-insensitively.
//!
//! A name outside a family's naming pattern is an `InvalidArgument`; a name
//! that fits the pattern but is not supported is an `UnsupportedAlgorithm`.

use crate::error::{CryptoError, Result};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    Md5,
    Sha1,
    Sha224,
    Sha256,
    Sha384,
    Sha512,
}

impl DigestAlgorithm {
    pub fn output_len(self) -> usize {
        match self {
            DigestAlgorithm::Md5 => 16,
            DigestAlgorithm::Sha1 => 20,
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
            DigestAlgorithm::Sha512 => 64,
        }
    }

    /// Name fragment used inside composite names (`HmacSHA256`, `SHA256withRSA`).
    fn compact_name(self) -> &'static str {
        match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA1",
            DigestAlgorithm::Sha224 => "SHA224",
            DigestAlgorithm::Sha256 => "SHA256",
            DigestAlgorithm::Sha384 => "SHA384",
            DigestAlgorithm::Sha512 => "SHA512",
        }
    }

    fn from_compact(name: &str) -> Option<Self> {
        match name.replace('-', "").to_ascii_uppercase().as_str() {
            "MD5" => Some(DigestAlgorithm::Md5),
            "SHA" | "SHA1" => Some(DigestAlgorithm::Sha1),
            "SHA224" => Some(DigestAlgorithm::Sha224),
            "SHA256" => Some(DigestAlgorithm::Sha256),
            "SHA384" => Some(DigestAlgorithm::Sha384),
            "SHA512" => Some(DigestAlgorithm::Sha512),
            _ => None,
        }
    }

    fn require_sha(self, family: &str) -> Result<Self> {
        if self == DigestAlgorithm::Md5 {
            return Err(CryptoError::UnsupportedAlgorithm(format!(
                "{} does not support MD5",
                family
            )));
        }
        Ok(self)
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigestAlgorithm::Md5 => "MD5",
            DigestAlgorithm::Sha1 => "SHA-1",
            DigestAlgorithm::Sha224 => "SHA-224",
            DigestAlgorithm::Sha256 => "SHA-256",
            DigestAlgorithm::Sha384 => "SHA-384",
            DigestAlgorithm::Sha512 => "SHA-512",
        };
        f.write_str(name)
    }
}

impl FromStr for DigestAlgorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        Self::from_compact(name)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(format!("digest {:?}", name)))
    }
}

/// HMAC over any supported digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HmacAlgorithm(DigestAlgorithm);

impl HmacAlgorithm {
    pub const HMAC_MD5: Self = Self(DigestAlgorithm::Md5);
    pub const HMAC_SHA1: Self = Self(DigestAlgorithm::Sha1);
    pub const HMAC_SHA224: Self = Self(DigestAlgorithm::Sha224);
    pub const HMAC_SHA256: Self = Self(DigestAlgorithm::Sha256);
    pub const HMAC_SHA384: Self = Self(DigestAlgorithm::Sha384);
    pub const HMAC_SHA512: Self = Self(DigestAlgorithm::Sha512);

    pub fn new(digest: DigestAlgorithm) -> Self {
        Self(digest)
    }

    pub fn digest(self) -> DigestAlgorithm {
        self.0
    }

    /// Key length `generate_hmac_key` produces (bytes).
    pub fn default_key_len(self) -> usize {
        match self.0 {
            DigestAlgorithm::Md5 | DigestAlgorithm::Sha1 | DigestAlgorithm::Sha512 => 64,
            DigestAlgorithm::Sha224 => 28,
            DigestAlgorithm::Sha256 => 32,
            DigestAlgorithm::Sha384 => 48,
        }
    }
}

impl Default for HmacAlgorithm {
    fn default() -> Self {
        Self::HMAC_SHA256
    }
}

impl fmt::Display for HmacAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Hmac{}", self.0.compact_name())
    }
}

impl FromStr for HmacAlgorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let rest = lower.strip_prefix("hmac").ok_or_else(|| {
            CryptoError::InvalidArgument(format!("{:?} is not an HMAC algorithm name", name))
        })?;
        DigestAlgorithm::from_compact(rest)
            .map(Self)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(format!("HMAC {:?}", name)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AesKeySize {
    Aes128,
    Aes192,
    Aes256,
}

impl AesKeySize {
    pub fn from_bits(bits: usize) -> Result<Self> {
        match bits {
            128 => Ok(AesKeySize::Aes128),
            192 => Ok(AesKeySize::Aes192),
            256 => Ok(AesKeySize::Aes256),
            _ => Err(CryptoError::InvalidArgument(format!(
                "AES key size must be 128, 192 or 256 bits, got {}",
                bits
            ))),
        }
    }

    pub fn bits(self) -> usize {
        match self {
            AesKeySize::Aes128 => 128,
            AesKeySize::Aes192 => 192,
            AesKeySize::Aes256 => 256,
        }
    }

    pub fn key_len(self) -> usize {
        self.bits() / 8
    }
}

/// PBKDF2 with an HMAC-SHA pseudo-random function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pbkdf2Algorithm {
    prf: DigestAlgorithm,
}

impl Pbkdf2Algorithm {
    pub fn new(prf: DigestAlgorithm) -> Result<Self> {
        Ok(Self {
            prf: prf.require_sha("PBKDF2")?,
        })
    }

    pub fn prf(self) -> DigestAlgorithm {
        self.prf
    }
}

impl Default for Pbkdf2Algorithm {
    fn default() -> Self {
        Self {
            prf: DigestAlgorithm::Sha256,
        }
    }
}

impl fmt::Display for Pbkdf2Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PBKDF2WithHmac{}", self.prf.compact_name())
    }
}

impl FromStr for Pbkdf2Algorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let rest = lower.strip_prefix("pbkdf2with").ok_or_else(|| {
            CryptoError::InvalidArgument(format!("{:?} is not a PBKDF2 algorithm name", name))
        })?;
        let prf = rest
            .strip_prefix("hmac")
            .and_then(DigestAlgorithm::from_compact)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(format!("PBKDF2 {:?}", name)))?;
        Self::new(prf)
    }
}

/// Password-based encryption: PBKDF2 (HMAC-SHA) feeding AES-CBC.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PbeAlgorithm {
    prf: DigestAlgorithm,
    key_size: AesKeySize,
}

impl PbeAlgorithm {
    pub fn new(prf: DigestAlgorithm, key_size: AesKeySize) -> Result<Self> {
        Ok(Self {
            prf: prf.require_sha("PBE")?,
            key_size,
        })
    }

    pub fn prf(self) -> DigestAlgorithm {
        self.prf
    }

    pub fn key_size(self) -> AesKeySize {
        self.key_size
    }
}

impl Default for PbeAlgorithm {
    fn default() -> Self {
        Self {
            prf: DigestAlgorithm::Sha256,
            key_size: AesKeySize::Aes128,
        }
    }
}

impl fmt::Display for PbeAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "PBEWithHmac{}AndAES_{}",
            self.prf.compact_name(),
            self.key_size.bits()
        )
    }
}

impl FromStr for PbeAlgorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let rest = lower.strip_prefix("pbewith").ok_or_else(|| {
            CryptoError::InvalidArgument(format!("{:?} is not a PBE algorithm name", name))
        })?;
        let unsupported = || CryptoError::UnsupportedAlgorithm(format!("PBE {:?}", name));

        let (prf, cipher) = rest
            .strip_prefix("hmac")
            .and_then(|r| r.split_once("and"))
            .ok_or_else(unsupported)?;
        let prf = DigestAlgorithm::from_compact(prf).ok_or_else(unsupported)?;
        let bits = cipher
            .strip_prefix("aes_")
            .and_then(|b| b.parse::<usize>().ok())
            .ok_or_else(unsupported)?;
        let key_size = AesKeySize::from_bits(bits).map_err(|_| unsupported())?;
        Self::new(prf, key_size)
    }
}

/// PKCS#1 v1.5 RSA signature over an SHA digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignatureAlgorithm {
    digest: DigestAlgorithm,
}

impl SignatureAlgorithm {
    pub fn new(digest: DigestAlgorithm) -> Result<Self> {
        Ok(Self {
            digest: digest.require_sha("RSA signature")?,
        })
    }

    pub fn digest(self) -> DigestAlgorithm {
        self.digest
    }
}

impl Default for SignatureAlgorithm {
    fn default() -> Self {
        Self {
            digest: DigestAlgorithm::Sha256,
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}withRSA", self.digest.compact_name())
    }
}

impl FromStr for SignatureAlgorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        let digest = lower
            .strip_suffix("withrsa")
            .filter(|d| d.starts_with("sha"))
            .ok_or_else(|| {
                CryptoError::InvalidArgument(format!(
                    "{:?} is not a digest-with-RSA signature name",
                    name
                ))
            })?;
        let digest = DigestAlgorithm::from_compact(digest)
            .ok_or_else(|| CryptoError::UnsupportedAlgorithm(format!("signature {:?}", name)))?;
        Self::new(digest)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyPairAlgorithm {
    Rsa,
    Dh,
}

impl fmt::Display for KeyPairAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyPairAlgorithm::Rsa => f.write_str("RSA"),
            KeyPairAlgorithm::Dh => f.write_str("DH"),
        }
    }
}

impl FromStr for KeyPairAlgorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        match name.to_ascii_uppercase().as_str() {
            "RSA" => Ok(KeyPairAlgorithm::Rsa),
            "DH" | "DIFFIEHELLMAN" => Ok(KeyPairAlgorithm::Dh),
            _ => Err(CryptoError::UnsupportedAlgorithm(format!(
                "key pair {:?}",
                name
            ))),
        }
    }
}

/// Tag carried by every `SymmetricKey`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyAlgorithm {
    Aes,
    Hmac(HmacAlgorithm),
    Pbe(PbeAlgorithm),
}

impl fmt::Display for KeyAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyAlgorithm::Aes => f.write_str("AES"),
            KeyAlgorithm::Hmac(hmac) => write!(f, "{}", hmac),
            KeyAlgorithm::Pbe(pbe) => write!(f, "{}", pbe),
        }
    }
}

impl FromStr for KeyAlgorithm {
    type Err = CryptoError;

    fn from_str(name: &str) -> Result<Self> {
        let lower = name.to_ascii_lowercase();
        if lower == "aes" {
            Ok(KeyAlgorithm::Aes)
        } else if lower.starts_with("hmac") {
            name.parse().map(KeyAlgorithm::Hmac)
        } else if lower.starts_with("pbewith") {
            name.parse().map(KeyAlgorithm::Pbe)
        } else {
            Err(CryptoError::UnsupportedAlgorithm(format!(
                "secret key {:?}",
                name
            )))
        }
    }
}
