//! DER codec for the PBE parameter segment.
//!
//! ```text
//! PBES2-params ::= SEQUENCE {
//!     keyDerivationFunc  AlgorithmIdentifier {{ id-PBKDF2 PBKDF2-params }},
//!     encryptionScheme   AlgorithmIdentifier {{ aes-CBC-Pad  IV }} }
//!
//! PBKDF2-params ::= SEQUENCE {
//!     salt            OCTET STRING,
//!     iterationCount  INTEGER,
//!     keyLength       INTEGER OPTIONAL,
//!     prf             AlgorithmIdentifier DEFAULT hmacWithSHA1 }
//! ```

use crate::crypto::algorithms::{AesKeySize, DigestAlgorithm, PbeAlgorithm};
use crate::error::{CryptoError, Result};
use der::asn1::{Null, ObjectIdentifier, OctetStringRef};
use der::{Decode, Encode, Sequence};

const PBKDF2_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.5.12");

const HMAC_SHA1_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.7");
const HMAC_SHA224_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.8");
const HMAC_SHA256_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.9");
const HMAC_SHA384_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.10");
const HMAC_SHA512_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.2.11");

const AES_128_CBC_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.2");
const AES_192_CBC_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.22");
const AES_256_CBC_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("2.16.840.1.101.3.4.1.42");

#[derive(Sequence)]
struct Pbes2Params<'a> {
    kdf: KdfScheme<'a>,
    encryption: CipherScheme<'a>,
}

#[derive(Sequence)]
struct KdfScheme<'a> {
    oid: ObjectIdentifier,
    params: Pbkdf2Params<'a>,
}

#[derive(Sequence)]
struct Pbkdf2Params<'a> {
    salt: OctetStringRef<'a>,
    iteration_count: u32,
    #[asn1(optional = "true")]
    key_length: Option<u16>,
    #[asn1(optional = "true")]
    prf: Option<PrfScheme>,
}

#[derive(Sequence)]
struct PrfScheme {
    oid: ObjectIdentifier,
    #[asn1(optional = "true")]
    params: Option<Null>,
}

#[derive(Sequence)]
struct CipherScheme<'a> {
    oid: ObjectIdentifier,
    iv: OctetStringRef<'a>,
}

/// Everything except the password needed to decrypt a PBE payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PbeParameters {
    pub algorithm: PbeAlgorithm,
    pub salt: Vec<u8>,
    pub iterations: u32,
    pub iv: Vec<u8>,
}

impl PbeParameters {
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let key_length = u16::try_from(self.algorithm.key_size().key_len())
            .map_err(|_| CryptoError::InvalidArgument("key length overflow".to_string()))?;
        // hmacWithSHA1 is the DEFAULT and is left out.
        let prf = match self.algorithm.prf() {
            DigestAlgorithm::Sha1 => None,
            digest => Some(PrfScheme {
                oid: prf_oid(digest)?,
                params: Some(Null),
            }),
        };
        let params = Pbes2Params {
            kdf: KdfScheme {
                oid: PBKDF2_OID,
                params: Pbkdf2Params {
                    salt: OctetStringRef::new(&self.salt)?,
                    iteration_count: self.iterations,
                    key_length: Some(key_length),
                    prf,
                },
            },
            encryption: CipherScheme {
                oid: cipher_oid(self.algorithm.key_size()),
                iv: OctetStringRef::new(&self.iv)?,
            },
        };
        Ok(params.to_der()?)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let params = Pbes2Params::from_der(der)?;
        let malformed = |what: String| CryptoError::MalformedInput(format!("PBE parameters: {}", what));

        if params.kdf.oid != PBKDF2_OID {
            return Err(malformed(format!("key derivation {} is not PBKDF2", params.kdf.oid)));
        }
        let kdf = params.kdf.params;
        let prf = match &kdf.prf {
            None => DigestAlgorithm::Sha1,
            Some(scheme) => digest_for_prf(&scheme.oid)
                .ok_or_else(|| malformed(format!("unknown PRF {}", scheme.oid)))?,
        };
        let key_size = key_size_for_cipher(&params.encryption.oid)
            .ok_or_else(|| malformed(format!("unknown cipher {}", params.encryption.oid)))?;
        if let Some(len) = kdf.key_length {
            if usize::from(len) != key_size.key_len() {
                return Err(malformed(format!(
                    "key length {} does not match AES-{}",
                    len,
                    key_size.bits()
                )));
            }
        }
        if kdf.iteration_count == 0 {
            return Err(malformed("iteration count is zero".to_string()));
        }

        Ok(Self {
            algorithm: PbeAlgorithm::new(prf, key_size).map_err(|e| malformed(e.to_string()))?,
            salt: kdf.salt.as_bytes().to_vec(),
            iterations: kdf.iteration_count,
            iv: params.encryption.iv.as_bytes().to_vec(),
        })
    }
}

fn prf_oid(digest: DigestAlgorithm) -> Result<ObjectIdentifier> {
    match digest {
        DigestAlgorithm::Sha1 => Ok(HMAC_SHA1_OID),
        DigestAlgorithm::Sha224 => Ok(HMAC_SHA224_OID),
        DigestAlgorithm::Sha256 => Ok(HMAC_SHA256_OID),
        DigestAlgorithm::Sha384 => Ok(HMAC_SHA384_OID),
        DigestAlgorithm::Sha512 => Ok(HMAC_SHA512_OID),
        DigestAlgorithm::Md5 => Err(CryptoError::UnsupportedAlgorithm(
            "PBES2 has no HMAC-MD5 PRF".to_string(),
        )),
    }
}

fn digest_for_prf(oid: &ObjectIdentifier) -> Option<DigestAlgorithm> {
    [
        (HMAC_SHA1_OID, DigestAlgorithm::Sha1),
        (HMAC_SHA224_OID, DigestAlgorithm::Sha224),
        (HMAC_SHA256_OID, DigestAlgorithm::Sha256),
        (HMAC_SHA384_OID, DigestAlgorithm::Sha384),
        (HMAC_SHA512_OID, DigestAlgorithm::Sha512),
    ]
    .into_iter()
    .find(|(known, _)| known == oid)
    .map(|(_, digest)| digest)
}

fn cipher_oid(key_size: AesKeySize) -> ObjectIdentifier {
    match key_size {
        AesKeySize::Aes128 => AES_128_CBC_OID,
        AesKeySize::Aes192 => AES_192_CBC_OID,
        AesKeySize::Aes256 => AES_256_CBC_OID,
    }
}

fn key_size_for_cipher(oid: &ObjectIdentifier) -> Option<AesKeySize> {
    [AesKeySize::Aes128, AesKeySize::Aes192, AesKeySize::Aes256]
        .into_iter()
        .find(|size| &cipher_oid(*size) == oid)
}

#[cfg(test)]
mod tests {
    use super::*;

    // Parameter segment of a PBEWithHmacSHA256AndAES_128 payload
    const PROVIDER_PARAMS: &str = "3059303806092a864886f70d01050c302b041437df545d5bee8c19126930377cea1d14d5709bdd02021000020110300c06082a864886f70d02090500301d06096086480165030401020410934e1cf68072a67da3e4e899791fd09a";

    #[test]
    fn test_decode_provider_params() {
        let params = PbeParameters::from_der(&hex::decode(PROVIDER_PARAMS).unwrap()).unwrap();
        assert_eq!(params.algorithm, PbeAlgorithm::default());
        assert_eq!(params.iterations, 4096);
        assert_eq!(hex::encode(&params.salt), "37df545d5bee8c19126930377cea1d14d5709bdd");
        assert_eq!(hex::encode(&params.iv), "934e1cf68072a67da3e4e899791fd09a");
    }

    #[test]
    fn test_encode_matches_provider_layout() {
        let params = PbeParameters::from_der(&hex::decode(PROVIDER_PARAMS).unwrap()).unwrap();
        assert_eq!(hex::encode(params.to_der().unwrap()), PROVIDER_PARAMS);
    }

    #[test]
    fn test_sha1_prf_is_omitted() {
        let params = PbeParameters {
            algorithm: PbeAlgorithm::new(DigestAlgorithm::Sha1, AesKeySize::Aes256).unwrap(),
            salt: vec![1; 8],
            iterations: 10,
            iv: vec![2; 16],
        };
        let der = params.to_der().unwrap();
        assert!(!der.windows(8).any(|w| *w == [0x2a, 0x86, 0x48, 0x86, 0xf7, 0x0d, 0x02, 0x07]));
        assert_eq!(PbeParameters::from_der(&der).unwrap(), params);
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            PbeParameters::from_der(b"\x30\x03\x02\x01\x01"),
            Err(CryptoError::MalformedInput(_))
        ));
        assert!(matches!(PbeParameters::from_der(&[]), Err(CryptoError::MalformedInput(_))));
    }
}
