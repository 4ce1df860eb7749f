//! HMAC tags. The variant comes from the key's algorithm tag.

use crate::crypto::algorithms::{DigestAlgorithm, HmacAlgorithm, KeyAlgorithm};
use crate::crypto::keys::SymmetricKey;
use crate::error::{CryptoError, Result};
use hmac::{Hmac as HmacCore, Mac};
use md5::Md5;
use sha1::Sha1;
use sha2::{Sha224, Sha256, Sha384, Sha512};
use tracing::debug;

// Runs `$body` with `$mac` bound to the concrete HMAC type for `$digest`.
macro_rules! with_hmac {
    ($digest:expr, $mac:ident => $body:expr) => {
        match $digest {
            DigestAlgorithm::Md5 => {
                type $mac = HmacCore<Md5>;
                $body
            }
            DigestAlgorithm::Sha1 => {
                type $mac = HmacCore<Sha1>;
                $body
            }
            DigestAlgorithm::Sha224 => {
                type $mac = HmacCore<Sha224>;
                $body
            }
            DigestAlgorithm::Sha256 => {
                type $mac = HmacCore<Sha256>;
                $body
            }
            DigestAlgorithm::Sha384 => {
                type $mac = HmacCore<Sha384>;
                $body
            }
            DigestAlgorithm::Sha512 => {
                type $mac = HmacCore<Sha512>;
                $body
            }
        }
    };
}

#[derive(Debug, Default, Clone, Copy)]
pub struct Hmac;

impl Hmac {
    pub fn new() -> Self {
        Self
    }

    pub fn mac(&self, data: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
        let algorithm = hmac_algorithm(key)?;
        debug!(algorithm = %algorithm, len = data.len(), "HMAC");
        with_hmac!(algorithm.digest(), M => {
            let mut mac = M::new_from_slice(key.as_bytes())
                .map_err(|e| CryptoError::MalformedKey(format!("{}: {}", algorithm, e)))?;
            mac.update(data);
            Ok(mac.finalize().into_bytes().to_vec())
        })
    }

    /// Constant-time comparison of the full tag. Keys that are not HMAC
    /// keys never verify.
    pub fn verify(&self, tag: &[u8], data: &[u8], key: &SymmetricKey) -> bool {
        let algorithm = match hmac_algorithm(key) {
            Ok(algorithm) => algorithm,
            Err(err) => {
                debug!(%err, "HMAC verify with unusable key");
                return false;
            }
        };
        with_hmac!(algorithm.digest(), M => {
            match M::new_from_slice(key.as_bytes()) {
                Ok(mut mac) => {
                    mac.update(data);
                    mac.verify_slice(tag).is_ok()
                }
                Err(_) => false,
            }
        })
    }
}

fn hmac_algorithm(key: &SymmetricKey) -> Result<HmacAlgorithm> {
    match key.algorithm() {
        KeyAlgorithm::Hmac(algorithm) => Ok(algorithm),
        other => Err(CryptoError::InvalidArgument(format!(
            "{} key cannot be used for HMAC",
            other
        ))),
    }
}
