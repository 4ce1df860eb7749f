//! One-shot message digests.

use crate::crypto::algorithms::DigestAlgorithm;
use md5::Md5;
use sha1::Sha1;
use sha2::{Digest as _, Sha224, Sha256, Sha384, Sha512};

#[derive(Debug, Default, Clone, Copy)]
pub struct Digest;

impl Digest {
    pub fn new() -> Self {
        Self
    }

    pub fn hash(&self, data: &[u8], algorithm: DigestAlgorithm) -> Vec<u8> {
        hash(data, algorithm)
    }

    /// Recomputes the digest and compares every byte. A mismatch is `false`.
    pub fn verify(&self, data: &[u8], expected: &[u8], algorithm: DigestAlgorithm) -> bool {
        hash(data, algorithm).as_slice() == expected
    }
}

pub(crate) fn hash(data: &[u8], algorithm: DigestAlgorithm) -> Vec<u8> {
    match algorithm {
        DigestAlgorithm::Md5 => Md5::digest(data).to_vec(),
        DigestAlgorithm::Sha1 => Sha1::digest(data).to_vec(),
        DigestAlgorithm::Sha224 => Sha224::digest(data).to_vec(),
        DigestAlgorithm::Sha256 => Sha256::digest(data).to_vec(),
        DigestAlgorithm::Sha384 => Sha384::digest(data).to_vec(),
        DigestAlgorithm::Sha512 => Sha512::digest(data).to_vec(),
    }
}
