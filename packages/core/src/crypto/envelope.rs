//! Length-prefixed framing that keeps ciphertext self-describing.
//!
//! ```text
//! u32_be(len) || params[len] || payload...
//! ```
//!
//! `params` is non-secret material needed for decryption (an IV, or encoded
//! PBE parameters). Everything after the parameter segment is payload.

use crate::error::{CryptoError, Result};

const LENGTH_PREFIX: usize = 4;

/// Prepends the big-endian length of `params`.
pub fn serialize(params: &[u8]) -> Result<Vec<u8>> {
    seal(params, &[])
}

/// `serialize(params) || payload` in one allocation.
pub fn seal(params: &[u8], payload: &[u8]) -> Result<Vec<u8>> {
    let len = u32::try_from(params.len()).map_err(|_| {
        CryptoError::InvalidArgument(format!(
            "parameter segment of {} bytes does not fit a u32 length prefix",
            params.len()
        ))
    })?;

    let mut framed = Vec::with_capacity(LENGTH_PREFIX + params.len() + payload.len());
    framed.extend_from_slice(&len.to_be_bytes());
    framed.extend_from_slice(params);
    framed.extend_from_slice(payload);
    Ok(framed)
}

/// Splits a framed buffer into `(params, payload)`.
pub fn deserialize(framed: &[u8]) -> Result<(&[u8], &[u8])> {
    if framed.len() < LENGTH_PREFIX {
        return Err(CryptoError::MalformedInput(format!(
            "envelope of {} bytes is shorter than its length prefix",
            framed.len()
        )));
    }
    let (prefix, rest) = framed.split_at(LENGTH_PREFIX);
    let mut len_bytes = [0u8; LENGTH_PREFIX];
    len_bytes.copy_from_slice(prefix);
    let declared = u32::from_be_bytes(len_bytes) as usize;

    if declared > rest.len() {
        return Err(CryptoError::MalformedInput(format!(
            "envelope declares {} parameter bytes but only {} are available",
            declared,
            rest.len()
        )));
    }
    Ok(rest.split_at(declared))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_serialize() {
        let mut framed = serialize(b"Hello").unwrap();
        framed.extend_from_slice(b"Hello");
        assert_eq!(hex::encode(&framed), "0000000548656c6c6f48656c6c6f");
    }

    #[test]
    fn test_deserialize() {
        let framed = hex::decode("0000000548656c6c6f48656c6c6f").unwrap();
        let (params, payload) = deserialize(&framed).unwrap();
        assert_eq!(params, b"Hello");
        assert_eq!(payload, b"Hello");
    }

    #[test]
    fn test_deserialize_empty_payload() {
        let framed = serialize(&[1, 2, 3]).unwrap();
        let (params, payload) = deserialize(&framed).unwrap();
        assert_eq!(params, &[1, 2, 3]);
        assert!(payload.is_empty());
    }

    #[test]
    fn test_deserialize_rejects_overlong_prefix() {
        let framed = [0x00, 0x00, 0x00, 0x10, 0xaa, 0xbb];
        assert!(matches!(deserialize(&framed), Err(CryptoError::MalformedInput(_))));
    }

    #[test]
    fn test_deserialize_rejects_truncated_prefix() {
        assert!(matches!(deserialize(&[0x00, 0x00]), Err(CryptoError::MalformedInput(_))));
    }

    proptest! {
        #[test]
        fn prop_seal_then_deserialize_is_lossless(
            params in proptest::collection::vec(any::<u8>(), 0..64),
            payload in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let framed = seal(&params, &payload).unwrap();
            prop_assert_eq!(framed.len(), 4 + params.len() + payload.len());
            let (p, rest) = deserialize(&framed).unwrap();
            prop_assert_eq!(p, params.as_slice());
            prop_assert_eq!(rest, payload.as_slice());
        }
    }
}
