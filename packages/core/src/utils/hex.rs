// Hex утилиты

use crate::error::{CryptoError, Result};

/// Lowercase hex, no separators.
pub fn encode(data: &[u8]) -> String {
    ::hex::encode(data)
}

/// Decodes hex pairs in either case. Each pair may be followed by one space,
/// so `"A0 b0 e0 F0"` and `"A0b0e0F0"` decode to the same bytes.
pub fn decode(text: &str) -> Result<Vec<u8>> {
    if !is_hex_pairs(text) {
        return Err(CryptoError::MalformedInput(format!(
            "Not a sequence of hex pairs: {:?}",
            text
        )));
    }
    let compact: String = text.chars().filter(|c| *c != ' ').collect();
    Ok(::hex::decode(compact)?)
}

fn is_hex_pairs(text: &str) -> bool {
    let bytes = text.as_bytes();
    if bytes.is_empty() {
        return false;
    }
    let mut i = 0;
    while i < bytes.len() {
        if i + 1 >= bytes.len()
            || !bytes[i].is_ascii_hexdigit()
            || !bytes[i + 1].is_ascii_hexdigit()
        {
            return false;
        }
        i += 2;
        if i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_encode_is_lowercase() {
        assert_eq!(encode(&[0xA0, 0xB0, 0xE0, 0xF0]), "a0b0e0f0");
    }

    #[test]
    fn test_decode_mixed_case_and_spaces() {
        let expected = vec![0xA0, 0xB0, 0xE0, 0xF0];
        assert_eq!(decode("A0b0e0F0").unwrap(), expected);
        assert_eq!(decode("A0 b0 e0 F0").unwrap(), expected);
    }

    #[test]
    fn test_decode_rejects_malformed() {
        for bad in ["", "a", "abc", "zz", "a0  b0", " a0", "a 0"] {
            assert!(
                matches!(decode(bad), Err(CryptoError::MalformedInput(_))),
                "{:?} should be rejected",
                bad
            );
        }
    }

    proptest! {
        #[test]
        fn prop_decode_encode_round_trip(bytes in proptest::collection::vec(any::<u8>(), 0..64)) {
            let text = encode(&bytes);
            prop_assert_eq!(text.len(), bytes.len() * 2);
            if !bytes.is_empty() {
                prop_assert_eq!(decode(&text).unwrap(), bytes.clone());
                let spaced = bytes.iter().map(|b| format!("{:02X}", b)).collect::<Vec<_>>().join(" ");
                prop_assert_eq!(decode(&spaced).unwrap(), bytes);
            }
        }
    }
}
