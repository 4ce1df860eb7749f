// Симметричное шифрование AES
// CBC (PKCS#7), GCM (128-bit tag) и PBE (PBKDF2 + AES-CBC)
//
// Every ciphertext is framed as `envelope(params) || payload` so that only
// the key (or password) is needed to decrypt it.

use crate::crypto::algorithms::PbeAlgorithm;
use crate::crypto::envelope;
use crate::crypto::keys::SymmetricKey;
use crate::crypto::password;
use crate::crypto::pbes2::PbeParameters;
use crate::crypto::random::{os_random, RandomSource};
use crate::error::{CryptoError, Result};
use aes::{Aes128, Aes192, Aes256};
use aes_gcm::aead::consts::{U12, U16};
use aes_gcm::aead::generic_array::GenericArray;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::AesGcm;
use cbc::cipher::block_padding::Pkcs7;
use cbc::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};
use zeroize::Zeroizing;

const BLOCK_SIZE: usize = 16;
pub(crate) const CBC_IV_LENGTH: usize = 16;
const GCM_TAG_LENGTH: usize = 16;

// Binds `$aes` to the AES variant for a 16/24/32-byte key.
macro_rules! with_aes {
    ($key:expr, $aes:ident => $body:expr) => {
        match $key.len() {
            16 => {
                type $aes = Aes128;
                $body
            }
            24 => {
                type $aes = Aes192;
                $body
            }
            32 => {
                type $aes = Aes256;
                $body
            }
            other => Err(invalid_key_length(other)),
        }
    };
}

// Binds `$gcm` to AES-GCM for the key size and a 12- or 16-byte nonce.
macro_rules! with_gcm {
    ($key:expr, $iv:expr, $gcm:ident => $body:expr) => {
        match $iv.len() {
            12 => with_aes!($key, A => {
                type $gcm = AesGcm<A, U12>;
                $body
            }),
            16 => with_aes!($key, A => {
                type $gcm = AesGcm<A, U16>;
                $body
            }),
            other => Err(CryptoError::InvalidArgument(format!(
                "GCM IV must be 12 or 16 bytes, got {}",
                other
            ))),
        }
    };
}

fn invalid_key_length(len: usize) -> CryptoError {
    CryptoError::MalformedKey(format!(
        "AES key must be 16, 24 or 32 bytes, got {}",
        len
    ))
}

/// AES in CBC, GCM and password-based modes.
#[derive(Clone)]
pub struct AesCipher {
    random: Arc<dyn RandomSource>,
}

impl Default for AesCipher {
    fn default() -> Self {
        Self::new(os_random())
    }
}

impl fmt::Debug for AesCipher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AesCipher").finish_non_exhaustive()
    }
}

impl AesCipher {
    /// `random` supplies the IVs for password-based encryption.
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    // ------------------------------------------------------------------
    // CBC
    // ------------------------------------------------------------------

    /// `envelope(iv) || AES-CBC(plaintext)`.
    pub fn encrypt(&self, plaintext: &[u8], key: &SymmetricKey, iv: &[u8]) -> Result<Vec<u8>> {
        check_cbc_iv(iv)?;
        let ciphertext = cbc_encrypt(key.as_bytes(), iv, plaintext)?;
        debug!(key_len = key.len(), len = plaintext.len(), "AES-CBC encrypt");
        envelope::seal(iv, &ciphertext)
    }

    pub fn decrypt(&self, framed: &[u8], key: &SymmetricKey) -> Result<Vec<u8>> {
        let (iv, ciphertext) = envelope::deserialize(framed)?;
        check_cbc_iv(iv)?;
        debug!(key_len = key.len(), len = ciphertext.len(), "AES-CBC decrypt");
        cbc_decrypt(key.as_bytes(), iv, ciphertext)
    }

    // ------------------------------------------------------------------
    // GCM
    // ------------------------------------------------------------------

    /// `envelope(iv) || ciphertext || tag`.
    pub fn gcm_encrypt(
        &self,
        plaintext: &[u8],
        key: &SymmetricKey,
        iv: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>> {
        let key_bytes = key.as_bytes();
        let payload = Payload {
            msg: plaintext,
            aad: aad.unwrap_or_default(),
        };
        let sealed = with_gcm!(key_bytes, iv, G => {
            G::new_from_slice(key_bytes)
                .map_err(|_| invalid_key_length(key_bytes.len()))?
                .encrypt(GenericArray::from_slice(iv), payload)
                .map_err(|_| CryptoError::InvalidArgument("AES-GCM encryption failed".to_string()))
        })?;
        debug!(
            key_len = key_bytes.len(),
            iv_len = iv.len(),
            aad = aad.is_some(),
            "AES-GCM encrypt"
        );
        envelope::seal(iv, &sealed)
    }

    /// Fails with `AuthenticationFailure` when the tag does not verify.
    pub fn gcm_decrypt(&self, framed: &[u8], key: &SymmetricKey, aad: Option<&[u8]>) -> Result<Vec<u8>> {
        let (iv, sealed) = envelope::deserialize(framed)?;
        let key_bytes = key.as_bytes();
        if sealed.len() < GCM_TAG_LENGTH {
            return Err(CryptoError::AuthenticationFailure(format!(
                "GCM payload of {} bytes is shorter than the tag",
                sealed.len()
            )));
        }
        let payload = Payload {
            msg: sealed,
            aad: aad.unwrap_or_default(),
        };
        debug!(key_len = key_bytes.len(), iv_len = iv.len(), "AES-GCM decrypt");
        with_gcm!(key_bytes, iv, G => {
            G::new_from_slice(key_bytes)
                .map_err(|_| invalid_key_length(key_bytes.len()))?
                .decrypt(GenericArray::from_slice(iv), payload)
                .map_err(|_| CryptoError::AuthenticationFailure("GCM tag mismatch".to_string()))
        })
    }

    // ------------------------------------------------------------------
    // PBE
    // ------------------------------------------------------------------

    /// `envelope(PBES2 params) || AES-CBC(plaintext)`. The IV is drawn from
    /// this cipher's random source.
    pub fn pb_encrypt(
        &self,
        plaintext: &[u8],
        password: &str,
        salt: &[u8],
        iterations: u32,
        algorithm: PbeAlgorithm,
    ) -> Result<Vec<u8>> {
        if iterations == 0 {
            return Err(CryptoError::InvalidArgument(
                "iteration count must be at least 1".to_string(),
            ));
        }
        let mut iv = vec![0u8; CBC_IV_LENGTH];
        self.random.fill_bytes(&mut iv);

        let params = PbeParameters {
            algorithm,
            salt: salt.to_vec(),
            iterations,
            iv,
        };
        let key = pbe_decryption_key(password, &params);
        let ciphertext = cbc_encrypt(&key, &params.iv, plaintext)?;

        debug!(algorithm = %algorithm, iterations, "PBE encrypt");
        envelope::seal(&params.to_der()?, &ciphertext)
    }

    /// Parameters come from the envelope; `algorithm` must match them.
    pub fn pb_decrypt(&self, framed: &[u8], password: &str, algorithm: PbeAlgorithm) -> Result<Vec<u8>> {
        let (params_der, ciphertext) = envelope::deserialize(framed)?;
        let params = PbeParameters::from_der(params_der)?;
        if params.algorithm != algorithm {
            return Err(CryptoError::AuthenticationFailure(format!(
                "payload was encrypted with {}, not {}",
                params.algorithm, algorithm
            )));
        }
        check_cbc_iv(&params.iv).map_err(|_| {
            CryptoError::MalformedInput(format!("PBE IV of {} bytes", params.iv.len()))
        })?;

        debug!(algorithm = %algorithm, iterations = params.iterations, "PBE decrypt");
        let key = pbe_decryption_key(password, &params);
        cbc_decrypt(&key, &params.iv, ciphertext)
    }
}

/// The only place a PBE cipher key is derived. Salt, iteration count, PRF
/// and key length all come from `params`, so the parameters stored in the
/// envelope are exactly the ones that produced the key.
fn pbe_decryption_key(password: &str, params: &PbeParameters) -> Zeroizing<Vec<u8>> {
    let secret = Zeroizing::new(password.as_bytes().to_vec());
    password::derive(
        params.algorithm.prf(),
        &secret,
        &params.salt,
        params.iterations,
        params.algorithm.key_size().key_len(),
    )
}

fn check_cbc_iv(iv: &[u8]) -> Result<()> {
    if iv.len() != CBC_IV_LENGTH {
        return Err(CryptoError::InvalidArgument(format!(
            "CBC IV must be {} bytes, got {}",
            CBC_IV_LENGTH,
            iv.len()
        )));
    }
    Ok(())
}

fn cbc_encrypt(key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>> {
    with_aes!(key, A => {
        let encryptor = cbc::Encryptor::<A>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_length(key.len()))?;
        Ok(encryptor.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
    })
}

fn cbc_decrypt(key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>> {
    if ciphertext.is_empty() || ciphertext.len() % BLOCK_SIZE != 0 {
        // Ключ проверяем раньше, чем длину
        if !matches!(key.len(), 16 | 24 | 32) {
            return Err(invalid_key_length(key.len()));
        }
        trace!(len = ciphertext.len(), "ciphertext is not whole blocks");
        return Err(CryptoError::DecryptionFailure(format!(
            "ciphertext of {} bytes is not a whole number of blocks",
            ciphertext.len()
        )));
    }
    with_aes!(key, A => {
        let decryptor = cbc::Decryptor::<A>::new_from_slices(key, iv)
            .map_err(|_| invalid_key_length(key.len()))?;
        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| CryptoError::DecryptionFailure("bad padding".to_string()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::algorithms::{AesKeySize, DigestAlgorithm, KeyAlgorithm};
    use crate::crypto::random::SeededRandom;
    use proptest::prelude::*;

    const KEY: &str = "badce3d4684262b0b207effc475954dd";
    const IV: &str = "b3025e1e695289ceba86beecb4e8eec0";
    const TEXT: &[u8] = b"Hello, world!";
    const AAD: &[u8] = b"/*** Authenticated Data ***/";

    const CBC_ENVELOPE: &str =
        "00000010b3025e1e695289ceba86beecb4e8eec0ce613f4ae10abd0e5111f7400be403dc";
    const GCM_ENVELOPE: &str = "00000010b3025e1e695289ceba86beecb4e8eec0e1b090b1f4e90213cfc08f6d4fe711828fc6cfcee6ba35900b5d68d437";
    const GCM_AAD_ENVELOPE: &str = "00000010b3025e1e695289ceba86beecb4e8eec0e1b090b1f4e90213cfc08f6d4fe4bf52ff71b371ee32bf724ceb2dd3ef";
    const PBE_ENVELOPE: &str = "0000005b3059303806092a864886f70d01050c302b041437df545d5bee8c19126930377cea1d14d5709bdd02021000020110300c06082a864886f70d02090500301d06096086480165030401020410934e1cf68072a67da3e4e899791fd09aebb868f6af7852f63b435c932ce8f66c";

    fn key() -> SymmetricKey {
        SymmetricKey::new(hex::decode(KEY).unwrap(), KeyAlgorithm::Aes)
    }

    fn iv() -> Vec<u8> {
        hex::decode(IV).unwrap()
    }

    fn cipher() -> AesCipher {
        AesCipher::new(Arc::new(SeededRandom::new(11)))
    }

    #[test]
    fn test_cbc_known_vector() {
        let framed = cipher().encrypt(TEXT, &key(), &iv()).unwrap();
        assert_eq!(hex::encode(&framed), CBC_ENVELOPE);
        assert_eq!(cipher().decrypt(&framed, &key()).unwrap(), TEXT);
    }

    #[test]
    fn test_cbc_rejects_bad_iv_and_key() {
        let c = cipher();
        assert!(matches!(
            c.encrypt(TEXT, &key(), &[0u8; 12]),
            Err(CryptoError::InvalidArgument(_))
        ));
        let short = SymmetricKey::new(vec![0u8; 10], KeyAlgorithm::Aes);
        assert!(matches!(c.encrypt(TEXT, &short, &iv()), Err(CryptoError::MalformedKey(_))));
    }

    #[test]
    fn test_cbc_wrong_key_never_yields_plaintext() {
        let framed = hex::decode(CBC_ENVELOPE).unwrap();
        let other = SymmetricKey::new(vec![0x42; 16], KeyAlgorithm::Aes);
        // Неверный ключ: либо ошибка паддинга, либо мусор
        let result = cipher().decrypt(&framed, &other);
        assert!(result.map(|p| p != TEXT).unwrap_or(true));
    }

    #[test]
    fn test_cbc_bad_padding_is_decryption_failure() {
        use cbc::cipher::block_padding::NoPadding;

        let key_bytes = hex::decode(KEY).unwrap();
        let mut zero_pad = [0x41u8; BLOCK_SIZE];
        zero_pad[BLOCK_SIZE - 1] = 0x00;
        let mut inconsistent = [0x41u8; BLOCK_SIZE];
        inconsistent[BLOCK_SIZE - 2] = 0x01;
        inconsistent[BLOCK_SIZE - 1] = 0x02;

        for block in [zero_pad, inconsistent] {
            let ciphertext = cbc::Encryptor::<Aes128>::new_from_slices(&key_bytes, &iv())
                .unwrap()
                .encrypt_padded_vec_mut::<NoPadding>(&block);
            let framed = envelope::seal(&iv(), &ciphertext).unwrap();
            assert!(matches!(
                cipher().decrypt(&framed, &key()),
                Err(CryptoError::DecryptionFailure(_))
            ));
        }
    }

    #[test]
    fn test_cbc_partial_block() {
        let mut framed = hex::decode(CBC_ENVELOPE).unwrap();
        framed.pop();
        assert!(matches!(
            cipher().decrypt(&framed, &key()),
            Err(CryptoError::DecryptionFailure(_))
        ));
    }

    #[test]
    fn test_cbc_truncated_envelope() {
        assert!(matches!(
            cipher().decrypt(&[0, 0, 0, 16, 1, 2], &key()),
            Err(CryptoError::MalformedInput(_))
        ));
    }

    #[test]
    fn test_gcm_known_vectors() {
        let c = cipher();
        let framed = c.gcm_encrypt(TEXT, &key(), &iv(), None).unwrap();
        assert_eq!(hex::encode(&framed), GCM_ENVELOPE);
        assert_eq!(c.gcm_decrypt(&framed, &key(), None).unwrap(), TEXT);

        let framed = c.gcm_encrypt(TEXT, &key(), &iv(), Some(AAD)).unwrap();
        assert_eq!(hex::encode(&framed), GCM_AAD_ENVELOPE);
        assert_eq!(c.gcm_decrypt(&framed, &key(), Some(AAD)).unwrap(), TEXT);
    }

    #[test]
    fn test_gcm_tamper_detection() {
        let c = cipher();
        let framed = hex::decode(GCM_ENVELOPE).unwrap();
        for i in 4..framed.len() {
            let mut tampered = framed.clone();
            tampered[i] ^= 0x01;
            assert!(
                matches!(c.gcm_decrypt(&tampered, &key(), None), Err(CryptoError::AuthenticationFailure(_))),
                "flipping byte {} must fail authentication",
                i
            );
        }
    }

    #[test]
    fn test_gcm_aad_mismatch() {
        let c = cipher();
        let framed = hex::decode(GCM_AAD_ENVELOPE).unwrap();
        assert!(matches!(
            c.gcm_decrypt(&framed, &key(), None),
            Err(CryptoError::AuthenticationFailure(_))
        ));
        assert!(matches!(
            c.gcm_decrypt(&framed, &key(), Some(&b"other"[..])),
            Err(CryptoError::AuthenticationFailure(_))
        ));
    }

    #[test]
    fn test_gcm_nonce_lengths() {
        let c = cipher();
        let nonce = [9u8; 12];
        let framed = c.gcm_encrypt(TEXT, &key(), &nonce, None).unwrap();
        assert_eq!(&framed[..4], &[0, 0, 0, 12]);
        assert_eq!(c.gcm_decrypt(&framed, &key(), None).unwrap(), TEXT);

        assert!(matches!(
            c.gcm_encrypt(TEXT, &key(), &[0u8; 8], None),
            Err(CryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_gcm_short_payload() {
        let framed = envelope::seal(&iv(), &[1, 2, 3]).unwrap();
        assert!(matches!(
            cipher().gcm_decrypt(&framed, &key(), None),
            Err(CryptoError::AuthenticationFailure(_))
        ));
    }

    #[test]
    fn test_pbe_provider_vector() {
        let framed = hex::decode(PBE_ENVELOPE).unwrap();
        let plaintext = cipher()
            .pb_decrypt(&framed, "password", PbeAlgorithm::default())
            .unwrap();
        assert_eq!(plaintext, TEXT);
    }

    #[test]
    fn test_pbe_round_trip() {
        let c = cipher();
        let algorithm = PbeAlgorithm::new(DigestAlgorithm::Sha512, AesKeySize::Aes256).unwrap();
        let framed = c.pb_encrypt(TEXT, "secret", b"saltsalt", 1000, algorithm).unwrap();
        assert_eq!(c.pb_decrypt(&framed, "secret", algorithm).unwrap(), TEXT);

        let (params, _) = envelope::deserialize(&framed).unwrap();
        let params = PbeParameters::from_der(params).unwrap();
        assert_eq!(params.salt, b"saltsalt");
        assert_eq!(params.iterations, 1000);
    }

    #[test]
    fn test_pbe_algorithm_mismatch() {
        let framed = hex::decode(PBE_ENVELOPE).unwrap();
        let other = PbeAlgorithm::new(DigestAlgorithm::Sha1, AesKeySize::Aes128).unwrap();
        assert!(matches!(
            cipher().pb_decrypt(&framed, "password", other),
            Err(CryptoError::AuthenticationFailure(_))
        ));
    }

    #[test]
    fn test_pbe_wrong_password() {
        let c = cipher();
        let algorithm = PbeAlgorithm::default();
        let framed = c.pb_encrypt(b"0123456789abcdef0123", "right", b"salt", 10, algorithm).unwrap();
        let result = c.pb_decrypt(&framed, "wrong", algorithm);
        assert!(result.map(|p| p != b"0123456789abcdef0123").unwrap_or(true));
    }

    #[test]
    fn test_pbe_zero_iterations() {
        assert!(matches!(
            cipher().pb_encrypt(TEXT, "pw", b"salt", 0, PbeAlgorithm::default()),
            Err(CryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_pbe_garbage_params() {
        let framed = envelope::seal(b"not der", &[0u8; 16]).unwrap();
        assert!(matches!(
            cipher().pb_decrypt(&framed, "pw", PbeAlgorithm::default()),
            Err(CryptoError::MalformedInput(_))
        ));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn prop_cbc_round_trip(
            plaintext in proptest::collection::vec(any::<u8>(), 0..200),
            key in proptest::collection::vec(any::<u8>(), 32),
            iv in proptest::collection::vec(any::<u8>(), 16),
        ) {
            let key = SymmetricKey::new(key, KeyAlgorithm::Aes);
            let c = cipher();
            let framed = c.encrypt(&plaintext, &key, &iv).unwrap();
            prop_assert_eq!(c.decrypt(&framed, &key).unwrap(), plaintext);
        }

        #[test]
        fn prop_gcm_round_trip(
            plaintext in proptest::collection::vec(any::<u8>(), 0..200),
            key in proptest::collection::vec(any::<u8>(), 24),
            iv in proptest::collection::vec(any::<u8>(), 12),
        ) {
            let key = SymmetricKey::new(key, KeyAlgorithm::Aes);
            let c = cipher();
            let framed = c.gcm_encrypt(&plaintext, &key, &iv, None).unwrap();
            prop_assert_eq!(c.gcm_decrypt(&framed, &key, None).unwrap(), plaintext);
        }
    }
}
