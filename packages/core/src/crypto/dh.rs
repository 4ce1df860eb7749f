//! Diffie-Hellman key agreement over finite-field groups.
//!
//! A party is one key pair inside a domain `(p, g)`. The first party of an
//! exchange picks a standard safe-prime group by size; the peer reuses the
//! received `(p, g)`. Both sides then combine their own private value with
//! the other's public value:
//!
//! ```text
//! A: x_a, y_a = g^x_a mod p          B: x_b, y_b = g^x_b mod p
//!            y_a ───────────────────────▶
//!            ◀─────────────────────── y_b
//! z = y_b^x_a mod p            ==          z = y_a^x_b mod p
//! ```
//!
//! Keys encode as X.509 / PKCS#8 with the PKCS#3 `dhKeyAgreement` OID.

use crate::config::Config;
use crate::crypto::algorithms::KeyAlgorithm;
use crate::crypto::keys::{KeyPair, PrivateKey, PublicKey, SymmetricKey};
use crate::crypto::random::{os_random, RandomSource};
use crate::error::{CryptoError, Result};
use der::asn1::{AnyRef, BitStringRef, ObjectIdentifier, UintRef};
use der::{Decode, Encode, Sequence};
use num_bigint_dig::BigUint;
use num_traits::One;
use pkcs8::PrivateKeyInfo;
use spki::{AlgorithmIdentifierRef, SubjectPublicKeyInfoRef};
use std::fmt;
use std::sync::Arc;
use tracing::debug;
use zeroize::{Zeroize, Zeroizing};

/// PKCS#3 `dhKeyAgreement`.
pub const DH_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.2.840.113549.1.3.1");

const MIN_PRIME_BITS: usize = 512;

struct StandardGroup {
    bits: usize,
    private_value_bits: u32,
    prime: &'static str,
}

// Safe primes with generator 2 (RFC 2409 / RFC 3526 MODP groups).
const STANDARD_GROUPS: &[StandardGroup] = &[
    StandardGroup {
        bits: 512,
        private_value_bits: 160,
        prime: concat!(
            "ffffffffffffffff8b479b3a6e8de86c294188f0bf2cd86cdb950adb36d0f61f",
            "d51e46f69c99ed95abe5a7bbb230a6ed1d0b4506b5317284ffffffffffffffff",
        ),
    },
    StandardGroup {
        bits: 768,
        private_value_bits: 160,
        prime: concat!(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74",
            "020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f1437",
            "4fe1356d6d51c245e485b576625e7ec6f44c42e9a63a3620ffffffffffffffff",
        ),
    },
    StandardGroup {
        bits: 1024,
        private_value_bits: 160,
        prime: concat!(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74",
            "020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f1437",
            "4fe1356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7ed",
            "ee386bfb5a899fa5ae9f24117c4b1fe649286651ece65381ffffffffffffffff",
        ),
    },
    StandardGroup {
        bits: 1536,
        private_value_bits: 160,
        prime: concat!(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74",
            "020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f1437",
            "4fe1356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7ed",
            "ee386bfb5a899fa5ae9f24117c4b1fe649286651ece45b3dc2007cb8a163bf05",
            "98da48361c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552bb",
            "9ed529077096966d670c354e4abc9804f1746c08ca237327ffffffffffffffff",
        ),
    },
    StandardGroup {
        bits: 2048,
        private_value_bits: 224,
        prime: concat!(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74",
            "020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f1437",
            "4fe1356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7ed",
            "ee386bfb5a899fa5ae9f24117c4b1fe649286651ece45b3dc2007cb8a163bf05",
            "98da48361c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552bb",
            "9ed529077096966d670c354e4abc9804f1746c08ca18217c32905e462e36ce3b",
            "e39e772c180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf695581718",
            "3995497cea956ae515d2261898fa051015728e5a8aacaa68ffffffffffffffff",
        ),
    },
    StandardGroup {
        bits: 3072,
        private_value_bits: 256,
        prime: concat!(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74",
            "020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f1437",
            "4fe1356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7ed",
            "ee386bfb5a899fa5ae9f24117c4b1fe649286651ece45b3dc2007cb8a163bf05",
            "98da48361c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552bb",
            "9ed529077096966d670c354e4abc9804f1746c08ca18217c32905e462e36ce3b",
            "e39e772c180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf695581718",
            "3995497cea956ae515d2261898fa051015728e5a8aaac42dad33170d04507a33",
            "a85521abdf1cba64ecfb850458dbef0a8aea71575d060c7db3970f85a6e1e4c7",
            "abf5ae8cdb0933d71e8c94e04a25619dcee3d2261ad2ee6bf12ffa06d98a0864",
            "d87602733ec86a64521f2b18177b200cbbe117577a615d6c770988c0bad946e2",
            "08e24fa074e5ab3143db5bfce0fd108e4b82d120a93ad2caffffffffffffffff",
        ),
    },
    StandardGroup {
        bits: 4096,
        private_value_bits: 304,
        prime: concat!(
            "ffffffffffffffffc90fdaa22168c234c4c6628b80dc1cd129024e088a67cc74",
            "020bbea63b139b22514a08798e3404ddef9519b3cd3a431b302b0a6df25f1437",
            "4fe1356d6d51c245e485b576625e7ec6f44c42e9a637ed6b0bff5cb6f406b7ed",
            "ee386bfb5a899fa5ae9f24117c4b1fe649286651ece45b3dc2007cb8a163bf05",
            "98da48361c55d39a69163fa8fd24cf5f83655d23dca3ad961c62f356208552bb",
            "9ed529077096966d670c354e4abc9804f1746c08ca18217c32905e462e36ce3b",
            "e39e772c180e86039b2783a2ec07a28fb5c55df06f4c52c9de2bcbf695581718",
            "3995497cea956ae515d2261898fa051015728e5a8aaac42dad33170d04507a33",
            "a85521abdf1cba64ecfb850458dbef0a8aea71575d060c7db3970f85a6e1e4c7",
            "abf5ae8cdb0933d71e8c94e04a25619dcee3d2261ad2ee6bf12ffa06d98a0864",
            "d87602733ec86a64521f2b18177b200cbbe117577a615d6c770988c0bad946e2",
            "08e24fa074e5ab3143db5bfce0fd108e4b82d120a92108011a723c12a787e6d7",
            "88719a10bdba5b2699c327186af4e23c1a946834b6150bda2583e9ca2ad44ce8",
            "dbbbc2db04de8ef92e8efc141fbecaa6287c59474e6bc05d99b2964fa090c3a2",
            "233ba186515be7ed1f612970cee2d7afb81bdd762170481cd0069127d5b05aa9",
            "93b4ea988d8fddc186ffb7dc90a6c08f4df435c934063199ffffffffffffffff",
        ),
    },
];

/// `DHParameter ::= SEQUENCE { prime INTEGER, base INTEGER, privateValueLength INTEGER OPTIONAL }`
#[derive(Sequence)]
struct DhParameter<'a> {
    prime: UintRef<'a>,
    base: UintRef<'a>,
    #[asn1(optional = "true")]
    private_value_length: Option<u32>,
}

/// Domain parameters shared by both parties.
///
/// `private_value_bits` is the size of generated private values; `0` means
/// unspecified and a size-dependent default applies.
#[derive(Clone, PartialEq, Eq)]
pub struct DhGroup {
    p: BigUint,
    g: BigUint,
    private_value_bits: u32,
}

impl DhGroup {
    pub fn new(p: BigUint, g: BigUint) -> Self {
        Self {
            p,
            g,
            private_value_bits: 0,
        }
    }

    pub fn with_private_value_bits(p: BigUint, g: BigUint, private_value_bits: u32) -> Self {
        Self {
            p,
            g,
            private_value_bits,
        }
    }

    /// Standard group for a prime of `bits` bits.
    pub fn standard(bits: usize) -> Result<Self> {
        let group = STANDARD_GROUPS
            .iter()
            .find(|group| group.bits == bits)
            .ok_or_else(|| {
                CryptoError::InvalidArgument(format!(
                    "no standard DH group of {} bits (supported: {})",
                    bits,
                    STANDARD_GROUPS
                        .iter()
                        .map(|group| group.bits.to_string())
                        .collect::<Vec<_>>()
                        .join(", ")
                ))
            })?;
        let p = BigUint::parse_bytes(group.prime.as_bytes(), 16).ok_or_else(|| {
            CryptoError::KeyGenerationError(format!("bad {}-bit group prime", bits))
        })?;
        Ok(Self::with_private_value_bits(
            p,
            BigUint::from(2u32),
            group.private_value_bits,
        ))
    }

    pub fn prime(&self) -> &BigUint {
        &self.p
    }

    pub fn generator(&self) -> &BigUint {
        &self.g
    }

    pub fn private_value_bits(&self) -> u32 {
        self.private_value_bits
    }

    pub fn prime_bits(&self) -> usize {
        self.p.bits()
    }

    /// Same `(p, g)`. The private value length is not part of the domain.
    pub fn same_domain(&self, other: &DhGroup) -> bool {
        self.p == other.p && self.g == other.g
    }

    /// `p` odd, at least 512 bits, `1 < g < p - 1`.
    pub fn validate(&self) -> Result<()> {
        if self.p.to_bytes_le()[0] & 1 == 0 {
            return Err(CryptoError::InvalidArgument("DH prime must be odd".to_string()));
        }
        if self.prime_bits() < MIN_PRIME_BITS {
            return Err(CryptoError::InvalidArgument(format!(
                "DH prime of {} bits is below the {}-bit minimum",
                self.prime_bits(),
                MIN_PRIME_BITS
            )));
        }
        let one = BigUint::one();
        if self.g <= one || self.g >= &self.p - &one {
            return Err(CryptoError::InvalidArgument(
                "DH generator must satisfy 1 < g < p - 1".to_string(),
            ));
        }
        Ok(())
    }

    fn effective_private_bits(&self) -> usize {
        let cap = self.prime_bits().saturating_sub(1).max(1);
        let wanted = if self.private_value_bits > 0 {
            self.private_value_bits as usize
        } else {
            match self.prime_bits() {
                0..=1536 => 160,
                1537..=2048 => 224,
                2049..=3072 => 256,
                _ => 304,
            }
        };
        wanted.min(cap)
    }

    /// `y ∈ [2, p - 2]`.
    fn check_public_value(&self, y: &BigUint) -> Result<()> {
        let two = BigUint::from(2u32);
        if y < &two || y > &(&self.p - &two) {
            return Err(CryptoError::MalformedKey(
                "DH public value out of range [2, p - 2]".to_string(),
            ));
        }
        Ok(())
    }

    fn to_der(&self) -> Result<Vec<u8>> {
        let p = self.p.to_bytes_be();
        let g = self.g.to_bytes_be();
        let params = DhParameter {
            prime: UintRef::new(&p)?,
            base: UintRef::new(&g)?,
            private_value_length: (self.private_value_bits > 0).then_some(self.private_value_bits),
        };
        Ok(params.to_der()?)
    }

    fn from_algorithm(algorithm: &AlgorithmIdentifierRef<'_>) -> Result<Self> {
        if algorithm.oid != DH_OID {
            return Err(CryptoError::MalformedKey(format!(
                "expected DH key ({}), found {}",
                DH_OID, algorithm.oid
            )));
        }
        let params = algorithm
            .parameters
            .ok_or_else(|| CryptoError::MalformedKey("DH key without domain parameters".to_string()))?;
        let params_der = params.to_der().map_err(malformed_key)?;
        let params = DhParameter::from_der(&params_der).map_err(malformed_key)?;
        Ok(Self::with_private_value_bits(
            BigUint::from_bytes_be(params.prime.as_bytes()),
            BigUint::from_bytes_be(params.base.as_bytes()),
            params.private_value_length.unwrap_or(0),
        ))
    }
}

impl fmt::Debug for DhGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhGroup")
            .field("prime_bits", &self.prime_bits())
            .field("g", &self.g)
            .field("private_value_bits", &self.private_value_bits)
            .finish()
    }
}

fn malformed_key(err: der::Error) -> CryptoError {
    CryptoError::MalformedKey(err.to_string())
}

/// Public value `y` within a domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DhPublicKey {
    group: DhGroup,
    y: BigUint,
}

impl DhPublicKey {
    /// Fails with `MalformedKey` when `y ∉ [2, p - 2]`.
    pub fn new(group: DhGroup, y: BigUint) -> Result<Self> {
        group.check_public_value(&y)?;
        Ok(Self { group, y })
    }

    pub fn group(&self) -> &DhGroup {
        &self.group
    }

    pub fn y(&self) -> &BigUint {
        &self.y
    }

    /// X.509 `SubjectPublicKeyInfo`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let params_der = self.group.to_der()?;
        let y = self.y.to_bytes_be();
        let y_der = UintRef::new(&y)?.to_der()?;
        let spki = SubjectPublicKeyInfoRef {
            algorithm: AlgorithmIdentifierRef {
                oid: DH_OID,
                parameters: Some(AnyRef::from_der(&params_der)?),
            },
            subject_public_key: BitStringRef::from_bytes(&y_der)?,
        };
        Ok(spki.to_der()?)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let spki = SubjectPublicKeyInfoRef::from_der(der).map_err(malformed_key)?;
        let group = DhGroup::from_algorithm(&spki.algorithm)?;
        let key_bytes = spki
            .subject_public_key
            .as_bytes()
            .ok_or_else(|| CryptoError::MalformedKey("DH public key has unused bits".to_string()))?;
        let y = UintRef::from_der(key_bytes).map_err(malformed_key)?;
        Self::new(group, BigUint::from_bytes_be(y.as_bytes()))
    }
}

/// Private value `x`, cleared on drop.
#[derive(Clone)]
pub struct DhPrivateKey {
    group: DhGroup,
    x: BigUint,
}

impl DhPrivateKey {
    pub fn group(&self) -> &DhGroup {
        &self.group
    }

    pub fn x(&self) -> &BigUint {
        &self.x
    }

    /// PKCS#8 `PrivateKeyInfo`.
    pub fn to_der(&self) -> Result<Vec<u8>> {
        let params_der = self.group.to_der()?;
        let x = Zeroizing::new(self.x.to_bytes_be());
        let x_der = Zeroizing::new(UintRef::new(&x)?.to_der()?);
        let info = PrivateKeyInfo::new(
            AlgorithmIdentifierRef {
                oid: DH_OID,
                parameters: Some(AnyRef::from_der(&params_der)?),
            },
            &x_der,
        );
        Ok(info.to_der()?)
    }

    pub fn from_der(der: &[u8]) -> Result<Self> {
        let info = PrivateKeyInfo::from_der(der).map_err(malformed_key)?;
        let group = DhGroup::from_algorithm(&info.algorithm)?;
        let x = UintRef::from_der(info.private_key).map_err(malformed_key)?;
        let x = BigUint::from_bytes_be(x.as_bytes());
        if x < BigUint::one() || x >= group.p {
            return Err(CryptoError::MalformedKey(
                "DH private value out of range".to_string(),
            ));
        }
        Ok(Self { group, x })
    }
}

impl fmt::Debug for DhPrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DhPrivateKey")
            .field("group", &self.group)
            .field("x", &"[REDACTED]")
            .finish()
    }
}

impl Drop for DhPrivateKey {
    fn drop(&mut self) {
        self.x.zeroize();
    }
}

/// One side of an exchange.
#[derive(Debug, Clone)]
pub struct DhParty {
    public_key: DhPublicKey,
    private_key: DhPrivateKey,
}

impl DhParty {
    pub fn prime(&self) -> &BigUint {
        &self.public_key.group.p
    }

    pub fn generator(&self) -> &BigUint {
        &self.public_key.group.g
    }

    /// Public value to send to the peer.
    pub fn y(&self) -> &BigUint {
        &self.public_key.y
    }

    pub fn group(&self) -> &DhGroup {
        &self.public_key.group
    }

    pub fn public_key(&self) -> &DhPublicKey {
        &self.public_key
    }

    pub fn private_key(&self) -> &DhPrivateKey {
        &self.private_key
    }

    pub fn key_pair(&self) -> KeyPair {
        KeyPair {
            public: PublicKey::Dh(self.public_key.clone()),
            private: PrivateKey::Dh(self.private_key.clone()),
        }
    }
}

impl From<DhParty> for KeyPair {
    fn from(party: DhParty) -> Self {
        party.key_pair()
    }
}

/// Diffie-Hellman parties and shared secrets.
#[derive(Clone)]
pub struct DiffieHellman {
    random: Arc<dyn RandomSource>,
}

impl Default for DiffieHellman {
    fn default() -> Self {
        Self::new(os_random())
    }
}

impl DiffieHellman {
    pub fn new(random: Arc<dyn RandomSource>) -> Self {
        Self { random }
    }

    /// New party in the standard group of `prime_length_bits`.
    pub fn create_party(&self, prime_length_bits: usize) -> Result<DhParty> {
        let group = DhGroup::standard(prime_length_bits)?;
        self.generate(group)
    }

    /// New party with the configured default prime length.
    pub fn create_default_party(&self) -> Result<DhParty> {
        self.create_party(Config::global().dh_prime_length_bits)
    }

    /// New party in the domain received from the other side.
    pub fn create_peer(&self, p: &BigUint, g: &BigUint) -> Result<DhParty> {
        let group = DhGroup::new(p.clone(), g.clone());
        group.validate()?;
        self.generate(group)
    }

    pub fn compute_secret(
        &self,
        peer_public: &DhPublicKey,
        own_private: &DhPrivateKey,
    ) -> Result<SymmetricKey> {
        if !peer_public.group.same_domain(&own_private.group) {
            return Err(CryptoError::InvalidArgument(
                "peer public key belongs to a different DH domain".to_string(),
            ));
        }
        peer_public.group.check_public_value(&peer_public.y)?;

        let p = &own_private.group.p;
        let z = Zeroizing::new(peer_public.y.modpow(&own_private.x, p).to_bytes_be());
        let len = (p.bits() + 7) / 8;
        let mut secret = vec![0u8; len];
        secret[len - z.len()..].copy_from_slice(&z);

        debug!(prime_bits = p.bits(), secret_len = len, "DH shared secret computed");
        Ok(SymmetricKey::new(secret, KeyAlgorithm::Aes))
    }

    /// Rebuilds the peer key from `(p, g, y)` and agrees as [`Self::compute_secret`].
    pub fn compute_secret_from_values(
        &self,
        p: &BigUint,
        g: &BigUint,
        y: &BigUint,
        own_private: &DhPrivateKey,
    ) -> Result<SymmetricKey> {
        let peer = DhPublicKey::new(DhGroup::new(p.clone(), g.clone()), y.clone())?;
        self.compute_secret(&peer, own_private)
    }

    pub(crate) fn generate(&self, group: DhGroup) -> Result<DhParty> {
        let bits = group.effective_private_bits();
        let mut buf = Zeroizing::new(vec![0u8; (bits + 7) / 8]);
        self.random.fill_bytes(&mut buf);
        let excess = buf.len() * 8 - bits;
        buf[0] &= 0xff >> excess;
        buf[0] |= 0x80 >> excess;
        let x = BigUint::from_bytes_be(&buf);

        let y = group.g.modpow(&x, &group.p);
        group
            .check_public_value(&y)
            .map_err(|_| CryptoError::KeyGenerationError("degenerate DH public value".to_string()))?;

        debug!(
            prime_bits = group.prime_bits(),
            private_value_bits = bits,
            "DH key pair generated"
        );
        Ok(DhParty {
            public_key: DhPublicKey {
                group: group.clone(),
                y,
            },
            private_key: DhPrivateKey { group, x },
        })
    }
}

impl fmt::Debug for DiffieHellman {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DiffieHellman").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::random::SeededRandom;

    const PUBLIC_DER: &str = "3081df30819706092a864886f70d010301308189024100fca682ce8e12caba26efccf7110e526db078b05edecbcd1eb4a208f3ae1617ae01f35b91a47e6df63413c5e12ed0899bcd132acd50d99151bdc43ee737592e170240678471b27a9cf44ee91a49c5147db1a9aaf244f05a434d6486931d2d14271b9e35030b71fd73da179069b32e2935630e1c2062354d0da20a6c416e50be794ca40202018003430002404512c2aca7fc613cf8e919496f677ba5bf16e60863b235a05c43f599cf7e31c1be5e09c75ea8a6b47fd4810403dbc273045a6e8019b12ce1a156a72d31756509";
    const PRIVATE_DER: &str = "3081d202010030819706092a864886f70d010301308189024100fca682ce8e12caba26efccf7110e526db078b05edecbcd1eb4a208f3ae1617ae01f35b91a47e6df63413c5e12ed0899bcd132acd50d99151bdc43ee737592e170240678471b27a9cf44ee91a49c5147db1a9aaf244f05a434d6486931d2d14271b9e35030b71fd73da179069b32e2935630e1c2062354d0da20a6c416e50be794ca40202018004330231009b8437541b60489cc67923c0f9464adad57b17d507284c682f9a56615f98834f2db236267e48b340c858dd3f1097f731";
    const SHARED: &str = "eb445fbda4669e4bf9dcba5a43d7f5e09c6185e4ddb154aabacc7a186b54185cbbe1da007d178d9e548a1e70be3c2c7c5be199e865b7b3da826b96ea84c7dc4f";

    fn dh() -> DiffieHellman {
        DiffieHellman::new(Arc::new(SeededRandom::new(1)))
    }

    #[test]
    fn test_standard_groups() {
        for bits in [512, 768, 1024, 1536, 2048, 3072, 4096] {
            let group = DhGroup::standard(bits).unwrap();
            assert_eq!(group.prime_bits(), bits);
            assert!(group.validate().is_ok(), "{}-bit group should validate", bits);
        }
    }

    #[test]
    fn test_unknown_group_size() {
        assert!(matches!(
            dh().create_party(1000),
            Err(CryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_agreement_with_key_objects() {
        let dh = dh();
        let alice = dh.create_party(512).unwrap();
        let bob = dh.create_peer(alice.prime(), alice.generator()).unwrap();

        let alice_secret = dh.compute_secret(bob.public_key(), alice.private_key()).unwrap();
        let bob_secret = dh.compute_secret(alice.public_key(), bob.private_key()).unwrap();
        assert_eq!(alice_secret, bob_secret);
        assert_eq!(alice_secret.as_bytes().len(), 64);
        assert_eq!(alice_secret.algorithm(), KeyAlgorithm::Aes);
    }

    #[test]
    fn test_agreement_with_values() {
        let dh = dh();
        let alice = dh.create_party(512).unwrap();
        let bob = dh.create_peer(alice.prime(), alice.generator()).unwrap();

        let alice_secret = dh
            .compute_secret_from_values(alice.prime(), alice.generator(), bob.y(), alice.private_key())
            .unwrap();
        let bob_secret = dh
            .compute_secret_from_values(alice.prime(), alice.generator(), alice.y(), bob.private_key())
            .unwrap();
        assert_eq!(alice_secret, bob_secret);
        assert_eq!(
            alice_secret,
            dh.compute_secret(bob.public_key(), alice.private_key()).unwrap()
        );
    }

    #[test]
    fn test_private_value_size() {
        let party = dh().create_party(2048).unwrap();
        assert_eq!(party.private_key().x().bits(), 224);
    }

    #[test]
    fn test_create_peer_rejects_bad_domain() {
        let dh = dh();
        let p = DhGroup::standard(512).unwrap().prime().clone();
        let even = &p - &BigUint::one();
        assert!(dh.create_peer(&even, &BigUint::from(2u32)).is_err());
        assert!(dh.create_peer(&p, &BigUint::one()).is_err());
        assert!(dh.create_peer(&BigUint::from(23u32), &BigUint::from(5u32)).is_err());
    }

    #[test]
    fn test_domain_mismatch() {
        let dh = dh();
        let a = dh.create_party(512).unwrap();
        let b = dh.create_party(768).unwrap();
        assert!(matches!(
            dh.compute_secret(b.public_key(), a.private_key()),
            Err(CryptoError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_out_of_range_public_value() {
        let dh = dh();
        let a = dh.create_party(512).unwrap();
        let result =
            dh.compute_secret_from_values(a.prime(), a.generator(), &BigUint::one(), a.private_key());
        assert!(matches!(result, Err(CryptoError::MalformedKey(_))));
    }

    #[test]
    fn test_restore_vectors() {
        let public = DhPublicKey::from_der(&hex::decode(PUBLIC_DER).unwrap()).unwrap();
        let private = DhPrivateKey::from_der(&hex::decode(PRIVATE_DER).unwrap()).unwrap();

        assert_eq!(public.group().prime_bits(), 512);
        assert_eq!(public.group().private_value_bits(), 384);
        assert!(public.group().same_domain(private.group()));
        assert_eq!(hex::encode(public.to_der().unwrap()), PUBLIC_DER);
        assert_eq!(hex::encode(private.to_der().unwrap()), PRIVATE_DER);

        let secret = dh().compute_secret(&public, &private).unwrap();
        assert_eq!(hex::encode(secret.as_bytes()), SHARED);
    }

    #[test]
    fn test_generated_keys_encode_and_restore() {
        let party = dh().create_party(512).unwrap();
        let public = DhPublicKey::from_der(&party.public_key().to_der().unwrap()).unwrap();
        let private = DhPrivateKey::from_der(&party.private_key().to_der().unwrap()).unwrap();
        assert_eq!(&public, party.public_key());
        assert_eq!(private.x(), party.private_key().x());
    }

    #[test]
    fn test_restore_rejects_garbage() {
        assert!(matches!(
            DhPublicKey::from_der(&[0x30, 0x03, 0x02, 0x01, 0x01]),
            Err(CryptoError::MalformedKey(_))
        ));
        assert!(matches!(
            DhPrivateKey::from_der(b"not a key"),
            Err(CryptoError::MalformedKey(_))
        ));
    }

    #[test]
    fn test_private_key_debug_is_redacted() {
        let party = dh().create_party(512).unwrap();
        let debug = format!("{:?}", party.private_key());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains(&party.private_key().x().to_str_radix(16)));
    }
}
