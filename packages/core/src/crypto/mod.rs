//! Криптографический модуль
//!
//! # Архитектура
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Application                          │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!         ┌────────────────────┼─────────────────────┐
//!         ▼                    ▼                     ▼
//! ┌───────────────┐  ┌──────────────────────┐  ┌───────────────┐
//! │  KeyMaterial  │  │  AesCipher           │  │ DiffieHellman │
//! │  - random     │  │  - CBC / GCM / PBE   │  │  - parties    │
//! │  - keys       │  │  - envelope framing  │  │  - secrets    │
//! │  - restore    │  └──────────────────────┘  └───────────────┘
//! └───────────────┘  ┌──────────────────────┐
//!                    │  RsaCipher / RsaSign │
//!                    │  Hmac / Digest       │
//!                    │  Pbkdf2Digest        │
//!                    └──────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                 RandomSource (injectable)                   │
//! │  - OsRandom (production)                                    │
//! │  - SeededRandom (reproducible)                              │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Модули
//!
//! ### Primitives
//! - [`digest`]: одноразовые хеши MD5 .. SHA-512
//! - [`password`]: PBKDF2 с самоописываемым результатом
//! - [`mac`]: HMAC
//! - [`symmetric`]: AES-CBC, AES-GCM, PBE
//! - [`asymmetric`]: RSA шифрование и подписи
//! - [`dh`]: Diffie-Hellman
//!
//! ### Framing
//! - [`envelope`]: `u32_be(len) || params || payload`
//! - [`pbes2`]: DER параметры PBE
//!
//! ### Keys
//! - [`keys`]: KeyMaterial, SymmetricKey, KeyPair
//! - [`algorithms`]: закрытые перечисления алгоритмов
//! - [`random`]: источник случайности

// ============================================================================
// Algorithms & randomness
// ============================================================================

pub mod algorithms;

pub mod random;

// ============================================================================
// Keys & framing
// ============================================================================

pub mod keys;

pub mod envelope;

pub mod pbes2;

// ============================================================================
// Operations
// ============================================================================

pub mod digest;

pub mod password;

pub mod mac;

pub mod symmetric;

pub mod asymmetric;

pub mod dh;

// ============================================================================
// Re-exports для удобства
// ============================================================================

pub use algorithms::{
    AesKeySize, DigestAlgorithm, HmacAlgorithm, KeyAlgorithm, KeyPairAlgorithm, PbeAlgorithm,
    Pbkdf2Algorithm, SignatureAlgorithm,
};
pub use asymmetric::{RsaCipher, RsaSign};
pub use dh::{DhGroup, DhParty, DhPrivateKey, DhPublicKey, DiffieHellman};
pub use digest::Digest;
pub use keys::{KeyMaterial, KeyPair, PrivateKey, PublicKey, SymmetricKey};
pub use mac::Hmac;
pub use password::{Pbkdf2Digest, Pbkdf2Hash};
pub use pbes2::PbeParameters;
pub use random::{OsRandom, RandomSource, SeededRandom};
pub use symmetric::AesCipher;
