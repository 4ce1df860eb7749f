// Cryptokit Core
// Key material, envelope framing and wrappers over RustCrypto primitives

#![warn(clippy::all)]
#![allow(clippy::too_many_arguments)]

// Модули
pub mod config;
pub mod crypto;
pub mod error;
pub mod utils;

// Re-exports для удобства
pub use config::Config;
pub use crypto::{
    AesCipher, Digest, DiffieHellman, Hmac, KeyMaterial, Pbkdf2Digest, RsaCipher, RsaSign,
};
pub use error::{CryptoError, Result};
