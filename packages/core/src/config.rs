//! Централизованная конфигурация для cryptokit-core
//!
//! Defaults for every size, count and length the operations fall back to
//! when the caller does not pass one explicitly.

use std::sync::OnceLock;

/// Глобальная конфигурация (синглтон)
static GLOBAL_CONFIG: OnceLock<Config> = OnceLock::new();

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    // ============================================
    // СЛУЧАЙНЫЕ ДАННЫЕ
    // ============================================

    /// Default length of `KeyMaterial::generate_default_bytes` (bytes)
    pub random_bytes_length: usize,

    // ============================================
    // СИММЕТРИЧНЫЕ ПАРАМЕТРЫ
    // ============================================

    /// AES key size used when `generate_key` is asked for the default (bits)
    pub aes_key_size_bits: usize,

    // ============================================
    // PBKDF2
    // ============================================

    /// Iteration count for `Pbkdf2Digest::default()`
    pub pbkdf2_iterations: u32,

    /// Derived key length for `Pbkdf2Digest::default()` (bits)
    pub pbkdf2_key_length_bits: u32,

    // ============================================
    // АСИММЕТРИЧНЫЕ ПАРАМЕТРЫ
    // ============================================

    /// RSA modulus size when `generate_key_pair` gets `0` (bits)
    pub rsa_key_size_bits: usize,

    /// DH prime length when `generate_key_pair` gets `0` (bits)
    pub dh_prime_length_bits: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            random_bytes_length: 8,
            aes_key_size_bits: 128,
            pbkdf2_iterations: 100_000,
            pbkdf2_key_length_bits: 256,
            rsa_key_size_bits: 2048,
            dh_prime_length_bits: 2048,
        }
    }
}

impl Config {
    /// Создать конфигурацию из переменных окружения
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(val) = std::env::var("CRYPTOKIT_PBKDF2_ITERATIONS") {
            if let Ok(parsed) = val.parse() {
                config.pbkdf2_iterations = parsed;
            }
        }

        if let Ok(val) = std::env::var("CRYPTOKIT_RSA_KEY_SIZE") {
            if let Ok(parsed) = val.parse() {
                config.rsa_key_size_bits = parsed;
            }
        }

        if let Ok(val) = std::env::var("CRYPTOKIT_DH_PRIME_LENGTH") {
            if let Ok(parsed) = val.parse() {
                config.dh_prime_length_bits = parsed;
            }
        }

        config
    }

    /// Получить глобальный экземпляр конфигурации
    ///
    /// Initializes with defaults on first use.
    pub fn global() -> &'static Config {
        GLOBAL_CONFIG.get_or_init(Config::default)
    }

    /// # Errors
    ///
    /// Fails if the global configuration was already initialized.
    pub fn init() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::default())
            .map_err(|_| "Config already initialized")
    }

    /// # Errors
    ///
    /// Fails if the global configuration was already initialized.
    pub fn init_from_env() -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(Self::from_env())
            .map_err(|_| "Config already initialized")
    }

    /// # Errors
    ///
    /// Fails if the global configuration was already initialized.
    pub fn init_with(config: Config) -> Result<(), &'static str> {
        GLOBAL_CONFIG
            .set(config)
            .map_err(|_| "Config already initialized")
    }

    pub fn is_initialized() -> bool {
        GLOBAL_CONFIG.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.random_bytes_length, 8);
        assert_eq!(config.pbkdf2_iterations, 100_000);
        assert_eq!(config.pbkdf2_key_length_bits, 256);
    }

    #[test]
    fn test_config_values() {
        let config = Config::default();

        assert_eq!(config.aes_key_size_bits, 128);
        assert_eq!(config.rsa_key_size_bits, 2048);
        assert_eq!(config.dh_prime_length_bits, 2048);
    }

    #[test]
    fn test_global_is_initialized_on_access() {
        let _ = Config::global();
        assert!(Config::is_initialized());
        assert!(Config::init().is_err());
    }
}
