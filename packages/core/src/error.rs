use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
    #[error("Malformed input: {0}")]
    MalformedInput(String),
    #[error("Malformed key: {0}")]
    MalformedKey(String),
    #[error("Authentication failed: {0}")]
    AuthenticationFailure(String),
    #[error("Decryption failed: {0}")]
    DecryptionFailure(String),
    #[error("Failed to generate keys: {0}")]
    KeyGenerationError(String),
}

pub type Result<T> = std::result::Result<T, CryptoError>;

impl From<der::Error> for CryptoError {
    fn from(err: der::Error) -> Self {
        CryptoError::MalformedInput(format!("DER: {}", err))
    }
}

impl From<base64::DecodeError> for CryptoError {
    fn from(err: base64::DecodeError) -> Self {
        CryptoError::MalformedInput(format!("Base64 decode failed: {}", err))
    }
}

impl From<hex::FromHexError> for CryptoError {
    fn from(err: hex::FromHexError) -> Self {
        CryptoError::MalformedInput(format!("Hex decode failed: {}", err))
    }
}
