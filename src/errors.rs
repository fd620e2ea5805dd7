use std::io;

use thiserror::Error;

use crate::config::validation::ConfigValidationError;
use crate::consensus::rct_validation::{ErrorKind, ValidationError};
use crate::crypto::errors::{BulletproofsError, CryptoError};

/// Crate-level error taxonomy
#[derive(Debug, Error)]
pub enum RctError {
    /// Construction asked for a proof over an unsupported number of amounts
    #[error("invalid input size: {0}")]
    InvalidInputSize(String),

    /// Transaction does not use the bulletproof scheme
    #[error("scheme mismatch: {0}")]
    SchemeMismatch(String),

    /// Proof count or amount coverage does not match the outputs
    #[error("coverage mismatch: {0}")]
    CoverageMismatch(String),

    /// A proof failed verification against its commitments
    #[error("cryptographic failure: {0}")]
    CryptographicFailure(String),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("crypto error: {0}")]
    Crypto(#[from] CryptoError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl From<BulletproofsError> for RctError {
    fn from(err: BulletproofsError) -> Self {
        match err {
            BulletproofsError::InvalidInputSize(_) | BulletproofsError::MismatchedInputs { .. } => {
                RctError::InvalidInputSize(err.to_string())
            }
            BulletproofsError::FormatError(_) => RctError::Serialization(err.to_string()),
            BulletproofsError::VerificationError => RctError::CryptographicFailure(err.to_string()),
            BulletproofsError::InvalidBitsize(_) | BulletproofsError::InvalidAggregation(_) => {
                RctError::Config(err.to_string())
            }
        }
    }
}

impl From<ValidationError> for RctError {
    fn from(err: ValidationError) -> Self {
        match err.kind() {
            ErrorKind::SchemeMismatch => RctError::SchemeMismatch(err.to_string()),
            ErrorKind::CoverageMismatch => RctError::CoverageMismatch(err.to_string()),
            ErrorKind::CryptographicFailure => RctError::CryptographicFailure(err.to_string()),
        }
    }
}

impl From<ConfigValidationError> for RctError {
    fn from(err: ConfigValidationError) -> Self {
        RctError::Config(err.to_string())
    }
}

impl From<::config::ConfigError> for RctError {
    fn from(err: ::config::ConfigError) -> Self {
        RctError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for RctError {
    fn from(err: serde_json::Error) -> Self {
        RctError::Serialization(err.to_string())
    }
}

impl From<hex::FromHexError> for RctError {
    fn from(err: hex::FromHexError) -> Self {
        RctError::Serialization(err.to_string())
    }
}

pub type RctResult<T> = Result<T, RctError>;
