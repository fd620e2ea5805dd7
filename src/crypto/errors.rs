use thiserror::Error;

/// Errors raised by the range proof engine
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulletproofsError {
    /// Number of amounts is zero, above the aggregation limit, or not a power of two
    #[error("invalid input size: {0} amounts is not a supported group size")]
    InvalidInputSize(usize),

    /// Amounts and masks were supplied in different quantities
    #[error("mismatched inputs: {amounts} amounts but {masks} masks")]
    MismatchedInputs { amounts: usize, masks: usize },

    /// Bit width outside {8, 16, 32, 64}
    #[error("invalid bit size {0}")]
    InvalidBitsize(usize),

    /// Aggregation limit is not a power of two or exceeds the generator table
    #[error("invalid aggregation limit {0}")]
    InvalidAggregation(usize),

    /// Proof bytes could not be decoded
    #[error("proof format error: {0}")]
    FormatError(String),

    /// Proof did not verify
    #[error("range proof verification failed")]
    VerificationError,
}

/// Errors for key, point and encoding handling
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    #[error("invalid point encoding {0}")]
    InvalidPoint(String),

    #[error("invalid scalar encoding")]
    InvalidScalar,

    #[error("key error: {0}")]
    KeyError(String),

    #[error("commitment error: {0}")]
    CommitmentError(String),
}
