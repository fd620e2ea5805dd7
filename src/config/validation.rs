use thiserror::Error;

use crate::config::RctConfig;
use crate::crypto::bulletproofs::{supported_group_size, SUPPORTED_BITS};

/// Error type for configuration validation issues
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),

    #[error("Value out of range: {0}")]
    ValueOutOfRange(String),

    #[error("Incompatible settings: {0}")]
    IncompatibleSettings(String),
}

/// Check every setting, collecting all problems rather than stopping at the first
pub fn validate_config(config: &RctConfig) -> Result<(), Vec<ConfigValidationError>> {
    let mut errors = Vec::new();

    if !SUPPORTED_BITS.contains(&config.range_bits) {
        errors.push(ConfigValidationError::InvalidValue(format!(
            "range_bits must be one of {:?}, got {}",
            SUPPORTED_BITS, config.range_bits
        )));
    }

    if !supported_group_size(config.max_aggregation) {
        errors.push(ConfigValidationError::ValueOutOfRange(format!(
            "max_aggregation must be a power of two between 1 and 16, got {}",
            config.max_aggregation
        )));
    }

    if config.verification_threads > 1024 {
        errors.push(ConfigValidationError::ValueOutOfRange(format!(
            "verification_threads {} exceeds 1024",
            config.verification_threads
        )));
    }

    if let crate::blockchain::assembler::GroupingPolicy::Explicit(_) = config.default_grouping {
        errors.push(ConfigValidationError::IncompatibleSettings(
            "default_grouping cannot be an explicit size list".to_string(),
        ));
    }

    let mut forks = config.hard_forks.clone();
    forks.sort_by_key(|fork| fork.height);
    for pair in forks.windows(2) {
        if pair[0].height == pair[1].height || pair[0].version >= pair[1].version {
            errors.push(ConfigValidationError::IncompatibleSettings(format!(
                "hard_forks must raise the version at each new height, got v{} at {} then v{} at {}",
                pair[0].version, pair[0].height, pair[1].version, pair[1].height
            )));
        }
    }
    if forks.iter().any(|fork| fork.version == 0) {
        errors.push(ConfigValidationError::InvalidValue(
            "hard_forks versions start at 1".to_string(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
