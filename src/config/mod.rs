pub mod validation;

use std::fs;
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::blockchain::assembler::GroupingPolicy;
use crate::blockchain::hardfork::{ForkActivation, BULLETPROOF_FORK_VERSION};
use crate::crypto::bulletproofs::{DEFAULT_BITS, MAX_AGGREGATION};
use crate::errors::{RctError, RctResult};

pub use validation::{validate_config, ConfigValidationError};

/// Prefix for environment overrides, e.g. `OBSCURA_RCT_RANGE_BITS=32`
pub const ENV_PREFIX: &str = "OBSCURA_RCT";

/// Range proof and validation settings
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RctConfig {
    /// Bit width N of the proven range [0, 2^N)
    pub range_bits: usize,
    /// Most amounts covered by a single proof
    pub max_aggregation: usize,
    /// Verification worker threads, 0 for one per CPU
    pub verification_threads: usize,
    /// Grouping used when the caller does not pick one
    pub default_grouping: GroupingPolicy,
    /// First major version that admits bulletproofs
    pub bulletproof_fork_version: u8,
    pub log_level: String,
    /// Height at which each major version activates
    pub hard_forks: Vec<ForkActivation>,
}

impl Default for RctConfig {
    fn default() -> Self {
        Self {
            range_bits: DEFAULT_BITS,
            max_aggregation: MAX_AGGREGATION,
            verification_threads: 0,
            default_grouping: GroupingPolicy::Aggregated,
            bulletproof_fork_version: BULLETPROOF_FORK_VERSION,
            log_level: "info".to_string(),
            hard_forks: vec![
                ForkActivation { version: 1, height: 0 },
                ForkActivation {
                    version: BULLETPROOF_FORK_VERSION,
                    height: 1,
                },
            ],
        }
    }
}

impl RctConfig {
    /// Layer defaults, an optional TOML file and `OBSCURA_RCT_*` variables
    pub fn load(path: Option<&Path>) -> RctResult<Self> {
        let mut builder = ::config::Config::builder();
        if let Some(path) = path {
            debug!("Loading configuration from {}", path.display());
            let text = fs::read_to_string(path)?;
            builder = builder.add_source(::config::File::from_str(&text, ::config::FileFormat::Toml));
        }
        builder = builder.add_source(
            ::config::Environment::with_prefix(ENV_PREFIX).try_parsing(true),
        );

        let loaded: RctConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    /// First validation problem, if any
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        validate_config(self).map_err(|mut errors| errors.remove(0))
    }

    /// Render as TOML
    pub fn to_toml(&self) -> RctResult<String> {
        toml::to_string_pretty(self).map_err(|e| RctError::Serialization(e.to_string()))
    }
}
