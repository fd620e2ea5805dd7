pub mod rct_validation;


use log::{info, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::blockchain::hardfork::HardForkTable;
use crate::blockchain::rct::RctType;
use crate::blockchain::Block;
use crate::config::RctConfig;
use crate::crypto::bulletproofs::RangeProofEngine;
use crate::errors::RctError;

pub use rct_validation::{ErrorKind, TransactionProofValidator, ValidationError, Verdict};

/// Why a block was rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum BlockValidationError {
    #[error("block {height} claims version {claimed}, fork table requires {expected}")]
    VersionMismatch {
        height: u64,
        expected: u8,
        claimed: u8,
    },

    #[error("{rct_type:?} signatures are not allowed at version {version} (tx {index})")]
    ForkGate {
        index: usize,
        version: u8,
        rct_type: RctType,
    },

    #[error("tx {index} rejected: {source}")]
    Transaction {
        index: usize,
        #[source]
        source: ValidationError,
    },
}

/// Everything needed to accept or reject transactions and blocks
#[derive(Clone)]
pub struct ValidationContext {
    pub hardforks: HardForkTable,
    pub validator: TransactionProofValidator,
}

impl ValidationContext {
    pub fn new(hardforks: HardForkTable, validator: TransactionProofValidator) -> Self {
        Self {
            hardforks,
            validator,
        }
    }

    /// Build the engine, validator pool and fork gate from configuration
    pub fn from_config(config: &RctConfig) -> Result<Self, RctError> {
        let engine = RangeProofEngine::new(config.range_bits, config.max_aggregation)?;
        let validator = TransactionProofValidator::new(engine, config.verification_threads)?;
        let hardforks =
            HardForkTable::from_activations(&config.hard_forks, config.bulletproof_fork_version);
        Ok(Self::new(hardforks, validator))
    }

    /// Check the header version against the fork table, apply the fork gate
    /// for the block's height, then validate every confidential transaction
    /// in parallel. Cleartext (`Null`) transactions carry no proofs and are
    /// only fork-gated.
    ///
    /// The lowest-indexed failing transaction is reported.
    pub fn validate_block(&self, block: &Block) -> Result<(), BlockValidationError> {
        let height = block.header.height;
        let rules = self.hardforks.rules_at(height);
        if block.header.major_version != rules.version {
            warn!(
                "Block {} claims version {} but version {} is in force",
                height, block.header.major_version, rules.version
            );
            return Err(BlockValidationError::VersionMismatch {
                height,
                expected: rules.version,
                claimed: block.header.major_version,
            });
        }

        for (index, tx) in block.transactions.iter().enumerate() {
            let rct_type = tx.rct_signatures.rct_type;
            if !rules.allows(rct_type) {
                warn!(
                    "Block {} carries {:?} tx at version {}",
                    height, rct_type, rules.version
                );
                return Err(BlockValidationError::ForkGate {
                    index,
                    version: rules.version,
                    rct_type,
                });
            }
        }

        let validator = &self.validator;
        let failure = validator.thread_pool().install(|| {
            block
                .transactions
                .par_iter()
                .enumerate()
                .filter(|(_, tx)| tx.rct_signatures.rct_type != RctType::Null)
                .filter_map(|(index, tx)| validator.validate(tx).err().map(|e| (index, e)))
                .min_by_key(|(index, _)| *index)
        });

        match failure {
            Some((index, source)) => Err(BlockValidationError::Transaction { index, source }),
            None => {
                info!(
                    "Block {} accepted with {} transactions",
                    block.header.height,
                    block.transactions.len()
                );
                Ok(())
            }
        }
    }
}
