pub mod blockchain;
pub mod config;
pub mod consensus;
pub mod crypto;
pub mod errors;
pub mod utils;
pub mod wallet;

// Re-export commonly used items
pub use blockchain::assembler::{assemble, GroupingPolicy};
pub use blockchain::hardfork::{ForkActivation, HardForkTable};
pub use blockchain::{Block, BlockHeader, ConfidentialPayload, RctSignatures, RctType, Transaction};
pub use config::RctConfig;
pub use consensus::{TransactionProofValidator, ValidationContext, ValidationError, Verdict};
pub use errors::{RctError, RctResult};

// Re-export key types for convenience
pub use crypto::key_derivation::derive_mask;
pub use crypto::{commit, open, Mask, PedersenCommitment, RangeProof, RangeProofEngine};
