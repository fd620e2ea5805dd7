// Cryptographic building blocks for confidential amounts

pub mod bulletproofs;
pub mod errors;
pub mod jubjub;
pub mod key_derivation;
pub mod pedersen;

#[cfg(test)]
mod tests;

// Re-export commonly used items
pub use bulletproofs::{RangeProof, RangeProofEngine};
pub use errors::{BulletproofsError, CryptoError};
pub use jubjub::{JubjubKeypair, JubjubPoint, JubjubScalar};
pub use pedersen::{commit, open, Mask, PedersenCommitment};
