use serde::{Deserialize, Serialize};

use crate::crypto::bulletproofs::{RangeProof, RangeProofEngine};
use crate::crypto::pedersen::PedersenCommitment;

/// Signature scheme discriminant carried by every transaction
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RctType {
    /// Cleartext amounts, no confidential payload
    Null,
    /// Legacy full ring signature with per-bit range proofs
    Full,
    /// Legacy simple ring signature with per-bit range proofs
    Simple,
    /// Aggregated bulletproof range proofs
    Bulletproof,
}

impl RctType {
    pub fn to_u8(self) -> u8 {
        match self {
            RctType::Null => 0,
            RctType::Full => 1,
            RctType::Simple => 2,
            RctType::Bulletproof => 3,
        }
    }

    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            0 => Some(RctType::Null),
            1 => Some(RctType::Full),
            2 => Some(RctType::Simple),
            3 => Some(RctType::Bulletproof),
            _ => None,
        }
    }
}

/// Amount masked with a pad derived from the output's amount key
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct EncryptedAmount(pub [u8; 8]);

/// Range proofs plus the output commitments they cover.
///
/// Proofs appear in group order and cover contiguous runs of
/// `commitments`, which appear in output order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ConfidentialPayload {
    pub commitments: Vec<PedersenCommitment>,
    pub range_proofs: Vec<RangeProof>,
}

impl ConfidentialPayload {
    /// Amount counts claimed by each proof, or `None` at the first proof
    /// whose structure is not a valid aggregation
    pub fn group_sizes(&self, engine: &RangeProofEngine) -> Option<Vec<usize>> {
        self.range_proofs
            .iter()
            .map(|proof| engine.amount_count(proof))
            .collect()
    }

    /// Pair each proof with the commitment slice it covers, or `None` when
    /// `sizes` does not match the proofs one to one or overruns the
    /// commitments
    pub fn slices<'a>(
        &'a self,
        sizes: &[usize],
    ) -> Option<Vec<(&'a RangeProof, &'a [PedersenCommitment])>> {
        if sizes.len() != self.range_proofs.len() {
            return None;
        }
        let mut offset = 0usize;
        self.range_proofs
            .iter()
            .zip(sizes.iter())
            .map(|(proof, &size)| {
                let end = offset.checked_add(size)?;
                let slice = self.commitments.get(offset..end)?;
                offset = end;
                Some((proof, slice))
            })
            .collect()
    }
}

/// Confidential signature block of a transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RctSignatures {
    pub rct_type: RctType,
    /// One entry per output, in output order
    pub encrypted_amounts: Vec<EncryptedAmount>,
    pub payload: ConfidentialPayload,
}

impl RctSignatures {
    pub fn null() -> Self {
        RctSignatures {
            rct_type: RctType::Null,
            encrypted_amounts: Vec::new(),
            payload: ConfidentialPayload::default(),
        }
    }

    pub fn bulletproof(payload: ConfidentialPayload, encrypted_amounts: Vec<EncryptedAmount>) -> Self {
        RctSignatures {
            rct_type: RctType::Bulletproof,
            encrypted_amounts,
            payload,
        }
    }
}
