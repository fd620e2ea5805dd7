use log::debug;
use rand::{CryptoRng, RngCore};
use serde::{Deserialize, Serialize};

use crate::blockchain::rct::ConfidentialPayload;
use crate::crypto::bulletproofs::RangeProofEngine;
use crate::crypto::pedersen::{commit, Mask};
use crate::errors::RctError;

/// How a transaction's outputs are split into proof groups
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingPolicy {
    /// One proof per output
    PerOutput,
    /// Greedy largest power-of-two groups up to the engine's aggregation limit
    Aggregated,
    /// Caller-chosen group sizes, in output order
    Explicit(Vec<usize>),
}

impl Default for GroupingPolicy {
    fn default() -> Self {
        GroupingPolicy::Aggregated
    }
}

impl GroupingPolicy {
    /// Group sizes for `output_count` outputs.
    ///
    /// Fails with `InvalidInputSize` when an explicit list does not sum to
    /// the output count or names a size the engine cannot prove.
    pub fn group_sizes(
        &self,
        output_count: usize,
        engine: &RangeProofEngine,
    ) -> Result<Vec<usize>, RctError> {
        match self {
            GroupingPolicy::PerOutput => Ok(vec![1; output_count]),
            GroupingPolicy::Aggregated => {
                let mut sizes = Vec::new();
                let mut remaining = output_count;
                while remaining > 0 {
                    let cap = remaining.min(engine.max_aggregation());
                    // Largest power of two not above cap
                    let size = 1usize << (usize::BITS - 1 - cap.leading_zeros());
                    sizes.push(size);
                    remaining -= size;
                }
                Ok(sizes)
            }
            GroupingPolicy::Explicit(sizes) => {
                if let Some(bad) = sizes.iter().find(|&&s| !engine.is_supported_group_size(s)) {
                    return Err(RctError::InvalidInputSize(format!(
                        "group size {} is not supported",
                        bad
                    )));
                }
                let total: usize = sizes.iter().sum();
                if total != output_count {
                    return Err(RctError::InvalidInputSize(format!(
                        "groups cover {} amounts but there are {} outputs",
                        total, output_count
                    )));
                }
                Ok(sizes.clone())
            }
        }
    }
}

/// Commit to every output and attach one range proof per group.
///
/// Proofs come back in group order and commitments in output order. Nothing
/// is returned if any group fails to prove.
pub fn assemble<R: RngCore + CryptoRng>(
    outputs: &[(u64, Mask)],
    policy: &GroupingPolicy,
    engine: &RangeProofEngine,
    rng: &mut R,
) -> Result<ConfidentialPayload, RctError> {
    let sizes = policy.group_sizes(outputs.len(), engine)?;

    let commitments = outputs
        .iter()
        .map(|(amount, mask)| commit(*amount, mask))
        .collect();

    let mut range_proofs = Vec::with_capacity(sizes.len());
    let mut offset = 0;
    for size in &sizes {
        let group = &outputs[offset..offset + size];
        let amounts: Vec<u64> = group.iter().map(|(amount, _)| *amount).collect();
        let masks: Vec<Mask> = group.iter().map(|(_, mask)| mask.clone()).collect();

        debug!("Proving group of {} outputs at offset {}", size, offset);
        range_proofs.push(engine.prove_with_rng(&amounts, &masks, rng)?);
        offset += size;
    }

    Ok(ConfidentialPayload {
        commitments,
        range_proofs,
    })
}
