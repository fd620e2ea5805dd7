// Vector generators G_i and H_i for aggregated range proofs

use ark_ec::CurveGroup;
use ark_ed_on_bls12_381::EdwardsAffine;
use lazy_static::lazy_static;

use crate::crypto::jubjub::{hash_to_point, JubjubPoint};

/// Widest supported range, in bits
pub const MAX_BITS: usize = 64;

/// Most amounts a single proof may cover
pub const MAX_AGGREGATION: usize = 16;

const G_LABEL: &[u8] = b"Obscura RingCT bulletproof G";
const H_LABEL: &[u8] = b"Obscura RingCT bulletproof H";

// Global generators, created lazily on first proof
lazy_static! {
    static ref BP_GENS: BulletproofGens = BulletproofGens::new(MAX_BITS, MAX_AGGREGATION);
}

/// Generators for `party_capacity` parties of `gens_capacity` bits each.
///
/// Party `j` uses the slice `[j*gens_capacity, (j+1)*gens_capacity)`; a proof
/// over `n` bits takes the first `n` generators of each party slice.
pub struct BulletproofGens {
    pub gens_capacity: usize,
    pub party_capacity: usize,
    g_vec: Vec<EdwardsAffine>,
    h_vec: Vec<EdwardsAffine>,
}

impl BulletproofGens {
    pub fn new(gens_capacity: usize, party_capacity: usize) -> Self {
        let total = gens_capacity * party_capacity;
        let derive = |label: &[u8]| -> Vec<EdwardsAffine> {
            let points: Vec<JubjubPoint> = (0..total as u64)
                .map(|i| hash_to_point(label, &i.to_le_bytes()))
                .collect();
            JubjubPoint::normalize_batch(&points)
        };

        BulletproofGens {
            gens_capacity,
            party_capacity,
            g_vec: derive(G_LABEL),
            h_vec: derive(H_LABEL),
        }
    }

    /// G generators for an `n`-bit proof over `m` parties, in party order
    pub fn g(&self, n: usize, m: usize) -> Vec<EdwardsAffine> {
        self.select(&self.g_vec, n, m)
    }

    /// H generators for an `n`-bit proof over `m` parties, in party order
    pub fn h(&self, n: usize, m: usize) -> Vec<EdwardsAffine> {
        self.select(&self.h_vec, n, m)
    }

    fn select(&self, table: &[EdwardsAffine], n: usize, m: usize) -> Vec<EdwardsAffine> {
        (0..m)
            .flat_map(|j| {
                let start = j * self.gens_capacity;
                table[start..start + n].iter().copied()
            })
            .collect()
    }
}

/// Shared generator table
pub fn bulletproof_gens() -> &'static BulletproofGens {
    &BP_GENS
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_party_slices_do_not_overlap() {
        let gens = BulletproofGens::new(8, 4);
        let g = gens.g(8, 4);
        let h = gens.h(8, 4);
        assert_eq!(g.len(), 32);

        let all: HashSet<_> = g.iter().chain(h.iter()).collect();
        assert_eq!(all.len(), 64);
    }

    #[test]
    fn test_narrow_selection_is_prefix_of_each_party() {
        let gens = BulletproofGens::new(16, 2);
        let wide = gens.g(16, 2);
        let narrow = gens.g(8, 2);
        assert_eq!(&narrow[..8], &wide[..8]);
        assert_eq!(&narrow[8..], &wide[16..24]);
    }
}
