use ark_ec::VariableBaseMSM;
use ark_ed_on_bls12_381::EdwardsAffine;
use ark_ff::{One, Zero};

use crate::crypto::jubjub::{JubjubPoint, JubjubScalar};

/// Iterator over `1, x, x^2, ...`
pub struct ScalarExp {
    x: JubjubScalar,
    next_exp_x: JubjubScalar,
}

impl Iterator for ScalarExp {
    type Item = JubjubScalar;

    fn next(&mut self) -> Option<JubjubScalar> {
        let exp_x = self.next_exp_x;
        self.next_exp_x *= self.x;
        Some(exp_x)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (usize::MAX, None)
    }
}

pub fn exp_iter(x: JubjubScalar) -> ScalarExp {
    ScalarExp {
        x,
        next_exp_x: JubjubScalar::one(),
    }
}

/// `1 + x + ... + x^(n-1)`
pub fn sum_of_powers(x: &JubjubScalar, n: usize) -> JubjubScalar {
    exp_iter(*x).take(n).sum()
}

pub fn inner_product(a: &[JubjubScalar], b: &[JubjubScalar]) -> JubjubScalar {
    debug_assert_eq!(a.len(), b.len());
    a.iter()
        .zip(b.iter())
        .fold(JubjubScalar::zero(), |acc, (a_i, b_i)| acc + *a_i * b_i)
}

/// Multiscalar multiplication over equal-length inputs
pub fn msm(bases: &[EdwardsAffine], scalars: &[JubjubScalar]) -> JubjubPoint {
    debug_assert_eq!(bases.len(), scalars.len());
    JubjubPoint::msm_unchecked(bases, scalars)
}

/// Integer log2 of a power of two
pub fn log2_exact(n: usize) -> Option<usize> {
    if n.is_power_of_two() {
        Some(n.trailing_zeros() as usize)
    } else {
        None
    }
}
