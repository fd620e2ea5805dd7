use std::fmt;
use std::ops::Add;

use ark_ec::CurveGroup;
use ark_ed_on_bls12_381::EdwardsAffine;
use lazy_static::lazy_static;
use rand::Rng;
use subtle::ConstantTimeEq;

use crate::crypto::errors::CryptoError;
use crate::crypto::jubjub::{
    decode_point, hash_to_point, JubjubPoint, JubjubPointExt, JubjubScalar, JubjubScalarExt,
};

/// Label for the blinding generator
const BLINDING_GENERATOR_LABEL: &[u8] = b"Obscura RingCT Pedersen blinding generator";

// Base points for JubJub Pedersen commitments
lazy_static! {
    static ref PC_GENS: PedersenGens = PedersenGens::new();
}

/// Generators for `v*B + m*B_blinding` commitments
#[derive(Clone, Copy, Debug)]
pub struct PedersenGens {
    /// Value generator, the curve's prime subgroup base point
    pub b: JubjubPoint,
    /// Blinding generator, hashed onto the curve
    pub b_blinding: JubjubPoint,
}

impl PedersenGens {
    fn new() -> Self {
        let b = <JubjubPoint as JubjubPointExt>::generator();
        let b_blinding = hash_to_point(BLINDING_GENERATOR_LABEL, &b.to_bytes());
        PedersenGens { b, b_blinding }
    }

    /// Compute `value*B + blinding*B_blinding`
    pub fn commit(&self, value: JubjubScalar, blinding: JubjubScalar) -> JubjubPoint {
        self.b * value + self.b_blinding * blinding
    }

    /// Both generators in affine form, for multiscalar multiplication
    pub(crate) fn affine(&self) -> (EdwardsAffine, EdwardsAffine) {
        (self.b.into_affine(), self.b_blinding.into_affine())
    }
}

/// Shared commitment generators
pub fn pedersen_gens() -> &'static PedersenGens {
    &PC_GENS
}

/// Blinding factor paired with a single commitment.
///
/// Never printed or serialized; `Debug` is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Mask(JubjubScalar);

impl Mask {
    pub fn from_scalar(scalar: JubjubScalar) -> Self {
        Mask(scalar)
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Mask(<JubjubScalar as JubjubScalarExt>::random(rng))
    }

    pub fn as_scalar(&self) -> &JubjubScalar {
        &self.0
    }
}

impl fmt::Debug for Mask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Mask(<redacted>)")
    }
}

impl Add for &Mask {
    type Output = Mask;

    fn add(self, other: &Mask) -> Mask {
        Mask(self.0 + other.0)
    }
}

/// Pedersen commitment to an amount on JubJub
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct PedersenCommitment {
    point: JubjubPoint,
}

impl PedersenCommitment {
    /// Commit = amount*B + mask*B_blinding
    pub fn commit(amount: u64, mask: &Mask) -> Self {
        let point = pedersen_gens().commit(JubjubScalar::from(amount), mask.0);
        PedersenCommitment { point }
    }

    /// Wrap an existing point, e.g. one decoded from a transaction
    pub fn from_point(point: JubjubPoint) -> Self {
        PedersenCommitment { point }
    }

    pub fn point(&self) -> &JubjubPoint {
        &self.point
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.point.to_bytes()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CryptoError> {
        decode_point(bytes).map(Self::from_point)
    }

    /// Homomorphic addition of commitments
    // If C1 = v1*B + m1*H and C2 = v2*B + m2*H
    // Then C1 + C2 = (v1+v2)*B + (m1+m2)*H
    pub fn add(&self, other: &PedersenCommitment) -> PedersenCommitment {
        PedersenCommitment {
            point: self.point + other.point,
        }
    }
}

impl fmt::Debug for PedersenCommitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PedersenCommitment({})", hex::encode(self.to_bytes()))
    }
}

/// Commit to `amount` under `mask`
pub fn commit(amount: u64, mask: &Mask) -> PedersenCommitment {
    PedersenCommitment::commit(amount, mask)
}

/// Check that `commitment` opens to `claimed_amount` under `mask`.
///
/// Debugging and wallet-side helper; consensus never learns amounts.
pub fn open(commitment: &PedersenCommitment, mask: &Mask, claimed_amount: u64) -> bool {
    let expected = commit(claimed_amount, mask).to_bytes();
    expected.ct_eq(&commitment.to_bytes()).into()
}
