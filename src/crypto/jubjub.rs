// Jubjub curve helpers shared by commitments, range proofs and key derivation

use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bls12_381::{EdwardsAffine, EdwardsProjective, Fr};
use ark_ff::{PrimeField, Zero};
use ark_serialize::{CanonicalDeserialize, CanonicalSerialize};
use ark_std::UniformRand;
use blake2::{Blake2b512, Digest};

use crate::crypto::errors::CryptoError;

/// Scalar field element of the JubJub curve
pub type JubjubScalar = Fr;

/// Point on the JubJub curve (Edwards form)
pub type JubjubPoint = EdwardsProjective;

/// Encoded size of both points and scalars
pub const ENCODED_SIZE: usize = 32;

// Extension trait for JubjubScalar to provide additional functionality
pub trait JubjubScalarExt {
    fn to_bytes(&self) -> [u8; 32];
    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: Sized;
    fn hash_to_scalar(data: &[u8]) -> Self
    where
        Self: Sized;
    fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self
    where
        Self: Sized;
}

// Extension trait for JubjubPoint to provide additional functionality
pub trait JubjubPointExt {
    fn to_bytes(&self) -> [u8; 32];
    fn from_bytes(bytes: &[u8]) -> Option<Self>
    where
        Self: Sized;
    fn generator() -> Self
    where
        Self: Sized;
}

impl JubjubScalarExt for JubjubScalar {
    fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        // A field element always fits the buffer, so serialization cannot fail
        let _ = self.serialize_compressed(&mut bytes[..]);
        bytes
    }

    /// Only canonical encodings (value below the group order) are accepted
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ENCODED_SIZE {
            return None;
        }
        JubjubScalar::deserialize_compressed(bytes).ok()
    }

    /// Wide reduction of a Blake2b-512 digest, so the output is close to uniform
    fn hash_to_scalar(data: &[u8]) -> Self {
        let digest = Blake2b512::digest(data);
        JubjubScalar::from_le_bytes_mod_order(&digest)
    }

    fn random<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        Fr::rand(rng)
    }
}

impl JubjubPointExt for JubjubPoint {
    fn to_bytes(&self) -> [u8; 32] {
        let mut bytes = [0u8; 32];
        let _ = self.into_affine().serialize_compressed(&mut bytes[..]);
        bytes
    }

    /// Rejects encodings that are off the curve or outside the prime-order subgroup
    fn from_bytes(bytes: &[u8]) -> Option<Self> {
        if bytes.len() != ENCODED_SIZE {
            return None;
        }
        let affine = EdwardsAffine::deserialize_compressed(bytes).ok()?;
        Some(affine.into_group())
    }

    fn generator() -> Self {
        EdwardsAffine::generator().into_group()
    }
}

/// Hash arbitrary data onto the prime-order subgroup.
///
/// Uses try-and-increment over Blake2b-512 followed by cofactor clearing, so
/// nobody knows the discrete log of the result with respect to any other
/// generator.
pub fn hash_to_point(label: &[u8], data: &[u8]) -> JubjubPoint {
    let mut counter: u64 = 0;
    loop {
        let mut hasher = Blake2b512::new();
        hasher.update(label);
        hasher.update(data);
        hasher.update(counter.to_le_bytes());
        let digest = hasher.finalize();

        if let Some(candidate) = EdwardsAffine::from_random_bytes(&digest[..32]) {
            let point = candidate.clear_cofactor();
            if !point.is_zero() {
                return point.into_group();
            }
        }
        counter += 1;
    }
}

/// Decode a point, mapping failures onto a crypto error
pub fn decode_point(bytes: &[u8]) -> Result<JubjubPoint, CryptoError> {
    <JubjubPoint as JubjubPointExt>::from_bytes(bytes)
        .ok_or_else(|| CryptoError::InvalidPoint(hex::encode(bytes)))
}

/// Decode a scalar, mapping failures onto a crypto error
pub fn decode_scalar(bytes: &[u8]) -> Result<JubjubScalar, CryptoError> {
    <JubjubScalar as JubjubScalarExt>::from_bytes(bytes).ok_or(CryptoError::InvalidScalar)
}

/// A keypair for the JubJub curve
#[derive(Clone)]
pub struct JubjubKeypair {
    /// The secret key
    pub secret: JubjubScalar,
    /// The public key
    pub public: JubjubPoint,
}

impl JubjubKeypair {
    /// Create a new keypair from a secret key
    pub fn new(secret: JubjubScalar) -> Self {
        let public = <JubjubPoint as JubjubPointExt>::generator() * secret;
        Self { secret, public }
    }

    /// Generate a fresh keypair
    pub fn generate<R: rand::Rng + ?Sized>(rng: &mut R) -> Self {
        loop {
            let secret = <JubjubScalar as JubjubScalarExt>::random(rng);
            if !secret.is_zero() {
                return Self::new(secret);
            }
        }
    }
}

impl std::fmt::Debug for JubjubKeypair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JubjubKeypair")
            .field("public", &hex::encode(self.public.to_bytes()))
            .finish_non_exhaustive()
    }
}
