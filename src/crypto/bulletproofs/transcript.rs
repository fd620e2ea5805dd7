//! Fiat-Shamir transcript operations for range proofs.

use ark_ff::{PrimeField, Zero};
use merlin::Transcript;

use crate::crypto::errors::BulletproofsError;
use crate::crypto::jubjub::{JubjubPoint, JubjubPointExt, JubjubScalar, JubjubScalarExt};

pub trait TranscriptProtocol {
    /// Domain separator for an `n`-bit, `m`-party range proof
    fn rangeproof_domain_sep(&mut self, n: u64, m: u64);

    /// Domain separator for an inner product proof of length `n`
    fn innerproduct_domain_sep(&mut self, n: u64);

    fn append_point(&mut self, label: &'static [u8], point: &JubjubPoint);

    /// Append a point, failing if it is the identity
    fn validate_and_append_point(
        &mut self,
        label: &'static [u8],
        point: &JubjubPoint,
    ) -> Result<(), BulletproofsError>;

    fn append_scalar(&mut self, label: &'static [u8], scalar: &JubjubScalar);

    /// Wide-reduced 64 byte challenge
    fn challenge_scalar(&mut self, label: &'static [u8]) -> JubjubScalar;
}

impl TranscriptProtocol for Transcript {
    fn rangeproof_domain_sep(&mut self, n: u64, m: u64) {
        self.append_message(b"dom-sep", b"rangeproof v1");
        self.append_u64(b"n", n);
        self.append_u64(b"m", m);
    }

    fn innerproduct_domain_sep(&mut self, n: u64) {
        self.append_message(b"dom-sep", b"ipp v1");
        self.append_u64(b"n", n);
    }

    fn append_point(&mut self, label: &'static [u8], point: &JubjubPoint) {
        self.append_message(label, &point.to_bytes());
    }

    fn validate_and_append_point(
        &mut self,
        label: &'static [u8],
        point: &JubjubPoint,
    ) -> Result<(), BulletproofsError> {
        if point.is_zero() {
            Err(BulletproofsError::VerificationError)
        } else {
            self.append_point(label, point);
            Ok(())
        }
    }

    fn append_scalar(&mut self, label: &'static [u8], scalar: &JubjubScalar) {
        self.append_message(label, &scalar.to_bytes());
    }

    fn challenge_scalar(&mut self, label: &'static [u8]) -> JubjubScalar {
        let mut buf = [0u8; 64];
        self.challenge_bytes(label, &mut buf);
        JubjubScalar::from_le_bytes_mod_order(&buf)
    }
}
