// Shared-secret derivation of one-time output keys, commitment masks and
// amount pads
//
//   D   = r*A = a*R
//   k_i = Hs(D || varint(i))
//   P_i = k_i*G + B
//   m_i = Hs("commitment_mask" || k_i)
//   amount_i XOR H("amount" || k_i)[..8]

use std::fmt;

use blake2::{Blake2b512, Digest};

use crate::crypto::jubjub::{JubjubPoint, JubjubPointExt, JubjubScalar, JubjubScalarExt};
use crate::crypto::pedersen::Mask;
use crate::utils::varint::write_varint;

const COMMITMENT_MASK_DOMAIN: &[u8] = b"commitment_mask";
const AMOUNT_DOMAIN: &[u8] = b"amount";

/// Diffie-Hellman point shared by sender and recipient of a transaction
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct KeyDerivation(JubjubPoint);

impl KeyDerivation {
    pub fn as_point(&self) -> &JubjubPoint {
        &self.0
    }

    pub fn to_bytes(&self) -> [u8; 32] {
        self.0.to_bytes()
    }
}

impl fmt::Debug for KeyDerivation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("KeyDerivation(<redacted>)")
    }
}

/// `secret * public`; the sender passes `(A, r)`, the recipient `(R, a)`
pub fn generate_key_derivation(public: &JubjubPoint, secret: &JubjubScalar) -> KeyDerivation {
    KeyDerivation(*public * secret)
}

/// Per-output amount key `Hs(D || varint(i))`
pub fn derivation_to_scalar(derivation: &KeyDerivation, output_index: u64) -> JubjubScalar {
    let mut data = Vec::with_capacity(32 + 10);
    data.extend_from_slice(&derivation.to_bytes());
    write_varint(output_index, &mut data);
    JubjubScalar::hash_to_scalar(&data)
}

/// One-time destination key `Hs(D || i)*G + B`
pub fn derive_output_public_key(
    derivation: &KeyDerivation,
    output_index: u64,
    spend_public: &JubjubPoint,
) -> JubjubPoint {
    let scalar = derivation_to_scalar(derivation, output_index);
    <JubjubPoint as JubjubPointExt>::generator() * scalar + spend_public
}

/// Secret key for a one-time destination key, `Hs(D || i) + b`
pub fn derive_output_secret_key(
    derivation: &KeyDerivation,
    output_index: u64,
    spend_secret: &JubjubScalar,
) -> JubjubScalar {
    derivation_to_scalar(derivation, output_index) + spend_secret
}

/// Blinding mask bound to an amount key
pub fn commitment_mask(amount_key: &JubjubScalar) -> Mask {
    let mut data = Vec::with_capacity(COMMITMENT_MASK_DOMAIN.len() + 32);
    data.extend_from_slice(COMMITMENT_MASK_DOMAIN);
    data.extend_from_slice(&amount_key.to_bytes());
    Mask::from_scalar(JubjubScalar::hash_to_scalar(&data))
}

fn amount_pad(amount_key: &JubjubScalar) -> [u8; 8] {
    let mut hasher = Blake2b512::new();
    hasher.update(AMOUNT_DOMAIN);
    hasher.update(amount_key.to_bytes());
    let digest = hasher.finalize();
    let mut pad = [0u8; 8];
    pad.copy_from_slice(&digest[..8]);
    pad
}

/// Mask the little-endian amount with the key's pad
pub fn encode_amount(amount: u64, amount_key: &JubjubScalar) -> [u8; 8] {
    let pad = amount_pad(amount_key);
    let mut out = amount.to_le_bytes();
    for (byte, p) in out.iter_mut().zip(pad.iter()) {
        *byte ^= p;
    }
    out
}

pub fn decode_amount(encrypted: &[u8; 8], amount_key: &JubjubScalar) -> u64 {
    let pad = amount_pad(amount_key);
    let mut out = *encrypted;
    for (byte, p) in out.iter_mut().zip(pad.iter()) {
        *byte ^= p;
    }
    u64::from_le_bytes(out)
}

/// Recompute the mask the sender used for output `output_index` of a
/// transaction with public key `tx_pubkey`
pub fn derive_mask(tx_pubkey: &JubjubPoint, view_secret: &JubjubScalar, output_index: u64) -> Mask {
    let derivation = generate_key_derivation(tx_pubkey, view_secret);
    commitment_mask(&derivation_to_scalar(&derivation, output_index))
}
