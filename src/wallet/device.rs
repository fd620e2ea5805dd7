// Mask-decoding capability.
// A software decoder holds the view secret in process; hardware-backed
// implementations keep it on the device and expose the same two calls.

use crate::blockchain::rct::EncryptedAmount;
use crate::crypto::errors::CryptoError;
use crate::crypto::jubjub::{JubjubPoint, JubjubScalar};
use crate::crypto::key_derivation::{
    commitment_mask, decode_amount, derivation_to_scalar, generate_key_derivation, KeyDerivation,
};
use crate::crypto::pedersen::Mask;

#[cfg_attr(test, mockall::automock)]
pub trait MaskDecoder {
    /// Shared derivation `a*R` for a transaction public key
    fn derivation(&self, tx_public_key: &JubjubPoint) -> Result<KeyDerivation, CryptoError>;

    /// Recover the amount and blinding mask of output `output_index`
    fn decode(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        encrypted: &EncryptedAmount,
    ) -> Result<(u64, Mask), CryptoError>;
}

/// In-process decoder backed by the account's view secret
pub struct SoftwareDecoder {
    view_secret: JubjubScalar,
}

impl SoftwareDecoder {
    pub fn new(view_secret: JubjubScalar) -> Self {
        Self { view_secret }
    }
}

impl MaskDecoder for SoftwareDecoder {
    fn derivation(&self, tx_public_key: &JubjubPoint) -> Result<KeyDerivation, CryptoError> {
        Ok(generate_key_derivation(tx_public_key, &self.view_secret))
    }

    fn decode(
        &self,
        derivation: &KeyDerivation,
        output_index: u64,
        encrypted: &EncryptedAmount,
    ) -> Result<(u64, Mask), CryptoError> {
        let amount_key = derivation_to_scalar(derivation, output_index);
        Ok((decode_amount(&encrypted.0, &amount_key), commitment_mask(&amount_key)))
    }
}
