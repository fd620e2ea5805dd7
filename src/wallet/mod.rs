pub mod device;
pub mod tx_builder;


use log::debug;
use rand::Rng;

use crate::blockchain::Transaction;
use crate::crypto::errors::CryptoError;
use crate::crypto::jubjub::{JubjubKeypair, JubjubPoint};
use crate::crypto::key_derivation::derive_output_public_key;
use crate::crypto::pedersen::{open, Mask};
use crate::errors::RctError;

pub use device::{MaskDecoder, SoftwareDecoder};
pub use tx_builder::{construct_transaction, Destination, TxSecretKey};

/// Public half of an account
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AccountAddress {
    pub spend_public: JubjubPoint,
    pub view_public: JubjubPoint,
}

/// Spend and view keypairs of an account
#[derive(Clone, Debug)]
pub struct AccountKeys {
    pub spend: JubjubKeypair,
    pub view: JubjubKeypair,
}

impl AccountKeys {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self {
            spend: JubjubKeypair::generate(rng),
            view: JubjubKeypair::generate(rng),
        }
    }

    pub fn address(&self) -> AccountAddress {
        AccountAddress {
            spend_public: self.spend.public,
            view_public: self.view.public,
        }
    }

    /// Software decoder over this account's view secret
    pub fn decoder(&self) -> SoftwareDecoder {
        SoftwareDecoder::new(self.view.secret)
    }
}

/// An output recovered by its owner
#[derive(Clone, Debug)]
pub struct OwnedOutput {
    pub index: usize,
    pub amount: u64,
    pub mask: Mask,
}

/// Recover amount and mask of output `index`, checking they open its commitment
pub fn decode_output(
    tx: &Transaction,
    index: usize,
    decoder: &dyn MaskDecoder,
) -> Result<(u64, Mask), RctError> {
    let rct = &tx.rct_signatures;
    let (encrypted, commitment) = match (
        rct.encrypted_amounts.get(index),
        rct.payload.commitments.get(index),
    ) {
        (Some(encrypted), Some(commitment)) => (encrypted, commitment),
        _ => {
            return Err(RctError::Crypto(CryptoError::CommitmentError(format!(
                "output {} has no commitment",
                index
            ))))
        }
    };

    let derivation = decoder.derivation(&tx.tx_public_key)?;
    let (amount, mask) = decoder.decode(&derivation, index as u64, encrypted)?;
    if !open(commitment, &mask, amount) {
        return Err(RctError::Crypto(CryptoError::CommitmentError(format!(
            "decoded mask does not open commitment {}",
            index
        ))));
    }
    Ok((amount, mask))
}

/// Find and decode every output of `tx` addressed to `spend_public`
pub fn scan_transaction(
    tx: &Transaction,
    spend_public: &JubjubPoint,
    decoder: &dyn MaskDecoder,
) -> Result<Vec<OwnedOutput>, RctError> {
    let derivation = decoder.derivation(&tx.tx_public_key)?;
    let mut owned = Vec::new();

    for (index, output) in tx.outputs.iter().enumerate() {
        let expected = derive_output_public_key(&derivation, index as u64, spend_public);
        if expected != output.target {
            continue;
        }
        let (amount, mask) = decode_output(tx, index, decoder)?;
        debug!("Found owned output {}", index);
        owned.push(OwnedOutput {
            index,
            amount,
            mask,
        });
    }
    Ok(owned)
}
