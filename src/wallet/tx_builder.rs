use std::fmt;

use log::info;
use rand::{CryptoRng, RngCore};

use crate::blockchain::assembler::{assemble, GroupingPolicy};
use crate::blockchain::rct::{EncryptedAmount, RctSignatures};
use crate::blockchain::{Transaction, TransactionOutput, MIN_RCT_TX_VERSION};
use crate::crypto::bulletproofs::RangeProofEngine;
use crate::crypto::jubjub::{JubjubKeypair, JubjubPoint, JubjubScalar};
use crate::crypto::key_derivation::{
    commitment_mask, derivation_to_scalar, derive_output_public_key, encode_amount,
    generate_key_derivation, KeyDerivation,
};
use crate::crypto::pedersen::Mask;
use crate::errors::RctError;
use crate::wallet::AccountAddress;

/// Payment of `amount` to `address`
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Destination {
    pub address: AccountAddress,
    pub amount: u64,
}

/// Per-transaction secret `r`; lets the sender re-derive what it committed
#[derive(Clone)]
pub struct TxSecretKey(JubjubScalar);

impl TxSecretKey {
    /// Sender-side derivation `r*A` for a recipient's view key
    pub fn derivation(&self, view_public: &JubjubPoint) -> KeyDerivation {
        generate_key_derivation(view_public, &self.0)
    }
}

impl fmt::Debug for TxSecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TxSecretKey(<redacted>)")
    }
}

/// Build a bulletproof transaction paying every destination.
///
/// Output `i` gets one-time key `Hs(rA_i || i)*G + B_i`, a mask derived from
/// the same amount key, and an encrypted amount. Range proofs are grouped by
/// `policy`.
pub fn construct_transaction<R: RngCore + CryptoRng>(
    destinations: &[Destination],
    policy: &GroupingPolicy,
    engine: &RangeProofEngine,
    rng: &mut R,
) -> Result<(Transaction, TxSecretKey), RctError> {
    let tx_key = JubjubKeypair::generate(rng);
    let tx_secret = TxSecretKey(tx_key.secret);

    let mut outputs = Vec::with_capacity(destinations.len());
    let mut encrypted_amounts = Vec::with_capacity(destinations.len());
    let mut openings: Vec<(u64, Mask)> = Vec::with_capacity(destinations.len());

    for (index, destination) in destinations.iter().enumerate() {
        let index = index as u64;
        let derivation = tx_secret.derivation(&destination.address.view_public);
        let amount_key = derivation_to_scalar(&derivation, index);

        outputs.push(TransactionOutput {
            target: derive_output_public_key(&derivation, index, &destination.address.spend_public),
        });
        encrypted_amounts.push(EncryptedAmount(encode_amount(destination.amount, &amount_key)));
        openings.push((destination.amount, commitment_mask(&amount_key)));
    }

    let payload = assemble(&openings, policy, engine, rng)?;
    info!(
        "Constructed transaction with {} outputs and {} range proofs",
        outputs.len(),
        payload.range_proofs.len()
    );

    let tx = Transaction {
        version: MIN_RCT_TX_VERSION,
        tx_public_key: tx_key.public,
        outputs,
        rct_signatures: RctSignatures::bulletproof(payload, encrypted_amounts),
    };
    Ok((tx, tx_secret))
}
