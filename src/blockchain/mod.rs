use sha2::{Digest, Sha256};

use crate::crypto::bulletproofs::RangeProof;
use crate::crypto::jubjub::{decode_point, JubjubPoint, JubjubPointExt};
use crate::crypto::pedersen::PedersenCommitment;
use crate::errors::RctError;
use crate::utils::varint::{read_varint, write_varint};

pub mod assembler;
pub mod hardfork;
pub mod rct;


pub use rct::{ConfidentialPayload, EncryptedAmount, RctSignatures, RctType};

/// Lowest transaction version that may carry a confidential payload
pub const MIN_RCT_TX_VERSION: u32 = 2;

#[derive(Clone, Debug)]
pub struct Block {
    pub header: BlockHeader,
    pub transactions: Vec<Transaction>,
}

#[derive(Clone, Debug)]
pub struct BlockHeader {
    pub major_version: u8,
    pub minor_version: u8,
    pub previous_hash: [u8; 32],
    pub merkle_root: [u8; 32],
    pub timestamp: u64,
    pub height: u64,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Transaction {
    pub version: u32,
    /// Transaction public key `R = r*G`
    pub tx_public_key: JubjubPoint,
    pub outputs: Vec<TransactionOutput>,
    pub rct_signatures: RctSignatures,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransactionOutput {
    /// One-time destination key
    pub target: JubjubPoint,
}

impl Block {
    pub fn new(previous_hash: [u8; 32], height: u64, major_version: u8, timestamp: u64) -> Self {
        Self {
            header: BlockHeader {
                major_version,
                minor_version: major_version,
                previous_hash,
                merkle_root: [0; 32],
                timestamp,
                height,
            },
            transactions: Vec::new(),
        }
    }

    pub fn hash(&self) -> [u8; 32] {
        let serialized = self.serialize_header();
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&Sha256::digest(&serialized));
        hash
    }

    pub fn serialize_header(&self) -> Vec<u8> {
        let mut buffer = Vec::new();
        buffer.push(self.header.major_version);
        buffer.push(self.header.minor_version);
        buffer.extend_from_slice(&self.header.previous_hash);
        buffer.extend_from_slice(&self.header.merkle_root);
        buffer.extend_from_slice(&self.header.timestamp.to_le_bytes());
        buffer.extend_from_slice(&self.header.height.to_le_bytes());
        buffer
    }

    pub fn calculate_merkle_root(&mut self) {
        self.header.merkle_root = calculate_merkle_root(&self.transactions);
    }
}

pub fn calculate_merkle_root(transactions: &[Transaction]) -> [u8; 32] {
    if transactions.is_empty() {
        return [0u8; 32];
    }

    let mut hashes: Vec<[u8; 32]> = transactions.iter().map(|tx| tx.hash()).collect();

    while hashes.len() > 1 {
        if hashes.len() % 2 != 0 {
            let last = hashes[hashes.len() - 1];
            hashes.push(last);
        }

        hashes = hashes
            .chunks(2)
            .map(|chunk| {
                let mut hasher = Sha256::new();
                hasher.update(chunk[0]);
                hasher.update(chunk[1]);
                let mut hash = [0u8; 32];
                hash.copy_from_slice(&hasher.finalize());
                hash
            })
            .collect();
    }

    hashes[0]
}

impl Transaction {
    /// SHA-256 of the binary encoding
    pub fn hash(&self) -> [u8; 32] {
        let mut hash = [0u8; 32];
        hash.copy_from_slice(&Sha256::digest(self.to_bytes()));
        hash
    }

    /// Binary encoding:
    /// `varint(version) || R || varint(#outputs) || P_i* || type ||
    /// varint(#commitments) || C_i* || varint(#amounts) || amount_i* ||
    /// varint(#proofs) || (varint(len) || proof)*`.
    /// A `Null` payload stops after the type byte.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        write_varint(self.version as u64, &mut out);
        out.extend_from_slice(&self.tx_public_key.to_bytes());

        write_varint(self.outputs.len() as u64, &mut out);
        for output in &self.outputs {
            out.extend_from_slice(&output.target.to_bytes());
        }

        let rct = &self.rct_signatures;
        out.push(rct.rct_type.to_u8());
        if rct.rct_type == RctType::Null {
            return out;
        }

        write_varint(rct.payload.commitments.len() as u64, &mut out);
        for commitment in &rct.payload.commitments {
            out.extend_from_slice(&commitment.to_bytes());
        }

        write_varint(rct.encrypted_amounts.len() as u64, &mut out);
        for amount in &rct.encrypted_amounts {
            out.extend_from_slice(&amount.0);
        }

        write_varint(rct.payload.range_proofs.len() as u64, &mut out);
        for proof in &rct.payload.range_proofs {
            let bytes = proof.to_bytes();
            write_varint(bytes.len() as u64, &mut out);
            out.extend_from_slice(&bytes);
        }
        out
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, RctError> {
        let mut reader = ByteReader::new(bytes);

        let version = u32::try_from(reader.varint()?)
            .map_err(|_| RctError::Serialization("version out of range".to_string()))?;
        let tx_public_key = decode_point(reader.take(32)?)?;

        let output_count = reader.count()?;
        let mut outputs = Vec::with_capacity(output_count);
        for _ in 0..output_count {
            outputs.push(TransactionOutput {
                target: decode_point(reader.take(32)?)?,
            });
        }

        let tag = reader.take(1)?[0];
        let rct_type = RctType::from_u8(tag)
            .ok_or_else(|| RctError::Serialization(format!("unknown rct type {}", tag)))?;

        let rct_signatures = if rct_type == RctType::Null {
            RctSignatures::null()
        } else {
            let commitment_count = reader.count()?;
            let mut commitments = Vec::with_capacity(commitment_count);
            for _ in 0..commitment_count {
                commitments.push(PedersenCommitment::from_bytes(reader.take(32)?)?);
            }

            let amount_count = reader.count()?;
            let mut encrypted_amounts = Vec::with_capacity(amount_count);
            for _ in 0..amount_count {
                let mut amount = [0u8; 8];
                amount.copy_from_slice(reader.take(8)?);
                encrypted_amounts.push(EncryptedAmount(amount));
            }

            let proof_count = reader.count()?;
            let mut range_proofs = Vec::with_capacity(proof_count);
            for _ in 0..proof_count {
                let len = reader.count()?;
                range_proofs.push(RangeProof::from_bytes(reader.take(len)?)?);
            }

            RctSignatures {
                rct_type,
                encrypted_amounts,
                payload: ConfidentialPayload {
                    commitments,
                    range_proofs,
                },
            }
        };

        if !reader.is_empty() {
            return Err(RctError::Serialization("trailing bytes after transaction".to_string()));
        }

        Ok(Transaction {
            version,
            tx_public_key,
            outputs,
            rct_signatures,
        })
    }
}

/// Cursor over an encoded transaction
struct ByteReader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> ByteReader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        ByteReader { bytes, pos: 0 }
    }

    fn take(&mut self, len: usize) -> Result<&'a [u8], RctError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| RctError::Serialization("unexpected end of input".to_string()))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn varint(&mut self) -> Result<u64, RctError> {
        read_varint(self.bytes, &mut self.pos)
            .ok_or_else(|| RctError::Serialization("malformed varint".to_string()))
    }

    /// Element count, bounded by the bytes left so hostile input cannot
    /// force huge allocations
    fn count(&mut self) -> Result<usize, RctError> {
        let value = self.varint()?;
        let remaining = (self.bytes.len() - self.pos) as u64;
        if value > remaining {
            return Err(RctError::Serialization(format!("count {} exceeds input", value)));
        }
        Ok(value as usize)
    }

    fn is_empty(&self) -> bool {
        self.pos == self.bytes.len()
    }
}
