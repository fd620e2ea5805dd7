use std::fmt;
use std::sync::Arc;

use log::{debug, warn};
use rayon::prelude::*;
use thiserror::Error;

use crate::blockchain::rct::RctType;
use crate::blockchain::{Transaction, MIN_RCT_TX_VERSION};
use crate::crypto::bulletproofs::RangeProofEngine;
use crate::errors::RctError;

/// Coarse class of a rejection
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    SchemeMismatch,
    CoverageMismatch,
    CryptographicFailure,
}

/// Why a transaction's range proofs were rejected
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("wrong scheme: version {version} with {rct_type:?} signatures")]
    WrongScheme { version: u32, rct_type: RctType },

    #[error("malformed payload: {outputs} outputs, {commitments} commitments, {amounts} encrypted amounts")]
    MalformedPayload {
        outputs: usize,
        commitments: usize,
        amounts: usize,
    },

    #[error("not enough proofs: none attached for {outputs} outputs")]
    NotEnoughProofs { outputs: usize },

    #[error("too many proofs: {proofs} proofs for {outputs} outputs")]
    TooManyProofs { proofs: usize, outputs: usize },

    #[error("malformed proof {index}: round count is not a supported aggregation")]
    MalformedProof { index: usize },

    #[error("wrong amount coverage: proofs cover {covered} amounts but there are {outputs} outputs")]
    WrongAmountCoverage { covered: usize, outputs: usize },

    #[error("invalid proof {index}")]
    InvalidProof { index: usize },
}

impl ValidationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ValidationError::WrongScheme { .. } => ErrorKind::SchemeMismatch,
            ValidationError::MalformedPayload { .. }
            | ValidationError::NotEnoughProofs { .. }
            | ValidationError::TooManyProofs { .. }
            | ValidationError::MalformedProof { .. }
            | ValidationError::WrongAmountCoverage { .. } => ErrorKind::CoverageMismatch,
            ValidationError::InvalidProof { .. } => ErrorKind::CryptographicFailure,
        }
    }
}

/// Terminal state of validating one transaction
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(String),
}

impl Verdict {
    pub fn is_accept(&self) -> bool {
        matches!(self, Verdict::Accept)
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Verdict::Accept => write!(f, "ACCEPT"),
            Verdict::Reject(reason) => write!(f, "REJECT: {}", reason),
        }
    }
}

impl From<Result<(), ValidationError>> for Verdict {
    fn from(result: Result<(), ValidationError>) -> Self {
        match result {
            Ok(()) => Verdict::Accept,
            Err(e) => Verdict::Reject(e.to_string()),
        }
    }
}

/// Checks shape, coverage and validity of a transaction's range proofs
#[derive(Clone)]
pub struct TransactionProofValidator {
    engine: RangeProofEngine,
    /// Thread pool for per-group verification
    thread_pool: Arc<rayon::ThreadPool>,
}

impl TransactionProofValidator {
    /// `num_threads == 0` sizes the pool to the CPU count
    pub fn new(engine: RangeProofEngine, num_threads: usize) -> Result<Self, RctError> {
        let num_threads = if num_threads == 0 {
            num_cpus::get()
        } else {
            num_threads
        };
        let thread_pool = rayon::ThreadPoolBuilder::new()
            .num_threads(num_threads)
            .build()
            .map_err(|e| RctError::Config(e.to_string()))?;

        Ok(Self {
            engine,
            thread_pool: Arc::new(thread_pool),
        })
    }

    pub fn engine(&self) -> &RangeProofEngine {
        &self.engine
    }

    pub(crate) fn thread_pool(&self) -> &rayon::ThreadPool {
        &self.thread_pool
    }

    /// Run the four checks in order, stopping at the first failure
    pub fn validate(&self, tx: &Transaction) -> Result<(), ValidationError> {
        let result = self.check(tx);
        match &result {
            Ok(()) => debug!("Accepted range proofs of tx {}", hex::encode(tx.hash())),
            Err(e) => warn!("Rejected tx {}: {}", hex::encode(tx.hash()), e),
        }
        result
    }

    /// Validate and collapse into a verdict with a diagnostic reason
    pub fn verdict(&self, tx: &Transaction) -> Verdict {
        self.validate(tx).into()
    }

    fn check(&self, tx: &Transaction) -> Result<(), ValidationError> {
        let rct = &tx.rct_signatures;
        let payload = &rct.payload;
        let outputs = tx.outputs.len();

        // 1. Shape
        if tx.version < MIN_RCT_TX_VERSION || rct.rct_type != RctType::Bulletproof {
            return Err(ValidationError::WrongScheme {
                version: tx.version,
                rct_type: rct.rct_type,
            });
        }
        if payload.commitments.len() != outputs || rct.encrypted_amounts.len() != outputs {
            return Err(ValidationError::MalformedPayload {
                outputs,
                commitments: payload.commitments.len(),
                amounts: rct.encrypted_amounts.len(),
            });
        }

        // 2. Count
        let proofs = payload.range_proofs.len();
        if outputs > 0 && proofs == 0 {
            return Err(ValidationError::NotEnoughProofs { outputs });
        }
        if proofs > outputs {
            return Err(ValidationError::TooManyProofs { proofs, outputs });
        }

        // 3. Coverage
        let mut sizes = Vec::with_capacity(proofs);
        for (index, proof) in payload.range_proofs.iter().enumerate() {
            let size = self
                .engine
                .amount_count(proof)
                .ok_or(ValidationError::MalformedProof { index })?;
            sizes.push(size);
        }
        let covered: usize = sizes.iter().sum();
        if covered != outputs {
            return Err(ValidationError::WrongAmountCoverage { covered, outputs });
        }

        // 4. Cryptographic, groups in parallel
        let groups = payload
            .slices(&sizes)
            .ok_or(ValidationError::WrongAmountCoverage { covered, outputs })?;
        let engine = &self.engine;
        let failed = self.thread_pool.install(|| {
            groups
                .par_iter()
                .position_first(|(proof, commitments)| !engine.verify(proof, commitments))
        });
        if let Some(index) = failed {
            return Err(ValidationError::InvalidProof { index });
        }

        Ok(())
    }
}
