// Chain-building harness for range proof scenarios.
//
// A `TestGenerator` mines blocks and builds transactions into an `EventLog`.
// `MarkInvalidTx` and `MarkInvalidBlock` flag the next transaction or block
// as one that must be rejected; `replay` checks every verdict.
#![allow(dead_code)]

use obscura_ringct::blockchain::assembler::GroupingPolicy;
use obscura_ringct::blockchain::hardfork::HardForkTable;
use obscura_ringct::consensus::BlockValidationError;
use obscura_ringct::wallet::{construct_transaction, AccountKeys, Destination};
use obscura_ringct::{
    Block, RangeProofEngine, Transaction, TransactionProofValidator, ValidationContext,
    ValidationError,
};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

pub const NUM_ACCOUNTS: usize = 8;
pub const NUM_UNLOCKED_BLOCKS: usize = 4;
pub const TS_START: u64 = 1_338_224_400;
pub const BLOCK_TIME: u64 = 240;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

#[derive(Clone, Debug)]
pub enum Event {
    Block(Block),
    Tx(Transaction),
    MarkInvalidTx,
    MarkInvalidBlock,
}

#[derive(Default)]
pub struct EventLog {
    events: Vec<Event>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }
}

/// Rejections observed during a replay, in event order
#[derive(Debug, Default)]
pub struct ReplayReport {
    pub accepted_txs: usize,
    pub accepted_blocks: usize,
    pub rejected_txs: Vec<ValidationError>,
    pub rejected_blocks: Vec<BlockValidationError>,
}

pub struct TestGenerator {
    rng: ChaCha20Rng,
    pub engine: RangeProofEngine,
    pub hardforks: HardForkTable,
    pub accounts: Vec<AccountKeys>,
    height: u64,
    prev_hash: [u8; 32],
    timestamp: u64,
}

impl TestGenerator {
    /// Bulletproofs activate at height 1 via version 8
    pub fn new(seed: u64) -> Self {
        let mut rng = ChaCha20Rng::seed_from_u64(seed);
        let accounts = (0..NUM_ACCOUNTS).map(|_| AccountKeys::generate(&mut rng)).collect();
        Self {
            rng,
            engine: RangeProofEngine::default(),
            hardforks: HardForkTable::default().with_fork(8, 1),
            accounts,
            height: 0,
            prev_hash: [0u8; 32],
            timestamp: TS_START,
        }
    }

    pub fn context(&self) -> ValidationContext {
        let validator =
            TransactionProofValidator::new(self.engine, 0).expect("validator pool");
        ValidationContext::new(self.hardforks.clone(), validator)
    }

    pub fn rng(&mut self) -> &mut ChaCha20Rng {
        &mut self.rng
    }

    /// Next block on the chain tip, at the version in force for its height
    pub fn make_block(&mut self, transactions: Vec<Transaction>) -> Block {
        let version = self.hardforks.version_at(self.height);
        let mut block = Block::new(self.prev_hash, self.height, version, self.timestamp);
        block.transactions = transactions;
        block.calculate_merkle_root();

        self.prev_hash = block.hash();
        self.height += 1;
        self.timestamp += BLOCK_TIME;
        block
    }

    pub fn mine_empty(&mut self, events: &mut EventLog, count: usize) {
        for _ in 0..count {
            let block = self.make_block(Vec::new());
            events.push(Event::Block(block));
        }
    }

    /// Transaction `n` pays `amounts[n]` to account `n + 1`, grouped as `groups[n]`
    pub fn build_txs(&mut self, amounts: &[Vec<u64>], groups: &[Vec<usize>]) -> Vec<Transaction> {
        assert_eq!(amounts.len(), groups.len());
        assert!(amounts.len() < NUM_ACCOUNTS);

        amounts
            .iter()
            .zip(groups)
            .enumerate()
            .map(|(n, (paid, sizes))| {
                let address = self.accounts[n + 1].address();
                let destinations: Vec<Destination> = paid
                    .iter()
                    .map(|&amount| Destination { address, amount })
                    .collect();
                let policy = GroupingPolicy::Explicit(sizes.clone());
                let (tx, _) = construct_transaction(&destinations, &policy, &self.engine, &mut self.rng)
                    .expect("transaction construction");
                tx
            })
            .collect()
    }

    pub fn push_txs(&self, events: &mut EventLog, txs: &[Transaction], valid: bool) {
        for tx in txs {
            if !valid {
                events.push(Event::MarkInvalidTx);
            }
            events.push(Event::Tx(tx.clone()));
        }
    }

    pub fn push_block(&mut self, events: &mut EventLog, txs: Vec<Transaction>, valid: bool) {
        let block = self.make_block(txs);
        if !valid {
            events.push(Event::MarkInvalidBlock);
        }
        events.push(Event::Block(block));
    }

    /// Mine a short chain, then add the transactions and a block holding them.
    ///
    /// `post_tx` may tamper with each transaction before it is logged.
    pub fn generate_with<F>(
        &mut self,
        events: &mut EventLog,
        amounts: &[Vec<u64>],
        groups: &[Vec<usize>],
        valid: bool,
        mut post_tx: F,
    ) -> Vec<Transaction>
    where
        F: FnMut(&mut Transaction, usize),
    {
        self.mine_empty(events, NUM_UNLOCKED_BLOCKS);

        let mut txs = self.build_txs(amounts, groups);
        for (index, tx) in txs.iter_mut().enumerate() {
            post_tx(tx, index);
        }
        self.push_txs(events, &txs, valid);
        self.push_block(events, txs.clone(), valid);
        txs
    }
}

/// Replay the log, failing on the first verdict that contradicts its marker
pub fn replay(events: &EventLog, ctx: &ValidationContext) -> Result<ReplayReport, String> {
    let mut report = ReplayReport::default();
    let mut expect_invalid_tx = false;
    let mut expect_invalid_block = false;

    for (index, event) in events.events().iter().enumerate() {
        match event {
            Event::MarkInvalidTx => expect_invalid_tx = true,
            Event::MarkInvalidBlock => expect_invalid_block = true,
            Event::Tx(tx) => {
                let expect_invalid = std::mem::take(&mut expect_invalid_tx);
                match ctx.validator.validate(tx) {
                    Ok(()) if expect_invalid => {
                        return Err(format!("event {}: invalid tx was accepted", index))
                    }
                    Ok(()) => report.accepted_txs += 1,
                    Err(e) if !expect_invalid => {
                        return Err(format!("event {}: valid tx was rejected: {}", index, e))
                    }
                    Err(e) => report.rejected_txs.push(e),
                }
            }
            Event::Block(block) => {
                let expect_invalid = std::mem::take(&mut expect_invalid_block);
                match ctx.validate_block(block) {
                    Ok(()) if expect_invalid => {
                        return Err(format!("event {}: invalid block was accepted", index))
                    }
                    Ok(()) => report.accepted_blocks += 1,
                    Err(e) if !expect_invalid => {
                        return Err(format!("event {}: valid block was rejected: {}", index, e))
                    }
                    Err(e) => report.rejected_blocks.push(e),
                }
            }
        }
    }
    Ok(report)
}

/// Proof count and per-proof amount counts of `tx` match `sizes`
pub fn check_groups(tx: &Transaction, engine: &RangeProofEngine, sizes: &[usize]) {
    assert!(tx.version >= 2);
    let proofs = &tx.rct_signatures.payload.range_proofs;
    assert_eq!(proofs.len(), sizes.len());
    let counts: Vec<usize> = proofs
        .iter()
        .map(|proof| engine.amount_count(proof).expect("well-formed proof"))
        .collect();
    assert_eq!(counts, sizes);
    assert_eq!(counts.iter().sum::<usize>(), tx.outputs.len());
}
