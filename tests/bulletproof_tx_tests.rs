mod common;

use common::*;
use obscura_ringct::consensus::{BlockValidationError, ErrorKind, ValidationError};
use obscura_ringct::wallet::scan_transaction;
use obscura_ringct::{Mask, RctType};

fn run_valid(seed: u64, amounts: Vec<Vec<u64>>, groups: Vec<Vec<usize>>) {
    init_logging();
    let mut gen = TestGenerator::new(seed);
    let mut events = EventLog::new();
    let txs = gen.generate_with(&mut events, &amounts, &groups, true, |_, _| {});

    let report = replay(&events, &gen.context()).unwrap();
    assert_eq!(report.accepted_txs, amounts.len());
    assert_eq!(report.accepted_blocks, NUM_UNLOCKED_BLOCKS + 1);
    assert!(report.rejected_txs.is_empty());

    for (tx, sizes) in txs.iter().zip(&groups) {
        assert_eq!(tx.rct_signatures.rct_type, RctType::Bulletproof);
        check_groups(tx, &gen.engine, sizes);
    }
}

fn run_invalid<F>(seed: u64, amounts: Vec<Vec<u64>>, groups: Vec<Vec<usize>>, post_tx: F) -> ReplayReport
where
    F: FnMut(&mut obscura_ringct::Transaction, usize),
{
    init_logging();
    let mut gen = TestGenerator::new(seed);
    let mut events = EventLog::new();
    gen.generate_with(&mut events, &amounts, &groups, false, post_tx);

    let report = replay(&events, &gen.context()).unwrap();
    assert_eq!(report.rejected_txs.len(), amounts.len());
    assert_eq!(report.rejected_blocks.len(), 1);
    report
}

#[test]
fn bp_tx_valid_1() {
    run_valid(1, vec![vec![10000]], vec![vec![1]]);
}

#[test]
fn bp_tx_valid_1_1() {
    run_valid(2, vec![vec![5000, 5000]], vec![vec![1, 1]]);
}

#[test]
fn bp_tx_valid_2() {
    run_valid(3, vec![vec![5000, 5000]], vec![vec![2]]);
}

#[test]
fn bp_tx_valid_4_2_1() {
    run_valid(4, vec![vec![1000; 7]], vec![vec![4, 2, 1]]);
}

#[test]
fn bp_tx_valid_16_16() {
    run_valid(5, vec![vec![1000; 32]], vec![vec![16, 16]]);
}

#[test]
fn bp_txs_valid_2_and_2() {
    run_valid(
        6,
        vec![vec![1000, 1000], vec![1000, 1000]],
        vec![vec![2], vec![2]],
    );
}

#[test]
fn bp_txs_valid_1_1_and_8_2_and_16_16_1() {
    run_valid(
        7,
        vec![vec![1000; 2], vec![1000; 10], vec![1000; 33]],
        vec![vec![1, 1], vec![8, 2], vec![16, 16, 1]],
    );
}

#[test]
fn bp_tx_invalid_not_enough_proofs() {
    let report = run_invalid(8, vec![vec![10000]], vec![vec![1]], |tx, _| {
        assert!(tx.rct_signatures.payload.range_proofs.pop().is_some());
    });
    assert_eq!(report.rejected_txs[0], ValidationError::NotEnoughProofs { outputs: 1 });
    assert_eq!(report.rejected_txs[0].kind(), ErrorKind::CoverageMismatch);
    assert!(matches!(
        report.rejected_blocks[0],
        BlockValidationError::Transaction { index: 0, .. }
    ));
}

#[test]
fn bp_tx_invalid_too_many_proofs() {
    let report = run_invalid(9, vec![vec![10000]], vec![vec![1]], |tx, _| {
        let proofs = &mut tx.rct_signatures.payload.range_proofs;
        let last = proofs.last().cloned().unwrap();
        proofs.push(last);
    });
    assert_eq!(
        report.rejected_txs[0],
        ValidationError::TooManyProofs { proofs: 2, outputs: 1 }
    );
}

#[test]
fn bp_tx_invalid_wrong_amount() {
    let mut rng = <rand_chacha::ChaCha20Rng as rand::SeedableRng>::seed_from_u64(100);
    let report = run_invalid(10, vec![vec![10000]], vec![vec![1]], |tx, _| {
        let engine = obscura_ringct::RangeProofEngine::default();
        let forged = engine
            .prove_with_rng(&[1000], &[Mask::random(&mut rng)], &mut rng)
            .unwrap();
        *tx.rct_signatures.payload.range_proofs.last_mut().unwrap() = forged;
    });
    assert_eq!(report.rejected_txs[0], ValidationError::InvalidProof { index: 0 });
    assert_eq!(report.rejected_txs[0].kind(), ErrorKind::CryptographicFailure);
}

#[test]
fn bp_tx_invalid_switched() {
    let report = run_invalid(11, vec![vec![5000, 5000]], vec![vec![1, 1]], |tx, _| {
        let proofs = &mut tx.rct_signatures.payload.range_proofs;
        assert_eq!(proofs.len(), 2);
        proofs.swap(0, 1);
    });
    assert_eq!(report.rejected_txs[0], ValidationError::InvalidProof { index: 0 });
}

#[test]
fn bp_txs_invalid_swapped_across_transactions() {
    init_logging();
    let mut gen = TestGenerator::new(12);
    let mut events = EventLog::new();
    gen.mine_empty(&mut events, NUM_UNLOCKED_BLOCKS);

    let mut txs = gen.build_txs(&[vec![1000, 1000], vec![1000, 1000]], &[vec![2], vec![2]]);
    let (first, second) = txs.split_at_mut(1);
    std::mem::swap(
        &mut first[0].rct_signatures.payload.range_proofs[0],
        &mut second[0].rct_signatures.payload.range_proofs[0],
    );
    gen.push_txs(&mut events, &txs, false);
    gen.push_block(&mut events, txs, false);

    let report = replay(&events, &gen.context()).unwrap();
    assert_eq!(
        report.rejected_txs,
        vec![
            ValidationError::InvalidProof { index: 0 },
            ValidationError::InvalidProof { index: 0 },
        ]
    );
}

#[test]
fn bp_tx_rejected_before_fork() {
    init_logging();
    let mut gen = TestGenerator::new(13);
    let mut events = EventLog::new();

    // Height 0 is still version 1
    let txs = gen.build_txs(&[vec![1000]], &[vec![1]]);
    gen.push_txs(&mut events, &txs, true);
    gen.push_block(&mut events, txs, false);

    let report = replay(&events, &gen.context()).unwrap();
    assert_eq!(
        report.rejected_blocks,
        vec![BlockValidationError::ForkGate {
            index: 0,
            version: 1,
            rct_type: RctType::Bulletproof,
        }]
    );
}

#[test]
fn bp_recipient_recovers_every_output() {
    init_logging();
    let mut gen = TestGenerator::new(14);
    let mut events = EventLog::new();
    let amounts = vec![vec![10, 20, 30], vec![1000; 5]];
    let txs = gen.generate_with(&mut events, &amounts, &[vec![2, 1], vec![4, 1]], true, |_, _| {});
    assert!(replay(&events, &gen.context()).is_ok());

    for (n, (tx, paid)) in txs.iter().zip(&amounts).enumerate() {
        let recipient = &gen.accounts[n + 1];
        let owned = scan_transaction(tx, &recipient.spend.public, &recipient.decoder()).unwrap();
        let recovered: Vec<u64> = owned.iter().map(|o| o.amount).collect();
        assert_eq!(&recovered, paid);

        // Nobody else sees these outputs
        let stranger = &gen.accounts[0];
        assert!(scan_transaction(tx, &stranger.spend.public, &stranger.decoder())
            .unwrap()
            .is_empty());
    }
}

#[test]
fn bp_tx_survives_wire_roundtrip() {
    init_logging();
    let mut gen = TestGenerator::new(15);
    let txs = gen.build_txs(&[vec![7, 8]], &[vec![2]]);
    let decoded = obscura_ringct::Transaction::from_bytes(&txs[0].to_bytes()).unwrap();
    assert_eq!(decoded, txs[0]);
    assert!(gen.context().validator.verdict(&decoded).is_accept());
}
