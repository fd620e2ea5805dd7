use ark_ff::Zero;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::crypto::bulletproofs::{RangeProof, RangeProofEngine};
use crate::crypto::errors::BulletproofsError;
use crate::crypto::jubjub::{JubjubPoint, JubjubPointExt};
use crate::crypto::pedersen::{commit, pedersen_gens, Mask, PedersenCommitment};

fn masks(rng: &mut ChaCha20Rng, count: usize) -> Vec<Mask> {
    (0..count).map(|_| Mask::random(rng)).collect()
}

fn commitments(amounts: &[u64], masks: &[Mask]) -> Vec<PedersenCommitment> {
    amounts.iter().zip(masks).map(|(a, m)| commit(*a, m)).collect()
}

#[test]
fn test_single_amount_64_bit() {
    let mut rng = ChaCha20Rng::seed_from_u64(1);
    let engine = RangeProofEngine::default();
    let gammas = masks(&mut rng, 1);

    let proof = engine.prove_with_rng(&[10000], &gammas, &mut rng).unwrap();
    assert!(engine.verify(&proof, &commitments(&[10000], &gammas)));
    assert_eq!(engine.amount_count(&proof), Some(1));
    assert_eq!(proof.rounds(), 6);
}

#[test]
fn test_max_u64_is_in_range() {
    let mut rng = ChaCha20Rng::seed_from_u64(2);
    let engine = RangeProofEngine::default();
    let gammas = masks(&mut rng, 2);
    let amounts = [u64::MAX, 0];

    let proof = engine.prove_with_rng(&amounts, &gammas, &mut rng).unwrap();
    assert!(engine.verify(&proof, &commitments(&amounts, &gammas)));
}

#[test]
fn test_aggregated_groups_verify() {
    let mut rng = ChaCha20Rng::seed_from_u64(3);
    let engine = RangeProofEngine::new(16, 16).unwrap();

    for m in [1usize, 2, 4, 8, 16] {
        let amounts: Vec<u64> = (0..m as u64).map(|i| 1000 + i).collect();
        let gammas = masks(&mut rng, m);
        let proof = engine.prove_with_rng(&amounts, &gammas, &mut rng).unwrap();

        assert_eq!(engine.amount_count(&proof), Some(m));
        assert!(engine.verify(&proof, &commitments(&amounts, &gammas)), "m = {}", m);
    }
}

#[test]
fn test_boundary_of_range() {
    let mut rng = ChaCha20Rng::seed_from_u64(4);
    let engine = RangeProofEngine::new(8, 16).unwrap();

    let gammas = masks(&mut rng, 1);
    let proof = engine.prove_with_rng(&[255], &gammas, &mut rng).unwrap();
    assert!(engine.verify(&proof, &commitments(&[255], &gammas)));

    let proof = engine.prove_with_rng(&[256], &gammas, &mut rng).unwrap();
    assert!(!engine.verify(&proof, &commitments(&[256], &gammas)));
}

#[test]
fn test_one_out_of_range_amount_fails_whole_group() {
    let mut rng = ChaCha20Rng::seed_from_u64(5);
    let engine = RangeProofEngine::new(8, 16).unwrap();
    let amounts = [1, 2, 300, 4];
    let gammas = masks(&mut rng, 4);

    let proof = engine.prove_with_rng(&amounts, &gammas, &mut rng).unwrap();
    assert!(!engine.verify(&proof, &commitments(&amounts, &gammas)));
}

#[test]
fn test_commitment_below_zero_is_rejected() {
    let mut rng = ChaCha20Rng::seed_from_u64(6);
    let engine = RangeProofEngine::new(8, 16).unwrap();
    let gammas = masks(&mut rng, 1);

    // Commitment to -1 under the same mask
    let negative = PedersenCommitment::from_point(
        *commit(0, &gammas[0]).point() - pedersen_gens().b,
    );
    let proof = engine.prove_with_rng(&[0], &gammas, &mut rng).unwrap();
    assert!(!engine.verify(&proof, &[negative]));
}

#[test]
fn test_unsupported_group_sizes() {
    let mut rng = ChaCha20Rng::seed_from_u64(7);
    let engine = RangeProofEngine::default();

    assert_eq!(
        engine.prove_with_rng(&[], &[], &mut rng),
        Err(BulletproofsError::InvalidInputSize(0))
    );
    let three = masks(&mut rng, 3);
    assert_eq!(
        engine.prove_with_rng(&[1, 2, 3], &three, &mut rng),
        Err(BulletproofsError::InvalidInputSize(3))
    );
    let many = masks(&mut rng, 32);
    assert_eq!(
        engine.prove_with_rng(&[1; 32], &many, &mut rng),
        Err(BulletproofsError::InvalidInputSize(32))
    );
    assert_eq!(
        engine.prove_with_rng(&[1, 2], &three[..1], &mut rng),
        Err(BulletproofsError::MismatchedInputs { amounts: 2, masks: 1 })
    );

    let capped = RangeProofEngine::new(64, 4).unwrap();
    let eight = masks(&mut rng, 8);
    assert_eq!(
        capped.prove_with_rng(&[1; 8], &eight, &mut rng),
        Err(BulletproofsError::InvalidInputSize(8))
    );
}

#[test]
fn test_engine_parameters() {
    assert_eq!(RangeProofEngine::new(12, 16), Err(BulletproofsError::InvalidBitsize(12)));
    assert_eq!(RangeProofEngine::new(64, 3), Err(BulletproofsError::InvalidAggregation(3)));
    assert_eq!(RangeProofEngine::new(64, 32), Err(BulletproofsError::InvalidAggregation(32)));
    assert!(RangeProofEngine::new(32, 8).is_ok());
}

#[test]
fn test_proof_is_bound_to_its_commitments() {
    let mut rng = ChaCha20Rng::seed_from_u64(8);
    let engine = RangeProofEngine::new(16, 16).unwrap();

    let first = masks(&mut rng, 2);
    let second = masks(&mut rng, 2);
    let c1 = commitments(&[5000, 5000], &first);
    let c2 = commitments(&[5000, 5000], &second);

    let p1 = engine.prove_with_rng(&[5000, 5000], &first, &mut rng).unwrap();
    let p2 = engine.prove_with_rng(&[5000, 5000], &second, &mut rng).unwrap();

    assert!(engine.verify(&p1, &c1));
    assert!(engine.verify(&p2, &c2));
    assert!(!engine.verify(&p1, &c2));
    assert!(!engine.verify(&p2, &c1));

    // Order inside a group matters too
    let reversed: Vec<_> = c1.iter().rev().copied().collect();
    let mixed = engine.prove_with_rng(&[1, 2], &first, &mut rng).unwrap();
    assert!(!engine.verify(&mixed, &commitments(&[2, 1], &first)));
    assert!(!engine.verify(&p1, &reversed));
}

#[test]
fn test_wrong_commitment_count_is_rejected() {
    let mut rng = ChaCha20Rng::seed_from_u64(9);
    let engine = RangeProofEngine::new(8, 16).unwrap();
    let gammas = masks(&mut rng, 2);
    let cs = commitments(&[1, 2], &gammas);
    let proof = engine.prove_with_rng(&[1, 2], &gammas, &mut rng).unwrap();

    assert!(!engine.verify(&proof, &cs[..1]));
    assert!(!engine.verify(&proof, &[]));
    let four = [cs[0], cs[1], cs[0], cs[1]];
    assert!(!engine.verify(&proof, &four));
}

#[test]
fn test_amount_count_depends_on_bit_width() {
    let mut rng = ChaCha20Rng::seed_from_u64(10);
    let narrow = RangeProofEngine::new(8, 16).unwrap();
    let gammas = masks(&mut rng, 1);
    let proof = narrow.prove_with_rng(&[7], &gammas, &mut rng).unwrap();

    assert_eq!(narrow.amount_count(&proof), Some(1));
    // Three rounds cannot be a 64-bit proof
    assert_eq!(RangeProofEngine::default().amount_count(&proof), None);
    assert!(!RangeProofEngine::default().verify(&proof, &commitments(&[7], &gammas)));
}

#[test]
fn test_verify_is_idempotent() {
    let mut rng = ChaCha20Rng::seed_from_u64(11);
    let engine = RangeProofEngine::new(32, 16).unwrap();
    let gammas = masks(&mut rng, 2);
    let cs = commitments(&[3, 4], &gammas);
    let proof = engine.prove_with_rng(&[3, 4], &gammas, &mut rng).unwrap();
    let snapshot = proof.clone();

    let first = engine.verify(&proof, &cs);
    let second = engine.verify(&proof, &cs);
    assert!(first);
    assert_eq!(first, second);
    assert_eq!(proof, snapshot);

    let bad = commitments(&[3, 5], &gammas);
    assert_eq!(engine.verify(&proof, &bad), engine.verify(&proof, &bad));
}

#[test]
fn test_proof_bytes_roundtrip() {
    let mut rng = ChaCha20Rng::seed_from_u64(12);
    let engine = RangeProofEngine::new(16, 16).unwrap();
    let gammas = masks(&mut rng, 4);
    let amounts = [10, 20, 30, 40];
    let proof = engine.prove_with_rng(&amounts, &gammas, &mut rng).unwrap();

    let bytes = proof.to_bytes();
    assert_eq!(bytes.len(), proof.serialized_size());
    assert_eq!(bytes.len(), 32 * (9 + 2 * 6));

    let decoded = RangeProof::from_bytes(&bytes).unwrap();
    assert_eq!(decoded, proof);
    assert!(engine.verify(&decoded, &commitments(&amounts, &gammas)));

    assert!(matches!(
        RangeProof::from_bytes(&bytes[..bytes.len() - 1]),
        Err(BulletproofsError::FormatError(_))
    ));
    assert!(matches!(
        RangeProof::from_bytes(&bytes[..bytes.len() - 32]),
        Err(BulletproofsError::FormatError(_))
    ));
}

#[test]
fn test_identity_points_are_rejected() {
    let mut rng = ChaCha20Rng::seed_from_u64(13);
    let engine = RangeProofEngine::new(8, 16).unwrap();
    let gammas = masks(&mut rng, 1);
    let proof = engine.prove_with_rng(&[9], &gammas, &mut rng).unwrap();

    // Replace A with the identity
    let mut bytes = proof.to_bytes();
    bytes[..32].copy_from_slice(&JubjubPoint::zero().to_bytes());
    let tampered = RangeProof::from_bytes(&bytes).unwrap();
    assert!(!engine.verify(&tampered, &commitments(&[9], &gammas)));
}

#[test]
fn test_tampered_scalar_is_rejected() {
    let mut rng = ChaCha20Rng::seed_from_u64(14);
    let engine = RangeProofEngine::new(8, 16).unwrap();
    let gammas = masks(&mut rng, 1);
    let proof = engine.prove_with_rng(&[9], &gammas, &mut rng).unwrap();

    // Flip a low bit of t_x, keeping the encoding canonical
    let mut bytes = proof.to_bytes();
    bytes[4 * 32] ^= 1;
    let tampered = RangeProof::from_bytes(&bytes).unwrap();
    assert!(!engine.verify(&tampered, &commitments(&[9], &gammas)));
}
