// Aggregated Bulletproofs range proofs over JubJub
// Proves that each of m committed amounts lies in [0, 2^n) with a proof of
// 2*log2(n*m) + 9 group and field elements.

#![allow(non_snake_case)]

mod generators;
mod inner_product;
mod transcript;
mod util;

use std::iter;

use ark_ec::{AffineRepr, CurveGroup};
use ark_ed_on_bls12_381::EdwardsAffine;
use ark_ff::{Field, One, Zero};
use ark_std::UniformRand;
use log::{debug, trace};
use merlin::Transcript;
use rand::rngs::OsRng;
use rand::{CryptoRng, RngCore};

pub use self::generators::{bulletproof_gens, BulletproofGens, MAX_AGGREGATION, MAX_BITS};
pub use self::inner_product::InnerProductProof;
pub use self::transcript::TranscriptProtocol;

use self::util::{exp_iter, inner_product, log2_exact, msm, sum_of_powers};
use crate::crypto::errors::BulletproofsError;
use crate::crypto::jubjub::{
    decode_point, decode_scalar, JubjubPoint, JubjubPointExt, JubjubScalar, JubjubScalarExt,
};
use crate::crypto::pedersen::{pedersen_gens, Mask, PedersenCommitment};

/// Transcript label shared by prover and verifier
const TRANSCRIPT_LABEL: &[u8] = b"Obscura Range Proof";

/// Bit widths a proof may use
pub const SUPPORTED_BITS: [usize; 4] = [8, 16, 32, 64];

/// Default range, [0, 2^64)
pub const DEFAULT_BITS: usize = 64;

/// Fixed elements in an encoded proof: A, S, T_1, T_2, t_x, t_x_blinding,
/// e_blinding, a, b
const FIXED_ELEMENTS: usize = 9;

/// A range proof over one group of aggregated amounts.
///
/// The committed values are not part of the proof; the verifier supplies
/// them and they are bound through the transcript.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RangeProof {
    /// Commitment to the bits of the value
    A: JubjubPoint,
    /// Commitment to the blinding factors
    S: JubjubPoint,
    /// Commitment to the \\(t_1\\) coefficient of \\( t(x) \\)
    T_1: JubjubPoint,
    /// Commitment to the \\(t_2\\) coefficient of \\( t(x) \\)
    T_2: JubjubPoint,
    /// Evaluation of the polynomial \\(t(x)\\) at the challenge point \\(x\\)
    t_x: JubjubScalar,
    /// Blinding factor for the synthetic commitment to \\(t(x)\\)
    t_x_blinding: JubjubScalar,
    /// Blinding factor for the synthetic commitment to the inner-product arguments
    e_blinding: JubjubScalar,
    /// Proof data for the inner-product argument.
    ipp_proof: InnerProductProof,
}

impl RangeProof {
    /// Number of folding rounds in the inner product argument
    pub fn rounds(&self) -> usize {
        self.ipp_proof.L_vec.len()
    }

    pub fn serialized_size(&self) -> usize {
        7 * 32 + self.ipp_proof.serialized_size()
    }

    /// Layout: `A || S || T_1 || T_2 || t_x || t_x_blinding || e_blinding ||
    /// (L_i || R_i)* || a || b`, 32 bytes per element
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        buf.extend_from_slice(&self.A.to_bytes());
        buf.extend_from_slice(&self.S.to_bytes());
        buf.extend_from_slice(&self.T_1.to_bytes());
        buf.extend_from_slice(&self.T_2.to_bytes());
        buf.extend_from_slice(&self.t_x.to_bytes());
        buf.extend_from_slice(&self.t_x_blinding.to_bytes());
        buf.extend_from_slice(&self.e_blinding.to_bytes());
        for (L, R) in self.ipp_proof.L_vec.iter().zip(self.ipp_proof.R_vec.iter()) {
            buf.extend_from_slice(&L.to_bytes());
            buf.extend_from_slice(&R.to_bytes());
        }
        buf.extend_from_slice(&self.ipp_proof.a.to_bytes());
        buf.extend_from_slice(&self.ipp_proof.b.to_bytes());
        buf
    }

    pub fn from_bytes(slice: &[u8]) -> Result<RangeProof, BulletproofsError> {
        if slice.len() % 32 != 0 {
            return Err(BulletproofsError::FormatError(format!(
                "length {} is not a multiple of 32",
                slice.len()
            )));
        }
        let num_elements = slice.len() / 32;
        if num_elements < FIXED_ELEMENTS || (num_elements - FIXED_ELEMENTS) % 2 != 0 {
            return Err(BulletproofsError::FormatError(format!(
                "{} elements do not form a proof",
                num_elements
            )));
        }
        let lg_n = (num_elements - FIXED_ELEMENTS) / 2;
        if lg_n >= 32 {
            return Err(BulletproofsError::FormatError(format!("{} rounds", lg_n)));
        }

        let chunk = |i: usize| &slice[i * 32..(i + 1) * 32];
        let point = |i: usize| {
            decode_point(chunk(i)).map_err(|e| BulletproofsError::FormatError(e.to_string()))
        };
        let scalar = |i: usize| {
            decode_scalar(chunk(i)).map_err(|e| BulletproofsError::FormatError(e.to_string()))
        };

        let mut L_vec = Vec::with_capacity(lg_n);
        let mut R_vec = Vec::with_capacity(lg_n);
        for round in 0..lg_n {
            L_vec.push(point(7 + 2 * round)?);
            R_vec.push(point(8 + 2 * round)?);
        }

        Ok(RangeProof {
            A: point(0)?,
            S: point(1)?,
            T_1: point(2)?,
            T_2: point(3)?,
            t_x: scalar(4)?,
            t_x_blinding: scalar(5)?,
            e_blinding: scalar(6)?,
            ipp_proof: InnerProductProof {
                L_vec,
                R_vec,
                a: scalar(num_elements - 2)?,
                b: scalar(num_elements - 1)?,
            },
        })
    }
}

/// Returns true if `count` amounts may share one proof under the global limit
pub fn supported_group_size(count: usize) -> bool {
    count >= 1 && count <= MAX_AGGREGATION && count.is_power_of_two()
}

/// Builds and checks range proofs for a fixed bit width and aggregation limit
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RangeProofEngine {
    bits: usize,
    max_aggregation: usize,
}

impl Default for RangeProofEngine {
    fn default() -> Self {
        RangeProofEngine {
            bits: DEFAULT_BITS,
            max_aggregation: MAX_AGGREGATION,
        }
    }
}

impl RangeProofEngine {
    pub fn new(bits: usize, max_aggregation: usize) -> Result<Self, BulletproofsError> {
        if !SUPPORTED_BITS.contains(&bits) {
            return Err(BulletproofsError::InvalidBitsize(bits));
        }
        if !supported_group_size(max_aggregation) {
            return Err(BulletproofsError::InvalidAggregation(max_aggregation));
        }
        Ok(RangeProofEngine {
            bits,
            max_aggregation,
        })
    }

    pub fn bits(&self) -> usize {
        self.bits
    }

    pub fn max_aggregation(&self) -> usize {
        self.max_aggregation
    }

    /// Whether `count` amounts can be covered by one proof from this engine
    pub fn is_supported_group_size(&self, count: usize) -> bool {
        supported_group_size(count) && count <= self.max_aggregation
    }

    /// Prove that every amount lies in `[0, 2^bits)` using fresh OS randomness
    pub fn prove(&self, amounts: &[u64], masks: &[Mask]) -> Result<RangeProof, BulletproofsError> {
        self.prove_with_rng(amounts, masks, &mut OsRng)
    }

    /// Prove that every amount lies in `[0, 2^bits)`.
    ///
    /// Only the low `bits` bits of each amount are encoded, so an amount at or
    /// above `2^bits` produces a proof that fails verification rather than an
    /// error.
    pub fn prove_with_rng<R: RngCore + CryptoRng>(
        &self,
        amounts: &[u64],
        masks: &[Mask],
        rng: &mut R,
    ) -> Result<RangeProof, BulletproofsError> {
        let n = self.bits;
        let m = amounts.len();
        if !self.is_supported_group_size(m) {
            return Err(BulletproofsError::InvalidInputSize(m));
        }
        if masks.len() != m {
            return Err(BulletproofsError::MismatchedInputs {
                amounts: m,
                masks: masks.len(),
            });
        }

        let pc_gens = pedersen_gens();
        let (_, B_blinding) = pc_gens.affine();
        let G = bulletproof_gens().g(n, m);
        let H = bulletproof_gens().h(n, m);
        let nm = n * m;

        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        transcript.rangeproof_domain_sep(n as u64, m as u64);
        for (v, gamma) in amounts.iter().zip(masks.iter()) {
            let V = PedersenCommitment::commit(*v, gamma);
            transcript.append_point(b"V", V.point());
        }

        // Bit decomposition: a_L holds the bits, a_R = a_L - 1
        let mut a_L = Vec::with_capacity(nm);
        let mut a_R = Vec::with_capacity(nm);
        for v in amounts {
            for i in 0..n {
                let bit = JubjubScalar::from((*v >> i) & 1);
                a_L.push(bit);
                a_R.push(bit - JubjubScalar::one());
            }
        }

        let bases: Vec<EdwardsAffine> = G
            .iter()
            .chain(H.iter())
            .chain(iter::once(&B_blinding))
            .copied()
            .collect();

        let alpha = JubjubScalar::rand(rng);
        let A_scalars: Vec<JubjubScalar> = a_L
            .iter()
            .chain(a_R.iter())
            .chain(iter::once(&alpha))
            .copied()
            .collect();
        let A = msm(&bases, &A_scalars);

        let s_L: Vec<JubjubScalar> = (0..nm).map(|_| JubjubScalar::rand(rng)).collect();
        let s_R: Vec<JubjubScalar> = (0..nm).map(|_| JubjubScalar::rand(rng)).collect();
        let rho = JubjubScalar::rand(rng);
        let S_scalars: Vec<JubjubScalar> = s_L
            .iter()
            .chain(s_R.iter())
            .chain(iter::once(&rho))
            .copied()
            .collect();
        let S = msm(&bases, &S_scalars);

        transcript.validate_and_append_point(b"A", &A)?;
        transcript.validate_and_append_point(b"S", &S)?;

        let y = transcript.challenge_scalar(b"y");
        let z = transcript.challenge_scalar(b"z");
        let zz = z * z;

        // l(x) = l0 + l1 x, r(x) = r0 + r1 x
        let mut l0 = Vec::with_capacity(nm);
        let mut r0 = Vec::with_capacity(nm);
        let mut r1 = Vec::with_capacity(nm);
        let mut exp_y = JubjubScalar::one();
        let mut exp_z = zz;
        for j in 0..m {
            let mut exp_2 = JubjubScalar::one();
            for i in 0..n {
                let k = j * n + i;
                l0.push(a_L[k] - z);
                r0.push(exp_y * (a_R[k] + z) + exp_z * exp_2);
                r1.push(exp_y * s_R[k]);
                exp_y *= y;
                exp_2 += exp_2;
            }
            exp_z *= z;
        }
        let l1 = s_L;

        let t1 = inner_product(&l0, &r1) + inner_product(&l1, &r0);
        let t2 = inner_product(&l1, &r1);

        let tau1 = JubjubScalar::rand(rng);
        let tau2 = JubjubScalar::rand(rng);
        let T_1 = pc_gens.commit(t1, tau1);
        let T_2 = pc_gens.commit(t2, tau2);

        transcript.validate_and_append_point(b"T_1", &T_1)?;
        transcript.validate_and_append_point(b"T_2", &T_2)?;

        let x = transcript.challenge_scalar(b"x");

        let l_vec: Vec<JubjubScalar> = l0
            .iter()
            .zip(l1.iter())
            .map(|(c0, c1)| *c0 + *c1 * x)
            .collect();
        let r_vec: Vec<JubjubScalar> = r0
            .iter()
            .zip(r1.iter())
            .map(|(c0, c1)| *c0 + *c1 * x)
            .collect();
        let t_x = inner_product(&l_vec, &r_vec);

        let masked_sum: JubjubScalar = exp_iter(z)
            .skip(2)
            .zip(masks.iter())
            .map(|(z_exp, gamma)| z_exp * gamma.as_scalar())
            .sum();
        let t_x_blinding = tau2 * x * x + tau1 * x + masked_sum;
        let e_blinding = alpha + rho * x;

        transcript.append_scalar(b"t_x", &t_x);
        transcript.append_scalar(b"t_x_blinding", &t_x_blinding);
        transcript.append_scalar(b"e_blinding", &e_blinding);

        // Bind t_x into the inner product argument through Q = w*B
        let w = transcript.challenge_scalar(b"w");
        let Q = pc_gens.b * w;

        let y_inv = y.inverse().ok_or(BulletproofsError::VerificationError)?;
        let G_vec: Vec<JubjubPoint> = G.iter().map(|g| g.into_group()).collect();
        let H_prime: Vec<JubjubPoint> = H
            .iter()
            .zip(exp_iter(y_inv))
            .map(|(h, factor)| h.into_group() * factor)
            .collect();

        let ipp_proof =
            InnerProductProof::create(&mut transcript, &Q, G_vec, H_prime, l_vec, r_vec)?;

        debug!("Created {}-bit range proof over {} amounts", n, m);

        Ok(RangeProof {
            A,
            S,
            T_1,
            T_2,
            t_x,
            t_x_blinding,
            e_blinding,
            ipp_proof,
        })
    }

    /// Check `proof` against `commitments`; any mismatch yields `false`
    pub fn verify(&self, proof: &RangeProof, commitments: &[PedersenCommitment]) -> bool {
        match self.verify_with_rng(proof, commitments, &mut OsRng) {
            Ok(()) => true,
            Err(e) => {
                trace!("Range proof rejected: {}", e);
                false
            }
        }
    }

    /// Verify with a caller-supplied source for the batching weight
    pub fn verify_with_rng<R: RngCore + CryptoRng>(
        &self,
        proof: &RangeProof,
        commitments: &[PedersenCommitment],
        rng: &mut R,
    ) -> Result<(), BulletproofsError> {
        let n = self.bits;
        let m = commitments.len();
        if !self.is_supported_group_size(m) {
            return Err(BulletproofsError::InvalidInputSize(m));
        }
        if self.amount_count(proof) != Some(m) {
            return Err(BulletproofsError::VerificationError);
        }
        let nm = n * m;

        let mut transcript = Transcript::new(TRANSCRIPT_LABEL);
        transcript.rangeproof_domain_sep(n as u64, m as u64);
        for V in commitments {
            transcript.append_point(b"V", V.point());
        }

        transcript.validate_and_append_point(b"A", &proof.A)?;
        transcript.validate_and_append_point(b"S", &proof.S)?;

        let y = transcript.challenge_scalar(b"y");
        let z = transcript.challenge_scalar(b"z");
        let zz = z * z;
        let minus_z = -z;

        transcript.validate_and_append_point(b"T_1", &proof.T_1)?;
        transcript.validate_and_append_point(b"T_2", &proof.T_2)?;

        let x = transcript.challenge_scalar(b"x");

        transcript.append_scalar(b"t_x", &proof.t_x);
        transcript.append_scalar(b"t_x_blinding", &proof.t_x_blinding);
        transcript.append_scalar(b"e_blinding", &proof.e_blinding);

        let w = transcript.challenge_scalar(b"w");

        // Random weight batching the polynomial check with the inner product check
        let c = JubjubScalar::rand(rng);

        let (x_sq, x_inv_sq, s) = proof.ipp_proof.verification_scalars(nm, &mut transcript)?;

        let a = proof.ipp_proof.a;
        let b = proof.ipp_proof.b;
        let y_inv = y.inverse().ok_or(BulletproofsError::VerificationError)?;

        // z^0 * 2^n || z^1 * 2^n || ... || z^(m-1) * 2^n
        let powers_of_2: Vec<JubjubScalar> =
            exp_iter(JubjubScalar::from(2u64)).take(n).collect();
        let concat_z_and_2: Vec<JubjubScalar> = exp_iter(z)
            .take(m)
            .flat_map(|exp_z| powers_of_2.iter().map(move |exp_2| *exp_2 * exp_z))
            .collect();

        let g = s.iter().map(|s_i| minus_z - a * s_i);
        let h = s
            .iter()
            .rev()
            .zip(exp_iter(y_inv))
            .zip(concat_z_and_2.iter())
            .map(|((s_i_inv, exp_y_inv), z_and_2)| z + exp_y_inv * (zz * z_and_2 - b * s_i_inv));

        let value_commitment_scalars = exp_iter(z).take(m).map(|z_exp| c * zz * z_exp);
        let basepoint_scalar =
            w * (proof.t_x - a * b) + c * (delta(n, m, &y, &z) - proof.t_x);

        let scalars: Vec<JubjubScalar> = iter::once(JubjubScalar::one())
            .chain(iter::once(x))
            .chain(iter::once(c * x))
            .chain(iter::once(c * x * x))
            .chain(x_sq.iter().copied())
            .chain(x_inv_sq.iter().copied())
            .chain(iter::once(-proof.e_blinding - c * proof.t_x_blinding))
            .chain(iter::once(basepoint_scalar))
            .chain(g)
            .chain(h)
            .chain(value_commitment_scalars)
            .collect();

        let proof_points: Vec<JubjubPoint> = [proof.A, proof.S, proof.T_1, proof.T_2]
            .into_iter()
            .chain(proof.ipp_proof.L_vec.iter().copied())
            .chain(proof.ipp_proof.R_vec.iter().copied())
            .collect();
        let commitment_points: Vec<JubjubPoint> = commitments.iter().map(|V| *V.point()).collect();

        let (B, B_blinding) = pedersen_gens().affine();
        let bases: Vec<EdwardsAffine> = JubjubPoint::normalize_batch(&proof_points)
            .into_iter()
            .chain(iter::once(B_blinding))
            .chain(iter::once(B))
            .chain(bulletproof_gens().g(n, m))
            .chain(bulletproof_gens().h(n, m))
            .chain(JubjubPoint::normalize_batch(&commitment_points))
            .collect();

        if bases.len() != scalars.len() {
            return Err(BulletproofsError::VerificationError);
        }

        let mega_check = msm(&bases, &scalars);
        if mega_check.is_zero() {
            Ok(())
        } else {
            Err(BulletproofsError::VerificationError)
        }
    }

    /// Number of amounts `proof` claims to cover, read from its round count.
    ///
    /// Does not verify anything. `None` when the round count does not match
    /// `log2(bits * m)` for a supported `m`.
    pub fn amount_count(&self, proof: &RangeProof) -> Option<usize> {
        let lg_bits = log2_exact(self.bits)?;
        let lg_max = log2_exact(self.max_aggregation)?;
        let rounds = proof.rounds();
        if rounds < lg_bits || rounds - lg_bits > lg_max {
            return None;
        }
        Some(1 << (rounds - lg_bits))
    }
}

/// Compute
/// \\[
/// \delta(y,z) = (z - z^{2}) \langle \mathbf{1}, {\mathbf{y}}^{n \cdot m} \rangle - \sum_{j=0}^{m-1} z^{j+3} \cdot \langle \mathbf{1}, {\mathbf{2}}^{n \cdot m} \rangle
/// \\]
fn delta(n: usize, m: usize, y: &JubjubScalar, z: &JubjubScalar) -> JubjubScalar {
    let sum_y = sum_of_powers(y, n * m);
    let sum_2 = sum_of_powers(&JubjubScalar::from(2u64), n);
    let sum_z = sum_of_powers(z, m);

    (*z - *z * z) * sum_y - *z * z * z * sum_2 * sum_z
}

/// Prove with the default 64-bit engine
pub fn prove(amounts: &[u64], masks: &[Mask]) -> Result<RangeProof, BulletproofsError> {
    RangeProofEngine::default().prove(amounts, masks)
}

/// Verify with the default 64-bit engine
pub fn verify(proof: &RangeProof, commitments: &[PedersenCommitment]) -> bool {
    RangeProofEngine::default().verify(proof, commitments)
}

/// Structural amount count under the default 64-bit engine
pub fn amount_count(proof: &RangeProof) -> Option<usize> {
    RangeProofEngine::default().amount_count(proof)
}
