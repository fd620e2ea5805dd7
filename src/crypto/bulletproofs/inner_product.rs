#![allow(non_snake_case)]

use ark_ec::CurveGroup;
use ark_ed_on_bls12_381::EdwardsAffine;
use ark_ff::Field;
use merlin::Transcript;

use crate::crypto::bulletproofs::transcript::TranscriptProtocol;
use crate::crypto::bulletproofs::util::{inner_product, msm};
use crate::crypto::errors::BulletproofsError;
use crate::crypto::jubjub::{JubjubPoint, JubjubScalar};

/// Logarithmic-size argument that `c = <a, b>` for committed vectors `a`, `b`
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct InnerProductProof {
    pub(crate) L_vec: Vec<JubjubPoint>,
    pub(crate) R_vec: Vec<JubjubPoint>,
    pub(crate) a: JubjubScalar,
    pub(crate) b: JubjubScalar,
}

impl InnerProductProof {
    /// Prove knowledge of `a`, `b` such that
    /// `P = <a, G> + <b, H> + <a, b> Q`.
    ///
    /// All vectors must share one power-of-two length.
    pub fn create(
        transcript: &mut Transcript,
        Q: &JubjubPoint,
        mut G: Vec<JubjubPoint>,
        mut H: Vec<JubjubPoint>,
        mut a: Vec<JubjubScalar>,
        mut b: Vec<JubjubScalar>,
    ) -> Result<InnerProductProof, BulletproofsError> {
        let mut n = G.len();
        if H.len() != n || a.len() != n || b.len() != n || !n.is_power_of_two() {
            return Err(BulletproofsError::InvalidInputSize(n));
        }

        transcript.innerproduct_domain_sep(n as u64);

        let lg_n = n.trailing_zeros() as usize;
        let mut L_vec = Vec::with_capacity(lg_n);
        let mut R_vec = Vec::with_capacity(lg_n);

        while n != 1 {
            n /= 2;
            let (a_L, a_R) = a.split_at(n);
            let (b_L, b_R) = b.split_at(n);
            let (G_L, G_R) = G.split_at(n);
            let (H_L, H_R) = H.split_at(n);

            let c_L = inner_product(a_L, b_R);
            let c_R = inner_product(a_R, b_L);

            let L = cross_term(G_R, H_L, Q, a_L, b_R, c_L);
            let R = cross_term(G_L, H_R, Q, a_R, b_L, c_R);

            transcript.append_point(b"L", &L);
            transcript.append_point(b"R", &R);
            L_vec.push(L);
            R_vec.push(R);

            let u = transcript.challenge_scalar(b"u");
            let u_inv = u.inverse().ok_or(BulletproofsError::VerificationError)?;

            let a_next: Vec<JubjubScalar> =
                (0..n).map(|i| a_L[i] * u + u_inv * a_R[i]).collect();
            let b_next: Vec<JubjubScalar> =
                (0..n).map(|i| b_L[i] * u_inv + u * b_R[i]).collect();
            let G_next: Vec<JubjubPoint> =
                (0..n).map(|i| G_L[i] * u_inv + G_R[i] * u).collect();
            let H_next: Vec<JubjubPoint> =
                (0..n).map(|i| H_L[i] * u + H_R[i] * u_inv).collect();

            a = a_next;
            b = b_next;
            G = G_next;
            H = H_next;
        }

        Ok(InnerProductProof {
            L_vec,
            R_vec,
            a: a[0],
            b: b[0],
        })
    }

    /// Replay the folding challenges and return `(u_sq, u_inv_sq, s)` so the
    /// caller can fold the whole check into one multiscalar multiplication.
    pub(crate) fn verification_scalars(
        &self,
        n: usize,
        transcript: &mut Transcript,
    ) -> Result<(Vec<JubjubScalar>, Vec<JubjubScalar>, Vec<JubjubScalar>), BulletproofsError> {
        let lg_n = self.L_vec.len();
        if lg_n >= 32 || self.R_vec.len() != lg_n || n != (1 << lg_n) {
            return Err(BulletproofsError::VerificationError);
        }

        transcript.innerproduct_domain_sep(n as u64);

        // Recompute u_k,...,u_1 from the proof transcript
        let mut challenges = Vec::with_capacity(lg_n);
        for (L, R) in self.L_vec.iter().zip(self.R_vec.iter()) {
            transcript.validate_and_append_point(b"L", L)?;
            transcript.validate_and_append_point(b"R", R)?;
            challenges.push(transcript.challenge_scalar(b"u"));
        }

        let mut challenges_inv = challenges.clone();
        ark_ff::batch_inversion(&mut challenges_inv);
        let allinv: JubjubScalar = challenges_inv.iter().product();

        let challenges_sq: Vec<JubjubScalar> = challenges.iter().map(|u| u.square()).collect();
        let challenges_inv_sq: Vec<JubjubScalar> =
            challenges_inv.iter().map(|u| u.square()).collect();

        // s_i is the product of u_j^{+1 or -1} selected by the bits of i
        let mut s = Vec::with_capacity(n);
        s.push(allinv);
        for i in 1..n {
            let lg_i = (usize::BITS - 1 - i.leading_zeros()) as usize;
            let k = 1 << lg_i;
            let u_lg_i_sq = challenges_sq[(lg_n - 1) - lg_i];
            s.push(s[i - k] * u_lg_i_sq);
        }

        Ok((challenges_sq, challenges_inv_sq, s))
    }

    /// Size in bytes of the encoded argument
    pub fn serialized_size(&self) -> usize {
        (self.L_vec.len() * 2 + 2) * 32
    }
}

/// `<a, G> + <b, H> + c Q` for one folding round
fn cross_term(
    G: &[JubjubPoint],
    H: &[JubjubPoint],
    Q: &JubjubPoint,
    a: &[JubjubScalar],
    b: &[JubjubScalar],
    c: JubjubScalar,
) -> JubjubPoint {
    let bases: Vec<JubjubPoint> = G
        .iter()
        .chain(H.iter())
        .chain(std::iter::once(Q))
        .copied()
        .collect();
    let bases: Vec<EdwardsAffine> = JubjubPoint::normalize_batch(&bases);
    let scalars: Vec<JubjubScalar> = a
        .iter()
        .chain(b.iter())
        .chain(std::iter::once(&c))
        .copied()
        .collect();
    msm(&bases, &scalars)
}
