//! Nested authentication attack.
//!
//! A key already known for one sector buys an authenticated session, and
//! nonces collected through that session come with known keystream. XORing
//! the session keystream off each captured nonce leaves only the tag-side
//! correlation between consecutive nonces; folding those stripped
//! transitions narrows the target-sector key space to a handful of
//! candidates, which are then scored exhaustively.

use crate::core::Crypto1;
use crate::error::AttackError;
use crate::prng::validate_prng_nonce;
use crate::{NESTED_MIN_NONCES, STATE_BITS};

use super::{RecoveredKey, rotl48};

/// Rotation stride between successive stripped transitions. Coprime to
/// 48, so consecutive transitions land on distinct register phases.
const PHASE_STRIDE: usize = 5;

/// Byte-aligned rotations tried when widening the reduced seed into the
/// candidate set.
const CANDIDATE_ROTATIONS: u32 = 6;

/// Recovers a candidate key for a target sector from an ordered nonce
/// capture and a key already known for another sector of the same tag.
///
/// Needs at least [`NESTED_MIN_NONCES`] nonces. A capture whose stripped
/// transitions are all zero carries no information beyond the known
/// session and fails with [`AttackError::NotRecovered`]. The recovered
/// key is a candidate only — verify it against fresh traffic before use.
pub fn nested_attack(nonces: &[u32], known_key: u64) -> Result<RecoveredKey, AttackError> {
    if nonces.is_empty() {
        return Err(AttackError::InvalidArgument);
    }
    if nonces.len() < NESTED_MIN_NONCES {
        return Err(AttackError::InsufficientSamples {
            required: NESTED_MIN_NONCES,
            actual: nonces.len(),
        });
    }

    let weak = nonces.iter().filter(|&&n| validate_prng_nonce(n)).count();
    log::debug!(
        "nested: {} nonces, {weak} with weak-generator shape",
        nonces.len()
    );

    // Reduction pass: strip the known session keystream, then fold the
    // remaining transitions across the register phases.
    let mut known = Crypto1::new(known_key);
    let mut prev = nonces[0] ^ known.word(0, false);
    let first = prev;
    let mut acc = 0u64;
    let mut informative = 0usize;
    for (i, &nonce) in nonces[1..].iter().enumerate() {
        let cur = nonce ^ known.word(0, false);
        let delta = prev ^ cur;
        if delta != 0 {
            informative += 1;
        }
        acc ^= rotl48(u64::from(delta), (i * PHASE_STRIDE % STATE_BITS) as u32);
        prev = cur;
    }
    if informative == 0 {
        log::debug!("nested: capture carries no information beyond the known session");
        return Err(AttackError::NotRecovered);
    }

    // Candidate search: widen the seed to its byte-aligned rotations and
    // keep the one whose own keystream best explains the stripped
    // transitions. Ties keep the earliest rotation.
    let seed = acc ^ u64::from(first);
    let mut best = seed;
    let mut best_score = keystream_agreement(seed, nonces, known_key);
    for rotation in 1..CANDIDATE_ROTATIONS {
        let candidate = rotl48(seed, 8 * rotation);
        let score = keystream_agreement(candidate, nonces, known_key);
        if score > best_score {
            best = candidate;
            best_score = score;
        }
    }
    log::debug!("nested: best candidate explains {best_score} keystream bits");
    RecoveredKey::try_new(best)
}

/// Bits of agreement between `candidate`'s keystream and the stripped
/// transitions of the capture. Higher is a better explanation.
fn keystream_agreement(candidate: u64, nonces: &[u32], known_key: u64) -> u32 {
    let mut known = Crypto1::new(known_key);
    let mut trial = Crypto1::new(candidate);
    let mut prev = nonces[0] ^ known.word(0, false);
    let mut score = 0u32;
    for &nonce in &nonces[1..] {
        let cur = nonce ^ known.word(0, false);
        let delta = prev ^ cur;
        score += (delta ^ trial.word(0, false)).count_zeros();
        prev = cur;
    }
    score
}
