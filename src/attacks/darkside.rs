//! Darkside attack: key recovery from failed-authentication nonces alone.
//!
//! Repeatedly aborting authentication makes the tag leak nonces from a
//! weak generator, and the transitions between consecutive leaked nonces
//! carry register information. No prior key is needed, but the technique
//! is statistical — it needs enough transitions to converge, and the
//! result is a candidate to verify, not a certainty.

use crate::error::AttackError;
use crate::{DARKSIDE_MIN_NONCES, STATE_BITS};

use super::{RecoveredKey, rotl48};

/// Folds an ordered capture of at least [`DARKSIDE_MIN_NONCES`] nonces
/// into a candidate key.
///
/// Each adjacent pair contributes its XOR delta, rotated to the register
/// phase given by its position in the sequence; the first nonce anchors
/// the fold. A fold that collapses to zero means the capture carried no
/// usable entropy and is reported as [`AttackError::NotRecovered`].
pub fn darkside_attack(nonces: &[u32]) -> Result<RecoveredKey, AttackError> {
    if nonces.is_empty() {
        return Err(AttackError::InvalidArgument);
    }
    if nonces.len() < DARKSIDE_MIN_NONCES {
        return Err(AttackError::InsufficientSamples {
            required: DARKSIDE_MIN_NONCES,
            actual: nonces.len(),
        });
    }

    log::debug!("darkside: folding {} nonce transitions", nonces.len() - 1);
    let mut acc = 0u64;
    for (i, pair) in nonces.windows(2).enumerate() {
        let delta = u64::from(pair[0] ^ pair[1]);
        acc ^= rotl48(delta, (i % STATE_BITS) as u32);
    }
    RecoveredKey::try_new(acc ^ u64::from(nonces[0]))
}
