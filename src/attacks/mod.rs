//! Key-recovery attacks over captured authentication nonces.
//!
//! Each attack is one synchronous call: it validates its input, reduces
//! the nonce sequence to a candidate, and either reports exactly one
//! recovered key or a typed failure. Calls are not resumable; a retry
//! must re-supply the full nonce sequence. Progress and results go to the
//! reporting layer through `log`.

use core::fmt;

use crate::error::AttackError;
use crate::prng::validate_prng_nonce;
use crate::{DARKSIDE_MIN_NONCES, FALLBACK_MIN_NONCES, STATE_BITS, STATE_MASK};

mod darkside;
mod nested;

pub use darkside::darkside_attack;
pub use nested::nested_attack;

/// A 48-bit key produced by an attack.
///
/// Never zero: the zero candidate is reported as
/// [`AttackError::NotRecovered`] instead. Displays as exactly 12 hex
/// digits. Recovered keys are best-effort — verify against fresh traffic
/// before trusting one.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RecoveredKey(u64);

impl RecoveredKey {
    /// The key value in the low 48 bits.
    pub fn value(self) -> u64 {
        self.0
    }

    pub(crate) fn try_new(candidate: u64) -> Result<Self, AttackError> {
        let candidate = candidate & STATE_MASK;
        if candidate == 0 {
            Err(AttackError::NotRecovered)
        } else {
            Ok(Self(candidate))
        }
    }
}

impl fmt::Display for RecoveredKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:012x}", self.0)
    }
}

/// Rotates the low 48 bits of `x` left by `n` positions.
pub(crate) fn rotl48(x: u64, n: u32) -> u64 {
    let n = n % STATE_BITS as u32;
    (x << n | x >> (STATE_BITS as u32 - n)) & STATE_MASK
}

/// Attempts key recovery from nonces alone, choosing the fastest
/// applicable method.
///
/// With [`DARKSIDE_MIN_NONCES`] or more samples this is exactly the
/// darkside attack. Below that it runs the slower statistical fallback,
/// which needs at least [`FALLBACK_MIN_NONCES`] nonces and fails with
/// [`AttackError::NotRecovered`] when the votes do not converge. The
/// darkside path is never entered below its minimum.
pub fn recover_key(nonces: &[u32]) -> Result<RecoveredKey, AttackError> {
    if nonces.is_empty() {
        return Err(AttackError::InvalidArgument);
    }
    let weak = nonces.iter().filter(|&&n| validate_prng_nonce(n)).count();
    log::debug!(
        "cracking {} nonces, {weak} with weak-generator shape",
        nonces.len()
    );

    let result = if nonces.len() >= DARKSIDE_MIN_NONCES {
        darkside_attack(nonces)
    } else {
        statistical_fallback(nonces)
    };
    match &result {
        Ok(key) => log::info!("key recovered: {key}"),
        Err(err) => log::warn!("key recovery failed: {err}"),
    }
    result
}

/// Expands a 32-bit nonce over the 48-bit key space for voting.
fn expand(nonce: u32) -> u64 {
    (u64::from(nonce) << 16 | u64::from(nonce >> 16)) & STATE_MASK
}

/// Bitwise majority vote across the expanded nonces. Every key bit needs
/// a two-thirds quorum; one undecided position fails the whole attack.
fn statistical_fallback(nonces: &[u32]) -> Result<RecoveredKey, AttackError> {
    let len = nonces.len();
    if len < FALLBACK_MIN_NONCES {
        return Err(AttackError::InsufficientSamples {
            required: FALLBACK_MIN_NONCES,
            actual: len,
        });
    }
    let mut key = 0u64;
    for bit in 0..STATE_BITS {
        let ones = nonces.iter().filter(|&&n| expand(n) >> bit & 1 == 1).count();
        let zeros = len - ones;
        if ones * 3 >= len * 2 {
            key |= 1 << bit;
        } else if zeros * 3 < len * 2 {
            log::debug!("fallback: bit {bit} undecided after {len} votes");
            return Err(AttackError::NotRecovered);
        }
    }
    RecoveredKey::try_new(key)
}

#[cfg(test)]
mod tests {
    use super::*;

    extern crate alloc;
    use alloc::format;
    use alloc::vec::Vec;

    #[test]
    fn empty_input_is_rejected() {
        assert_eq!(recover_key(&[]), Err(AttackError::InvalidArgument));
    }

    #[test]
    fn dispatcher_routes_to_darkside_at_threshold() {
        let nonces = [0x1234_5678u32; DARKSIDE_MIN_NONCES];
        assert_eq!(recover_key(&nonces), darkside_attack(&nonces));

        let mut x = 0x0123u32;
        let varied: Vec<u32> = (0..24)
            .map(|_| {
                x = x.wrapping_mul(1664525).wrapping_add(1013904223);
                x
            })
            .collect();
        assert_eq!(recover_key(&varied), darkside_attack(&varied));
    }

    #[test]
    fn dispatcher_below_threshold_never_darksides() {
        // 19 identical nonces: darkside would recover the nonce value,
        // the fallback sees unanimous votes for its expansion instead.
        let nonces = [0xDEAD_BEEFu32; 19];
        let key = recover_key(&nonces).unwrap();
        assert_eq!(key.value(), 0xDEAD_BEEF_DEAD);
        assert_ne!(Ok(key), darkside_attack(&nonces[..]));
    }

    #[test]
    fn dispatcher_propagates_fallback_minimum() {
        let nonces = [0xDEAD_BEEFu32; 7];
        assert_eq!(
            recover_key(&nonces),
            Err(AttackError::InsufficientSamples {
                required: FALLBACK_MIN_NONCES,
                actual: 7,
            })
        );
    }

    #[test]
    fn fallback_unanimous_votes_recover() {
        let key = statistical_fallback(&[0xDEAD_BEEFu32; 8]).unwrap();
        assert_eq!(key.value(), 0xDEAD_BEEF_DEAD);
    }

    #[test]
    fn fallback_split_votes_fail() {
        let mut nonces = [0x0000_0001u32; 8];
        nonces[4..].fill(0xFFFF_FFFE);
        assert_eq!(
            statistical_fallback(&nonces),
            Err(AttackError::NotRecovered)
        );
    }

    #[test]
    fn fallback_never_reports_the_zero_key() {
        assert_eq!(
            statistical_fallback(&[0u32; 8]),
            Err(AttackError::NotRecovered)
        );
    }

    #[test]
    fn recovered_key_displays_twelve_hex_digits() {
        let key = RecoveredKey::try_new(0x0000_1234_5678).unwrap();
        assert_eq!(format!("{key}"), "000012345678");
    }

    #[test]
    fn rotl48_wraps_within_the_register() {
        assert_eq!(rotl48(1, 0), 1);
        assert_eq!(rotl48(1, 48), 1);
        assert_eq!(rotl48(1 << 47, 1), 1);
        assert_eq!(rotl48(0xABC, 4), 0xABC0);
        assert_eq!(rotl48(STATE_MASK, 17), STATE_MASK);
    }
}
