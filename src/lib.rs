//! Crypto1 — the MIFARE Classic stream cipher and its key-recovery attacks.
//!
//! The cipher is a 48-bit LFSR clocked one bit at a time: a linear feedback
//! tap set drives the register and a nonlinear filter tap set produces the
//! keystream. The pure-keystream mode is also exposed through the `cipher`
//! crate traits, so the wrapper type can be used like any other stream
//! cipher. On top of the cipher sit three recovery routines that consume
//! captured authentication nonces: the nested attack (bootstrapped from a
//! key already known for another sector), the darkside attack (no prior
//! key), and a dispatcher that routes between them.
//!
//! Crypto1 is cryptographically broken; this crate exists for analyzing
//! and auditing deployments of it, not for protecting anything.

#![no_std]

pub use cipher; // Re-export cipher crate for downstream users

// --- Cipher Parameters ---

/// Width of the shift register in bits.
pub const STATE_BITS: usize = 48;

/// Mask confining a register value to its 48 significant bits.
pub const STATE_MASK: u64 = (1 << STATE_BITS) - 1;

/// Bit positions feeding the nonlinear output filter: every odd position
/// from 9 through 47.
pub const FILTER_TAPS: [u32; 20] = [
    9, 11, 13, 15, 17, 19, 21, 23, 25, 27, 29, 31, 33, 35, 37, 39, 41, 43, 45, 47,
];

/// Bit positions of the linear feedback polynomial.
pub const FEEDBACK_TAPS: [u32; 18] = [
    0, 5, 9, 10, 12, 14, 15, 17, 19, 24, 25, 27, 29, 35, 39, 41, 42, 43,
];

// --- Attack Parameters ---

/// Fewest nonces the nested attack will accept.
pub const NESTED_MIN_NONCES: usize = 2;

/// Fewest nonces the darkside attack will accept; below this the
/// transition statistics do not converge.
pub const DARKSIDE_MIN_NONCES: usize = 20;

/// Fewest nonces the statistical fallback will accept.
pub const FALLBACK_MIN_NONCES: usize = 8;

// --- Core Cipher Logic ---

pub(crate) mod core;

// --- Software Backend ---
pub(crate) mod backends;

// --- Bit Functions, PRNG, Errors, Attacks ---

mod attacks;
mod error;
mod filter;
mod prng;

pub use crate::attacks::{RecoveredKey, darkside_attack, nested_attack, recover_key};
pub use crate::core::{Crypto1, Crypto1Core};
pub use crate::error::AttackError;
pub use crate::filter::{feedback, filter};
pub use crate::prng::{prng_successor, validate_prng_nonce};

// --- Convenience Type Alias for Users ---

/// Crypto1 in pure keystream mode behind the `cipher` traits. The 4-byte
/// IV is the card nonce, folded through the feedback path at setup.
pub type Crypto1Cipher = cipher::StreamCipherCoreWrapper<Crypto1Core>;

// --- Tests ---
#[cfg(test)]
mod tests {
    use super::{Crypto1, Crypto1Cipher};
    use cipher::{KeyIvInit, StreamCipher};

    #[test]
    fn wrapper_matches_inherent_keystream() {
        let key = [0xA0u8, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
        let iv = [0u8; 4];
        let mut cipher = Crypto1Cipher::new(&key.into(), &iv.into());
        let mut buf = [0u8; 8];
        cipher.apply_keystream(&mut buf);

        let mut inner = Crypto1::new(0xA0A1_A2A3_A4A5);
        inner.word(0, true);
        let mut expected = [0u8; 8];
        for b in expected.iter_mut() {
            *b = inner.byte(0, false);
        }
        assert_eq!(buf, expected);
    }

    #[test]
    fn wrapper_keystream_snapshot() {
        let key = [0xA0u8, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
        let iv = [0u8; 4];
        let mut cipher = Crypto1Cipher::new(&key.into(), &iv.into());
        let mut buf = [0u8; 4];
        cipher.apply_keystream(&mut buf);
        assert_eq!(buf, [0x69, 0xC0, 0x81, 0x1D]);
    }

    #[test]
    fn wrapper_encryption_decryption() {
        let key = [0x01u8, 0x23, 0x45, 0x67, 0x89, 0xAB];
        let iv = [0xDEu8, 0xAD, 0xBE, 0xEF];
        let mut plaintext = *b"crypto1 keystream roundtrip";
        let original = plaintext;

        let mut cipher = Crypto1Cipher::new(&key.into(), &iv.into());
        cipher.apply_keystream(&mut plaintext);
        assert_ne!(original, plaintext);

        let mut cipher = Crypto1Cipher::new(&key.into(), &iv.into());
        cipher.apply_keystream(&mut plaintext);
        assert_eq!(original, plaintext);
    }

    #[test]
    fn wrapper_distinct_ivs_diverge() {
        let key = [0xA0u8, 0xA1, 0xA2, 0xA3, 0xA4, 0xA5];
        let mut a = [0u8; 16];
        let mut b = [0u8; 16];
        Crypto1Cipher::new(&key.into(), &[0u8; 4].into()).apply_keystream(&mut a);
        Crypto1Cipher::new(&key.into(), &[1u8, 0, 0, 0].into()).apply_keystream(&mut b);
        assert_ne!(a, b);
    }
}
