//! Cipher state and lifecycle: init, bit-serial stepping, byte/word
//! composition, and the `cipher` trait glue for pure keystream mode.

use cipher::{
    BlockSizeUser, Iv, IvSizeUser, Key, KeyIvInit, KeySizeUser, StreamCipherCore, StreamClosure,
    consts::{U1, U4, U6},
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::STATE_MASK;
use crate::backends;
use crate::filter::{feedback, filter};

/// One Crypto1 session: the 48-bit shift register.
///
/// A session is created from a key, advanced one bit per [`step`](Self::step),
/// and dropped when the authentication or attack flow ends. It is owned by
/// exactly one flow; run parallel sessions on separate instances. The
/// register is wiped on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Crypto1 {
    state: u64,
}

impl Crypto1 {
    /// Initializes a session from a key; only the low 48 bits are kept.
    pub fn new(key: u64) -> Self {
        Self {
            state: key & STATE_MASK,
        }
    }

    /// Current register contents, always below 2^48.
    pub fn state(&self) -> u64 {
        self.state
    }

    /// Clocks the register once and returns the keystream bit.
    ///
    /// The returned bit is the filter output of the register *before* the
    /// update. The feedback bit absorbs `input & 1` only when
    /// `is_encrypted` is set — the mode where ciphertext bits from the
    /// exchange are fed back into the register. The register then shifts
    /// left by one, takes the feedback bit at position 0, and is masked
    /// back to 48 bits.
    pub fn step(&mut self, input: u8, is_encrypted: bool) -> u8 {
        let out = filter(self.state);
        let mut fb = feedback(self.state);
        if is_encrypted {
            fb ^= input & 1;
        }
        self.state = (self.state << 1 | u64::from(fb)) & STATE_MASK;
        out
    }

    /// Clocks the register 8 times, consuming and producing bits LSB-first.
    pub fn byte(&mut self, input: u8, is_encrypted: bool) -> u8 {
        let mut out = 0u8;
        for i in 0..8 {
            out |= self.step(input >> i & 1, is_encrypted) << i;
        }
        out
    }

    /// Clocks the register 32 times, consuming and producing bits LSB-first.
    pub fn word(&mut self, input: u32, is_encrypted: bool) -> u32 {
        let mut out = 0u32;
        for i in 0..32 {
            out |= u32::from(self.step((input >> i & 1) as u8, is_encrypted)) << i;
        }
        out
    }
}

/// The core behind [`Crypto1Cipher`](crate::Crypto1Cipher): keystream-only
/// operation for the traffic phase after authentication.
///
/// The 6-byte key is taken MSB-first, as keys are printed on readers and
/// in dump tools. The 4-byte IV (the card nonce of the session) is folded
/// through the feedback path before any keystream is produced.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Crypto1Core {
    pub(crate) inner: Crypto1,
}

impl KeySizeUser for Crypto1Core {
    type KeySize = U6;
}

impl IvSizeUser for Crypto1Core {
    type IvSize = U4;
}

impl BlockSizeUser for Crypto1Core {
    type BlockSize = U1; // bit-serial cipher, one keystream byte per block
}

impl KeyIvInit for Crypto1Core {
    fn new(key: &Key<Self>, iv: &Iv<Self>) -> Self {
        let key = key.iter().fold(0u64, |acc, &b| acc << 8 | u64::from(b));
        let mut inner = Crypto1::new(key);
        inner.word(u32::from_be_bytes([iv[0], iv[1], iv[2], iv[3]]), true);
        Self { inner }
    }
}

impl StreamCipherCore for Crypto1Core {
    fn remaining_blocks(&self) -> Option<usize> {
        None
    }

    fn process_with_backend(&mut self, f: impl StreamClosure<BlockSize = Self::BlockSize>) {
        f.call(&mut backends::soft::Backend(self));
    }
}

// Crypto1 has no block counter, so there is no `StreamCipherSeekCore`:
// reaching a keystream position means clocking the register there.
