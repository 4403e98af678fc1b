//! Attack error taxonomy.

use thiserror::Error;

/// Failure modes of the key-recovery attacks.
///
/// Every attack returns one of these instead of a key; nothing in the
/// crate panics or aborts on bad input. Callers decide whether to retry
/// with more nonces or report the failure upward.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttackError {
    /// The nonce buffer was empty. Rejected before any computation.
    #[error("nonce buffer is empty")]
    InvalidArgument,

    /// Fewer nonces than the selected attack's minimum. Rejected before
    /// any computation; no key is produced.
    #[error("insufficient samples: need at least {required} nonces, got {actual}")]
    InsufficientSamples { required: usize, actual: usize },

    /// The attack ran over valid input but did not converge to a usable
    /// key. Chiefly produced by the statistical fallback path.
    #[error("attack did not converge to a usable key")]
    NotRecovered,
}
