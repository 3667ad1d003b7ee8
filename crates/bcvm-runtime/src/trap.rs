//! Trap message protocol between host functions, the runtime, and the
//! invocation pipeline.
//!
//! The runtime surfaces every abortive condition as an error whose flattened
//! message text is the only portable channel, so host functions emit fixed
//! strings and the decoder dispatches on substrings. The strings `"revert"`
//! and `"finish"` are reserved: no host function other than the revert and
//! finish thunks may emit a message containing them.

use thiserror::Error;

pub(crate) const OUT_OF_GAS: &str = "Out of gas.";
pub(crate) const NEGATIVE_GAS: &str = "Negative gas supplied.";
pub(crate) const REVERT: &str = "revert";
pub(crate) const FINISH: &str = "finish";
pub(crate) const MEMORY_ACCESS: &str = "memory access";
pub(crate) const UNREACHABLE: &str = "unreachable";
pub(crate) const STACK_EXHAUSTED: &str = "stack exhausted";

/// Trap raised by a host function to end or fail the current guest call.
///
/// The `Display` text of each variant is part of the wire protocol with the
/// decoder; see the module docs.
#[derive(Debug, Error)]
pub(crate) enum HostTrap {
    /// Clean termination requested by the guest.
    #[error("finish")]
    Finish,
    /// Rollback requested by the guest; the return buffer is delivered.
    #[error("revert")]
    Revert,
    #[error("Out of gas.")]
    OutOfGas,
    #[error("Negative gas supplied.")]
    NegativeGas,
    /// Guest-supplied offset/length fell outside linear memory or a host
    /// buffer.
    #[error("out of bounds memory access (offset {offset}, length {length})")]
    MemoryAccess { offset: u64, length: u64 },
    /// Host-side precondition failure with no dedicated decoding. The text
    /// must not contain any reserved substring.
    #[error("{0}")]
    Aborted(String),
}

impl HostTrap {
    pub(crate) fn kind(&self) -> TrapKind {
        match self {
            HostTrap::Finish => TrapKind::Success,
            HostTrap::Revert => TrapKind::Revert,
            HostTrap::OutOfGas => TrapKind::OutOfGas,
            HostTrap::MemoryAccess { .. } => TrapKind::InvalidMemoryAccess,
            HostTrap::NegativeGas | HostTrap::Aborted(_) => TrapKind::Unknown,
        }
    }
}

/// Decoded trap classification; `StackExhausted` is folded into the public
/// `Unreachable` status by the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TrapKind {
    Success,
    Revert,
    OutOfGas,
    Unreachable,
    StackExhausted,
    InvalidMemoryAccess,
    Unknown,
}

/// Classify a trap message. First match wins.
pub(crate) fn decode(message: &str) -> TrapKind {
    if message.contains(OUT_OF_GAS) {
        TrapKind::OutOfGas
    } else if message.contains(STACK_EXHAUSTED) {
        TrapKind::StackExhausted
    } else if message.contains(UNREACHABLE) {
        TrapKind::Unreachable
    } else if message.contains(MEMORY_ACCESS) {
        TrapKind::InvalidMemoryAccess
    } else if message.contains(REVERT) {
        TrapKind::Revert
    } else if message.contains(FINISH) {
        TrapKind::Success
    } else {
        TrapKind::Unknown
    }
}

/// Flatten an error chain into one decodable line.
pub(crate) fn flatten(error: &anyhow::Error) -> String {
    format!("{error:#}")
}
