//! Core type definitions for the contract engine.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A 20-byte account address, treated as opaque bytes throughout the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    pub const LENGTH: usize = 20;

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<[u8; 20]> for Address {
    fn from(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x")?;
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

/// How a message enters a contract: constructor or regular call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallKind {
    Create,
    Call,
}

/// Hash algorithm the chain is configured with. Contracts declare the
/// algorithm they were built against through their `hash_type` export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HashAlgorithm {
    Keccak256,
    Sm3,
}

impl HashAlgorithm {
    /// Numeric id as reported by a contract's `hash_type` export.
    pub fn type_id(self) -> i32 {
        match self {
            HashAlgorithm::Keccak256 => 0,
            HashAlgorithm::Sm3 => 1,
        }
    }
}

/// One inbound message to a contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallMessage {
    pub kind: CallKind,
    /// Destination contract address; also the module-cache key.
    pub destination: Address,
    pub caller: Address,
    pub value: u128,
    pub input: Vec<u8>,
    /// Gas budget for this invocation.
    pub gas: i64,
}

impl CallMessage {
    pub fn call(destination: Address, caller: Address, input: Vec<u8>, gas: i64) -> Self {
        Self {
            kind: CallKind::Call,
            destination,
            caller,
            value: 0,
            input,
            gas,
        }
    }

    pub fn create(destination: Address, caller: Address, gas: i64) -> Self {
        Self {
            kind: CallKind::Create,
            destination,
            caller,
            value: 0,
            input: Vec::new(),
            gas,
        }
    }
}

/// Terminal status of one invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecStatus {
    /// Clean return or explicit `finish`.
    Success,
    /// Explicit `revert`; the return buffer is still delivered.
    Revert,
    OutOfGas,
    /// Guest `unreachable` instruction or stack exhaustion.
    Unreachable,
    InvalidMemoryAccess,
    /// Trap the engine could not classify.
    Unknown,
}

/// Outcome of one invocation as surfaced to the embedding VM.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub status: ExecStatus,
    pub gas_left: i64,
    pub return_value: Vec<u8>,
    pub is_revert: bool,
}
