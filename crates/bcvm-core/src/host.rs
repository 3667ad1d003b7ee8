//! Host-side capability surface consumed by the engine.
//!
//! The engine decodes guest arguments, enforces gas and memory bounds, and
//! then delegates every blockchain-visible effect to a [`HostContext`]. The
//! behavioral contract of each operation (consistency, persistence, charging
//! for child calls) belongs to the implementation behind this trait.

use crate::types::{Address, HashAlgorithm};

/// Kind of a cross-contract call issued through the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallMode {
    Call,
    CallCode,
    DelegateCall,
    StaticCall,
}

/// Result code of a cross-contract call or create, as seen by the guest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Success,
    Failure,
    Revert,
}

impl CallStatus {
    /// Wire representation returned to the guest.
    pub fn code(self) -> i32 {
        match self {
            CallStatus::Success => 0,
            CallStatus::Failure => 1,
            CallStatus::Revert => 2,
        }
    }
}

/// Outcome of a cross-contract call.
#[derive(Debug, Clone)]
pub struct CallOutcome {
    pub status: CallStatus,
    pub return_data: Vec<u8>,
    /// Gas consumed by the callee, charged against the caller's budget.
    pub gas_used: i64,
}

impl CallOutcome {
    pub fn success(return_data: Vec<u8>) -> Self {
        Self {
            status: CallStatus::Success,
            return_data,
            gas_used: 0,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: CallStatus::Failure,
            return_data: Vec::new(),
            gas_used: 0,
        }
    }
}

/// Outcome of a contract creation.
#[derive(Debug, Clone)]
pub struct CreateOutcome {
    pub status: CallStatus,
    pub address: Option<Address>,
    pub return_data: Vec<u8>,
    pub gas_used: i64,
}

impl CreateOutcome {
    pub fn success(address: Address) -> Self {
        Self {
            status: CallStatus::Success,
            address: Some(address),
            return_data: Vec::new(),
            gas_used: 0,
        }
    }

    pub fn failure() -> Self {
        Self {
            status: CallStatus::Failure,
            address: None,
            return_data: Vec::new(),
            gas_used: 0,
        }
    }
}

/// Blockchain state and environment exposed to executing contracts.
///
/// Implementations must be shareable across the engine's worker threads;
/// within a single invocation all calls arrive in guest issue order.
pub trait HostContext: Send + Sync + 'static {
    /// Hash algorithm the chain runs with; compared against the contract's
    /// `hash_type` export during deployment.
    fn active_hash_algorithm(&self) -> HashAlgorithm;

    /// Read a storage value for the executing contract. Missing keys read
    /// as an empty value.
    fn get_storage(&self, key: &[u8]) -> Vec<u8>;

    fn set_storage(&self, key: &[u8], value: &[u8]);

    fn get_balance(&self, address: &Address) -> u128;

    /// Deployed code of an arbitrary account; empty for non-contracts.
    fn get_code(&self, address: &Address) -> Vec<u8>;

    fn get_code_size(&self, address: &Address) -> u32;

    /// Hash of a past block, if still available.
    fn get_block_hash(&self, number: i64) -> Option<[u8; 32]>;

    fn block_number(&self) -> i64;

    fn block_timestamp(&self) -> i64;

    fn block_coinbase(&self) -> Address;

    fn block_difficulty(&self) -> [u8; 32];

    fn block_gas_limit(&self) -> i64;

    fn tx_gas_price(&self) -> u128;

    fn tx_origin(&self) -> Address;

    /// Emit a log record with up to four 32-byte topics.
    fn log(&self, topics: &[[u8; 32]], data: &[u8]);

    /// Dispatch a nested call to another contract.
    fn call(
        &self,
        mode: CallMode,
        gas: i64,
        to: &Address,
        value: u128,
        input: &[u8],
    ) -> CallOutcome;

    /// Deploy a new contract from within the guest.
    fn create(&self, value: u128, code: &[u8]) -> CreateOutcome;

    /// Schedule destruction of the executing contract, crediting the
    /// beneficiary. Execution still terminates through the engine.
    fn self_destruct(&self, beneficiary: &Address);

    // Asset ledger operations (bcos namespace).

    fn register_asset(
        &self,
        name: &[u8],
        issuer: &Address,
        fungible: bool,
        total: u64,
        description: &[u8],
    ) -> bool;

    fn issue_fungible_asset(&self, to: &Address, name: &[u8], amount: u64) -> bool;

    /// Returns the id of the newly minted token, or 0 on failure.
    fn issue_not_fungible_asset(&self, to: &Address, name: &[u8], uri: &[u8]) -> u64;

    fn transfer_asset(&self, to: &Address, name: &[u8], amount_or_id: u64, from_self: bool)
        -> bool;

    fn get_asset_balance(&self, account: &Address, name: &[u8]) -> u64;

    fn get_not_fungible_asset_ids(&self, account: &Address, name: &[u8]) -> Vec<u64>;

    /// URI attached to one non-fungible token, if it exists.
    fn get_not_fungible_asset_info(
        &self,
        account: &Address,
        name: &[u8],
        asset_id: u64,
    ) -> Option<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn call_status_codes() {
        assert_eq!(CallStatus::Success.code(), 0);
        assert_eq!(CallStatus::Failure.code(), 1);
        assert_eq!(CallStatus::Revert.code(), 2);
    }
}
