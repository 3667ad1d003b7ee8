//! Shared test fixtures: an in-memory host context and WAT contracts.

use bcvm_core::{Address, CallMode, CallOutcome, CreateOutcome, HashAlgorithm, HostContext};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;

pub(crate) fn compile_wat(source: &str) -> Vec<u8> {
    wat::parse_str(source).expect("valid wat fixture")
}

/// Smallest contract the validator accepts: both entry points finish with an
/// empty payload, built against Keccak-256.
pub(crate) const MINIMAL_CONTRACT: &str = r#"
    (module
      (import "bcos" "finish" (func $finish (param i32 i32)))
      (memory (export "memory") 1)
      (func (export "hash_type") (result i32) i32.const 0)
      (func (export "deploy") i32.const 0 i32.const 0 call $finish)
      (func (export "main") i32.const 0 i32.const 0 call $finish))
"#;

type AssetKey = (Address, Vec<u8>);

/// In-memory blockchain host recording every effect for assertions.
pub(crate) struct MockHost {
    hash_algorithm: HashAlgorithm,
    storage: RwLock<HashMap<Vec<u8>, Vec<u8>>>,
    balances: RwLock<HashMap<Address, u128>>,
    codes: RwLock<HashMap<Address, Vec<u8>>>,
    logs: Mutex<Vec<(Vec<[u8; 32]>, Vec<u8>)>>,
    calls: Mutex<Vec<(CallMode, Address, Vec<u8>)>>,
    call_response: Mutex<CallOutcome>,
    create_address: Mutex<Option<Address>>,
    self_destructs: Mutex<Vec<Address>>,
    registered_assets: RwLock<HashMap<Vec<u8>, bool>>,
    asset_balances: RwLock<HashMap<AssetKey, u64>>,
    nft_uris: RwLock<HashMap<(AssetKey, u64), Vec<u8>>>,
}

impl MockHost {
    pub(crate) const BLOCK_NUMBER: i64 = 1024;
    pub(crate) const BLOCK_TIMESTAMP: i64 = 1_700_000_000;
    pub(crate) const BLOCK_GAS_LIMIT: i64 = 30_000_000;

    fn new(hash_algorithm: HashAlgorithm) -> Arc<Self> {
        Arc::new(Self {
            hash_algorithm,
            storage: RwLock::new(HashMap::new()),
            balances: RwLock::new(HashMap::new()),
            codes: RwLock::new(HashMap::new()),
            logs: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
            call_response: Mutex::new(CallOutcome::success(Vec::new())),
            create_address: Mutex::new(None),
            self_destructs: Mutex::new(Vec::new()),
            registered_assets: RwLock::new(HashMap::new()),
            asset_balances: RwLock::new(HashMap::new()),
            nft_uris: RwLock::new(HashMap::new()),
        })
    }

    pub(crate) fn keccak() -> Arc<Self> {
        Self::new(HashAlgorithm::Keccak256)
    }

    pub(crate) fn sm3() -> Arc<Self> {
        Self::new(HashAlgorithm::Sm3)
    }

    pub(crate) fn storage_value(&self, key: &[u8]) -> Vec<u8> {
        self.storage.read().get(key).cloned().unwrap_or_default()
    }

    pub(crate) fn recorded_logs(&self) -> Vec<(Vec<[u8; 32]>, Vec<u8>)> {
        self.logs.lock().clone()
    }

    pub(crate) fn recorded_calls(&self) -> Vec<(CallMode, Address, Vec<u8>)> {
        self.calls.lock().clone()
    }

    pub(crate) fn recorded_self_destructs(&self) -> Vec<Address> {
        self.self_destructs.lock().clone()
    }

    pub(crate) fn set_call_response(&self, outcome: CallOutcome) {
        *self.call_response.lock() = outcome;
    }

    pub(crate) fn set_create_address(&self, address: Address) {
        *self.create_address.lock() = Some(address);
    }

    pub(crate) fn seed_nft(&self, owner: &Address, name: &[u8], id: u64, uri: &[u8]) {
        self.nft_uris
            .write()
            .insert(((*owner, name.to_vec()), id), uri.to_vec());
    }
}

impl HostContext for MockHost {
    fn active_hash_algorithm(&self) -> HashAlgorithm {
        self.hash_algorithm
    }

    fn get_storage(&self, key: &[u8]) -> Vec<u8> {
        self.storage_value(key)
    }

    fn set_storage(&self, key: &[u8], value: &[u8]) {
        self.storage.write().insert(key.to_vec(), value.to_vec());
    }

    fn get_balance(&self, address: &Address) -> u128 {
        self.balances.read().get(address).copied().unwrap_or(0)
    }

    fn get_code(&self, address: &Address) -> Vec<u8> {
        self.codes.read().get(address).cloned().unwrap_or_default()
    }

    fn get_code_size(&self, address: &Address) -> u32 {
        self.get_code(address).len() as u32
    }

    fn get_block_hash(&self, number: i64) -> Option<[u8; 32]> {
        if (0..Self::BLOCK_NUMBER).contains(&number) {
            Some([number as u8; 32])
        } else {
            None
        }
    }

    fn block_number(&self) -> i64 {
        Self::BLOCK_NUMBER
    }

    fn block_timestamp(&self) -> i64 {
        Self::BLOCK_TIMESTAMP
    }

    fn block_coinbase(&self) -> Address {
        Address([0x0c; 20])
    }

    fn block_difficulty(&self) -> [u8; 32] {
        let mut difficulty = [0u8; 32];
        difficulty[31] = 1;
        difficulty
    }

    fn block_gas_limit(&self) -> i64 {
        Self::BLOCK_GAS_LIMIT
    }

    fn tx_gas_price(&self) -> u128 {
        1
    }

    fn tx_origin(&self) -> Address {
        Address([0x02; 20])
    }

    fn log(&self, topics: &[[u8; 32]], data: &[u8]) {
        self.logs.lock().push((topics.to_vec(), data.to_vec()));
    }

    fn call(
        &self,
        mode: CallMode,
        _gas: i64,
        to: &Address,
        _value: u128,
        input: &[u8],
    ) -> CallOutcome {
        self.calls.lock().push((mode, *to, input.to_vec()));
        self.call_response.lock().clone()
    }

    fn create(&self, _value: u128, _code: &[u8]) -> CreateOutcome {
        match *self.create_address.lock() {
            Some(address) => CreateOutcome::success(address),
            None => CreateOutcome::failure(),
        }
    }

    fn self_destruct(&self, beneficiary: &Address) {
        self.self_destructs.lock().push(*beneficiary);
    }

    fn register_asset(
        &self,
        name: &[u8],
        _issuer: &Address,
        fungible: bool,
        _total: u64,
        _description: &[u8],
    ) -> bool {
        self.registered_assets
            .write()
            .insert(name.to_vec(), fungible)
            .is_none()
    }

    fn issue_fungible_asset(&self, to: &Address, name: &[u8], amount: u64) -> bool {
        if !self.registered_assets.read().contains_key(name) {
            return false;
        }
        *self
            .asset_balances
            .write()
            .entry((*to, name.to_vec()))
            .or_insert(0) += amount;
        true
    }

    fn issue_not_fungible_asset(&self, to: &Address, name: &[u8], uri: &[u8]) -> u64 {
        let mut uris = self.nft_uris.write();
        let id = uris.len() as u64 + 1;
        uris.insert(((*to, name.to_vec()), id), uri.to_vec());
        id
    }

    fn transfer_asset(
        &self,
        to: &Address,
        name: &[u8],
        amount_or_id: u64,
        _from_self: bool,
    ) -> bool {
        *self
            .asset_balances
            .write()
            .entry((*to, name.to_vec()))
            .or_insert(0) += amount_or_id;
        true
    }

    fn get_asset_balance(&self, account: &Address, name: &[u8]) -> u64 {
        self.asset_balances
            .read()
            .get(&(*account, name.to_vec()))
            .copied()
            .unwrap_or(0)
    }

    fn get_not_fungible_asset_ids(&self, account: &Address, name: &[u8]) -> Vec<u64> {
        let key = (*account, name.to_vec());
        let mut ids = self
            .nft_uris
            .read()
            .keys()
            .filter(|(owner, _)| *owner == key)
            .map(|(_, id)| *id)
            .collect::<Vec<_>>();
        ids.sort_unstable();
        ids
    }

    fn get_not_fungible_asset_info(
        &self,
        account: &Address,
        name: &[u8],
        asset_id: u64,
    ) -> Option<Vec<u8>> {
        self.nft_uris
            .read()
            .get(&((*account, name.to_vec()), asset_id))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_contract_compiles() {
        let code = compile_wat(MINIMAL_CONTRACT);
        assert!(code.starts_with(b"\0asm"));
    }

    #[test]
    fn mock_host_storage_round_trip() {
        let host = MockHost::keccak();
        host.set_storage(b"k", b"v");
        assert_eq!(host.get_storage(b"k"), b"v");
        assert!(host.get_storage(b"missing").is_empty());
    }
}
