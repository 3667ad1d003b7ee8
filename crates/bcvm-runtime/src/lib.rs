//! WebAssembly execution engine for blockchain smart contracts.
//!
//! This crate provides the host side of contract execution:
//! - Static validation of contract modules against the permitted ABI
//! - A registry of host functions (`bcos`/`ethereum` namespaces) bridging
//!   guest imports to the blockchain [`HostContext`]
//! - A per-contract module cache with a pool of reusable instances
//! - The invocation pipeline with gas metering and trap decoding

mod adapter;
mod memory;
mod pool;
mod registry;
#[cfg(test)]
mod test_support;
mod thunks;
mod trap;
mod validator;

pub use bcvm_core::{
    Address, CallKind, CallMessage, CallMode, CallOutcome, CallStatus, CreateOutcome,
    EngineConfig, EngineError, ExecStatus, ExecutionResult, HashAlgorithm, HostContext, Result,
};

use adapter::HostAdapter;
use parking_lot::RwLock;
use pool::{InstancePool, InstanceState};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;
use trap::TrapKind;
use wasmtime::{Config, Engine, Module};

/// The contract execution engine exposed to the embedding VM.
///
/// Holds the wasm engine and the per-address module cache; one value is
/// shared by all worker threads of the node.
pub struct ContractEngine {
    engine: Engine,
    cache: RwLock<HashMap<Address, Arc<InstancePool>>>,
}

impl ContractEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let mut wasm_config = Config::new();
        wasm_config.max_wasm_stack(config.max_wasm_stack);
        let engine = Engine::new(&wasm_config)
            .map_err(|e| EngineError::Engine(format!("failed to create engine: {e:#}")))?;
        Ok(Self {
            engine,
            cache: RwLock::new(HashMap::new()),
        })
    }

    /// Statically check a contract's exports and imports against the ABI.
    pub fn verify_contract(&self, code: &[u8]) -> Result<()> {
        let module = Module::new(&self.engine, code)
            .map_err(|e| EngineError::ContractValidation(format!("Compile wasm failed, {e:#}")))?;
        validator::verify_module(&module)
    }

    /// Execute one message against a contract.
    ///
    /// Validation, instantiation, and hash-type failures come back as
    /// errors; every trap raised while the guest runs is decoded into the
    /// `status` of the returned result.
    pub fn execute(
        &self,
        host: Arc<dyn HostContext>,
        code: &[u8],
        message: &CallMessage,
        meter_gas: bool,
    ) -> Result<ExecutionResult> {
        debug!(
            destination = %message.destination,
            kind = ?message.kind,
            gas = message.gas,
            "executing contract"
        );
        let pool = self.pool_for(message.destination, code)?;
        let reserved = pool.reserve()?;
        let mut state = reserved.state();
        let expected_hash = host.active_hash_algorithm();
        let adapter = HostAdapter::new(host, code, message, meter_gas);
        run_call(&mut state, adapter, expected_hash, message, code)
    }

    fn pool_for(&self, address: Address, code: &[u8]) -> Result<Arc<InstancePool>> {
        if let Some(pool) = self.cache.read().get(&address) {
            return Ok(pool.clone());
        }
        debug!(%address, "compiling contract module");
        let module = Module::new(&self.engine, code)
            .map_err(|e| EngineError::ContractValidation(format!("Compile wasm failed, {e:#}")))?;
        let pool = Arc::new(InstancePool::new(self.engine.clone(), module)?);
        // Concurrent first calls may both compile; the first writer wins and
        // the loser's pool is dropped.
        Ok(self.cache.write().entry(address).or_insert(pool).clone())
    }

    #[cfg(test)]
    fn pool_size(&self, address: &Address) -> usize {
        self.cache
            .read()
            .get(address)
            .map(|pool| pool.len())
            .unwrap_or(0)
    }
}

/// Run the entry point with the adapter installed in the instance's slot,
/// then translate the outcome.
fn run_call(
    state: &mut InstanceState,
    adapter: HostAdapter,
    expected_hash: HashAlgorithm,
    message: &CallMessage,
    code: &[u8],
) -> Result<ExecutionResult> {
    state.store.data_mut().adapter = Some(adapter);
    let outcome = dispatch(state, message.kind, expected_hash);
    let Some(adapter) = state.store.data_mut().adapter.take() else {
        return Err(EngineError::Engine(
            "adapter slot was cleared during the call".to_string(),
        ));
    };
    let trap = outcome?;

    let kind = match trap {
        None => TrapKind::Success,
        Some(error) => {
            let text = trap::flatten(&error);
            let kind = adapter.trap_status.unwrap_or_else(|| trap::decode(&text));
            debug!(message = %text, ?kind, "guest trapped");
            kind
        }
    };

    let mut gas_left = adapter.result.gas_left;
    let (status, is_revert) = match kind {
        TrapKind::Success => (ExecStatus::Success, false),
        TrapKind::Revert => (ExecStatus::Revert, true),
        TrapKind::OutOfGas => {
            gas_left = 0;
            (ExecStatus::OutOfGas, true)
        }
        TrapKind::Unreachable | TrapKind::StackExhausted => (ExecStatus::Unreachable, true),
        TrapKind::InvalidMemoryAccess => (ExecStatus::InvalidMemoryAccess, true),
        TrapKind::Unknown => (ExecStatus::Unknown, true),
    };

    // Constructor success returns the deployed bytecode itself.
    let return_value = if message.kind == CallKind::Create && !is_revert {
        code.to_vec()
    } else {
        adapter.result.return_value
    };

    Ok(ExecutionResult {
        status,
        gas_left,
        return_value,
        is_revert,
    })
}

/// Resolve and invoke the entry point; on a Create the contract's declared
/// hash algorithm is checked first.
fn dispatch(
    state: &mut InstanceState,
    kind: CallKind,
    expected_hash: HashAlgorithm,
) -> Result<Option<anyhow::Error>> {
    let entry = match kind {
        CallKind::Create => {
            let declared = state
                .hash_type
                .call(&mut state.store, ())
                .map_err(|e| {
                    EngineError::ContractValidation(format!("call hash_type failed, {e:#}"))
                })?;
            debug!(declared, expected = expected_hash.type_id(), "contract hash algorithm");
            if declared != expected_hash.type_id() {
                return Err(EngineError::ContractValidation(
                    "hash type mismatch".to_string(),
                ));
            }
            state.deploy.clone()
        }
        CallKind::Call => state.main.clone(),
    };
    Ok(entry.call(&mut state.store, ()).err())
}
