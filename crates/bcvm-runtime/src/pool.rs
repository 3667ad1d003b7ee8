//! Per-contract instance pool over one compiled module.
//!
//! Every pooled instance owns its store and stays alive for the process
//! lifetime; an atomic idle flag is the ownership token that moves it
//! between free and busy. Reservation is scoped: dropping the reservation
//! returns the instance to the pool, never destroys it.

use crate::adapter::AdapterSlot;
use crate::memory::MemoryView;
use crate::registry;
use crate::trap::HostTrap;
use bcvm_core::{EngineError, Result};
use parking_lot::{Mutex, MutexGuard, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};
use wasmtime::{Engine, Extern, Func, FuncType, Instance, Module, Store, TypedFunc};

/// A live instance with its resolved entry points. Host functions resolve
/// the memory export through their caller, so the slot in the store is the
/// only per-call state.
pub(crate) struct InstanceState {
    pub(crate) store: Store<AdapterSlot>,
    pub(crate) hash_type: TypedFunc<(), i32>,
    pub(crate) deploy: TypedFunc<(), ()>,
    pub(crate) main: TypedFunc<(), ()>,
}

pub(crate) struct PooledInstance {
    idle: AtomicBool,
    // Uncontended by construction: the idle flag is the ownership token and
    // only the holder of a successful compare-exchange locks the state.
    state: Mutex<InstanceState>,
}

impl PooledInstance {
    fn create(engine: &Engine, module: &Module, idle: bool) -> Result<Self> {
        Ok(Self {
            idle: AtomicBool::new(idle),
            state: Mutex::new(build_state(engine, module)?),
        })
    }
}

/// Scoped reservation of one pool instance. Releases the instance on drop.
pub(crate) struct ReservedInstance {
    inner: Arc<PooledInstance>,
}

impl ReservedInstance {
    pub(crate) fn state(&self) -> MutexGuard<'_, InstanceState> {
        self.inner.state.lock()
    }
}

impl Drop for ReservedInstance {
    fn drop(&mut self) {
        self.inner.idle.store(true, Ordering::Release);
    }
}

/// All instances compiled for one contract address.
pub(crate) struct InstancePool {
    engine: Engine,
    module: Module,
    instances: RwLock<Vec<Arc<PooledInstance>>>,
}

impl std::fmt::Debug for InstancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InstancePool").finish_non_exhaustive()
    }
}

impl InstancePool {
    pub(crate) fn new(engine: Engine, module: Module) -> Result<Self> {
        let first = Arc::new(PooledInstance::create(&engine, &module, true)?);
        Ok(Self {
            engine,
            module,
            instances: RwLock::new(vec![first]),
        })
    }

    /// Reserve an idle instance, creating one if every instance is busy.
    pub(crate) fn reserve(&self) -> Result<ReservedInstance> {
        {
            let instances = self.instances.read();
            for instance in instances.iter() {
                if instance
                    .idle
                    .compare_exchange(true, false, Ordering::Acquire, Ordering::Relaxed)
                    .is_ok()
                {
                    trace!("reusing pooled instance");
                    return Ok(ReservedInstance {
                        inner: instance.clone(),
                    });
                }
            }
        }
        debug!("pool exhausted, creating instance");
        let fresh = Arc::new(PooledInstance::create(&self.engine, &self.module, false)?);
        let reserved = ReservedInstance {
            inner: fresh.clone(),
        };
        self.instances.write().push(fresh);
        Ok(reserved)
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.instances.read().len()
    }
}

/// Instantiate the module, binding every declared import to its registry
/// thunk. The thunk reaches the per-call adapter through the store data and
/// resolves the calling instance's memory export at call time.
fn build_state(engine: &Engine, module: &Module) -> Result<InstanceState> {
    let mut store = Store::new(engine, AdapterSlot::default());
    let registry = registry::global();
    let mut imports: Vec<Extern> = Vec::with_capacity(module.imports().len());
    for import in module.imports() {
        let module_name = import.module();
        let function_name = import.name();
        if !registry.contains_module(module_name) {
            return Err(EngineError::ContractValidation(
                "Import from invalid namespace.".to_string(),
            ));
        }
        let entry = registry.lookup(module_name, function_name).ok_or_else(|| {
            EngineError::ContractValidation(format!(
                "{function_name} is not a supported function"
            ))
        })?;
        let ty = FuncType::new(
            engine,
            entry.params.iter().cloned(),
            entry.results.iter().cloned(),
        );
        let thunk = entry.thunk;
        let func = Func::new(&mut store, ty, move |mut caller, args, results| {
            let memory = caller
                .get_export("memory")
                .and_then(Extern::into_memory)
                .ok_or(HostTrap::MemoryAccess {
                    offset: 0,
                    length: 0,
                })?;
            let (data, slot) = memory.data_and_store_mut(&mut caller);
            let Some(adapter) = slot.adapter.as_mut() else {
                return Err(anyhow::anyhow!("host adapter is not bound for this call"));
            };
            match thunk(adapter, MemoryView::new(data), args, results) {
                Ok(()) => Ok(()),
                Err(trap) => {
                    adapter.record_trap(trap.kind());
                    Err(trap.into())
                }
            }
        });
        trace!(module = module_name, name = function_name, "import bound");
        imports.push(func.into());
    }

    let instance = Instance::new(&mut store, module, &imports)
        .map_err(|e| EngineError::ContractValidation(format!("Error instantiating wasm: {e:#}")))?;

    let memory = instance
        .get_memory(&mut store, "memory")
        .ok_or_else(|| EngineError::InvalidMemoryAccess("get memory from wasm failed".to_string()))?;
    if memory.size(&store) < 1 {
        return Err(EngineError::InvalidMemoryAccess(
            "wasm memory pages must be greater than 1".to_string(),
        ));
    }

    let hash_type = instance
        .get_typed_func::<(), i32>(&mut store, "hash_type")
        .map_err(|e| EngineError::ContractValidation(format!("get hash_type failed, {e:#}")))?;
    let deploy = instance
        .get_typed_func::<(), ()>(&mut store, "deploy")
        .map_err(|e| EngineError::ContractValidation(format!("get deploy failed, {e:#}")))?;
    let main = instance
        .get_typed_func::<(), ()>(&mut store, "main")
        .map_err(|e| EngineError::ContractValidation(format!("get main failed, {e:#}")))?;

    Ok(InstanceState {
        store,
        hash_type,
        deploy,
        main,
    })
}
