//! Blockchain Environment Interface thunks specific to the `bcos` namespace.

use super::{i32_arg, u32_arg, u64_arg};
use crate::adapter::{gas, HostAdapter};
use crate::memory::MemoryView;
use crate::trap::HostTrap;
use bcvm_core::CallMode;
use tracing::debug;
use wasmtime::Val;

/// Upper bound on the storage value `getStorage` will copy out.
const MAX_STORAGE_VALUE: usize = 19264;

pub(crate) fn get_call_data(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let length = adapter.input.len() as u32;
    adapter.take_interface_gas(gas::copy_cost(length))?;
    memory.store_padded(u32_arg(args, 0), &adapter.input, 0, length)
}

pub(crate) fn set_storage(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let key = memory.load(u32_arg(args, 0), u32_arg(args, 1))?;
    let value = memory.load(u32_arg(args, 2), u32_arg(args, 3))?;
    let cost = if adapter.host.get_storage(&key).is_empty() && !value.is_empty() {
        gas::STORAGE_STORE_CREATE
    } else {
        gas::STORAGE_STORE_CHANGE
    };
    adapter.take_interface_gas(cost)?;
    adapter.host.set_storage(&key, &value);
    Ok(())
}

pub(crate) fn get_storage(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_LOAD)?;
    let key = memory.load(u32_arg(args, 0), u32_arg(args, 1))?;
    let value = adapter.host.get_storage(&key);
    // Oversized values are truncated to the cap, never rejected.
    let written = value.len().min(MAX_STORAGE_VALUE);
    memory.store(u32_arg(args, 2), &value[..written])?;
    results[0] = Val::I32(written as i32);
    Ok(())
}

pub(crate) fn get_return_data(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let length = adapter.return_data.len() as u32;
    adapter.take_interface_gas(gas::copy_cost(length))?;
    memory.store_padded(u32_arg(args, 0), &adapter.return_data, 0, length)
}

pub(crate) fn call(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::CALL)?;
    let to = memory.load_address(u32_arg(args, 0))?;
    let input = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let gas_budget = adapter.gas_left();
    debug!(%to, gas = gas_budget, input_len = input.len(), "nested call");
    let outcome = adapter
        .host
        .call(CallMode::Call, gas_budget, &to, 0, &input);
    adapter.use_gas(outcome.gas_used)?;
    adapter.return_data = outcome.return_data;
    results[0] = Val::I32(outcome.status.code());
    Ok(())
}

pub(crate) fn register_asset(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_STORE_CHANGE)?;
    let name = memory.load(u32_arg(args, 0), u32_arg(args, 1))?;
    let issuer = memory.load_address(u32_arg(args, 2))?;
    let fungible = i32_arg(args, 3) != 0;
    let total = u64_arg(args, 4);
    let description = memory.load(u32_arg(args, 5), u32_arg(args, 6))?;
    let registered = adapter
        .host
        .register_asset(&name, &issuer, fungible, total, &description);
    results[0] = Val::I32(registered as i32);
    Ok(())
}

pub(crate) fn issue_fungible_asset(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_STORE_CHANGE)?;
    let to = memory.load_address(u32_arg(args, 0))?;
    let name = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let amount = u64_arg(args, 3);
    let issued = adapter.host.issue_fungible_asset(&to, &name, amount);
    results[0] = Val::I32(issued as i32);
    Ok(())
}

pub(crate) fn issue_not_fungible_asset(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_STORE_CHANGE)?;
    let to = memory.load_address(u32_arg(args, 0))?;
    let name = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let uri = memory.load(u32_arg(args, 3), u32_arg(args, 4))?;
    let asset_id = adapter.host.issue_not_fungible_asset(&to, &name, &uri);
    results[0] = Val::I64(asset_id as i64);
    Ok(())
}

pub(crate) fn transfer_asset(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_STORE_CHANGE)?;
    let to = memory.load_address(u32_arg(args, 0))?;
    let name = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let amount_or_id = u64_arg(args, 3);
    let from_self = i32_arg(args, 4) != 0;
    let transferred = adapter
        .host
        .transfer_asset(&to, &name, amount_or_id, from_self);
    results[0] = Val::I32(transferred as i32);
    Ok(())
}

pub(crate) fn get_asset_balance(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_LOAD)?;
    let account = memory.load_address(u32_arg(args, 0))?;
    let name = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let balance = adapter.host.get_asset_balance(&account, &name);
    results[0] = Val::I64(balance as i64);
    Ok(())
}

pub(crate) fn get_not_fungible_asset_ids(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_LOAD)?;
    let account = memory.load_address(u32_arg(args, 0))?;
    let name = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let ids = adapter.host.get_not_fungible_asset_ids(&account, &name);
    let needed = ids.len() as u64 * 8;
    if needed > u32_arg(args, 4) as u64 {
        results[0] = Val::I32(-1);
        return Ok(());
    }
    let mut offset = u32_arg(args, 3);
    for id in &ids {
        memory.store(offset, &id.to_le_bytes())?;
        offset += 8;
    }
    results[0] = Val::I32(ids.len() as i32);
    Ok(())
}

pub(crate) fn get_not_fungible_asset_info(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_LOAD)?;
    let account = memory.load_address(u32_arg(args, 0))?;
    let name = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let asset_id = u64_arg(args, 3);
    match adapter
        .host
        .get_not_fungible_asset_info(&account, &name, asset_id)
    {
        Some(uri) if uri.len() as u64 <= u32_arg(args, 5) as u64 => {
            memory.store(u32_arg(args, 4), &uri)?;
            results[0] = Val::I32(uri.len() as i32);
        }
        _ => results[0] = Val::I32(-1),
    }
    Ok(())
}
