//! Ethereum Environment Interface thunks (`ethereum` namespace, shared by
//! several `bcos` imports).

use super::{i64_arg, u32_arg};
use crate::adapter::{gas, HostAdapter};
use crate::memory::MemoryView;
use crate::trap::HostTrap;
use tracing::debug;
use wasmtime::Val;

fn is_zero(bytes: &[u8]) -> bool {
    bytes.iter().all(|byte| *byte == 0)
}

pub(crate) fn use_gas(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let amount = i64_arg(args, 0);
    debug!(amount, left = adapter.gas_left(), "useGas");
    if amount < 0 {
        return Err(HostTrap::NegativeGas);
    }
    adapter.use_gas(amount)
}

pub(crate) fn get_gas_left(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I64(adapter.gas_left());
    Ok(())
}

pub(crate) fn get_address(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    let destination = adapter.destination;
    memory.store(u32_arg(args, 0), destination.as_bytes())
}

pub(crate) fn get_external_balance(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BALANCE)?;
    let address = memory.load_address(u32_arg(args, 0))?;
    let balance = adapter.host.get_balance(&address);
    memory.store_u128_be(u32_arg(args, 1), balance)
}

pub(crate) fn get_block_hash(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BLOCK_HASH)?;
    let number = i64_arg(args, 0);
    match adapter.host.get_block_hash(number) {
        Some(hash) => {
            memory.store(u32_arg(args, 1), &hash)?;
            results[0] = Val::I32(0);
        }
        None => results[0] = Val::I32(1),
    }
    Ok(())
}

pub(crate) fn get_call_data_size(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I32(adapter.input.len() as i32);
    Ok(())
}

pub(crate) fn call_data_copy(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let length = u32_arg(args, 2);
    adapter.take_interface_gas(gas::copy_cost(length))?;
    memory.store_padded(u32_arg(args, 0), &adapter.input, u32_arg(args, 1), length)
}

pub(crate) fn get_caller(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    let caller = adapter.caller;
    memory.store(u32_arg(args, 0), caller.as_bytes())
}

pub(crate) fn get_call_value(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    memory.store_u128_be(u32_arg(args, 0), adapter.value)
}

pub(crate) fn code_copy(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let length = u32_arg(args, 2);
    adapter.take_interface_gas(gas::copy_cost(length))?;
    memory.store_padded(u32_arg(args, 0), &adapter.code, u32_arg(args, 1), length)
}

pub(crate) fn get_code_size(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I32(adapter.code.len() as i32);
    Ok(())
}

pub(crate) fn external_code_copy(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let length = u32_arg(args, 3);
    adapter.take_interface_gas(gas::EXT_CODE + gas::copy_cost(length))?;
    let address = memory.load_address(u32_arg(args, 0))?;
    let code = adapter.host.get_code(&address);
    memory.store_padded(u32_arg(args, 1), &code, u32_arg(args, 2), length)
}

pub(crate) fn get_external_code_size(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::EXT_CODE)?;
    let address = memory.load_address(u32_arg(args, 0))?;
    results[0] = Val::I32(adapter.host.get_code_size(&address) as i32);
    Ok(())
}

pub(crate) fn get_block_coinbase(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    let coinbase = adapter.host.block_coinbase();
    memory.store(u32_arg(args, 0), coinbase.as_bytes())
}

pub(crate) fn get_block_difficulty(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    let difficulty = adapter.host.block_difficulty();
    memory.store(u32_arg(args, 0), &difficulty)
}

pub(crate) fn get_block_gas_limit(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I64(adapter.host.block_gas_limit());
    Ok(())
}

pub(crate) fn get_tx_gas_price(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    let price = adapter.host.tx_gas_price();
    memory.store_u128_be(u32_arg(args, 0), price)
}

pub(crate) fn log(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let data_offset = u32_arg(args, 0);
    let length = u32_arg(args, 1);
    let topic_count = u32_arg(args, 2);
    if topic_count > 4 {
        return Err(HostTrap::Aborted("unsupported number of topics".to_string()));
    }
    adapter.take_interface_gas(
        gas::LOG + gas::LOG_TOPIC * i64::from(topic_count) + gas::LOG_DATA_BYTE * i64::from(length),
    )?;
    let data = memory.load(data_offset, length)?;
    let mut topics = Vec::with_capacity(topic_count as usize);
    for index in 0..topic_count {
        topics.push(memory.load_exact::<32>(u32_arg(args, 3 + index as usize))?);
    }
    adapter.host.log(&topics, &data);
    Ok(())
}

pub(crate) fn get_block_number(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I64(adapter.host.block_number());
    Ok(())
}

pub(crate) fn get_block_timestamp(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I64(adapter.host.block_timestamp());
    Ok(())
}

pub(crate) fn get_tx_origin(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::VERY_LOW)?;
    let origin = adapter.host.tx_origin();
    memory.store(u32_arg(args, 0), origin.as_bytes())
}

pub(crate) fn storage_store(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let key = memory.load_exact::<32>(u32_arg(args, 0))?;
    let value = memory.load_exact::<32>(u32_arg(args, 1))?;
    let current = adapter.host.get_storage(&key);
    let cost = if is_zero(&current) && !is_zero(&value) {
        gas::STORAGE_STORE_CREATE
    } else {
        gas::STORAGE_STORE_CHANGE
    };
    adapter.take_interface_gas(cost)?;
    adapter.host.set_storage(&key, &value);
    Ok(())
}

pub(crate) fn storage_load(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::STORAGE_LOAD)?;
    let key = memory.load_exact::<32>(u32_arg(args, 0))?;
    let value = adapter.host.get_storage(&key);
    // Storage words are fixed 32 bytes; short values read back zero-padded.
    memory.store_padded(u32_arg(args, 1), &value, 0, 32)
}

fn finish_or_revert(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    revert: bool,
) -> Result<(), HostTrap> {
    let offset = u32_arg(args, 0);
    let size = u32_arg(args, 1);
    debug!(revert, offset, size, "guest terminating");
    let data = if size != 0 {
        memory.load(offset, size)?
    } else {
        Vec::new()
    };
    Err(adapter.finish_or_revert(revert, data))
}

pub(crate) fn finish(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    finish_or_revert(adapter, memory, args, false)
}

pub(crate) fn revert(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    finish_or_revert(adapter, memory, args, true)
}

pub(crate) fn get_return_data_size(
    adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    _args: &[Val],
    results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::BASE)?;
    results[0] = Val::I32(adapter.return_data.len() as i32);
    Ok(())
}

pub(crate) fn return_data_copy(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let offset = u32_arg(args, 1);
    let size = u32_arg(args, 2);
    adapter.take_interface_gas(gas::copy_cost(size))?;
    let end = offset as u64 + size as u64;
    if end > adapter.return_data.len() as u64 {
        return Err(HostTrap::MemoryAccess {
            offset: offset as u64,
            length: size as u64,
        });
    }
    let slice = adapter.return_data[offset as usize..end as usize].to_vec();
    memory.store(u32_arg(args, 0), &slice)
}

pub(crate) fn create(
    adapter: &mut HostAdapter,
    mut memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::CREATE)?;
    let value = memory.load_u128_be(u32_arg(args, 0))?;
    let code = memory.load(u32_arg(args, 1), u32_arg(args, 2))?;
    let outcome = adapter.host.create(value, &code);
    adapter.use_gas(outcome.gas_used)?;
    // Void return: success is observable through the address written at
    // resultOffset (all-zero on failure) and the captured return buffer.
    if let Some(address) = outcome.address {
        memory.store(u32_arg(args, 3), address.as_bytes())?;
    }
    adapter.return_data = outcome.return_data;
    Ok(())
}

pub(crate) fn self_destruct(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    adapter.take_interface_gas(gas::SELF_DESTRUCT)?;
    let beneficiary = memory.load_address(u32_arg(args, 0))?;
    adapter.host.self_destruct(&beneficiary);
    // Destruction ends the call cleanly with an empty payload.
    Err(adapter.finish_or_revert(false, Vec::new()))
}
