//! Debug-build print helpers (`debug` namespace). Output goes to `tracing`
//! and never touches blockchain state.

use super::{i64_arg, u32_arg};
use crate::adapter::HostAdapter;
use crate::memory::MemoryView;
use crate::trap::HostTrap;
use tracing::debug;
use wasmtime::Val;

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|byte| format!("{byte:02x}")).collect()
}

pub(crate) fn print32(
    _adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let value = u32_arg(args, 0);
    debug!("print32: {value} 0x{value:x}");
    Ok(())
}

pub(crate) fn print64(
    _adapter: &mut HostAdapter,
    _memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let value = i64_arg(args, 0) as u64;
    debug!("print64: {value} 0x{value:x}");
    Ok(())
}

pub(crate) fn print_mem(
    _adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let data = memory.load(u32_arg(args, 0), u32_arg(args, 1))?;
    debug!("printMem: {}", String::from_utf8_lossy(&data));
    Ok(())
}

pub(crate) fn print_mem_hex(
    _adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let data = memory.load(u32_arg(args, 0), u32_arg(args, 1))?;
    debug!("printMemHex: {}", hex_string(&data));
    Ok(())
}

pub(crate) fn print_storage(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let key = memory.load_exact::<32>(u32_arg(args, 0))?;
    let value = adapter.host.get_storage(&key);
    debug!("printStorage: {}", String::from_utf8_lossy(&value));
    Ok(())
}

pub(crate) fn print_storage_hex(
    adapter: &mut HostAdapter,
    memory: MemoryView<'_>,
    args: &[Val],
    _results: &mut [Val],
) -> Result<(), HostTrap> {
    let key = memory.load_exact::<32>(u32_arg(args, 0))?;
    let value = adapter.host.get_storage(&key);
    debug!("printStorageHex: {}", hex_string(&value));
    Ok(())
}
