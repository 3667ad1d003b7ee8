//! Host-function thunks bridging guest imports to the host adapter.
//!
//! Every thunk reads positional arguments out of the value vector, charges
//! interface gas where the schedule applies, performs the operation against
//! the adapter or host context, and writes a single result value when its
//! signature declares one. Argument kinds are fixed by the signatures in the
//! import registry and enforced by the runtime at instantiation, so the
//! positional accessors here cannot observe a mismatched kind.

pub(crate) mod bei;
#[cfg(feature = "debug")]
pub(crate) mod debug;
pub(crate) mod eei;

use wasmtime::Val;

fn i32_arg(args: &[Val], index: usize) -> i32 {
    args[index].unwrap_i32()
}

fn u32_arg(args: &[Val], index: usize) -> u32 {
    args[index].unwrap_i32() as u32
}

fn i64_arg(args: &[Val], index: usize) -> i64 {
    args[index].unwrap_i64()
}

fn u64_arg(args: &[Val], index: usize) -> u64 {
    args[index].unwrap_i64() as u64
}
