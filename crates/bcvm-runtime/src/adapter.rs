//! Per-invocation host adapter.
//!
//! One [`HostAdapter`] is built for every `execute` call and installed into
//! the reserved instance's store for the duration of the call. Host-function
//! thunks reach it through the store data, so reusing a pooled instance for
//! a new message only requires writing this slot.

use crate::trap::{HostTrap, TrapKind};
use bcvm_core::{Address, CallMessage, HostContext};
use std::sync::Arc;

/// Interface gas schedule charged by host functions when metering is on.
/// Values follow the classic EVM cost table.
pub(crate) mod gas {
    pub(crate) const BASE: i64 = 2;
    pub(crate) const VERY_LOW: i64 = 3;
    pub(crate) const COPY_WORD: i64 = 3;
    pub(crate) const BALANCE: i64 = 400;
    pub(crate) const BLOCK_HASH: i64 = 800;
    pub(crate) const EXT_CODE: i64 = 700;
    pub(crate) const STORAGE_LOAD: i64 = 200;
    pub(crate) const STORAGE_STORE_CREATE: i64 = 20_000;
    pub(crate) const STORAGE_STORE_CHANGE: i64 = 5_000;
    pub(crate) const LOG: i64 = 375;
    pub(crate) const LOG_TOPIC: i64 = 375;
    pub(crate) const LOG_DATA_BYTE: i64 = 8;
    pub(crate) const CALL: i64 = 700;
    pub(crate) const CREATE: i64 = 32_000;
    pub(crate) const SELF_DESTRUCT: i64 = 5_000;

    /// Cost of copying `length` bytes between a host buffer and guest
    /// memory, charged per 32-byte word.
    pub(crate) fn copy_cost(length: u32) -> i64 {
        let words = (i64::from(length) + 31) / 32;
        VERY_LOW + COPY_WORD * words
    }
}

/// Result fields accumulated over one invocation.
#[derive(Debug, Clone, Default)]
pub(crate) struct CallResult {
    pub(crate) return_value: Vec<u8>,
    pub(crate) is_revert: bool,
    pub(crate) gas_left: i64,
}

/// Store data of every pooled instance: an indirection cell the pipeline
/// writes on reservation and thunks read on entry.
#[derive(Default)]
pub(crate) struct AdapterSlot {
    pub(crate) adapter: Option<HostAdapter>,
}

/// Per-call carrier of gas, message identity, result buffer, and the handle
/// back to the blockchain host.
pub(crate) struct HostAdapter {
    pub(crate) host: Arc<dyn HostContext>,
    /// Code of the executing contract, served by codeCopy/getCodeSize.
    pub(crate) code: Vec<u8>,
    pub(crate) destination: Address,
    pub(crate) caller: Address,
    pub(crate) value: u128,
    pub(crate) input: Vec<u8>,
    meter_gas: bool,
    /// Return buffer of the most recent nested call or create.
    pub(crate) return_data: Vec<u8>,
    /// Status channel: the trap kind recorded by the host function that
    /// ended the call, consulted before string decoding.
    pub(crate) trap_status: Option<TrapKind>,
    pub(crate) result: CallResult,
}

impl HostAdapter {
    pub(crate) fn new(
        host: Arc<dyn HostContext>,
        code: &[u8],
        message: &CallMessage,
        meter_gas: bool,
    ) -> Self {
        Self {
            host,
            code: code.to_vec(),
            destination: message.destination,
            caller: message.caller,
            value: message.value,
            input: message.input.clone(),
            meter_gas,
            return_data: Vec::new(),
            trap_status: None,
            result: CallResult {
                return_value: Vec::new(),
                is_revert: false,
                gas_left: message.gas,
            },
        }
    }

    pub(crate) fn gas_left(&self) -> i64 {
        self.result.gas_left
    }

    /// Deduct gas; a post-deduction balance below zero is the out-of-gas
    /// trap and the only preemptive termination the engine has.
    pub(crate) fn use_gas(&mut self, gas: i64) -> Result<(), HostTrap> {
        self.result.gas_left = self.result.gas_left.saturating_sub(gas);
        if self.result.gas_left < 0 {
            return Err(HostTrap::OutOfGas);
        }
        Ok(())
    }

    /// Charge the interface schedule, if metering is enabled for this call.
    pub(crate) fn take_interface_gas(&mut self, cost: i64) -> Result<(), HostTrap> {
        if self.meter_gas {
            self.use_gas(cost)
        } else {
            Ok(())
        }
    }

    /// Record the return buffer and produce the terminating trap. This is
    /// the sole clean-return mechanism available to the guest.
    pub(crate) fn finish_or_revert(&mut self, revert: bool, data: Vec<u8>) -> HostTrap {
        self.result.return_value = data;
        self.result.is_revert = revert;
        if revert {
            HostTrap::Revert
        } else {
            HostTrap::Finish
        }
    }

    pub(crate) fn record_trap(&mut self, kind: TrapKind) {
        self.trap_status = Some(kind);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MockHost;
    use bcvm_core::CallMessage;

    fn adapter(gas: i64, meter: bool) -> HostAdapter {
        let message = CallMessage::call(Address([1; 20]), Address([2; 20]), vec![], gas);
        HostAdapter::new(MockHost::keccak(), &[0x00], &message, meter)
    }

    #[test]
    fn gas_is_monotonically_non_increasing() {
        let mut adapter = adapter(1_000, false);
        adapter.use_gas(100).unwrap();
        assert_eq!(adapter.gas_left(), 900);
        adapter.use_gas(0).unwrap();
        assert_eq!(adapter.gas_left(), 900);
    }

    #[test]
    fn exhausting_gas_traps() {
        let mut adapter = adapter(10, false);
        let err = adapter.use_gas(11).unwrap_err();
        assert!(matches!(err, HostTrap::OutOfGas));
        assert!(adapter.gas_left() < 0);
    }

    #[test]
    fn interface_gas_is_skipped_without_metering() {
        let mut adapter = adapter(10, false);
        adapter.take_interface_gas(1_000_000).unwrap();
        assert_eq!(adapter.gas_left(), 10);
    }

    #[test]
    fn interface_gas_is_charged_with_metering() {
        let mut adapter = adapter(1_000, true);
        adapter.take_interface_gas(gas::STORAGE_LOAD).unwrap();
        assert_eq!(adapter.gas_left(), 1_000 - gas::STORAGE_LOAD);
    }

    #[test]
    fn finish_and_revert_set_result_fields() {
        let mut adapter = adapter(10, false);
        let trap = adapter.finish_or_revert(false, vec![1, 2]);
        assert!(matches!(trap, HostTrap::Finish));
        assert!(!adapter.result.is_revert);
        assert_eq!(adapter.result.return_value, vec![1, 2]);

        let trap = adapter.finish_or_revert(true, vec![3]);
        assert!(matches!(trap, HostTrap::Revert));
        assert!(adapter.result.is_revert);
        assert_eq!(adapter.result.return_value, vec![3]);
    }

    #[test]
    fn copy_cost_charges_per_word() {
        assert_eq!(gas::copy_cost(0), gas::VERY_LOW);
        assert_eq!(gas::copy_cost(1), gas::VERY_LOW + gas::COPY_WORD);
        assert_eq!(gas::copy_cost(32), gas::VERY_LOW + gas::COPY_WORD);
        assert_eq!(gas::copy_cost(33), gas::VERY_LOW + 2 * gas::COPY_WORD);
    }
}
