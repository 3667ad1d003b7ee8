//! Process-wide registry of the host functions guest contracts may import.
//!
//! Built once on first use and never mutated. Each entry fixes the wasm
//! signature a contract must declare and the thunk that services it. The
//! permitted import namespaces are `bcos`, `ethereum`, and (with the `debug`
//! feature) `debug`.

use crate::adapter::HostAdapter;
use crate::memory::MemoryView;
use crate::thunks::{bei, eei};
use crate::trap::HostTrap;
use std::collections::HashMap;
use std::sync::OnceLock;
use wasmtime::{Val, ValType};

pub(crate) const BCOS_MODULE: &str = "bcos";
pub(crate) const ETHEREUM_MODULE: &str = "ethereum";
pub(crate) const DEBUG_MODULE: &str = "debug";

/// A host function body: reads positional arguments, bridges to the adapter
/// and host context, writes at most one result, and signals traps.
pub(crate) type HostThunk =
    fn(&mut HostAdapter, MemoryView<'_>, &[Val], &mut [Val]) -> Result<(), HostTrap>;

pub(crate) struct HostImport {
    pub(crate) params: &'static [ValType],
    pub(crate) results: &'static [ValType],
    pub(crate) thunk: HostThunk,
}

const NONE: &[ValType] = &[];
const I32: &[ValType] = &[ValType::I32];
const I64: &[ValType] = &[ValType::I64];
const I32_2: &[ValType] = &[ValType::I32, ValType::I32];
const I32_3: &[ValType] = &[ValType::I32, ValType::I32, ValType::I32];
const I32_4: &[ValType] = &[ValType::I32, ValType::I32, ValType::I32, ValType::I32];
const I32_5: &[ValType] = &[
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
];
const I32_7: &[ValType] = &[
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
];
const I64_I32: &[ValType] = &[ValType::I64, ValType::I32];
const I32_3_I64: &[ValType] = &[ValType::I32, ValType::I32, ValType::I32, ValType::I64];
const I32_3_I64_I32: &[ValType] = &[
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I64,
    ValType::I32,
];
const I32_3_I64_I32_2: &[ValType] = &[
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I64,
    ValType::I32,
    ValType::I32,
];
const I32_4_I64_I32_2: &[ValType] = &[
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I32,
    ValType::I64,
    ValType::I32,
    ValType::I32,
];

pub(crate) struct HostImportRegistry {
    modules: HashMap<&'static str, HashMap<&'static str, HostImport>>,
}

impl HostImportRegistry {
    pub(crate) fn lookup(&self, module: &str, name: &str) -> Option<&HostImport> {
        self.modules.get(module)?.get(name)
    }

    pub(crate) fn contains_module(&self, module: &str) -> bool {
        self.modules.contains_key(module)
    }

    #[cfg(all(test, feature = "debug"))]
    pub(crate) fn names(&self, module: &str) -> Vec<&'static str> {
        self.modules
            .get(module)
            .map(|functions| functions.keys().copied().collect())
            .unwrap_or_default()
    }

    fn build() -> Self {
        fn entry(
            params: &'static [ValType],
            results: &'static [ValType],
            thunk: HostThunk,
        ) -> HostImport {
            HostImport {
                params,
                results,
                thunk,
            }
        }

        let mut modules: HashMap<&'static str, HashMap<&'static str, HostImport>> = HashMap::new();

        let ethereum = modules.entry(ETHEREUM_MODULE).or_default();
        ethereum.insert("useGas", entry(I64, NONE, eei::use_gas));
        ethereum.insert("getGasLeft", entry(NONE, I64, eei::get_gas_left));
        ethereum.insert("getAddress", entry(I32, NONE, eei::get_address));
        ethereum.insert(
            "getExternalBalance",
            entry(I32_2, NONE, eei::get_external_balance),
        );
        ethereum.insert("getBlockHash", entry(I64_I32, I32, eei::get_block_hash));
        ethereum.insert("getCallDataSize", entry(NONE, I32, eei::get_call_data_size));
        ethereum.insert("callDataCopy", entry(I32_3, NONE, eei::call_data_copy));
        ethereum.insert("getCaller", entry(I32, NONE, eei::get_caller));
        ethereum.insert("getCallValue", entry(I32, NONE, eei::get_call_value));
        ethereum.insert("codeCopy", entry(I32_3, NONE, eei::code_copy));
        ethereum.insert("getCodeSize", entry(NONE, I32, eei::get_code_size));
        ethereum.insert(
            "externalCodeCopy",
            entry(I32_4, NONE, eei::external_code_copy),
        );
        ethereum.insert(
            "getExternalCodeSize",
            entry(I32, I32, eei::get_external_code_size),
        );
        ethereum.insert("getBlockCoinbase", entry(I32, NONE, eei::get_block_coinbase));
        ethereum.insert(
            "getBlockDifficulty",
            entry(I32, NONE, eei::get_block_difficulty),
        );
        ethereum.insert("getBlockGasLimit", entry(NONE, I64, eei::get_block_gas_limit));
        ethereum.insert("getTxGasPrice", entry(I32, NONE, eei::get_tx_gas_price));
        ethereum.insert("log", entry(I32_7, NONE, eei::log));
        ethereum.insert("getBlockNumber", entry(NONE, I64, eei::get_block_number));
        ethereum.insert(
            "getBlockTimestamp",
            entry(NONE, I64, eei::get_block_timestamp),
        );
        ethereum.insert("getTxOrigin", entry(I32, NONE, eei::get_tx_origin));
        ethereum.insert("storageStore", entry(I32_2, NONE, eei::storage_store));
        ethereum.insert("storageLoad", entry(I32_2, NONE, eei::storage_load));
        ethereum.insert("finish", entry(I32_2, NONE, eei::finish));
        ethereum.insert("revert", entry(I32_2, NONE, eei::revert));
        ethereum.insert(
            "getReturnDataSize",
            entry(NONE, I32, eei::get_return_data_size),
        );
        ethereum.insert("returnDataCopy", entry(I32_3, NONE, eei::return_data_copy));
        ethereum.insert("create", entry(I32_4, NONE, eei::create));
        ethereum.insert("selfDestruct", entry(I32, NONE, eei::self_destruct));

        let bcos = modules.entry(BCOS_MODULE).or_default();
        bcos.insert("useGas", entry(I64, NONE, eei::use_gas));
        bcos.insert("finish", entry(I32_2, NONE, eei::finish));
        bcos.insert("getAddress", entry(I32, NONE, eei::get_address));
        bcos.insert("getCallDataSize", entry(NONE, I32, eei::get_call_data_size));
        bcos.insert("getCallData", entry(I32, NONE, bei::get_call_data));
        bcos.insert("create", entry(I32_4, NONE, eei::create));
        bcos.insert("setStorage", entry(I32_4, NONE, bei::set_storage));
        bcos.insert("getStorage", entry(I32_3, I32, bei::get_storage));
        bcos.insert("getCaller", entry(I32, NONE, eei::get_caller));
        bcos.insert("revert", entry(I32_2, NONE, eei::revert));
        bcos.insert("getTxOrigin", entry(I32, NONE, eei::get_tx_origin));
        bcos.insert(
            "getExternalCodeSize",
            entry(I32, I32, eei::get_external_code_size),
        );
        bcos.insert("getBlockNumber", entry(NONE, I64, eei::get_block_number));
        bcos.insert(
            "getBlockTimestamp",
            entry(NONE, I64, eei::get_block_timestamp),
        );
        bcos.insert("log", entry(I32_7, NONE, eei::log));
        bcos.insert(
            "getReturnDataSize",
            entry(NONE, I32, eei::get_return_data_size),
        );
        bcos.insert("getReturnData", entry(I32, NONE, bei::get_return_data));
        bcos.insert("call", entry(I32_3, I32, bei::call));
        bcos.insert(
            "registerAsset",
            entry(I32_4_I64_I32_2, I32, bei::register_asset),
        );
        bcos.insert(
            "issueFungibleAsset",
            entry(I32_3_I64, I32, bei::issue_fungible_asset),
        );
        bcos.insert(
            "issueNotFungibleAsset",
            entry(I32_5, I64, bei::issue_not_fungible_asset),
        );
        bcos.insert(
            "transferAsset",
            entry(I32_3_I64_I32, I32, bei::transfer_asset),
        );
        bcos.insert("getAssetBalance", entry(I32_3, I64, bei::get_asset_balance));
        bcos.insert(
            "getNotFungibleAssetIDs",
            entry(I32_5, I32, bei::get_not_fungible_asset_ids),
        );
        bcos.insert(
            "getNotFungibleAssetInfo",
            entry(I32_3_I64_I32_2, I32, bei::get_not_fungible_asset_info),
        );

        #[cfg(feature = "debug")]
        {
            use crate::thunks::debug;
            let debug_module = modules.entry(DEBUG_MODULE).or_default();
            debug_module.insert("print32", entry(I32, NONE, debug::print32));
            debug_module.insert("print64", entry(I64, NONE, debug::print64));
            debug_module.insert("printMem", entry(I32_2, NONE, debug::print_mem));
            debug_module.insert("printMemHex", entry(I32_2, NONE, debug::print_mem_hex));
            debug_module.insert("printStorage", entry(I32, NONE, debug::print_storage));
            debug_module.insert(
                "printStorageHex",
                entry(I32, NONE, debug::print_storage_hex),
            );
        }

        Self { modules }
    }
}

/// The process-wide registry; read-only after initialization.
pub(crate) fn global() -> &'static HostImportRegistry {
    static GLOBAL_IMPORTS: OnceLock<HostImportRegistry> = OnceLock::new();
    GLOBAL_IMPORTS.get_or_init(HostImportRegistry::build)
}
