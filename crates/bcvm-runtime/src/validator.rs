//! Static acceptance check of a compiled module against the permitted
//! contract ABI.
//!
//! A contract must export exactly `memory`, `deploy`, `main`, and
//! `hash_type` (the linker-emitted `__data_end`/`__heap_base` globals are
//! tolerated), and may import only allow-listed functions from the `bcos`
//! and `ethereum` namespaces. Import signatures are not checked here; a
//! mismatch surfaces when the instance is created.

use crate::registry::{BCOS_MODULE, DEBUG_MODULE, ETHEREUM_MODULE};
use bcvm_core::{EngineError, Result};
use tracing::debug;
use wasmtime::{ExternType, Module};

/// Function names contracts may import from the `ethereum` namespace.
pub(crate) const EEI_FUNCTIONS: &[&str] = &[
    "useGas",
    "getGasLeft",
    "getAddress",
    "getExternalBalance",
    "getBlockHash",
    "getCallDataSize",
    "callDataCopy",
    "getCaller",
    "getCallValue",
    "codeCopy",
    "getCodeSize",
    "externalCodeCopy",
    "getExternalCodeSize",
    "getBlockCoinbase",
    "getBlockDifficulty",
    "getBlockGasLimit",
    "getTxGasPrice",
    "log",
    "getBlockNumber",
    "getBlockTimestamp",
    "getTxOrigin",
    "storageStore",
    "storageLoad",
    "finish",
    "revert",
    "getReturnDataSize",
    "returnDataCopy",
    "call",
    "callCode",
    "callDelegate",
    "callStatic",
    "create",
    "selfDestruct",
];

/// Function names contracts may import from the `bcos` namespace.
pub(crate) const BEI_FUNCTIONS: &[&str] = &[
    "useGas",
    "finish",
    "getAddress",
    "getCallDataSize",
    "getCallData",
    "setStorage",
    "getStorage",
    "getCaller",
    "revert",
    "getTxOrigin",
    "getExternalCodeSize",
    "log",
    "getReturnDataSize",
    "getReturnData",
    "call",
    "registerAsset",
    "issueFungibleAsset",
    "issueNotFungibleAsset",
    "transferAsset",
    "getAssetBalance",
    "getNotFungibleAssetIDs",
    "getNotFungibleAssetInfo",
];

fn validation_error<T>(message: impl Into<String>) -> Result<T> {
    Err(EngineError::ContractValidation(message.into()))
}

pub(crate) fn verify_module(module: &Module) -> Result<()> {
    // Exports: the four BCI symbols, each with the right kind.
    let mut bci_exports = 0;
    for export in module.exports() {
        let name = export.name();
        match name {
            "memory" => {
                if !matches!(export.ty(), ExternType::Memory(_)) {
                    return validation_error("\"memory\" is not pointing to memory.");
                }
                bci_exports += 1;
            }
            "deploy" | "main" | "hash_type" => {
                if !matches!(export.ty(), ExternType::Func(_)) {
                    return validation_error(format!("\"{name}\" is not pointing to function."));
                }
                bci_exports += 1;
            }
            "__data_end" | "__heap_base" => {
                if !matches!(export.ty(), ExternType::Global(_)) {
                    return validation_error("__data_end/__heap_base is not pointing to global.");
                }
            }
            other => {
                debug!(export = other, "rejecting unexpected export");
                return validation_error(format!("Invalid export {other} is present."));
            }
        }
    }
    if bci_exports != 4 {
        return validation_error("BCI(deploy/main/hash_type/memory) are not all exported.");
    }

    // Imports: functions only, from permitted namespaces, with known names.
    for import in module.imports() {
        let module_name = import.module();
        if cfg!(feature = "debug") && module_name == DEBUG_MODULE {
            continue;
        }
        if module_name != BCOS_MODULE && module_name != ETHEREUM_MODULE {
            return validation_error("Import from invalid namespace.");
        }
        let name = import.name();
        if !BEI_FUNCTIONS.contains(&name) && !EEI_FUNCTIONS.contains(&name) {
            return validation_error(format!("Importing invalid EEI method {name}"));
        }
        if !matches!(import.ty(), ExternType::Func(_)) {
            return validation_error("Imported function type mismatch.");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::compile_wat;
    use wasmtime::Engine;

    fn verify(wat: &str) -> Result<()> {
        let engine = Engine::default();
        let module = Module::new(&engine, compile_wat(wat)).unwrap();
        verify_module(&module)
    }

    fn expect_rejection(wat: &str, fragment: &str) {
        match verify(wat) {
            Err(EngineError::ContractValidation(message)) => {
                assert!(
                    message.contains(fragment),
                    "message `{message}` does not contain `{fragment}`"
                );
            }
            other => panic!("expected validation failure, got {other:?}"),
        }
    }

    const VALID: &str = r#"
        (module
          (import "bcos" "finish" (func $finish (param i32 i32)))
          (memory (export "memory") 1)
          (func (export "hash_type") (result i32) i32.const 0)
          (func (export "deploy") i32.const 0 i32.const 0 call $finish)
          (func (export "main") i32.const 0 i32.const 0 call $finish))
    "#;

    #[test]
    fn accepts_a_well_formed_contract() {
        verify(VALID).unwrap();
    }

    #[test]
    fn validation_is_idempotent() {
        let engine = Engine::default();
        let module = Module::new(&engine, compile_wat(VALID)).unwrap();
        verify_module(&module).unwrap();
        verify_module(&module).unwrap();
    }

    #[test]
    fn rejects_a_memory_only_module() {
        expect_rejection(
            r#"(module (memory (export "memory") 1))"#,
            "are not all exported",
        );
    }

    #[test]
    fn rejects_missing_hash_type() {
        expect_rejection(
            r#"
            (module
              (memory (export "memory") 1)
              (func (export "deploy"))
              (func (export "main")))
            "#,
            "are not all exported",
        );
    }

    #[test]
    fn rejects_an_unexpected_export_by_name() {
        expect_rejection(
            r#"
            (module
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main"))
              (func (export "mystery")))
            "#,
            "mystery",
        );
    }

    #[test]
    fn rejects_bci_symbols_of_the_wrong_kind() {
        expect_rejection(
            r#"
            (module
              (memory (export "memory") 1)
              (global (export "hash_type") i32 (i32.const 0))
              (func (export "deploy"))
              (func (export "main")))
            "#,
            "\"hash_type\" is not pointing to function.",
        );
    }

    #[test]
    fn tolerates_linker_globals() {
        verify(
            r#"
            (module
              (memory (export "memory") 1)
              (global (export "__data_end") i32 (i32.const 16))
              (global (export "__heap_base") i32 (i32.const 32))
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
        )
        .unwrap();
    }

    #[test]
    fn rejects_imports_from_unknown_namespaces() {
        expect_rejection(
            r#"
            (module
              (import "env" "foo" (func $foo))
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
            "Import from invalid namespace.",
        );
    }

    #[test]
    fn rejects_unknown_import_names() {
        expect_rejection(
            r#"
            (module
              (import "bcos" "mintGold" (func $mint))
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
            "Importing invalid EEI method mintGold",
        );
    }

    #[test]
    fn rejects_non_function_imports() {
        expect_rejection(
            r#"
            (module
              (import "bcos" "finish" (global $g i32))
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
            "Imported function type mismatch.",
        );
    }

    #[test]
    fn accepts_the_eei_call_family_names() {
        // Allow-listed even though no thunk backs them; the failure is
        // deferred to instantiation.
        verify(
            r#"
            (module
              (import "ethereum" "callDelegate" (func $cd (param i32 i32 i32) (result i32)))
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
        )
        .unwrap();
    }

    #[cfg(feature = "debug")]
    #[test]
    fn debug_namespace_is_accepted_with_the_feature() {
        verify(
            r#"
            (module
              (import "debug" "print32" (func $p (param i32)))
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
        )
        .unwrap();
    }

    #[cfg(not(feature = "debug"))]
    #[test]
    fn debug_namespace_is_rejected_without_the_feature() {
        expect_rejection(
            r#"
            (module
              (import "debug" "print32" (func $p (param i32)))
              (memory (export "memory") 1)
              (func (export "hash_type") (result i32) i32.const 0)
              (func (export "deploy"))
              (func (export "main")))
            "#,
            "Import from invalid namespace.",
        );
    }
}
