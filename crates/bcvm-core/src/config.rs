//! Configuration types for the contract engine.

use serde::{Deserialize, Serialize};

/// Engine-wide configuration applied when the wasm engine is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Native stack available to guest execution (bytes). Recursion past
    /// this limit traps with the runtime's stack-exhaustion message.
    pub max_wasm_stack: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            max_wasm_stack: 128 * 1024, // 128 KiB stack
        }
    }
}
