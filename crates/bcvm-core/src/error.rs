//! Error types for the contract engine.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures that abort an invocation before or outside guest execution.
///
/// Traps raised while the guest is running are not errors at this level;
/// they are decoded into an [`ExecStatus`](crate::types::ExecStatus) and
/// returned inside the execution result.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Static validation, instantiation, or entry-point resolution failed.
    #[error("contract validation failed: {0}")]
    ContractValidation(String),

    /// The guest module exposes no usable linear memory.
    #[error("invalid memory access: {0}")]
    InvalidMemoryAccess(String),

    /// The underlying WebAssembly engine could not be set up.
    #[error("wasm engine error: {0}")]
    Engine(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_keeps_detail() {
        let err = EngineError::ContractValidation("hash type mismatch".to_string());
        assert!(err.to_string().contains("hash type mismatch"));
    }
}
