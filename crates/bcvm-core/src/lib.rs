//! Core types and utilities for the bcvm contract execution engine.

pub mod config;
pub mod error;
pub mod host;
pub mod types;

pub use config::EngineConfig;
pub use error::{EngineError, Result};
pub use host::{CallMode, CallOutcome, CallStatus, CreateOutcome, HostContext};
pub use types::*;
