//! Board-agnostic core types for the Tactus bus engines
//!
//! This crate contains everything the engines share that does not depend
//! on specific hardware implementations:
//!
//! - The I2C transaction model (addressing, buffers, register phase)
//! - Fault flags and terminal-outcome reporting
//! - The engine contract trait (begin / service / abort / query)
//! - Configuration type definitions

#![no_std]
#![deny(unsafe_code)]

pub mod config;
pub mod traits;
pub mod transaction;

// Re-export the contract surface at crate root for convenience
pub use config::{EngineConfig, DEFAULT_TRANSACTION_TIMEOUT_US};
pub use traits::I2cEngine;
pub use transaction::{Address, BeginError, FaultKind, Faults, Progress, Transaction};
