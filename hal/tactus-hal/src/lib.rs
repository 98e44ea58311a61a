//! Tactus Hardware Abstraction Layer
//!
//! This crate defines the register-level hardware traits that chip-specific
//! HALs implement. The bus engines in `tactus-drivers` are generic over
//! these traits, so the same engine logic runs on any target.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  Application / device drivers           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tactus-drivers (bus engines)           │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  tactus-hal (this crate - traits)       │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  chip HAL A   │       │  chip HAL B   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Contract
//!
//! Every trait method is a non-blocking poll or trigger: it must return
//! immediately, never spinning on hardware. The engines call them from a
//! repeatedly polled `service()` and provide all sequencing themselves.
//!
//! # Traits
//!
//! - [`i2c::I2cHardware`] - shared FIFO/fault surface of an I2C peripheral
//! - [`i2c::I2cByteHardware`] - byte-at-a-time peripherals
//! - [`i2c::I2cQueueHardware`] - peripherals with a hardware command queue
//! - [`timer::SoftTimer`] - snapshot-based deadline tickets

#![no_std]
#![deny(unsafe_code)]

pub mod i2c;
pub mod timer;

// Re-export key traits at crate root for convenience
pub use i2c::{I2cByteHardware, I2cHardware, I2cQueueHardware};
pub use timer::SoftTimer;
