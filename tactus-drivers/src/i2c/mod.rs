//! I2C master engines
//!
//! Two engines implement the one contract defined by
//! `tactus_core::I2cEngine`, differing only in how they talk to silicon:
//!
//! - [`PolledMaster`] moves the bus one byte at a time against
//!   shift-register-style peripherals ([`tactus_hal::I2cByteHardware`]).
//! - [`QueuedMaster`] builds hardware command lists for peripherals with
//!   a built-in sequencer ([`tactus_hal::I2cQueueHardware`]), trading
//!   per-byte software overhead for queue-depth bookkeeping.
//!
//! Callers pick whichever matches their peripheral; the two are drop-in
//! substitutable. [`BlockingI2c`] additionally adapts the polled engine
//! to the blocking `embedded_hal::i2c::I2c` trait.

pub mod blocking;
pub mod polled;
pub mod queued;

mod watchdog;

#[cfg(test)]
pub(crate) mod mock;

pub use blocking::BlockingI2c;
pub use polled::{Phase, PolledMaster};
pub use queued::QueuedMaster;
