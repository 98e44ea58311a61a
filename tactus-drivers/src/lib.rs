//! Bus engine implementations
//!
//! This crate provides the concrete transaction engines behind the
//! contracts defined in tactus-core:
//!
//! - I2C master engines (byte-polled and batch-queue variants)
//! - A blocking embedded-hal adapter over the polled engine
//!
//! Every engine is a single-threaded cooperative state machine: it is
//! driven exclusively by repeated `service()` calls and performs at most
//! one bounded unit of work per call.

#![no_std]
#![deny(unsafe_code)]

#[cfg(test)]
extern crate std;

pub mod i2c;
