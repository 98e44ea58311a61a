//! Blocking embedded-hal adapter
//!
//! Wraps byte-polled hardware in an [`embedded_hal::i2c::I2c`]
//! implementation for drivers from the wider ecosystem that expect a
//! blocking bus. Each call builds a short-lived [`PolledMaster`] over the
//! borrowed hardware and spins it to completion.
//!
//! The configured watchdog is the only bound on each call; with a zero
//! timeout a wedged bus blocks forever, so keep a nonzero deadline here.
//!
//! Only 7-bit addressing is exposed: forcing 10-bit mode onto addresses
//! that fit in 7 bits is not representable through this adapter. 10-bit
//! targets use the engine API directly.

use embedded_hal::i2c::{ErrorKind, ErrorType, NoAcknowledgeSource, Operation, SevenBitAddress};
use tactus_core::config::EngineConfig;
use tactus_core::traits::I2cEngine;
use tactus_core::transaction::{FaultKind, Progress, Transaction};
use tactus_hal::{I2cByteHardware, SoftTimer};

use super::polled::PolledMaster;

/// Transaction failure surfaced through embedded-hal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Error(pub FaultKind);

impl embedded_hal::i2c::Error for Error {
    fn kind(&self) -> ErrorKind {
        match self.0 {
            FaultKind::Nak => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Unknown),
            FaultKind::Collision => ErrorKind::ArbitrationLoss,
            FaultKind::Overflow => ErrorKind::Overrun,
            FaultKind::Timeout | FaultKind::Other => ErrorKind::Other,
        }
    }
}

/// Blocking I2C bus over byte-polled hardware.
pub struct BlockingI2c<B: I2cByteHardware, T: SoftTimer> {
    hardware: B,
    timer: T,
    config: EngineConfig,
}

impl<B: I2cByteHardware, T: SoftTimer> BlockingI2c<B, T> {
    /// Wrap hardware and a time source.
    pub fn new(hardware: B, timer: T, config: EngineConfig) -> Self {
        Self {
            hardware,
            timer,
            config,
        }
    }

    /// Borrow the underlying hardware.
    pub fn hardware(&self) -> &B {
        &self.hardware
    }

    /// Tear down the adapter, returning hardware and timer.
    pub fn release(self) -> (B, T) {
        (self.hardware, self.timer)
    }

    fn drive(&mut self, transaction: Transaction<'_>) -> Result<(), Error> {
        let mut engine = PolledMaster::new(&mut self.hardware, &self.timer, self.config);
        engine
            .begin(transaction)
            .map_err(|_| Error(FaultKind::Other))?;
        loop {
            if engine.service() == Progress::Complete {
                break;
            }
        }
        match engine.faults().first() {
            None => Ok(()),
            Some(kind) => Err(Error(kind)),
        }
    }

    fn run(&mut self, address: u16, operations: &mut [Operation<'_>]) -> Result<(), Error> {
        match operations {
            [] => Ok(()),
            [Operation::Write(data)] => {
                let txn =
                    Transaction::write(address, *data).map_err(|_| Error(FaultKind::Other))?;
                self.drive(txn)
            }
            [Operation::Read(buffer)] => {
                let txn = Transaction::read(address, &mut **buffer)
                    .map_err(|_| Error(FaultKind::Other))?;
                self.drive(txn)
            }
            [Operation::Write(data), Operation::Read(buffer)] => {
                let txn = Transaction::write_read(address, *data, &mut **buffer)
                    .map_err(|_| Error(FaultKind::Other))?;
                self.drive(txn)
            }
            // The engine models one write and one read per transaction;
            // other operation shapes are not expressible
            _ => Err(Error(FaultKind::Other)),
        }
    }
}

impl<B: I2cByteHardware, T: SoftTimer> ErrorType for BlockingI2c<B, T> {
    type Error = Error;
}

impl<B: I2cByteHardware, T: SoftTimer> embedded_hal::i2c::I2c<SevenBitAddress>
    for BlockingI2c<B, T>
{
    fn transaction(
        &mut self,
        address: SevenBitAddress,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        self.run(u16::from(address), operations)
    }
}
