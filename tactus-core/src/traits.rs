//! Engine contract traits
//!
//! These traits define the interface between device drivers and the bus
//! engines that move bytes for them. Both I2C engine variants implement
//! [`I2cEngine`] and are drop-in substitutable behind it.

use crate::transaction::{BeginError, Faults, Progress, Transaction};

/// Non-blocking I2C master transaction engine.
///
/// `'b` is the lifetime of the caller-owned buffers a transaction borrows;
/// they must stay valid and untouched from acceptance until the terminal
/// state.
///
/// # Usage
///
/// Exactly one transaction may be outstanding per instance. A `begin_*`
/// call on a busy instance is rejected with [`BeginError::Busy`] and
/// leaves all state unchanged; serializing multiple clients of one
/// physical bus is the job of an external arbiter, not the engine.
///
/// After a successful `begin_*`, call [`service`](Self::service)
/// repeatedly (from a periodic scheduler or a bare polling loop) until it
/// returns [`Progress::Complete`], then inspect
/// [`faults`](Self::faults): all-clear means success. Every outcome
/// leaves the instance idle and ready for the next transaction.
pub trait I2cEngine<'b> {
    /// Accept a transaction on an idle instance.
    fn begin(&mut self, transaction: Transaction<'b>) -> Result<(), BeginError>;

    /// Advance the transaction by at most one bounded unit of work.
    ///
    /// Never blocks; safe to call at any rate. Returns
    /// [`Progress::Pending`] while the transaction is in flight and
    /// [`Progress::Complete`] once terminal (and on an idle instance).
    /// Fault flags are only meaningful once `Complete` is returned.
    fn service(&mut self) -> Progress;

    /// Force the instance back to idle.
    ///
    /// Sets no fault flags. The physical bus state is unspecified
    /// afterwards; callers needing a clean bus must issue a reset through
    /// their HAL.
    fn abort(&mut self);

    /// Whether a transaction is outstanding.
    fn is_busy(&self) -> bool;

    /// Fault flags of the most recent transaction.
    fn faults(&self) -> Faults;

    /// Microseconds the in-flight transaction has spent since the
    /// watchdog was last rearmed, if one is running.
    fn elapsed_us(&self) -> Option<u32>;

    /// Reclaim the read buffer borrowed by the last transaction.
    ///
    /// Returns `None` while a transaction is in flight (the engine keeps
    /// the borrow until terminal state) or when no read buffer is held.
    fn take_read_buffer(&mut self) -> Option<&'b mut [u8]>;

    /// Begin a plain write.
    fn begin_write(&mut self, address: u16, data: &'b [u8]) -> Result<(), BeginError> {
        self.begin(Transaction::write(address, data)?)
    }

    /// Begin a plain read.
    fn begin_read(&mut self, address: u16, buffer: &'b mut [u8]) -> Result<(), BeginError> {
        self.begin(Transaction::read(address, buffer)?)
    }

    /// Begin a write followed by a repeated-start read.
    fn begin_write_read(
        &mut self,
        address: u16,
        data: &'b [u8],
        buffer: &'b mut [u8],
    ) -> Result<(), BeginError> {
        self.begin(Transaction::write_read(address, data, buffer)?)
    }

    /// Begin a register read (register bytes, repeated start, read).
    fn begin_register_read(
        &mut self,
        address: u16,
        register: u32,
        register_len: u8,
        buffer: &'b mut [u8],
    ) -> Result<(), BeginError> {
        self.begin(Transaction::register_read(
            address,
            register,
            register_len,
            buffer,
        )?)
    }

    /// Begin a register write (register bytes, then payload).
    fn begin_register_write(
        &mut self,
        address: u16,
        register: u32,
        register_len: u8,
        data: &'b [u8],
    ) -> Result<(), BeginError> {
        self.begin(Transaction::register_write(
            address,
            register,
            register_len,
            data,
        )?)
    }
}
