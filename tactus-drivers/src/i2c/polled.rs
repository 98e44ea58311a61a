//! Byte-polled I2C master engine
//!
//! Drives a transaction one element at a time by testing hardware "ready"
//! flags and moving single bytes, suited to peripherals that expose
//! shift-register-style data ports. Every byte follows the same rhythm:
//! wait for transmit-ready, write, wait for the ACK-or-NAK response,
//! branch. Reads additionally arm the receive path ahead of each byte so
//! hardware can pre-program its ACK/NAK answer.
//!
//! # Phase sequence
//!
//! ```text
//! Idle → Start → AddressWrite → [AddressWriteExt] → [RegisterBytes]
//!      → [Restart → AddressRead] → DataTransfer → Stop → Idle
//! ```
//!
//! A 7-bit transaction with nothing to transmit skips straight from
//! `Start` to `AddressRead`: the single address byte already carries the
//! read direction, so no repeated start is needed.

use tactus_core::config::EngineConfig;
use tactus_core::traits::I2cEngine;
use tactus_core::transaction::{
    register_byte, Address, BeginError, Faults, Progress, Transaction,
};
use tactus_hal::{I2cByteHardware, SoftTimer};

use super::watchdog::Watchdog;

/// Transaction phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    /// No transaction outstanding
    Idle,
    /// Start condition triggered, waiting for the bus
    Start,
    /// First address byte out, ACK pending
    AddressWrite,
    /// Second 10-bit address byte out, ACK pending
    AddressWriteExt,
    /// Register value bytes out, MSB first
    RegisterBytes,
    /// Repeated start before reversing bus direction
    Restart,
    /// Read-direction re-addressing byte out, ACK pending
    AddressRead,
    /// Payload bytes moving in either direction
    DataTransfer,
    /// Stop condition triggered, waiting for the bus
    Stop,
}

/// Sub-position within a phase.
///
/// `Confirm` is only used by the read path, which has three bounded HAL
/// interactions per byte (arm receive, read, clock out the response).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Step {
    Request,
    Response,
    Confirm,
}

/// Byte-polled I2C master transaction engine.
///
/// `'b` bounds the caller-owned buffers; they stay borrowed until the
/// engine releases them (next `begin`, [`take_read_buffer`] or
/// [`release`]).
///
/// [`take_read_buffer`]: I2cEngine::take_read_buffer
/// [`release`]: PolledMaster::release
pub struct PolledMaster<'b, B: I2cByteHardware, T: SoftTimer> {
    hardware: B,
    watchdog: Watchdog<T>,
    phase: Phase,
    step: Step,
    address: Address,
    initial_write: bool,
    register: u32,
    register_len: u8,
    register_sent: u8,
    write: Option<&'b [u8]>,
    written: usize,
    read: Option<&'b mut [u8]>,
    read_count: usize,
    faults: Faults,
}

impl<'b, B: I2cByteHardware, T: SoftTimer> PolledMaster<'b, B, T> {
    /// Wire up an engine to its hardware and time source.
    pub fn new(hardware: B, timer: T, config: EngineConfig) -> Self {
        Self {
            hardware,
            watchdog: Watchdog::new(timer, config.timeout_us),
            phase: Phase::Idle,
            step: Step::Request,
            address: Address::Seven(0),
            initial_write: false,
            register: 0,
            register_len: 0,
            register_sent: 0,
            write: None,
            written: 0,
            read: None,
            read_count: 0,
            faults: Faults::default(),
        }
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Borrow the underlying hardware.
    pub fn hardware(&self) -> &B {
        &self.hardware
    }

    /// Tear down the engine, returning hardware and timer.
    pub fn release(self) -> (B, T) {
        (self.hardware, self.watchdog.into_timer())
    }

    fn write_total(&self) -> usize {
        self.write.map_or(0, <[u8]>::len)
    }

    fn read_total(&self) -> usize {
        self.read.as_ref().map_or(0, |b| b.len())
    }

    /// Drive one write-direction byte through request/response.
    ///
    /// Returns `Some(acked)` once the slave's answer for `byte` is in,
    /// `None` while still pending.
    fn step_write_byte(&mut self, byte: u8) -> Option<bool> {
        match self.step {
            Step::Request => {
                if self.hardware.is_tx_ready() {
                    self.hardware.write_tx_register(byte);
                    self.step = Step::Response;
                }
                None
            }
            Step::Response => {
                // Transmit-ready again means the byte and its response
                // bit have been clocked
                if self.hardware.is_tx_ready() {
                    self.step = Step::Request;
                    Some(self.hardware.is_ack_received())
                } else {
                    None
                }
            }
            Step::Confirm => None,
        }
    }

    /// Pick the phase that follows the write-direction stream at its
    /// current position: register bytes, then payload, then the read
    /// turnaround, then stop.
    fn advance_write_direction(&mut self) {
        self.step = Step::Request;
        if self.register_sent < self.register_len {
            self.phase = Phase::RegisterBytes;
        } else if self.written < self.write_total() {
            self.phase = Phase::DataTransfer;
        } else if self.read.is_some() {
            self.phase = Phase::Restart;
        } else {
            self.phase = Phase::Stop;
        }
    }

    fn fail_nak(&mut self) {
        self.faults.nak = true;
        self.phase = Phase::Stop;
        self.step = Step::Request;
    }

    fn finish(&mut self) {
        self.phase = Phase::Idle;
        self.step = Step::Request;
        self.watchdog.disarm();
    }

    fn service_start(&mut self) {
        if self.step == Step::Request {
            self.hardware.send_start_condition();
            self.step = Step::Response;
        } else if self.hardware.is_start_completed() {
            self.phase = if self.initial_write {
                Phase::AddressWrite
            } else {
                Phase::AddressRead
            };
            self.step = Step::Request;
        }
    }

    fn service_address_write(&mut self) {
        let (bytes, _) = self.address.initial_bytes(false);
        match self.step_write_byte(bytes[0]) {
            Some(true) => {
                self.watchdog.arm();
                if self.address.is_ten_bit() {
                    self.phase = Phase::AddressWriteExt;
                } else {
                    self.advance_write_direction();
                }
            }
            // A slave that declines its own address is absent or busy
            Some(false) => self.fail_nak(),
            None => {}
        }
    }

    fn service_address_write_ext(&mut self) {
        let (bytes, _) = self.address.initial_bytes(false);
        match self.step_write_byte(bytes[1]) {
            Some(true) => {
                self.watchdog.arm();
                self.advance_write_direction();
            }
            Some(false) => self.fail_nak(),
            None => {}
        }
    }

    fn service_register_bytes(&mut self) {
        let byte = register_byte(self.register, self.register_len, self.register_sent);
        match self.step_write_byte(byte) {
            Some(acked) => {
                // A NAK is only the expected terminator when this was the
                // final write-direction byte of the whole transaction
                let last = self.register_sent + 1 == self.register_len
                    && self.write_total() == 0;
                if acked || last {
                    self.register_sent += 1;
                    self.watchdog.arm();
                    if self.register_sent == self.register_len {
                        self.advance_write_direction();
                    }
                } else {
                    self.fail_nak();
                }
            }
            None => {}
        }
    }

    fn service_restart(&mut self) {
        if self.step == Step::Request {
            self.hardware.send_restart_condition();
            self.step = Step::Response;
        } else if self.hardware.is_restart_completed() {
            self.phase = Phase::AddressRead;
            self.step = Step::Request;
        }
    }

    fn service_address_read(&mut self) {
        match self.step_write_byte(self.address.read_address_byte()) {
            Some(true) => {
                self.watchdog.arm();
                self.step = Step::Request;
                self.phase = if self.read_total() > 0 {
                    Phase::DataTransfer
                } else {
                    // Empty read buffer: the probe ends here
                    Phase::Stop
                };
            }
            Some(false) => self.fail_nak(),
            None => {}
        }
    }

    fn service_data_transfer(&mut self) {
        if self.written < self.write_total() {
            self.service_data_write();
        } else {
            self.service_data_read();
        }
    }

    fn service_data_write(&mut self) {
        let byte = self.write.map_or(0, |w| w[self.written]);
        match self.step_write_byte(byte) {
            Some(acked) => {
                let last = self.written + 1 == self.write_total();
                if acked || last {
                    self.written += 1;
                    self.watchdog.arm();
                    if self.written == self.write_total() {
                        self.advance_write_direction();
                    }
                } else {
                    // NAK ends a write phase early; anywhere but the last
                    // intended byte that is a bus fault
                    self.fail_nak();
                }
            }
            None => {}
        }
    }

    fn service_data_read(&mut self) {
        match self.step {
            Step::Request => {
                let last = self.read_count + 1 == self.read_total();
                self.hardware.enable_rx(last);
                self.step = Step::Response;
            }
            Step::Response => {
                if self.hardware.is_rx_ready() {
                    let byte = self.hardware.read_rx_register();
                    let last = self.read_count + 1 == self.read_total();
                    if let Some(buffer) = self.read.as_mut() {
                        buffer[self.read_count] = byte;
                    }
                    if last {
                        self.hardware.send_nak();
                    } else {
                        self.hardware.send_ack();
                    }
                    self.step = Step::Confirm;
                }
            }
            Step::Confirm => {
                if self.hardware.is_response_completed() {
                    self.read_count += 1;
                    self.watchdog.arm();
                    self.step = Step::Request;
                    if self.read_count == self.read_total() {
                        self.phase = Phase::Stop;
                    }
                }
            }
        }
    }

    fn service_stop(&mut self) -> Progress {
        if self.step == Step::Request {
            self.hardware.send_stop_condition();
            self.step = Step::Response;
            Progress::Pending
        } else if self.hardware.is_stop_completed() {
            self.finish();
            Progress::Complete
        } else {
            Progress::Pending
        }
    }
}

impl<'b, B: I2cByteHardware, T: SoftTimer> I2cEngine<'b> for PolledMaster<'b, B, T> {
    fn begin(&mut self, transaction: Transaction<'b>) -> Result<(), BeginError> {
        if self.phase != Phase::Idle {
            return Err(BeginError::Busy);
        }
        let initial_write = transaction.has_write_phase();
        let parts = transaction.into_parts();
        self.address = parts.address;
        self.initial_write = initial_write;
        self.register = parts.register;
        self.register_len = parts.register_len;
        self.register_sent = 0;
        self.write = parts.write;
        self.written = 0;
        self.read = parts.read;
        self.read_count = 0;
        self.faults.clear();
        self.hardware.clear_faults();
        self.hardware.reset_for_transaction();
        self.watchdog.arm();
        self.phase = Phase::Start;
        self.step = Step::Request;
        Ok(())
    }

    fn service(&mut self) -> Progress {
        if self.phase == Phase::Idle {
            return Progress::Complete;
        }
        if self.watchdog.expired() {
            // The bus cannot be trusted after a stall; skip the stop
            // attempt and leave recovery to the caller's HAL
            self.faults.timeout = true;
            self.finish();
            return Progress::Complete;
        }
        if self.phase != Phase::Stop {
            if self.hardware.arbitration_lost() {
                self.faults.collision = true;
                self.phase = Phase::Stop;
                self.step = Step::Request;
                return Progress::Pending;
            }
            if self.hardware.rx_overflow() {
                self.faults.overflow = true;
                self.phase = Phase::Stop;
                self.step = Step::Request;
                return Progress::Pending;
            }
            if self.hardware.fault() {
                self.faults.other = true;
                self.phase = Phase::Stop;
                self.step = Step::Request;
                return Progress::Pending;
            }
        }
        match self.phase {
            Phase::Idle => Progress::Complete,
            Phase::Start => {
                self.service_start();
                Progress::Pending
            }
            Phase::AddressWrite => {
                self.service_address_write();
                Progress::Pending
            }
            Phase::AddressWriteExt => {
                self.service_address_write_ext();
                Progress::Pending
            }
            Phase::RegisterBytes => {
                self.service_register_bytes();
                Progress::Pending
            }
            Phase::Restart => {
                self.service_restart();
                Progress::Pending
            }
            Phase::AddressRead => {
                self.service_address_read();
                Progress::Pending
            }
            Phase::DataTransfer => {
                self.service_data_transfer();
                Progress::Pending
            }
            Phase::Stop => self.service_stop(),
        }
    }

    fn abort(&mut self) {
        if self.phase != Phase::Idle {
            // Best effort; completion is not polled
            self.hardware.send_stop_condition();
        }
        self.finish();
    }

    fn is_busy(&self) -> bool {
        self.phase != Phase::Idle
    }

    fn faults(&self) -> Faults {
        self.faults
    }

    fn elapsed_us(&self) -> Option<u32> {
        self.watchdog.elapsed_us()
    }

    fn take_read_buffer(&mut self) -> Option<&'b mut [u8]> {
        if self.phase == Phase::Idle {
            self.read.take()
        } else {
            None
        }
    }
}
