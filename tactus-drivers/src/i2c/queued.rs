//! Batch-queue I2C master engine
//!
//! Drives the same transactions as the byte-polled engine, but against
//! peripherals with a built-in command sequencer: the transaction is
//! planned into abstract bus commands (start / restart / write-N /
//! read-N-with-ack / end / stop), enqueued up to the hardware queue
//! depth, and executed as one hardware-managed burst per batch.
//!
//! When a transaction needs more commands than the queue holds, the last
//! slot of a batch takes an `end` marker (more data follows, no stop on
//! the bus), the batch runs, its read bytes are drained, and command
//! building resumes where it left off. The transaction is only complete
//! once the batch carrying the `stop` command has executed.
//!
//! A multi-byte read is always split into one N−1 byte command answered
//! with ACK and a final single-byte command answered with NAK, as the
//! protocol requires for terminating a master read.

use heapless::Vec;
use tactus_core::config::EngineConfig;
use tactus_core::traits::I2cEngine;
use tactus_core::transaction::{
    register_byte, Address, BeginError, Faults, Progress, Transaction,
};
use tactus_hal::{I2cQueueHardware, SoftTimer};

use super::watchdog::Watchdog;

/// Longest possible segment sequence: start, address, register, payload,
/// restart, re-address, read body, read tail, stop.
const MAX_SEGMENTS: usize = 9;

/// One logical slice of the command plan. Each segment maps to exactly
/// one hardware command and never splits across batches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Seg {
    Start,
    AddressWrite,
    Register,
    WriteData,
    Restart,
    AddressRead,
    /// First N−1 read bytes, ACKed
    ReadBody,
    /// Final read byte, NAKed
    ReadTail,
    Stop,
}

/// Execution state of the batch machinery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Idle,
    /// Enqueueing commands and pushing their transmit bytes
    Fill,
    /// Batch submitted, waiting for hardware
    Execute,
    /// Draining the batch's receive bytes
    Drain,
}

/// Batch-queue I2C master transaction engine.
///
/// External contract identical to the byte-polled engine; only the
/// execution strategy differs. Requires a hardware queue depth of at
/// least 2 (one command plus the continuation marker).
pub struct QueuedMaster<'b, Q: I2cQueueHardware, T: SoftTimer> {
    hardware: Q,
    watchdog: Watchdog<T>,
    mode: Mode,
    plan: Vec<Seg, MAX_SEGMENTS>,
    seg_index: usize,
    address: Address,
    register: u32,
    register_len: u8,
    write: Option<&'b [u8]>,
    read: Option<&'b mut [u8]>,
    /// Next free slot of the current batch
    cursor: usize,
    /// Final slot of the submitted batch, polled for completion
    last_index: usize,
    /// Transmit bytes still owed for the command enqueued last
    tx_remaining: usize,
    /// Receive bytes to drain once the current batch completes
    batch_rx: usize,
    /// Read-buffer progress across the whole transaction
    read_drained: usize,
    faults: Faults,
}

impl<'b, Q: I2cQueueHardware, T: SoftTimer> QueuedMaster<'b, Q, T> {
    /// Wire up an engine to its hardware and time source.
    pub fn new(hardware: Q, timer: T, config: EngineConfig) -> Self {
        debug_assert!(hardware.queue_depth() >= 2);
        Self {
            hardware,
            watchdog: Watchdog::new(timer, config.timeout_us),
            mode: Mode::Idle,
            plan: Vec::new(),
            seg_index: 0,
            address: Address::Seven(0),
            register: 0,
            register_len: 0,
            write: None,
            read: None,
            cursor: 0,
            last_index: 0,
            tx_remaining: 0,
            batch_rx: 0,
            read_drained: 0,
            faults: Faults::default(),
        }
    }

    /// Borrow the underlying hardware.
    pub fn hardware(&self) -> &Q {
        &self.hardware
    }

    /// Tear down the engine, returning hardware and timer.
    pub fn release(self) -> (Q, T) {
        (self.hardware, self.watchdog.into_timer())
    }

    fn write_total(&self) -> usize {
        self.write.map_or(0, <[u8]>::len)
    }

    fn read_total(&self) -> usize {
        self.read.as_ref().map_or(0, |b| b.len())
    }

    fn push_seg(&mut self, seg: Seg) {
        // MAX_SEGMENTS covers every plan this builder can produce
        if self.plan.push(seg).is_err() {
            debug_assert!(false, "segment plan overflow");
        }
    }

    /// Transmit byte owed for the command enqueued last.
    fn next_tx_byte(&self) -> u8 {
        let seg = self.plan[self.seg_index - 1];
        match seg {
            Seg::AddressWrite => {
                let (bytes, len) = self.address.initial_bytes(false);
                bytes[len - self.tx_remaining]
            }
            Seg::AddressRead => self.address.read_address_byte(),
            Seg::Register => {
                let sent = self.register_len - self.tx_remaining as u8;
                register_byte(self.register, self.register_len, sent)
            }
            Seg::WriteData => self.write.map_or(0, |w| w[w.len() - self.tx_remaining]),
            _ => 0,
        }
    }

    fn enqueue_segment(&mut self) {
        let seg = self.plan[self.seg_index];
        let index = self.cursor;
        match seg {
            Seg::Start => self.hardware.enqueue_start(index),
            Seg::Restart => self.hardware.enqueue_restart(index),
            Seg::AddressWrite => {
                let (_, len) = self.address.initial_bytes(false);
                self.hardware.enqueue_write(index, len);
                self.tx_remaining = len;
            }
            Seg::AddressRead => {
                self.hardware.enqueue_write(index, 1);
                self.tx_remaining = 1;
            }
            Seg::Register => {
                let len = usize::from(self.register_len);
                self.hardware.enqueue_write(index, len);
                self.tx_remaining = len;
            }
            Seg::WriteData => {
                let len = self.write_total();
                self.hardware.enqueue_write(index, len);
                self.tx_remaining = len;
            }
            Seg::ReadBody => {
                let count = self.read_total() - 1;
                self.hardware.enqueue_read(index, count, true);
                self.batch_rx += count;
            }
            Seg::ReadTail => {
                self.hardware.enqueue_read(index, 1, false);
                self.batch_rx += 1;
            }
            Seg::Stop => self.hardware.enqueue_stop(index),
        }
        self.cursor += 1;
        self.seg_index += 1;
    }

    fn submit_batch(&mut self) {
        self.last_index = self.cursor - 1;
        self.hardware.trigger_execute();
        self.mode = Mode::Execute;
    }

    fn finish(&mut self) {
        self.mode = Mode::Idle;
        self.watchdog.disarm();
    }

    fn abort_batch(&mut self) -> Progress {
        self.hardware.trigger_abort();
        self.finish();
        Progress::Complete
    }

    fn service_fill(&mut self) -> Progress {
        if self.tx_remaining > 0 {
            if self.hardware.is_tx_ready() {
                let byte = self.next_tx_byte();
                self.hardware.write_tx_register(byte);
                self.tx_remaining -= 1;
            }
            return Progress::Pending;
        }
        if self.seg_index == self.plan.len() {
            // Everything is enqueued; this batch carries the stop command
            self.submit_batch();
            return Progress::Pending;
        }
        let free = self.hardware.queue_depth() - self.cursor;
        let remaining = self.plan.len() - self.seg_index;
        if free == 1 && remaining > 1 {
            // Reserve the final slot for the continuation marker
            self.hardware.enqueue_end(self.cursor);
            self.cursor += 1;
            self.submit_batch();
            return Progress::Pending;
        }
        self.enqueue_segment();
        Progress::Pending
    }

    fn service_execute(&mut self) -> Progress {
        if self.hardware.nak_detected() {
            // Batch hardware cannot attribute the NAK to a byte, so it is
            // always a fault here (unlike the byte-polled engine's
            // last-write-byte tolerance)
            self.faults.nak = true;
            return self.abort_batch();
        }
        if self.hardware.arbitration_lost() {
            self.faults.collision = true;
            return self.abort_batch();
        }
        if self.hardware.rx_overflow() {
            self.faults.overflow = true;
            return self.abort_batch();
        }
        if self.hardware.fault() {
            self.faults.other = true;
            return self.abort_batch();
        }
        if self.hardware.is_batch_completed(self.last_index) {
            // Per-element completion is not observable once a batch has
            // been submitted; the watchdog rearms per sub-batch instead
            self.watchdog.arm();
            self.mode = Mode::Drain;
        }
        Progress::Pending
    }

    fn service_drain(&mut self) -> Progress {
        if self.batch_rx > 0 {
            if self.hardware.is_rx_ready() {
                let byte = self.hardware.read_rx_register();
                if let Some(buffer) = self.read.as_mut() {
                    buffer[self.read_drained] = byte;
                }
                self.read_drained += 1;
                self.batch_rx -= 1;
                self.watchdog.arm();
            }
            return Progress::Pending;
        }
        if self.seg_index == self.plan.len() {
            // The sub-batch carrying the stop command has completed
            self.finish();
            return Progress::Complete;
        }
        // Continuation: rebuild from the current segment, no new start
        self.cursor = 0;
        self.mode = Mode::Fill;
        Progress::Pending
    }
}

impl<'b, Q: I2cQueueHardware, T: SoftTimer> I2cEngine<'b> for QueuedMaster<'b, Q, T> {
    fn begin(&mut self, transaction: Transaction<'b>) -> Result<(), BeginError> {
        if self.mode != Mode::Idle {
            return Err(BeginError::Busy);
        }
        let has_write_phase = transaction.has_write_phase();
        let parts = transaction.into_parts();
        self.address = parts.address;
        self.register = parts.register;
        self.register_len = parts.register_len;
        self.write = parts.write;
        self.read = parts.read;

        self.plan.clear();
        self.push_seg(Seg::Start);
        if has_write_phase {
            self.push_seg(Seg::AddressWrite);
            if self.register_len > 0 {
                self.push_seg(Seg::Register);
            }
            if self.write_total() > 0 {
                self.push_seg(Seg::WriteData);
            }
            if self.read.is_some() {
                self.push_seg(Seg::Restart);
                self.push_seg(Seg::AddressRead);
            }
        } else {
            self.push_seg(Seg::AddressRead);
        }
        let read_len = self.read_total();
        if read_len > 1 {
            self.push_seg(Seg::ReadBody);
        }
        if read_len > 0 {
            self.push_seg(Seg::ReadTail);
        }
        self.push_seg(Seg::Stop);

        self.seg_index = 0;
        self.cursor = 0;
        self.tx_remaining = 0;
        self.batch_rx = 0;
        self.read_drained = 0;
        self.faults.clear();
        self.hardware.clear_faults();
        self.hardware.reset_for_transaction();
        self.watchdog.arm();
        self.mode = Mode::Fill;
        Ok(())
    }

    fn service(&mut self) -> Progress {
        if self.mode == Mode::Idle {
            return Progress::Complete;
        }
        if self.watchdog.expired() {
            self.faults.timeout = true;
            if self.mode == Mode::Execute {
                self.hardware.trigger_abort();
            }
            self.finish();
            return Progress::Complete;
        }
        match self.mode {
            Mode::Idle => Progress::Complete,
            Mode::Fill => self.service_fill(),
            Mode::Execute => self.service_execute(),
            Mode::Drain => self.service_drain(),
        }
    }

    fn abort(&mut self) {
        if self.mode != Mode::Idle {
            self.hardware.trigger_abort();
        }
        self.finish();
    }

    fn is_busy(&self) -> bool {
        self.mode != Mode::Idle
    }

    fn faults(&self) -> Faults {
        self.faults
    }

    fn elapsed_us(&self) -> Option<u32> {
        self.watchdog.elapsed_us()
    }

    fn take_read_buffer(&mut self) -> Option<&'b mut [u8]> {
        if self.mode == Mode::Idle {
            self.read.take()
        } else {
            None
        }
    }
}
