//! Scripted hardware and timer mocks shared by the engine tests.
//!
//! The byte-bus mock simulates a slave one HAL call at a time and records
//! everything that would have reached the wire; the queue mock records
//! whole command batches. Tests pre-program fault behavior, drive the
//! engine, then assert on the recorded traces.

use core::cell::Cell;

use heapless::Vec;
use tactus_core::FaultKind;
use tactus_hal::{I2cByteHardware, I2cHardware, I2cQueueHardware, SoftTimer};

/// One recorded byte-bus interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Start,
    Restart,
    Stop,
    Write(u8),
    EnableRx { last: bool },
    Read(u8),
    Ack,
    Nak,
}

/// Byte-at-a-time bus mock with a scripted slave behind it.
#[derive(Default)]
pub struct MockByteBus {
    /// Everything that reached the wire, in order.
    pub trace: Vec<BusOp, 128>,
    /// Bytes the fake slave serves to master reads.
    pub rx_data: Vec<u8, 32>,
    /// 0-based index of the transmitted byte (addresses included) the
    /// slave answers with NAK; all others are ACKed.
    pub nak_on_write: Option<usize>,
    /// Transmit path never becomes ready (stall for timeout tests).
    pub stall_tx: bool,
    /// Report arbitration loss once this many bytes have been read.
    pub collide_after_reads: Option<usize>,
    /// Latch a receive overrun.
    pub overflow: bool,
    writes_seen: usize,
    last_write_acked: bool,
    rx_pos: usize,
    rx_armed: bool,
}

impl MockByteBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rx(data: &[u8]) -> Self {
        let mut mock = Self::new();
        mock.rx_data.extend_from_slice(data).unwrap();
        mock
    }

    /// Bytes written to the bus, in order (addresses included).
    pub fn written(&self) -> Vec<u8, 128> {
        let mut bytes = Vec::new();
        for op in &self.trace {
            if let BusOp::Write(b) = op {
                bytes.push(*b).unwrap();
            }
        }
        bytes
    }
}

impl I2cHardware for MockByteBus {
    fn is_tx_ready(&mut self) -> bool {
        !self.stall_tx
    }

    fn is_rx_ready(&mut self) -> bool {
        self.rx_armed && self.rx_pos < self.rx_data.len()
    }

    fn write_tx_register(&mut self, byte: u8) {
        self.trace.push(BusOp::Write(byte)).unwrap();
        self.last_write_acked = self.nak_on_write != Some(self.writes_seen);
        self.writes_seen += 1;
    }

    fn read_rx_register(&mut self) -> u8 {
        let byte = self.rx_data[self.rx_pos];
        self.rx_pos += 1;
        self.rx_armed = false;
        self.trace.push(BusOp::Read(byte)).unwrap();
        byte
    }

    fn arbitration_lost(&mut self) -> bool {
        self.collide_after_reads
            .map_or(false, |n| self.rx_pos >= n)
    }

    fn rx_overflow(&mut self) -> bool {
        self.overflow
    }
}

impl I2cByteHardware for MockByteBus {
    fn send_start_condition(&mut self) {
        self.trace.push(BusOp::Start).unwrap();
    }

    fn is_start_completed(&mut self) -> bool {
        true
    }

    fn send_restart_condition(&mut self) {
        self.trace.push(BusOp::Restart).unwrap();
    }

    fn is_restart_completed(&mut self) -> bool {
        true
    }

    fn send_stop_condition(&mut self) {
        self.trace.push(BusOp::Stop).unwrap();
    }

    fn is_stop_completed(&mut self) -> bool {
        true
    }

    fn is_ack_received(&mut self) -> bool {
        self.last_write_acked
    }

    fn enable_rx(&mut self, last: bool) {
        self.trace.push(BusOp::EnableRx { last }).unwrap();
        self.rx_armed = true;
    }

    fn send_ack(&mut self) {
        self.trace.push(BusOp::Ack).unwrap();
    }

    fn send_nak(&mut self) {
        self.trace.push(BusOp::Nak).unwrap();
    }

    fn is_response_completed(&mut self) -> bool {
        true
    }
}

/// One recorded command of a batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueueCmd {
    Start,
    Restart,
    Write { count: usize },
    Read { count: usize, ack: bool },
    End,
    Stop,
}

/// Command-queue bus mock.
pub struct MockQueueBus {
    /// Hardware queue depth reported to the engine.
    pub depth: usize,
    /// Bytes the fake slave serves to read commands.
    pub rx_data: Vec<u8, 64>,
    /// Batch number (0-based) whose execution latches the given fault
    /// instead of completing.
    pub fail_on_batch: Option<(usize, FaultKind)>,
    /// Execution never completes (stall for timeout tests).
    pub stall_execution: bool,
    /// Set once the engine fired the abort trigger.
    pub aborted: bool,
    /// Every executed (or fault-latched) batch, in submission order.
    pub batches: Vec<Vec<QueueCmd, 16>, 8>,
    /// All bytes pushed through the transmit register, in order.
    pub tx_bytes: Vec<u8, 64>,
    queue: Vec<QueueCmd, 16>,
    rx_fifo: Vec<u8, 64>,
    rx_fifo_pos: usize,
    rx_served: usize,
    executing: bool,
    fault_latched: Option<FaultKind>,
}

impl MockQueueBus {
    pub fn new(depth: usize) -> Self {
        Self {
            depth,
            rx_data: Vec::new(),
            fail_on_batch: None,
            stall_execution: false,
            aborted: false,
            batches: Vec::new(),
            tx_bytes: Vec::new(),
            queue: Vec::new(),
            rx_fifo: Vec::new(),
            rx_fifo_pos: 0,
            rx_served: 0,
            executing: false,
            fault_latched: None,
        }
    }

    pub fn with_rx(depth: usize, data: &[u8]) -> Self {
        let mut mock = Self::new(depth);
        mock.rx_data.extend_from_slice(data).unwrap();
        mock
    }

    fn enqueue(&mut self, index: usize, cmd: QueueCmd) {
        assert_eq!(index, self.queue.len(), "engine enqueued out of order");
        assert!(index < self.depth, "engine overran the command queue");
        self.queue.push(cmd).unwrap();
    }
}

impl I2cHardware for MockQueueBus {
    fn is_tx_ready(&mut self) -> bool {
        true
    }

    fn is_rx_ready(&mut self) -> bool {
        self.rx_fifo_pos < self.rx_fifo.len()
    }

    fn write_tx_register(&mut self, byte: u8) {
        self.tx_bytes.push(byte).unwrap();
    }

    fn read_rx_register(&mut self) -> u8 {
        let byte = self.rx_fifo[self.rx_fifo_pos];
        self.rx_fifo_pos += 1;
        byte
    }

    fn nak_detected(&mut self) -> bool {
        self.fault_latched == Some(FaultKind::Nak)
    }

    fn arbitration_lost(&mut self) -> bool {
        self.fault_latched == Some(FaultKind::Collision)
    }

    fn rx_overflow(&mut self) -> bool {
        self.fault_latched == Some(FaultKind::Overflow)
    }

    fn fault(&mut self) -> bool {
        self.fault_latched == Some(FaultKind::Other)
    }
}

impl I2cQueueHardware for MockQueueBus {
    fn queue_depth(&self) -> usize {
        self.depth
    }

    fn enqueue_start(&mut self, index: usize) {
        self.enqueue(index, QueueCmd::Start);
    }

    fn enqueue_restart(&mut self, index: usize) {
        self.enqueue(index, QueueCmd::Restart);
    }

    fn enqueue_write(&mut self, index: usize, count: usize) {
        self.enqueue(index, QueueCmd::Write { count });
    }

    fn enqueue_read(&mut self, index: usize, count: usize, ack: bool) {
        self.enqueue(index, QueueCmd::Read { count, ack });
    }

    fn enqueue_end(&mut self, index: usize) {
        self.enqueue(index, QueueCmd::End);
    }

    fn enqueue_stop(&mut self, index: usize) {
        self.enqueue(index, QueueCmd::Stop);
    }

    fn trigger_execute(&mut self) {
        let batch_no = self.batches.len();
        self.batches.push(self.queue.clone()).unwrap();
        if let Some((fail_no, kind)) = self.fail_on_batch {
            if fail_no == batch_no {
                self.fault_latched = Some(kind);
                self.queue.clear();
                return;
            }
        }
        // Serve the slave's bytes for every read command in this batch
        for cmd in &self.queue {
            if let QueueCmd::Read { count, .. } = cmd {
                for _ in 0..*count {
                    let byte = self.rx_data.get(self.rx_served).copied().unwrap_or(0xFF);
                    self.rx_served += 1;
                    self.rx_fifo.push(byte).unwrap();
                }
            }
        }
        self.queue.clear();
        self.executing = true;
    }

    fn trigger_abort(&mut self) {
        self.aborted = true;
        self.executing = false;
        self.fault_latched = None;
    }

    fn is_batch_completed(&mut self, last_index: usize) -> bool {
        if self.stall_execution || self.fault_latched.is_some() || !self.executing {
            return false;
        }
        let batch = self.batches.last().expect("no batch submitted");
        assert_eq!(last_index, batch.len() - 1, "engine polled the wrong slot");
        self.executing = false;
        true
    }
}

/// Deadline ticket of [`MockTimer`].
#[derive(Debug, Clone, Copy)]
pub struct MockTicket {
    created: u32,
    deadline_us: u32,
}

/// Monotonic mock clock advanced manually by tests.
///
/// Engines borrow it (`&MockTimer` implements `SoftTimer`), so a test can
/// advance time while a transaction is in flight.
#[derive(Default)]
pub struct MockTimer {
    now: Cell<u32>,
    auto_tick: Cell<u32>,
}

impl MockTimer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, us: u32) {
        self.now.set(self.now.get() + us);
    }

    /// Let time pass on every expiry poll, for tests that cannot advance
    /// the clock themselves (blocking adapter).
    pub fn auto_tick(&self, us: u32) {
        self.auto_tick.set(us);
    }
}

impl SoftTimer for MockTimer {
    type Ticket = MockTicket;

    fn ticket(&self, deadline_us: u32) -> MockTicket {
        MockTicket {
            created: self.now.get(),
            deadline_us,
        }
    }

    fn is_expired(&self, ticket: &MockTicket) -> bool {
        self.now.set(self.now.get() + self.auto_tick.get());
        self.now.get() - ticket.created >= ticket.deadline_us
    }

    fn elapsed_us(&self, ticket: &MockTicket) -> u32 {
        self.now.get() - ticket.created
    }
}
