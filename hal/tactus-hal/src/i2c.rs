//! I2C hardware abstractions
//!
//! Two execution models are covered by two traits sharing a common base:
//!
//! - [`I2cByteHardware`] for peripherals that expose shift-register-style
//!   data ports and per-condition trigger/poll pairs. The engine moves the
//!   bus one byte at a time.
//! - [`I2cQueueHardware`] for peripherals with a built-in command
//!   sequencer. The engine enqueues abstract bus commands and triggers one
//!   hardware-managed burst per batch.
//!
//! Fault polls on the base trait default to "never faulted" so a HAL only
//! implements the ones its silicon reports.

/// Shared surface of an I2C master peripheral.
///
/// Covers the data FIFO and the fault/reset hooks common to both
/// execution models.
pub trait I2cHardware {
    /// Poll whether the transmit path can accept one more byte.
    fn is_tx_ready(&mut self) -> bool;

    /// Poll whether the receive path holds at least one byte.
    fn is_rx_ready(&mut self) -> bool;

    /// Push one byte into the transmit register/FIFO.
    ///
    /// Only called after [`is_tx_ready`](Self::is_tx_ready) returned true.
    fn write_tx_register(&mut self, byte: u8);

    /// Pop one byte from the receive register/FIFO.
    ///
    /// Only called after [`is_rx_ready`](Self::is_rx_ready) returned true.
    fn read_rx_register(&mut self) -> u8;

    /// Poll whether the slave declined the last address or data byte.
    fn nak_detected(&mut self) -> bool {
        false
    }

    /// Poll whether bus arbitration was lost to another master.
    fn arbitration_lost(&mut self) -> bool {
        false
    }

    /// Poll whether the receive path overran.
    fn rx_overflow(&mut self) -> bool {
        false
    }

    /// Poll for any other hardware-reported fault.
    fn fault(&mut self) -> bool {
        false
    }

    /// Clear latched fault flags.
    fn clear_faults(&mut self) {}

    /// Prepare the peripheral for a fresh transaction.
    ///
    /// Called once per accepted transaction, before the first phase.
    fn reset_for_transaction(&mut self) {}
}

/// Byte-at-a-time I2C master peripheral.
///
/// Bus conditions and ACK/NAK responses follow a trigger + completion-poll
/// pattern: the engine calls the trigger once, then polls the matching
/// `is_*_completed` on subsequent service calls.
pub trait I2cByteHardware: I2cHardware {
    /// Trigger a start condition.
    fn send_start_condition(&mut self);

    /// Poll whether the triggered start condition is on the bus.
    fn is_start_completed(&mut self) -> bool;

    /// Trigger a repeated start condition.
    fn send_restart_condition(&mut self);

    /// Poll whether the triggered repeated start is on the bus.
    fn is_restart_completed(&mut self) -> bool;

    /// Trigger a stop condition.
    fn send_stop_condition(&mut self);

    /// Poll whether the triggered stop condition is on the bus.
    fn is_stop_completed(&mut self) -> bool;

    /// Poll whether the slave acknowledged the last transmitted byte.
    ///
    /// Sampled once the transmit path reports ready again after a write.
    fn is_ack_received(&mut self) -> bool;

    /// Arm the receive path for the next incoming byte.
    ///
    /// `last` tells hardware that pre-programs its response whether this
    /// byte terminates the read phase (NAK) or not (ACK).
    fn enable_rx(&mut self, last: bool);

    /// Trigger an ACK response for the byte just read.
    fn send_ack(&mut self);

    /// Trigger a NAK response for the byte just read.
    fn send_nak(&mut self);

    /// Poll whether the triggered ACK/NAK response has been clocked out.
    fn is_response_completed(&mut self) -> bool;
}

/// I2C master peripheral with a hardware command queue.
///
/// Commands are appended at explicit queue indices, then executed as one
/// burst by [`trigger_execute`](Self::trigger_execute). Write-command data
/// bytes go through the base trait's transmit register before the trigger;
/// read bytes are drained from the receive register after completion.
pub trait I2cQueueHardware: I2cHardware {
    /// Fixed depth of the hardware command queue. Must be at least 2.
    fn queue_depth(&self) -> usize;

    /// Append a start-condition command at `index`.
    fn enqueue_start(&mut self, index: usize);

    /// Append a repeated-start command at `index`.
    fn enqueue_restart(&mut self, index: usize);

    /// Append a write command for `count` bytes at `index`.
    fn enqueue_write(&mut self, index: usize, count: usize);

    /// Append a read command for `count` bytes at `index`.
    ///
    /// `ack` is the response the master sends after each byte; the final
    /// byte of a read phase is enqueued separately with `ack == false`.
    fn enqueue_read(&mut self, index: usize, count: usize, ack: bool);

    /// Append an end marker at `index`.
    ///
    /// Ends the batch while signalling that the transaction continues in a
    /// later batch (no stop condition is put on the bus).
    fn enqueue_end(&mut self, index: usize);

    /// Append a stop-condition command at `index`.
    fn enqueue_stop(&mut self, index: usize);

    /// Start executing the enqueued command list.
    fn trigger_execute(&mut self);

    /// Cancel a submitted command list.
    fn trigger_abort(&mut self);

    /// Poll whether the batch whose final command sits at `last_index` has
    /// finished executing.
    fn is_batch_completed(&mut self, last_index: usize) -> bool;
}

impl<T: I2cHardware + ?Sized> I2cHardware for &mut T {
    fn is_tx_ready(&mut self) -> bool {
        T::is_tx_ready(self)
    }

    fn is_rx_ready(&mut self) -> bool {
        T::is_rx_ready(self)
    }

    fn write_tx_register(&mut self, byte: u8) {
        T::write_tx_register(self, byte);
    }

    fn read_rx_register(&mut self) -> u8 {
        T::read_rx_register(self)
    }

    fn nak_detected(&mut self) -> bool {
        T::nak_detected(self)
    }

    fn arbitration_lost(&mut self) -> bool {
        T::arbitration_lost(self)
    }

    fn rx_overflow(&mut self) -> bool {
        T::rx_overflow(self)
    }

    fn fault(&mut self) -> bool {
        T::fault(self)
    }

    fn clear_faults(&mut self) {
        T::clear_faults(self);
    }

    fn reset_for_transaction(&mut self) {
        T::reset_for_transaction(self);
    }
}

impl<T: I2cByteHardware + ?Sized> I2cByteHardware for &mut T {
    fn send_start_condition(&mut self) {
        T::send_start_condition(self);
    }

    fn is_start_completed(&mut self) -> bool {
        T::is_start_completed(self)
    }

    fn send_restart_condition(&mut self) {
        T::send_restart_condition(self);
    }

    fn is_restart_completed(&mut self) -> bool {
        T::is_restart_completed(self)
    }

    fn send_stop_condition(&mut self) {
        T::send_stop_condition(self);
    }

    fn is_stop_completed(&mut self) -> bool {
        T::is_stop_completed(self)
    }

    fn is_ack_received(&mut self) -> bool {
        T::is_ack_received(self)
    }

    fn enable_rx(&mut self, last: bool) {
        T::enable_rx(self, last);
    }

    fn send_ack(&mut self) {
        T::send_ack(self);
    }

    fn send_nak(&mut self) {
        T::send_nak(self);
    }

    fn is_response_completed(&mut self) -> bool {
        T::is_response_completed(self)
    }
}

impl<T: I2cQueueHardware + ?Sized> I2cQueueHardware for &mut T {
    fn queue_depth(&self) -> usize {
        T::queue_depth(self)
    }

    fn enqueue_start(&mut self, index: usize) {
        T::enqueue_start(self, index);
    }

    fn enqueue_restart(&mut self, index: usize) {
        T::enqueue_restart(self, index);
    }

    fn enqueue_write(&mut self, index: usize, count: usize) {
        T::enqueue_write(self, index, count);
    }

    fn enqueue_read(&mut self, index: usize, count: usize, ack: bool) {
        T::enqueue_read(self, index, count, ack);
    }

    fn enqueue_end(&mut self, index: usize) {
        T::enqueue_end(self, index);
    }

    fn enqueue_stop(&mut self, index: usize) {
        T::enqueue_stop(self, index);
    }

    fn trigger_execute(&mut self) {
        T::trigger_execute(self);
    }

    fn trigger_abort(&mut self) {
        T::trigger_abort(self);
    }

    fn is_batch_completed(&mut self, last_index: usize) -> bool {
        T::is_batch_completed(self, last_index)
    }
}
