//! Transaction watchdog
//!
//! Thin wrapper over the soft-timer ticket interface shared by both
//! engine variants. A zero deadline disables the watchdog entirely: no
//! ticket is ever created and [`Watchdog::expired`] stays false.

use tactus_hal::SoftTimer;

pub(crate) struct Watchdog<T: SoftTimer> {
    timer: T,
    deadline_us: u32,
    ticket: Option<T::Ticket>,
}

impl<T: SoftTimer> Watchdog<T> {
    pub(crate) fn new(timer: T, deadline_us: u32) -> Self {
        Self {
            timer,
            deadline_us,
            ticket: None,
        }
    }

    /// Arm (or rearm) the deadline. Called at transaction acceptance and
    /// after every unit of forward progress.
    pub(crate) fn arm(&mut self) {
        if self.deadline_us > 0 {
            self.ticket = Some(self.timer.ticket(self.deadline_us));
        }
    }

    /// Drop the current ticket. Called at terminal state.
    pub(crate) fn disarm(&mut self) {
        self.ticket = None;
    }

    pub(crate) fn expired(&self) -> bool {
        self.ticket
            .as_ref()
            .map_or(false, |t| self.timer.is_expired(t))
    }

    pub(crate) fn elapsed_us(&self) -> Option<u32> {
        self.ticket.as_ref().map(|t| self.timer.elapsed_us(t))
    }

    pub(crate) fn into_timer(self) -> T {
        self.timer
    }
}
