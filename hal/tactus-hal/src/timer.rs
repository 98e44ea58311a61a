//! Soft-timer ticket abstraction
//!
//! Bus engines detect stalled hardware with a watchdog built on deadline
//! tickets: a ticket snapshots "now + deadline" from some monotonic time
//! source and is polled for expiry once per service call. The time source
//! itself lives outside this workspace; engines only consume this trait.

/// Provider of snapshot-based deadline tickets.
///
/// Implementations wrap a monotonic clock. Creating and checking tickets
/// must be cheap and non-blocking; engines create a fresh ticket after
/// every unit of forward progress.
pub trait SoftTimer {
    /// Deadline snapshot handle.
    type Ticket: Copy;

    /// Capture a ticket expiring `deadline_us` microseconds from now.
    fn ticket(&self, deadline_us: u32) -> Self::Ticket;

    /// Poll whether the ticket's deadline has passed.
    fn is_expired(&self, ticket: &Self::Ticket) -> bool;

    /// Microseconds elapsed since the ticket was created.
    ///
    /// Diagnostic only; engines never branch on this.
    fn elapsed_us(&self, ticket: &Self::Ticket) -> u32;
}

impl<T: SoftTimer + ?Sized> SoftTimer for &T {
    type Ticket = T::Ticket;

    fn ticket(&self, deadline_us: u32) -> Self::Ticket {
        T::ticket(self, deadline_us)
    }

    fn is_expired(&self, ticket: &Self::Ticket) -> bool {
        T::is_expired(self, ticket)
    }

    fn elapsed_us(&self, ticket: &Self::Ticket) -> u32 {
        T::elapsed_us(self, ticket)
    }
}
