use std::time::Duration;

use log::{debug, warn};

use super::types::{GateInputs, WatchdogTicket};

/// One-shot timer that only flips the waiting copy. The host owns the real
/// timer; this tracks which ticket is live so late fires are ignored.
#[derive(Debug)]
pub struct Watchdog {
    after: Duration,
    next_ticket: u32,
    armed: Option<WatchdogTicket>,
    slow_auth: bool,
}

impl Watchdog {
    pub fn new(after: Duration) -> Self {
        Self {
            after,
            next_ticket: 0,
            armed: None,
            slow_auth: false,
        }
    }

    pub fn arm(&mut self) -> (WatchdogTicket, Duration) {
        self.next_ticket = self.next_ticket.wrapping_add(1);
        let ticket = WatchdogTicket(self.next_ticket);
        self.armed = Some(ticket);
        debug!("Watchdog armed ({:?}, ticket {})", self.after, ticket.0);
        (ticket, self.after)
    }

    /// Returns true if a live timer was cancelled.
    pub fn cancel(&mut self) -> bool {
        self.armed.take().is_some()
    }

    #[cfg(test)]
    pub fn is_armed(&self) -> bool {
        self.armed.is_some()
    }

    /// Returns true when `slow_auth` changed.
    pub fn elapsed(&mut self, ticket: WatchdogTicket, inputs: &GateInputs) -> bool {
        if self.armed != Some(ticket) {
            debug!("Ignoring stale watchdog ticket {}", ticket.0);
            return false;
        }
        self.armed = None;
        if inputs.awaiting_identity() && !self.slow_auth {
            warn!("Access verification still pending after {:?}", self.after);
            self.slow_auth = true;
            return true;
        }
        false
    }

    pub fn slow_auth(&self) -> bool {
        self.slow_auth
    }

    pub fn reset(&mut self) {
        self.armed = None;
        self.slow_auth = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn waiting() -> GateInputs {
        GateInputs {
            identity_loading: true,
            ..GateInputs::default()
        }
    }

    #[test]
    fn fires_while_still_waiting() {
        let mut watchdog = Watchdog::new(Duration::from_secs(15));
        let (ticket, after) = watchdog.arm();
        assert_eq!(after, Duration::from_secs(15));
        assert!(watchdog.elapsed(ticket, &waiting()));
        assert!(watchdog.slow_auth());
        assert!(!watchdog.is_armed());
    }

    #[test]
    fn does_nothing_once_loads_finished() {
        let mut watchdog = Watchdog::new(Duration::from_secs(15));
        let (ticket, _) = watchdog.arm();
        assert!(!watchdog.elapsed(ticket, &GateInputs::default()));
        assert!(!watchdog.slow_auth());
    }

    #[test]
    fn cancelled_ticket_is_ignored() {
        let mut watchdog = Watchdog::new(Duration::from_secs(15));
        let (ticket, _) = watchdog.arm();
        assert!(watchdog.cancel());
        assert!(!watchdog.cancel());
        assert!(!watchdog.elapsed(ticket, &waiting()));
        assert!(!watchdog.slow_auth());
    }

    #[test]
    fn rearming_invalidates_previous_ticket() {
        let mut watchdog = Watchdog::new(Duration::from_secs(15));
        let (first, _) = watchdog.arm();
        let (second, _) = watchdog.arm();
        assert_ne!(first, second);
        assert!(!watchdog.elapsed(first, &waiting()));
        assert!(watchdog.elapsed(second, &waiting()));
    }
}
