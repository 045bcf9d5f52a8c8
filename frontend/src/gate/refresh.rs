use super::types::UserId;

/// Asks for one subscription refresh per sign-in, never two at once.
#[derive(Debug, Default)]
pub struct RefreshTracker {
    last_user: Option<UserId>,
    in_flight: bool,
    queued: Option<UserId>,
}

impl RefreshTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the current identity; returns the user to refresh for when the
    /// identity just appeared (or switched to another user).
    pub fn observe(&mut self, user: Option<&UserId>) -> Option<UserId> {
        if user == self.last_user.as_ref() {
            return None;
        }
        self.last_user = user.cloned();
        let user = user?.clone();
        if self.in_flight {
            self.queued = Some(user);
            return None;
        }
        self.in_flight = true;
        Some(user)
    }

    /// Marks the running refresh done and hands back a queued one, if any.
    pub fn finished(&mut self) -> Option<UserId> {
        self.in_flight = false;
        let next = self.queued.take()?;
        // only worth it if that user is still the one signed in
        if self.last_user.as_ref() != Some(&next) {
            return None;
        }
        self.in_flight = true;
        Some(next)
    }

    #[cfg(test)]
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: &str) -> UserId {
        UserId(id.to_string())
    }

    #[test]
    fn one_refresh_per_sign_in() {
        let mut tracker = RefreshTracker::new();
        assert_eq!(tracker.observe(None), None);
        assert_eq!(tracker.observe(Some(&user("a"))), Some(user("a")));
        assert_eq!(tracker.observe(Some(&user("a"))), None);
        assert!(tracker.in_flight());
        assert_eq!(tracker.finished(), None);
        assert!(!tracker.in_flight());
        assert_eq!(tracker.observe(Some(&user("a"))), None);
    }

    #[test]
    fn sign_in_during_refresh_is_queued() {
        let mut tracker = RefreshTracker::new();
        assert_eq!(tracker.observe(Some(&user("a"))), Some(user("a")));
        assert_eq!(tracker.observe(None), None);
        assert_eq!(tracker.observe(Some(&user("b"))), None);
        assert_eq!(tracker.finished(), Some(user("b")));
        assert!(tracker.in_flight());
    }

    #[test]
    fn queued_refresh_dropped_after_sign_out() {
        let mut tracker = RefreshTracker::new();
        tracker.observe(Some(&user("a")));
        tracker.observe(Some(&user("b")));
        tracker.observe(None);
        assert_eq!(tracker.finished(), None);
        assert!(!tracker.in_flight());
    }
}
