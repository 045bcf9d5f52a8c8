use std::time::Duration;

use log::{debug, info, warn};

use super::checks::{IdentityCheck, SubscriptionCheck};
use super::refresh::RefreshTracker;
use super::types::{
    CheckOutcome, GateDecision, GateEffect, GateInputs, GateView, RedirectTarget,
    RefreshOutcome, UserId, WatchdogTicket,
};
use super::watchdog::Watchdog;

#[derive(Debug, Default)]
struct Onboarding {
    requested_for: Option<UserId>,
    completed: Option<bool>,
}

/// Decides whether the dashboard may be shown. One instance per mounted
/// dashboard; the host feeds it provider snapshots and performs the
/// returned effects.
#[derive(Debug)]
pub struct GateEvaluator {
    subscription_check: SubscriptionCheck,
    identity_check: IdentityCheck,
    watchdog: Watchdog,
    refresh: RefreshTracker,
    onboarding: Onboarding,
    inputs: GateInputs,
}

impl Default for GateEvaluator {
    fn default() -> Self {
        Self::new(Duration::from_millis(crate::config::AUTH_TIMEOUT_MS))
    }
}

impl GateEvaluator {
    pub fn new(auth_timeout: Duration) -> Self {
        Self {
            subscription_check: SubscriptionCheck::new(),
            identity_check: IdentityCheck::new(),
            watchdog: Watchdog::new(auth_timeout),
            refresh: RefreshTracker::new(),
            onboarding: Onboarding::default(),
            inputs: GateInputs::default(),
        }
    }

    pub fn mount(&mut self) -> Vec<GateEffect> {
        let (ticket, after) = self.watchdog.arm();
        vec![GateEffect::ArmWatchdog { ticket, after }]
    }

    pub fn observe(&mut self, inputs: &GateInputs) -> Vec<GateEffect> {
        self.inputs = inputs.clone();
        let mut effects = Vec::new();

        if let Some(CheckOutcome::Redirect(target)) = self.subscription_check.evaluate(inputs) {
            push_redirect(&mut effects, target);
        }
        if let CheckOutcome::Redirect(target) = self.identity_check.evaluate(inputs) {
            push_redirect(&mut effects, target);
        }

        if let Some(user) = self.refresh.observe(inputs.user_id()) {
            debug!("Identity resolved for {}, refreshing subscription", user);
            effects.push(GateEffect::RefreshSubscription(user));
        }

        if let Some(user) = inputs.user_id() {
            if self.onboarding.requested_for.as_ref() != Some(user) {
                self.onboarding = Onboarding {
                    requested_for: Some(user.clone()),
                    completed: None,
                };
                effects.push(GateEffect::LoadOnboarding(user.clone()));
            }
        }

        if !inputs.awaiting_identity() && self.watchdog.cancel() {
            effects.push(GateEffect::CancelWatchdog);
        }

        effects
    }

    /// The refresh counts as "checked" whether it worked or not.
    pub fn refresh_finished(&mut self, outcome: RefreshOutcome) -> Vec<GateEffect> {
        if outcome == RefreshOutcome::Failed {
            warn!("Subscription refresh failed, continuing with the current record");
        }
        self.identity_check.mark_checked();
        match self.refresh.finished() {
            Some(user) => vec![GateEffect::RefreshSubscription(user)],
            None => Vec::new(),
        }
    }

    /// Returns true when the view changed because of the timeout.
    pub fn watchdog_elapsed(&mut self, ticket: WatchdogTicket) -> bool {
        self.watchdog.elapsed(ticket, &self.inputs)
    }

    pub fn onboarding_loaded(&mut self, user: &UserId, completed: bool) {
        if self.onboarding.requested_for.as_ref() == Some(user) {
            info!("hasCompletedOnboarding for {}: {}", user, completed);
            self.onboarding.completed = Some(completed);
        }
    }

    pub fn onboarding_completed(&self) -> Option<bool> {
        self.onboarding.completed
    }

    #[cfg(test)]
    pub fn slow_auth(&self) -> bool {
        self.watchdog.slow_auth()
    }

    pub fn decision(&self) -> GateDecision {
        let (Some(subscription), Some(identity)) = (
            self.subscription_check.last_outcome(),
            self.identity_check_result(),
        ) else {
            return GateDecision::Pending;
        };

        for outcome in [subscription, identity] {
            if let CheckOutcome::Redirect(target) = outcome {
                return GateDecision::Redirect(target);
            }
        }
        if self.inputs.any_loading() {
            GateDecision::Pending
        } else {
            GateDecision::Allow
        }
    }

    pub fn view(&self) -> GateView {
        if self.inputs.awaiting_identity() && !self.identity_check.is_latched() {
            return GateView::Verifying {
                slow: self.watchdog.slow_auth(),
            };
        }
        GateView::Dashboard {
            trial_banner: self.inputs.trial.active && self.inputs.subscription.is_none(),
        }
    }

    /// Cancels the watchdog and forgets everything about this mount.
    pub fn unmount(&mut self) -> Vec<GateEffect> {
        let cancelled = self.watchdog.cancel();
        self.watchdog.reset();
        self.subscription_check = SubscriptionCheck::new();
        self.identity_check = IdentityCheck::new();
        self.refresh = RefreshTracker::new();
        self.onboarding = Onboarding::default();
        self.inputs = GateInputs::default();
        if cancelled {
            vec![GateEffect::CancelWatchdog]
        } else {
            Vec::new()
        }
    }

    // A latch closed by the refresh counts as cleared.
    fn identity_check_result(&self) -> Option<CheckOutcome> {
        match self.identity_check.outcome() {
            Some(outcome) => Some(outcome),
            None if self.identity_check.is_latched() => Some(CheckOutcome::Passed),
            None => None,
        }
    }
}

fn push_redirect(effects: &mut Vec<GateEffect>, target: RedirectTarget) {
    let effect = GateEffect::Redirect(target);
    if !effects.contains(&effect) {
        effects.push(effect);
    }
}
