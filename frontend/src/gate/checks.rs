use log::{debug, info};

use super::types::{
    has_valid_subscription, CheckOutcome, GateInputs, RedirectTarget, SubscriptionRecord,
    TrialStatus,
};

/// Subscription/trial gate. Re-evaluated every time its inputs change.
#[derive(Debug, Default)]
pub struct SubscriptionCheck {
    seen: Option<(Option<SubscriptionRecord>, bool, TrialStatus)>,
    last: Option<CheckOutcome>,
}

impl SubscriptionCheck {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `None` when the inputs this check depends on did not change
    /// since the previous call, so nothing was re-run.
    pub fn evaluate(&mut self, inputs: &GateInputs) -> Option<CheckOutcome> {
        let deps = (
            inputs.subscription.clone(),
            inputs.subscription_loading,
            inputs.trial,
        );
        if self.seen.as_ref() == Some(&deps) {
            return None;
        }
        self.seen = Some(deps);

        if inputs.subscription_loading || inputs.trial.loading {
            return Some(CheckOutcome::Skipped);
        }

        let valid_subscription = has_valid_subscription(inputs.subscription.as_ref());
        info!(
            "Access check (subscription): has_subscription={} status={:?} in_trial={} valid_until={:?}",
            inputs.subscription.is_some(),
            inputs.subscription.as_ref().map(|s| s.status.as_str()),
            inputs.trial.active,
            inputs.subscription.as_ref().and_then(|s| s.current_period_end),
        );

        let outcome = if !valid_subscription && !inputs.trial.active {
            info!("No valid subscription or trial, redirecting");
            CheckOutcome::Redirect(RedirectTarget::Profile)
        } else {
            CheckOutcome::Passed
        };
        self.last = Some(outcome);
        Some(outcome)
    }

    /// Latest outcome that was not a skip.
    pub fn last_outcome(&self) -> Option<CheckOutcome> {
        self.last
    }
}

/// Identity gate. Single-shot: the latch closes on the first evaluation
/// that is not skipped, or when a subscription refresh completes.
#[derive(Debug, Default)]
pub struct IdentityCheck {
    latched: bool,
    outcome: Option<CheckOutcome>,
}

impl IdentityCheck {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn evaluate(&mut self, inputs: &GateInputs) -> CheckOutcome {
        if inputs.identity_loading || inputs.trial.loading {
            return CheckOutcome::Skipped;
        }
        if self.latched {
            return CheckOutcome::Skipped;
        }
        self.latched = true;

        let valid_subscriber = inputs
            .identity
            .as_ref()
            .map(|identity| identity.is_subscriber)
            .unwrap_or(false)
            || has_valid_subscription(inputs.subscription.as_ref());
        info!(
            "Access check (identity): signed_in={} subscriber={} in_trial={}",
            inputs.identity.is_some(),
            valid_subscriber,
            inputs.trial.active,
        );

        let outcome = if inputs.identity.is_none() || (!valid_subscriber && !inputs.trial.active) {
            info!("No identity or no valid subscription or trial, redirecting");
            CheckOutcome::Redirect(RedirectTarget::Profile)
        } else {
            CheckOutcome::Passed
        };
        self.outcome = Some(outcome);
        outcome
    }

    pub fn mark_checked(&mut self) {
        if !self.latched {
            debug!("Identity check latched by subscription refresh");
        }
        self.latched = true;
    }

    pub fn is_latched(&self) -> bool {
        self.latched
    }

    /// Outcome of the single evaluation, if the check ever ran.
    pub fn outcome(&self) -> Option<CheckOutcome> {
        self.outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::types::{Identity, SubscriptionStatus, UserId};
    use chrono::Utc;

    fn identity() -> Identity {
        Identity {
            id: UserId("user-1".to_string()),
            email: "user@example.com".to_string(),
            created_at: Utc::now(),
            is_subscriber: false,
        }
    }

    fn record(status: SubscriptionStatus) -> SubscriptionRecord {
        SubscriptionRecord {
            status,
            current_period_end: None,
        }
    }

    fn resolved() -> GateInputs {
        GateInputs {
            identity: Some(identity()),
            ..GateInputs::default()
        }
    }

    #[test]
    fn subscription_check_never_decides_while_loading() {
        for (sub_loading, trial_loading) in [(true, false), (false, true), (true, true)] {
            for subscription in [None, Some(record(SubscriptionStatus::Active))] {
                for trial_active in [false, true] {
                    let mut check = SubscriptionCheck::new();
                    let inputs = GateInputs {
                        subscription: subscription.clone(),
                        subscription_loading: sub_loading,
                        trial: TrialStatus {
                            active: trial_active,
                            loading: trial_loading,
                        },
                        ..resolved()
                    };
                    assert_eq!(check.evaluate(&inputs), Some(CheckOutcome::Skipped));
                    assert_eq!(check.last_outcome(), None);
                }
            }
        }
    }

    #[test]
    fn active_subscription_passes_without_trial() {
        let mut check = SubscriptionCheck::new();
        let inputs = GateInputs {
            subscription: Some(record(SubscriptionStatus::Active)),
            ..resolved()
        };
        assert_eq!(check.evaluate(&inputs), Some(CheckOutcome::Passed));
    }

    #[test]
    fn missing_subscription_without_trial_redirects_to_profile() {
        let mut check = SubscriptionCheck::new();
        let inputs = resolved();
        assert_eq!(
            check.evaluate(&inputs),
            Some(CheckOutcome::Redirect(RedirectTarget::Profile))
        );
    }

    #[test]
    fn canceled_subscription_is_rescued_by_trial() {
        let mut check = SubscriptionCheck::new();
        let inputs = GateInputs {
            subscription: Some(record(SubscriptionStatus::Canceled)),
            trial: TrialStatus {
                active: true,
                loading: false,
            },
            ..resolved()
        };
        assert_eq!(check.evaluate(&inputs), Some(CheckOutcome::Passed));
    }

    #[test]
    fn subscription_check_reruns_only_on_input_change() {
        let mut check = SubscriptionCheck::new();
        let mut inputs = resolved();
        assert!(check.evaluate(&inputs).is_some());
        assert_eq!(check.evaluate(&inputs), None);

        // identity is not one of its inputs
        inputs.identity = None;
        assert_eq!(check.evaluate(&inputs), None);

        inputs.subscription = Some(record(SubscriptionStatus::Trialing));
        assert_eq!(check.evaluate(&inputs), Some(CheckOutcome::Passed));

        inputs.subscription = Some(record(SubscriptionStatus::PastDue));
        assert_eq!(
            check.evaluate(&inputs),
            Some(CheckOutcome::Redirect(RedirectTarget::Profile))
        );
    }

    #[test]
    fn identity_check_fires_once() {
        let mut check = IdentityCheck::new();
        let mut inputs = GateInputs {
            subscription: Some(record(SubscriptionStatus::Active)),
            ..resolved()
        };
        assert_eq!(check.evaluate(&inputs), CheckOutcome::Passed);
        assert!(check.is_latched());

        inputs.identity = None;
        inputs.subscription = None;
        assert_eq!(check.evaluate(&inputs), CheckOutcome::Skipped);
        assert_eq!(check.outcome(), Some(CheckOutcome::Passed));
    }

    #[test]
    fn identity_check_waits_for_loads() {
        let mut check = IdentityCheck::new();
        let inputs = GateInputs {
            identity: None,
            identity_loading: true,
            ..GateInputs::default()
        };
        assert_eq!(check.evaluate(&inputs), CheckOutcome::Skipped);
        assert!(!check.is_latched());

        let inputs = GateInputs {
            trial: TrialStatus {
                active: false,
                loading: true,
            },
            ..resolved()
        };
        assert_eq!(check.evaluate(&inputs), CheckOutcome::Skipped);
        assert!(!check.is_latched());
    }

    #[test]
    fn identity_check_redirects_signed_out_viewer() {
        let mut check = IdentityCheck::new();
        let inputs = GateInputs {
            trial: TrialStatus {
                active: true,
                loading: false,
            },
            ..GateInputs::default()
        };
        assert_eq!(
            check.evaluate(&inputs),
            CheckOutcome::Redirect(RedirectTarget::Profile)
        );
    }

    #[test]
    fn identity_check_accepts_provider_subscriber_flag() {
        let mut check = IdentityCheck::new();
        let mut subscriber = identity();
        subscriber.is_subscriber = true;
        let inputs = GateInputs {
            identity: Some(subscriber),
            ..GateInputs::default()
        };
        assert_eq!(check.evaluate(&inputs), CheckOutcome::Passed);
    }

    #[test]
    fn marking_checked_suppresses_identity_check() {
        let mut check = IdentityCheck::new();
        check.mark_checked();
        assert_eq!(check.evaluate(&GateInputs::default()), CheckOutcome::Skipped);
        assert_eq!(check.outcome(), None);
    }
}
