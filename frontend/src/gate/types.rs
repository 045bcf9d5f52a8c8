use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Signed-in user as reported by the auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Identity {
    pub id: UserId,
    pub email: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub is_subscriber: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubscriptionStatus {
    Active,
    Trialing,
    Canceled,
    PastDue,
    Incomplete,
    Unpaid,
    None,
    Other(String),
}

impl SubscriptionStatus {
    pub fn as_str(&self) -> &str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trialing => "trialing",
            SubscriptionStatus::Canceled => "canceled",
            SubscriptionStatus::PastDue => "past_due",
            SubscriptionStatus::Incomplete => "incomplete",
            SubscriptionStatus::Unpaid => "unpaid",
            SubscriptionStatus::None => "none",
            SubscriptionStatus::Other(s) => s,
        }
    }
}

impl From<&str> for SubscriptionStatus {
    fn from(s: &str) -> Self {
        match s {
            "active" => SubscriptionStatus::Active,
            "trialing" => SubscriptionStatus::Trialing,
            "canceled" | "cancelled" => SubscriptionStatus::Canceled,
            "past_due" => SubscriptionStatus::PastDue,
            "incomplete" => SubscriptionStatus::Incomplete,
            "unpaid" => SubscriptionStatus::Unpaid,
            "" | "none" => SubscriptionStatus::None,
            other => SubscriptionStatus::Other(other.to_string()),
        }
    }
}

impl Serialize for SubscriptionStatus {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SubscriptionStatus {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(SubscriptionStatus::from(raw.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscriptionRecord {
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub current_period_end: Option<DateTime<Utc>>,
}

impl SubscriptionRecord {
    /// Only `active` and `trialing` records grant access.
    pub fn is_valid(&self) -> bool {
        matches!(
            self.status,
            SubscriptionStatus::Active | SubscriptionStatus::Trialing
        )
    }
}

pub fn has_valid_subscription(record: Option<&SubscriptionRecord>) -> bool {
    record.map(SubscriptionRecord::is_valid).unwrap_or(false)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrialStatus {
    pub active: bool,
    pub loading: bool,
}

/// Snapshot of everything the gate looks at.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GateInputs {
    pub identity: Option<Identity>,
    pub identity_loading: bool,
    pub subscription: Option<SubscriptionRecord>,
    pub subscription_loading: bool,
    pub trial: TrialStatus,
}

impl GateInputs {
    pub fn any_loading(&self) -> bool {
        self.identity_loading || self.subscription_loading || self.trial.loading
    }

    /// Identity not known yet and something it depends on is still loading.
    pub fn awaiting_identity(&self) -> bool {
        self.identity.is_none() && (self.identity_loading || self.trial.loading)
    }

    pub fn user_id(&self) -> Option<&UserId> {
        self.identity.as_ref().map(|identity| &identity.id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedirectTarget {
    Profile,
}

impl RedirectTarget {
    pub fn path(&self) -> &'static str {
        match self {
            RedirectTarget::Profile => "/profile",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(RedirectTarget),
    Pending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckOutcome {
    Skipped,
    Passed,
    Redirect(RedirectTarget),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchdogTicket(pub u32);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    Refreshed,
    Failed,
}

/// Work the host has to carry out on behalf of the evaluator.
#[derive(Debug, Clone, PartialEq)]
pub enum GateEffect {
    Redirect(RedirectTarget),
    RefreshSubscription(UserId),
    ArmWatchdog { ticket: WatchdogTicket, after: Duration },
    CancelWatchdog,
    LoadOnboarding(UserId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateView {
    Verifying { slow: bool },
    Dashboard { trial_banner: bool },
}
