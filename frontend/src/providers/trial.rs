use chrono::{DateTime, Duration, Utc};
use gloo_timers::callback::Timeout;
use log::info;
use yew::prelude::*;

use crate::config;
use crate::gate::types::{Identity, TrialStatus};
use super::auth::{use_auth, ProviderProps};

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TrialState {
    pub active: bool,
    pub loading: bool,
    pub ends_at: Option<DateTime<Utc>>,
}

impl TrialState {
    pub fn status(&self) -> TrialStatus {
        TrialStatus {
            active: self.active,
            loading: self.loading,
        }
    }
}

pub fn trial_ends_at(created_at: DateTime<Utc>) -> DateTime<Utc> {
    created_at + Duration::hours(config::TRIAL_WINDOW_HOURS)
}

pub fn compute_trial(
    identity: Option<&Identity>,
    identity_loading: bool,
    now: DateTime<Utc>,
) -> TrialState {
    if identity_loading {
        return TrialState {
            active: false,
            loading: true,
            ends_at: None,
        };
    }
    match identity {
        Some(identity) => {
            let ends_at = trial_ends_at(identity.created_at);
            TrialState {
                active: now < ends_at,
                loading: false,
                ends_at: Some(ends_at),
            }
        }
        None => TrialState {
            active: false,
            loading: false,
            ends_at: None,
        },
    }
}

/// "47h 59m" style copy for the trial banner.
pub fn format_remaining(ends_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let left = ends_at - now;
    if left <= Duration::zero() {
        return "0h 0m".to_string();
    }
    format!("{}h {}m", left.num_hours(), left.num_minutes() % 60)
}

// The tick is part of the key so a timer that fired early gets re-armed.
fn expiry_timer_key(state: &TrialState, tick: u32) -> (Option<DateTime<Utc>>, bool, u32) {
    (state.ends_at, state.active, tick)
}

#[function_component]
pub fn TrialProvider(props: &ProviderProps) -> Html {
    let auth = use_auth();
    // bumped when the window closes so the status is recomputed
    let expired_tick = use_state(|| 0u32);

    let state = compute_trial(auth.identity.as_ref(), auth.loading, Utc::now());
    let timer_key = expiry_timer_key(&state, *expired_tick);

    {
        let expired_tick = expired_tick.clone();
        use_effect_with_deps(
            move |(ends_at, active, _tick)| {
                let timeout = match (ends_at, active) {
                    (Some(ends_at), true) => {
                        let ms = (*ends_at - Utc::now()).num_milliseconds().max(0);
                        let tick = *expired_tick;
                        Some(Timeout::new(ms.min(u32::MAX as i64) as u32, move || {
                            info!("Trial window closed");
                            expired_tick.set(tick.wrapping_add(1));
                        }))
                    }
                    _ => None,
                };
                move || drop(timeout)
            },
            timer_key,
        );
    }

    html! {
        <ContextProvider<TrialState> context={state}>
            { props.children.clone() }
        </ContextProvider<TrialState>>
    }
}

#[hook]
pub fn use_trial() -> TrialState {
    use_context::<TrialState>().expect("use_trial called outside TrialProvider")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::types::UserId;
    use chrono::TimeZone;

    fn created(at: DateTime<Utc>) -> Identity {
        Identity {
            id: UserId("u".to_string()),
            email: "u@example.com".to_string(),
            created_at: at,
            is_subscriber: false,
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn new_account_is_in_trial() {
        let state = compute_trial(Some(&created(t0())), false, t0() + Duration::hours(47));
        assert!(state.active);
        assert!(!state.loading);
        assert_eq!(state.ends_at, Some(t0() + Duration::hours(48)));
    }

    #[test]
    fn trial_ends_after_48_hours() {
        let state = compute_trial(Some(&created(t0())), false, t0() + Duration::hours(48));
        assert!(!state.active);
    }

    #[test]
    fn loading_while_identity_loads() {
        let state = compute_trial(None, true, t0());
        assert!(state.loading);
        assert!(!state.active);
        assert_eq!(state.status(), TrialStatus { active: false, loading: true });
    }

    #[test]
    fn signed_out_has_no_trial() {
        let state = compute_trial(None, false, t0());
        assert!(!state.active);
        assert!(!state.loading);
        assert_eq!(state.ends_at, None);
    }

    #[test]
    fn expiry_timer_rearms_after_early_fire() {
        let state = compute_trial(Some(&created(t0())), false, t0() + Duration::hours(47));
        let before = expiry_timer_key(&state, 0);
        // still inside the window after the timer fired: only the tick moved
        let after = expiry_timer_key(&state, 1);
        assert_ne!(before, after);
        assert_eq!(before.0, after.0);
        assert_eq!(before.1, after.1);
    }

    #[test]
    fn remaining_time_copy() {
        let ends = t0() + Duration::hours(48);
        assert_eq!(format_remaining(ends, t0() + Duration::minutes(90)), "46h 30m");
        assert_eq!(format_remaining(ends, ends + Duration::minutes(1)), "0h 0m");
    }
}
