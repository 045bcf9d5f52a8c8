use chrono::{DateTime, Utc};
use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::pricing::PricingSection;
use crate::providers::auth::use_auth;
use crate::providers::subscription::use_subscription;
use crate::providers::trial::{format_remaining, use_trial};
use crate::Route;

pub fn format_period_end(at: DateTime<Utc>) -> String {
    at.format("%B %d, %Y").to_string()
}

#[function_component]
pub fn Profile() -> Html {
    let auth = use_auth();
    let subscription = use_subscription();
    let trial = use_trial();

    if auth.loading {
        return html! {
            <div class="profile-container">
                <div class="loading-profile">{"Loading profile..."}</div>
            </div>
        };
    }

    let Some(identity) = auth.identity.clone() else {
        return html! {
            <div class="profile-container">
                <div class="profile-panel">
                    <h1 class="profile-title">{"Profile"}</h1>
                    <p>{"Sign in to manage your subscription."}</p>
                    <PricingSection show_full_details={true} />
                </div>
            </div>
        };
    };

    let status_line = if subscription.loading {
        "Checking subscription...".to_string()
    } else {
        match subscription.record.as_ref() {
            Some(record) => match record.current_period_end {
                Some(end) if record.is_valid() => format!(
                    "Subscription {} until {}",
                    record.status.as_str(),
                    format_period_end(end)
                ),
                _ => format!("Subscription {}", record.status.as_str()),
            },
            None if trial.active => match trial.ends_at {
                Some(ends_at) => format!(
                    "Free trial, {} remaining",
                    format_remaining(ends_at, Utc::now())
                ),
                None => "Free trial".to_string(),
            },
            None => "No active subscription".to_string(),
        }
    };

    let needs_subscription = !subscription
        .record
        .as_ref()
        .map(|r| r.is_valid())
        .unwrap_or(false);

    html! {
        <div class="profile-container">
            <div class="profile-panel">
                <div class="profile-header">
                    <h1 class="profile-title">{"Profile"}</h1>
                    <Link<Route> to={Route::Home} classes="back-link">
                        {"Back to Home"}
                    </Link<Route>>
                </div>
                <div class="profile-info">
                    <p class="profile-email">{identity.email.clone()}</p>
                    <p class="profile-status">{status_line}</p>
                </div>
                {
                    if needs_subscription {
                        html! {
                            <PricingSection
                                show_full_details={true}
                                user_id={AttrValue::from(identity.id.0.clone())}
                                user_email={AttrValue::from(identity.email.clone())}
                            />
                        }
                    } else {
                        html! {
                            <Link<Route> to={Route::Dashboard} classes="dashboard-link">
                                {"Go to Dashboard →"}
                            </Link<Route>>
                        }
                    }
                }
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn period_end_is_human_readable() {
        let at = Utc.with_ymd_and_hms(2026, 11, 3, 8, 30, 0).unwrap();
        assert_eq!(format_period_end(at), "November 03, 2026");
    }
}
