use std::cell::{Cell, RefCell};
use std::rc::Rc;

use chrono::Utc;
use gloo_timers::callback::Timeout;
use log::{debug, error, info};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;
use yew_hooks::{use_mount, use_unmount};
use yew_router::prelude::*;

use crate::gate::evaluator::GateEvaluator;
use crate::gate::types::{GateEffect, GateInputs, GateView, RedirectTarget, RefreshOutcome};
use crate::providers::api;
use crate::providers::auth::use_auth;
use crate::providers::subscription::use_subscription;
use crate::providers::trial::{format_remaining, use_trial};
use crate::Route;

/// Carries out what the evaluator asks for. Cloned into timers and async
/// completions, so everything in here is shared.
#[derive(Clone)]
struct GateHost {
    gate: Rc<RefCell<GateEvaluator>>,
    timer: Rc<RefCell<Option<Timeout>>>,
    alive: Rc<Cell<bool>>,
    navigator: Navigator,
    refresh: Callback<Callback<RefreshOutcome>>,
    view: UseStateHandle<GateView>,
}

impl GateHost {
    fn run(&self, effects: Vec<GateEffect>) {
        for effect in effects {
            match effect {
                GateEffect::Redirect(target) => {
                    info!("Redirecting to {}", target.path());
                    match target {
                        RedirectTarget::Profile => self.navigator.replace(&Route::Profile),
                    }
                }
                GateEffect::RefreshSubscription(user) => {
                    debug!("Refreshing subscription for {}", user);
                    let host = self.clone();
                    self.refresh.emit(Callback::from(move |outcome: RefreshOutcome| {
                        if !host.alive.get() {
                            return;
                        }
                        let effects = host.gate.borrow_mut().refresh_finished(outcome);
                        host.run(effects);
                        host.sync_view();
                    }));
                }
                GateEffect::ArmWatchdog { ticket, after } => {
                    let host = self.clone();
                    let timeout = Timeout::new(after.as_millis() as u32, move || {
                        if !host.alive.get() {
                            return;
                        }
                        let changed = host.gate.borrow_mut().watchdog_elapsed(ticket);
                        if changed {
                            host.sync_view();
                        }
                    });
                    *self.timer.borrow_mut() = Some(timeout);
                }
                GateEffect::CancelWatchdog => {
                    // dropping the handle clears the browser timer
                    self.timer.borrow_mut().take();
                }
                GateEffect::LoadOnboarding(user) => {
                    let Some(token) = api::stored_token() else {
                        continue;
                    };
                    let host = self.clone();
                    spawn_local(async move {
                        match api::fetch_onboarding_completed(&token).await {
                            Ok(completed) => {
                                if host.alive.get() {
                                    host.gate.borrow_mut().onboarding_loaded(&user, completed);
                                    debug!(
                                        "Onboarding completed: {:?}",
                                        host.gate.borrow().onboarding_completed()
                                    );
                                }
                            }
                            Err(e) => error!("Failed to load preferences: {}", e),
                        }
                    });
                }
            }
        }
    }

    fn sync_view(&self) {
        let view = self.gate.borrow().view();
        self.view.set(view);
    }
}

#[function_component]
pub fn Dashboard() -> Html {
    let auth = use_auth();
    let subscription = use_subscription();
    let trial = use_trial();
    let navigator = use_navigator().unwrap();

    let gate = use_mut_ref(GateEvaluator::default);
    let timer = use_mut_ref(|| None::<Timeout>);
    let alive = use_memo(|_| Cell::new(true), ());
    let view = use_state_eq(|| GateView::Verifying { slow: false });

    let host = GateHost {
        gate,
        timer,
        alive,
        navigator,
        refresh: subscription.refresh.clone(),
        view: view.clone(),
    };

    {
        let host = host.clone();
        use_mount(move || {
            host.alive.set(true);
            let effects = host.gate.borrow_mut().mount();
            host.run(effects);
        });
    }

    {
        let host = host.clone();
        use_unmount(move || {
            host.alive.set(false);
            let effects = host.gate.borrow_mut().unmount();
            host.run(effects);
            // the timer closure holds a host clone; drop it either way
            host.timer.borrow_mut().take();
        });
    }

    let inputs = GateInputs {
        identity: auth.identity.clone(),
        identity_loading: auth.loading,
        subscription: subscription.record.clone(),
        subscription_loading: subscription.loading,
        trial: trial.status(),
    };

    {
        let host = host.clone();
        use_effect_with_deps(
            move |inputs: &GateInputs| {
                let effects = host.gate.borrow_mut().observe(inputs);
                host.run(effects);
                host.sync_view();
                debug!("Gate decision: {:?}", host.gate.borrow().decision());
                || ()
            },
            inputs,
        );
    }

    match *view {
        GateView::Verifying { slow } => html! {
            <div class="verifying-container">
                <div class="spinner"></div>
                <p class="verifying-text">
                    {
                        if slow {
                            "Taking longer than usual? Try refreshing the page 😊."
                        } else {
                            "Verifying access..."
                        }
                    }
                </p>
            </div>
        },
        GateView::Dashboard { trial_banner } => html! {
            <main class="dashboard-container">
                <div class="dashboard-header">
                    <h1 class="panel-title">{"Product Development Dashboard"}</h1>
                    <p class="panel-subtitle">
                        {"Monitor feedback, review changes, and streamline your development workflow"}
                    </p>
                </div>
                {
                    if trial_banner {
                        let remaining = trial
                            .ends_at
                            .map(|ends_at| format!(" ({} left)", format_remaining(ends_at, Utc::now())))
                            .unwrap_or_default();
                        html! {
                            <div class="trial-banner">
                                <p>
                                    {format!("You are currently in your 48-hr trial period{}.", remaining)}
                                    <Link<Route> to={Route::Profile} classes="trial-link">
                                        {"Subscribe now"}
                                    </Link<Route>>
                                    {" to continue using the app after the trial ends."}
                                </p>
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
                <div class="dashboard-grid">
                    <DashboardCard title="Recent Feedback">
                        <p class="card-text">{"Connect feedback sources to start gathering insights"}</p>
                        <button class="card-action">{"+ Add Feedback Source"}</button>
                    </DashboardCard>
                    <DashboardCard title="Pending Pull Requests">
                        <p class="card-text">{"Connect your GitHub repository to start generating PRs"}</p>
                        <button class="card-action">{"+ Connect Repository"}</button>
                    </DashboardCard>
                    <DashboardCard title="Repository Statistics">
                        <p class="card-text">{"View metrics and insights about your connected repositories"}</p>
                        <div class="stat-grid">
                            <Stat label="Connected Repos" value={0} />
                            <Stat label="Active PRs" value={0} />
                        </div>
                    </DashboardCard>
                    <DashboardCard title="Feedback Sources">
                        <p class="card-text">{"Monitor feedback from multiple platforms"}</p>
                        <div class="stat-grid">
                            <Stat label="Active Sources" value={0} />
                            <Stat label="New Feedback" value={0} />
                        </div>
                    </DashboardCard>
                </div>
                <div class="quick-actions">
                    <h2>{"Quick Actions"}</h2>
                    <div class="quick-actions-grid">
                        <button class="quick-action">{"Connect GitHub"}</button>
                        <button class="quick-action">{"Add Feedback Source"}</button>
                        <button class="quick-action">{"View Analytics"}</button>
                    </div>
                </div>
            </main>
        },
    }
}

#[derive(Properties, PartialEq)]
struct DashboardCardProps {
    title: AttrValue,
    children: Children,
}

#[function_component]
fn DashboardCard(props: &DashboardCardProps) -> Html {
    html! {
        <div class="dashboard-card">
            <h2 class="card-title">{props.title.clone()}</h2>
            <div class="card-body">{props.children.clone()}</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct StatProps {
    label: AttrValue,
    value: u32,
}

#[function_component]
fn Stat(props: &StatProps) -> Html {
    html! {
        <div class="stat">
            <p class="stat-label">{props.label.clone()}</p>
            <p class="stat-value">{props.value.to_string()}</p>
        </div>
    }
}
