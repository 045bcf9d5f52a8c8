use std::rc::Rc;

use log::{error, info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::gate::types::{RefreshOutcome, SubscriptionRecord, UserId};
use super::api;
use super::auth::{use_auth, ProviderProps};

#[derive(Clone, PartialEq, Debug, Default)]
struct SubscriptionData {
    record: Option<SubscriptionRecord>,
    loading: bool,
}

enum SubscriptionAction {
    Loading,
    Loaded(Option<SubscriptionRecord>),
    Refreshed(Option<SubscriptionRecord>),
}

impl Reducible for SubscriptionData {
    type Action = SubscriptionAction;

    fn reduce(self: Rc<Self>, action: Self::Action) -> Rc<Self> {
        match action {
            SubscriptionAction::Loading => Rc::new(SubscriptionData {
                record: self.record.clone(),
                loading: true,
            }),
            SubscriptionAction::Loaded(record) => Rc::new(SubscriptionData {
                record,
                loading: false,
            }),
            // a background refresh never flips the loading flag
            SubscriptionAction::Refreshed(record) => Rc::new(SubscriptionData {
                record,
                loading: self.loading,
            }),
        }
    }
}

#[derive(Clone, PartialEq)]
pub struct SubscriptionState {
    pub record: Option<SubscriptionRecord>,
    pub loading: bool,
    /// Re-fetches the record; the callback passed in hears how it went.
    pub refresh: Callback<Callback<RefreshOutcome>>,
}

#[function_component]
pub fn SubscriptionProvider(props: &ProviderProps) -> Html {
    let auth = use_auth();
    let data = use_reducer(|| SubscriptionData {
        record: None,
        loading: true,
    });
    let user_id: Option<UserId> = auth.identity.as_ref().map(|i| i.id.clone());

    {
        let dispatcher = data.dispatcher();
        use_effect_with_deps(
            move |(user_id, auth_loading)| {
                if *auth_loading {
                    dispatcher.dispatch(SubscriptionAction::Loading);
                } else if user_id.is_none() {
                    dispatcher.dispatch(SubscriptionAction::Loaded(None));
                } else if let Some(token) = api::stored_token() {
                    dispatcher.dispatch(SubscriptionAction::Loading);
                    spawn_local(async move {
                        let record = match api::fetch_subscription(&token).await {
                            Ok(record) => record,
                            Err(e) => {
                                error!("Failed to fetch subscription: {}", e);
                                None
                            }
                        };
                        dispatcher.dispatch(SubscriptionAction::Loaded(record));
                    });
                } else {
                    dispatcher.dispatch(SubscriptionAction::Loaded(None));
                }
                || ()
            },
            (user_id, auth.loading),
        );
    }

    let refresh = {
        let dispatcher = data.dispatcher();
        use_callback(
            move |done: Callback<RefreshOutcome>, dispatcher| {
                let dispatcher = dispatcher.clone();
                spawn_local(async move {
                    let Some(token) = api::stored_token() else {
                        warn!("Subscription refresh requested without a session");
                        done.emit(RefreshOutcome::Failed);
                        return;
                    };
                    match api::fetch_subscription(&token).await {
                        Ok(record) => {
                            info!(
                                "Subscription refreshed: {:?}",
                                record.as_ref().map(|r| r.status.as_str())
                            );
                            dispatcher.dispatch(SubscriptionAction::Refreshed(record));
                            done.emit(RefreshOutcome::Refreshed);
                        }
                        Err(e) => {
                            warn!("Subscription refresh failed: {}", e);
                            done.emit(RefreshOutcome::Failed);
                        }
                    }
                });
            },
            dispatcher,
        )
    };

    let state = SubscriptionState {
        record: data.record.clone(),
        loading: data.loading,
        refresh,
    };

    html! {
        <ContextProvider<SubscriptionState> context={state}>
            { props.children.clone() }
        </ContextProvider<SubscriptionState>>
    }
}

#[hook]
pub fn use_subscription() -> SubscriptionState {
    use_context::<SubscriptionState>().expect("use_subscription called outside SubscriptionProvider")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::types::SubscriptionStatus;

    fn active() -> SubscriptionRecord {
        SubscriptionRecord {
            status: SubscriptionStatus::Active,
            current_period_end: None,
        }
    }

    #[test]
    fn loading_keeps_previous_record() {
        let data = Rc::new(SubscriptionData {
            record: Some(active()),
            loading: false,
        });
        let next = data.reduce(SubscriptionAction::Loading);
        assert!(next.loading);
        assert_eq!(next.record, Some(active()));
    }

    #[test]
    fn refresh_does_not_touch_loading_flag() {
        let data = Rc::new(SubscriptionData {
            record: None,
            loading: false,
        });
        let next = data.reduce(SubscriptionAction::Refreshed(Some(active())));
        assert!(!next.loading);
        assert_eq!(next.record, Some(active()));

        let loaded = next.reduce(SubscriptionAction::Loaded(None));
        assert!(!loaded.loading);
        assert_eq!(loaded.record, None);
    }
}
