use log::{error, info, warn};
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::gate::types::{has_valid_subscription, Identity, SubscriptionRecord};
use super::api;
use super::error::ProviderError;

#[derive(Clone, PartialEq, Debug)]
pub struct AuthState {
    pub identity: Option<Identity>,
    pub loading: bool,
}

#[derive(Properties, PartialEq)]
pub struct ProviderProps {
    pub children: Children,
}

/// Marks the identity a subscriber when its record grants access.
pub fn with_subscriber_flag(mut identity: Identity, record: Option<&SubscriptionRecord>) -> Identity {
    identity.is_subscriber = identity.is_subscriber || has_valid_subscription(record);
    identity
}

#[function_component]
pub fn AuthProvider(props: &ProviderProps) -> Html {
    let state = use_state(|| AuthState {
        identity: None,
        loading: true,
    });

    {
        let state = state.clone();
        use_effect_with_deps(move |_| {
            match api::stored_token() {
                None => {
                    info!("No session token, viewer is signed out");
                    state.set(AuthState { identity: None, loading: false });
                }
                Some(token) => {
                    spawn_local(async move {
                        let identity = match api::fetch_identity(&token).await {
                            Ok(identity) => {
                                info!("Signed in as {}", identity.id);
                                // loading covers subscriber status too, not just the profile
                                let record = match api::fetch_subscription(&token).await {
                                    Ok(record) => record,
                                    Err(e) => {
                                        warn!("Failed to resolve subscriber status: {}", e);
                                        None
                                    }
                                };
                                Some(with_subscriber_flag(identity, record.as_ref()))
                            }
                            Err(ProviderError::Unauthorized) => {
                                warn!("Session token rejected, clearing it");
                                if let Err(e) = api::clear_token() {
                                    error!("Failed to clear token: {}", e);
                                }
                                None
                            }
                            Err(e) => {
                                error!("Failed to fetch profile: {}", e);
                                None
                            }
                        };
                        state.set(AuthState { identity, loading: false });
                    });
                }
            }
            || ()
        }, ());
    }

    html! {
        <ContextProvider<AuthState> context={(*state).clone()}>
            { props.children.clone() }
        </ContextProvider<AuthState>>
    }
}

#[hook]
pub fn use_auth() -> AuthState {
    use_context::<AuthState>().expect("use_auth called outside AuthProvider")
}
