use log::{error, warn};
use web_sys::window;
use yew::prelude::*;

use crate::config;

const BUY_BUTTON_SCRIPT: &str = "https://js.stripe.com/v3/buy-button.js";

const FEATURES: &[&str] = &[
    "Unlimited Voice Commands",
    "Smart Timer Management",
    "Real-time Cooking Assistance",
    "Hands-free Operation",
    "Cancel Anytime",
];

// Stripe's custom element only renders once its script is on the page.
fn ensure_buy_button_script() {
    let Some(document) = window().and_then(|w| w.document()) else {
        return;
    };
    if document
        .query_selector(&format!("script[src=\"{}\"]", BUY_BUTTON_SCRIPT))
        .ok()
        .flatten()
        .is_some()
    {
        return;
    }
    let Some(head) = document.head() else {
        return;
    };
    match document.create_element("script") {
        Ok(script) => {
            let _ = script.set_attribute("src", BUY_BUTTON_SCRIPT);
            let _ = script.set_attribute("async", "true");
            if let Err(e) = head.append_child(&script) {
                error!("Failed to attach buy button script: {:?}", e);
            }
        }
        Err(e) => error!("Failed to create buy button script: {:?}", e),
    }
}

#[derive(Properties, PartialEq)]
pub struct StripeBuyButtonProps {
    pub buy_button_id: AttrValue,
    pub publishable_key: AttrValue,
    #[prop_or_default]
    pub client_reference_id: Option<AttrValue>,
    #[prop_or_default]
    pub customer_email: Option<AttrValue>,
}

#[function_component]
pub fn StripeBuyButton(props: &StripeBuyButtonProps) -> Html {
    use_effect_with_deps(move |_| {
        ensure_buy_button_script();
        || ()
    }, ());

    if props.buy_button_id.is_empty() || props.publishable_key.is_empty() {
        warn!("Buy button is not configured");
        return html! {
            <p class="buy-button-missing">{"Checkout is not available right now."}</p>
        };
    }

    html! {
        <stripe-buy-button
            buy-button-id={props.buy_button_id.clone()}
            publishable-key={props.publishable_key.clone()}
            client-reference-id={props.client_reference_id.clone()}
            customer-email={props.customer_email.clone()}
        />
    }
}

#[derive(Properties, PartialEq)]
pub struct PricingSectionProps {
    #[prop_or_default]
    pub show_full_details: bool,
    #[prop_or_default]
    pub user_id: Option<AttrValue>,
    #[prop_or_default]
    pub user_email: Option<AttrValue>,
}

#[function_component]
pub fn PricingSection(props: &PricingSectionProps) -> Html {
    html! {
        <div class="pricing-section">
            <div class="pricing-card">
                <div class="pricing-header">
                    <h2>{"Simple, Transparent Pricing"}</h2>
                    <div class="price">
                        <span class="price-amount">{"$1.99"}</span>
                        <span class="price-period">{"/month"}</span>
                    </div>
                    <span class="trial-pill">{"7 days extended FREE trial"}</span>
                </div>
                <ul class="feature-list">
                    { for FEATURES.iter().map(|feature| html! {
                        <li class="feature-item">
                            <span class="feature-check">{"✓"}</span>
                            <span>{*feature}</span>
                        </li>
                    }) }
                </ul>
                <div class="pricing-cta">
                    <StripeBuyButton
                        buy_button_id={config::stripe_buy_button_id()}
                        publishable_key={config::stripe_publishable_key()}
                        client_reference_id={props.user_id.clone()}
                        customer_email={props.user_email.clone()}
                    />
                    <p class="pricing-note">{"$1.99/month after 7 days free trial"}</p>
                </div>
                {
                    if props.show_full_details {
                        html! {
                            <div class="pricing-details">
                                <p>{"• Cancel anytime before trial ends"}</p>
                                <p>{"• Automatic renewal after trial period"}</p>
                                <p>{"• Instant access to all features"}</p>
                            </div>
                        }
                    } else {
                        html! {}
                    }
                }
            </div>
        </div>
    }
}
