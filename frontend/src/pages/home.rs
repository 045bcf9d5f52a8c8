use yew::prelude::*;
use yew_router::prelude::*;

use crate::components::pricing::PricingSection;
use crate::providers::auth::use_auth;
use crate::Route;

#[function_component]
pub fn Home() -> Html {
    let auth = use_auth();
    let navigator = use_navigator().unwrap();

    let go_to_dashboard = Callback::from(move |_: MouseEvent| {
        navigator.push(&Route::Dashboard);
    });

    html! {
        <div class="home-container">
            <section class="hero">
                <h1 class="hero-title">{"Ship what your users ask for"}</h1>
                <p class="hero-subtitle">
                    {"Collect feedback, turn it into pull requests, and keep your roadmap honest."}
                </p>
                <button class="hero-cta" onclick={go_to_dashboard}>
                    {
                        if auth.identity.is_some() {
                            "Open Dashboard"
                        } else {
                            "Start your 48-hour free trial"
                        }
                    }
                </button>
            </section>
            <PricingSection />
        </div>
    }
}

#[function_component]
pub fn Pricing() -> Html {
    let auth = use_auth();
    let (user_id, user_email) = match auth.identity.as_ref() {
        Some(identity) => (
            Some(AttrValue::from(identity.id.0.clone())),
            Some(AttrValue::from(identity.email.clone())),
        ),
        None => (None, None),
    };

    html! {
        <div class="pricing-page">
            <PricingSection show_full_details={true} user_id={user_id} user_email={user_email} />
        </div>
    }
}
