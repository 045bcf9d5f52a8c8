use yew::prelude::*;
use yew_router::prelude::*;
use log::{info, Level};
use web_sys::{window, MouseEvent};

mod config;
mod gate {
    pub mod types;
    pub mod checks;
    pub mod watchdog;
    pub mod refresh;
    pub mod evaluator;
}
mod providers {
    pub mod error;
    pub mod api;
    pub mod auth;
    pub mod trial;
    pub mod subscription;
}
mod pages {
    pub mod home;
    pub mod dashboard;
    pub mod profile;
}
mod components {
    pub mod pricing;
}

use pages::{
    home::{Home, Pricing},
    dashboard::Dashboard,
    profile::Profile,
};
use providers::{
    auth::{use_auth, AuthProvider},
    subscription::SubscriptionProvider,
    trial::TrialProvider,
};


#[derive(Clone, Routable, PartialEq)]
pub enum Route {
    #[at("/")]
    Home,
    #[at("/dashboard")]
    Dashboard,
    #[at("/profile")]
    Profile,
    #[at("/pricing")]
    Pricing,
    #[not_found]
    #[at("/404")]
    NotFound,
}


fn switch(routes: Route) -> Html {
    match routes {
        Route::Home => {
            info!("Rendering Home page");
            html! { <Home /> }
        },
        Route::Dashboard => {
            info!("Rendering Dashboard page");
            html! { <Dashboard /> }
        },
        Route::Profile => {
            info!("Rendering Profile page");
            html! { <Profile /> }
        },
        Route::Pricing => {
            info!("Rendering Pricing page");
            html! { <Pricing /> }
        },
        Route::NotFound => {
            info!("Rendering NotFound page");
            html! { <Redirect<Route> to={Route::Home} /> }
        },
    }
}


#[derive(Properties, PartialEq)]
pub struct NavProps {
    pub on_logout: Callback<()>,
}

#[function_component(Nav)]
pub fn nav(props: &NavProps) -> Html {
    let auth = use_auth();
    let menu_open = use_state(|| false);
    let logged_in = auth.identity.is_some();

    let toggle_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |e: MouseEvent| {
            e.prevent_default();
            menu_open.set(!*menu_open);
        })
    };

    let close_menu = {
        let menu_open = menu_open.clone();
        Callback::from(move |_: MouseEvent| {
            menu_open.set(false);
        })
    };

    let handle_logout = {
        let on_logout = props.on_logout.clone();
        Callback::from(move |_: MouseEvent| on_logout.emit(()))
    };

    let menu_class = if *menu_open {
        "nav-right mobile-menu-open"
    } else {
        "nav-right"
    };

    html! {
        <nav class="top-nav">
            <div class="nav-content">
                <Link<Route> to={Route::Home} classes="nav-logo">
                    {"feedbackflow"}
                </Link<Route>>
                <button class="burger-menu" onclick={toggle_menu}>
                    <span></span>
                    <span></span>
                    <span></span>
                </button>
                <div class={menu_class} onclick={close_menu}>
                    <Link<Route> to={Route::Pricing} classes="nav-link">
                        {"Pricing"}
                    </Link<Route>>
                    {
                        if logged_in {
                            html! {
                                <>
                                    <Link<Route> to={Route::Dashboard} classes="nav-link">
                                        {"Dashboard"}
                                    </Link<Route>>
                                    <Link<Route> to={Route::Profile} classes="nav-profile-link">
                                        {"Profile"}
                                    </Link<Route>>
                                    <button onclick={handle_logout} class="nav-logout-button">
                                        {"Logout"}
                                    </button>
                                </>
                            }
                        } else {
                            html! {}
                        }
                    }
                </div>
            </div>
        </nav>
    }
}


#[function_component]
fn App() -> Html {
    let handle_logout = Callback::from(move |_| {
        if let Err(e) = providers::api::clear_token() {
            log::error!("Failed to clear token: {}", e);
        }
        // Reload the page to reflect the logged out state
        if let Some(window) = window() {
            let _ = window.location().reload();
        }
    });

    html! {
        <AuthProvider>
            <TrialProvider>
                <SubscriptionProvider>
                    <BrowserRouter>
                        <Nav on_logout={handle_logout} />
                        <Switch<Route> render={switch} />
                    </BrowserRouter>
                </SubscriptionProvider>
            </TrialProvider>
        </AuthProvider>
    }
}


fn main() {
    // Initialize console error panic hook for better error messages
    console_error_panic_hook::set_once();

    // Initialize logging
    console_log::init_with_level(Level::Info).expect("error initializing log");

    info!("Starting application");
    yew::Renderer::<App>::new().render();
}
