#[cfg(debug_assertions)]
pub fn get_backend_url() -> &'static str {
    "http://localhost:3001"  // Development URL when running locally
}

#[cfg(not(debug_assertions))]
pub fn get_backend_url() -> &'static str {
    ""  // Production URL
}

// How long "Verifying access..." may show before the copy changes
pub const AUTH_TIMEOUT_MS: u64 = 15_000;

pub const TRIAL_WINDOW_HOURS: i64 = 48;

pub const TOKEN_KEY: &str = "token";

pub fn stripe_buy_button_id() -> &'static str {
    option_env!("STRIPE_BUTTON_ID").unwrap_or("")
}

pub fn stripe_publishable_key() -> &'static str {
    option_env!("STRIPE_PUBLISHABLE_KEY").unwrap_or("")
}
