use gloo_net::http::{Request, Response};
use serde::Deserialize;
use web_sys::window;

use crate::config;
use crate::gate::types::{Identity, SubscriptionRecord};
use super::error::ProviderError;

#[derive(Deserialize)]
struct SubscriptionResponse {
    #[serde(default)]
    subscription: Option<SubscriptionRecord>,
}

#[derive(Deserialize)]
struct PreferencesResponse {
    #[serde(default)]
    has_completed_onboarding: bool,
}

pub fn stored_token() -> Option<String> {
    window()
        .and_then(|w| w.local_storage().ok())
        .flatten()
        .and_then(|storage| storage.get_item(config::TOKEN_KEY).ok())
        .flatten()
}

pub fn clear_token() -> Result<(), ProviderError> {
    let storage = window()
        .ok_or_else(|| ProviderError::Storage("no window".to_string()))?
        .local_storage()?
        .ok_or_else(|| ProviderError::Storage("no local storage".to_string()))?;
    storage.remove_item(config::TOKEN_KEY)?;
    Ok(())
}

async fn authorized_get(path: &str, token: &str) -> Result<Response, ProviderError> {
    let response = Request::get(&format!("{}{}", config::get_backend_url(), path))
        .header("Authorization", &format!("Bearer {}", token))
        .send()
        .await?;
    if response.status() == 401 {
        return Err(ProviderError::Unauthorized);
    }
    Ok(response)
}

pub async fn fetch_identity(token: &str) -> Result<Identity, ProviderError> {
    let response = authorized_get("/api/profile", token).await?;
    if !response.ok() {
        return Err(ProviderError::Status(response.status()));
    }
    Ok(response.json::<Identity>().await?)
}

pub async fn fetch_subscription(token: &str) -> Result<Option<SubscriptionRecord>, ProviderError> {
    let response = authorized_get("/api/subscription", token).await?;
    match response.status() {
        204 | 404 => Ok(None),
        _ if response.ok() => {
            let body = response.text().await?;
            decode_subscription(&body)
        }
        status => Err(ProviderError::Status(status)),
    }
}

pub async fn fetch_onboarding_completed(token: &str) -> Result<bool, ProviderError> {
    let response = authorized_get("/api/preferences", token).await?;
    match response.status() {
        404 => Ok(false),
        _ if response.ok() => {
            let body = response.text().await?;
            decode_onboarding(&body)
        }
        status => Err(ProviderError::Status(status)),
    }
}

fn decode_subscription(body: &str) -> Result<Option<SubscriptionRecord>, ProviderError> {
    if body.trim().is_empty() {
        return Ok(None);
    }
    serde_json::from_str::<SubscriptionResponse>(body)
        .map(|r| r.subscription)
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

fn decode_onboarding(body: &str) -> Result<bool, ProviderError> {
    serde_json::from_str::<PreferencesResponse>(body)
        .map(|r| r.has_completed_onboarding)
        .map_err(|e| ProviderError::Decode(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::types::SubscriptionStatus;

    #[test]
    fn decodes_subscription_payload() {
        let record = decode_subscription(
            r#"{"subscription":{"status":"trialing","current_period_end":"2026-11-01T00:00:00Z"}}"#,
        )
        .unwrap()
        .unwrap();
        assert_eq!(record.status, SubscriptionStatus::Trialing);
        assert!(record.is_valid());
        assert!(record.current_period_end.is_some());
    }

    #[test]
    fn missing_or_null_subscription_is_none() {
        assert_eq!(decode_subscription("").unwrap(), None);
        assert_eq!(decode_subscription("{}").unwrap(), None);
        assert_eq!(decode_subscription(r#"{"subscription":null}"#).unwrap(), None);
    }

    #[test]
    fn unknown_status_is_kept_but_invalid() {
        let record = decode_subscription(r#"{"subscription":{"status":"paused"}}"#)
            .unwrap()
            .unwrap();
        assert_eq!(record.status, SubscriptionStatus::Other("paused".to_string()));
        assert!(!record.is_valid());
    }

    #[test]
    fn malformed_subscription_is_a_decode_error() {
        assert!(matches!(
            decode_subscription("not json"),
            Err(ProviderError::Decode(_))
        ));
    }

    #[test]
    fn onboarding_flag_defaults_to_false() {
        assert!(!decode_onboarding("{}").unwrap());
        assert!(decode_onboarding(r#"{"has_completed_onboarding":true}"#).unwrap());
    }

    #[test]
    fn identity_decodes_from_profile_payload() {
        let identity: Identity = serde_json::from_str(
            r#"{"id":"42","email":"a@example.com","created_at":"2026-10-18T12:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(identity.id.0, "42");
        assert!(!identity.is_subscriber);
    }
}
