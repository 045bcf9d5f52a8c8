use thiserror::Error;
use wasm_bindgen::JsValue;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Network(String),
    #[error("session expired")]
    Unauthorized,
    #[error("unexpected status {0}")]
    Status(u16),
    #[error("failed to parse response: {0}")]
    Decode(String),
    #[error("local storage unavailable: {0}")]
    Storage(String),
}

impl From<gloo_net::Error> for ProviderError {
    fn from(err: gloo_net::Error) -> Self {
        match err {
            gloo_net::Error::SerdeError(e) => ProviderError::Decode(e.to_string()),
            other => ProviderError::Network(other.to_string()),
        }
    }
}

impl From<JsValue> for ProviderError {
    fn from(value: JsValue) -> Self {
        ProviderError::Storage(format!("{:?}", value))
    }
}
