//! Authenticated Push Transport

use crate::{AlarmNotifier, NotifyError};
use async_trait::async_trait;
use tracing::info;

/// HTTP client for the push-notification endpoint.
///
/// The endpoint expects a form-encoded `message` field and a bearer token
/// identifying the receiving account (the shape of the LINE Notify API).
pub struct PushClient {
    endpoint: String,
    client: reqwest::Client,
}

impl PushClient {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            client: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl AlarmNotifier for PushClient {
    async fn notify(&self, token: &str, message: &str) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .bearer_auth(token)
            .form(&[("message", message)])
            .send()
            .await
            .map_err(|e| NotifyError::Push(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Rejected(resp.status().as_u16()));
        }

        info!("Pushed alarm notification");
        Ok(())
    }
}
