//! Notification Dispatch
//!
//! Builds the human-readable warning for a unit whose thresholds were
//! crossed and pushes it to the configured messaging endpoint. Delivery is
//! best-effort: the ingestion path logs failures and moves on.

mod message;
mod push;

pub use message::warning_message;
pub use push::PushClient;

use async_trait::async_trait;
use thiserror::Error;

/// Notification errors
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("Push failed: {0}")]
    Push(String),

    #[error("Endpoint rejected message: HTTP {0}")]
    Rejected(u16),
}

/// Outbound alarm-notification channel.
///
/// The pipeline holds this as a trait object so tests can capture messages
/// instead of hitting the network.
#[async_trait]
pub trait AlarmNotifier: Send + Sync {
    /// Deliver `message` on behalf of the unit that owns `token`.
    async fn notify(&self, token: &str, message: &str) -> Result<(), NotifyError>;
}
