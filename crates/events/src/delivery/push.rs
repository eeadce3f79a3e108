//! Push notification payloads and the per-platform transport seam.
//!
//! [`PushPayload`] is the provider-neutral shape built by the
//! [`PushDispatcher`](crate::dispatcher::PushDispatcher). A [`PushTransport`]
//! maps it onto APNs or FCM and performs the send.

use async_trait::async_trait;
use chatnotify_core::models::Platform;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::collaborators::CollaboratorError;

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for push delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum PushError {
    /// No provider app registration is configured for the platform.
    #[error("No {0} push app is configured")]
    AppNotConfigured(Platform),

    /// A domain lookup needed for the payload failed.
    #[error("Failed to build push payload: {0}")]
    Build(#[from] CollaboratorError),

    /// The provider refused the notification (bad token, unregistered app).
    #[error("Push provider rejected notification: {0}")]
    Rejected(String),

    /// Connection-level failure talking to the provider.
    #[error("Push transport error: {0}")]
    Transport(String),
}

// ---------------------------------------------------------------------------
// PushPayload
// ---------------------------------------------------------------------------

/// Provider delivery tier. Android pushes always use `High` so delivery is
/// not deferred by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPriority {
    Normal,
    High,
}

/// One notification addressed to one device.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PushPayload {
    pub platform: Platform,
    /// Provider app registration the send goes through.
    pub app: String,
    pub device_token: String,
    /// iOS alert body, or Android notification title.
    pub alert_text: Option<String>,
    pub badge: Option<u64>,
    /// No visible alert or sound; the app is only woken to refresh.
    pub silent: bool,
    /// iOS `content-available` flag.
    pub content_available: bool,
    /// iOS sound name; `Some("")` mutes the alert.
    pub sound: Option<String>,
    /// Android notification icon.
    pub icon: Option<String>,
    pub provider_priority: Option<ProviderPriority>,
    /// Custom data delivered to the app alongside the notification.
    pub data: Map<String, Value>,
}

impl PushPayload {
    /// An empty payload for `device_token` on `platform`.
    pub fn new(platform: Platform, app: impl Into<String>, device_token: impl Into<String>) -> Self {
        Self {
            platform,
            app: app.into(),
            device_token: device_token.into(),
            alert_text: None,
            badge: None,
            silent: false,
            content_available: false,
            sound: None,
            icon: None,
            provider_priority: None,
            data: Map::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// PushTransport
// ---------------------------------------------------------------------------

/// Sends a push payload through one provider (APNs or FCM).
#[async_trait]
pub trait PushTransport: Send + Sync {
    async fn send(&self, payload: &PushPayload) -> Result<(), PushError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
