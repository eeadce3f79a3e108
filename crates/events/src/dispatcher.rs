//! Per-device push dispatch.
//!
//! [`PushDispatcher`] looks up every device registered to a user, shapes one
//! [`PushPayload`] per device for its platform, and sends them through the
//! platform's [`PushTransport`]. Sends run independently: one device failing
//! never stops its siblings, and [`PushDispatcher::dispatch`] never returns
//! an error. The outcome of every device is reported in [`DispatchReport`].

use std::sync::Arc;

use chatnotify_core::models::{Device, Platform, Priority, User};
use chatnotify_core::types::DbId;
use futures::future::join_all;
use serde_json::{Map, Value};

use crate::collaborators::{DeviceRegistry, DomainModel};
use crate::config::PushConfig;
use crate::delivery::push::{ProviderPriority, PushError, PushPayload, PushTransport};

/// Key of the event-type tag inside push data.
pub const DATA_TYPE_KEY: &str = "type";

// ---------------------------------------------------------------------------
// PushRequest
// ---------------------------------------------------------------------------

/// Event type carried in the push data so the app knows what to refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PushKind {
    /// A message arrived; pushes carry the unread badge.
    NewMessage,
    /// A message the user sent was read; always silent.
    ReadSentMessage,
}

impl PushKind {
    /// Wire code the mobile apps switch on.
    pub fn code(self) -> &'static str {
        match self {
            Self::NewMessage => "N",
            Self::ReadSentMessage => "R",
        }
    }
}

/// What to push to every device of one user.
#[derive(Debug, Clone, Default)]
pub struct PushRequest {
    pub kind: Option<PushKind>,
    pub alert: Option<String>,
    pub data: Map<String, Value>,
    pub priority: Priority,
    /// Manual test: falls back to the configured test alert.
    pub test: bool,
}

impl PushRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// New-message push with the rendered alert text.
    pub fn new_message(alert: impl Into<String>) -> Self {
        Self::new().with_kind(PushKind::NewMessage).with_alert(alert)
    }

    /// Silent read-receipt push.
    pub fn read_sent_message() -> Self {
        Self::new().with_kind(PushKind::ReadSentMessage)
    }

    /// Manual test push through the normal per-device path.
    pub fn test() -> Self {
        Self {
            test: true,
            ..Self::default()
        }
    }

    pub fn with_kind(mut self, kind: PushKind) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn with_alert(mut self, alert: impl Into<String>) -> Self {
        self.alert = Some(alert.into());
        self
    }

    pub fn with_data(mut self, data: Map<String, Value>) -> Self {
        self.data = data;
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    /// Whether a new-message push should skip the audible alert for `target`.
    fn mutes_for(&self, target: &User) -> bool {
        self.kind == Some(PushKind::NewMessage)
            && target.prefers_banner()
            && self.priority == Priority::Normal
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// How a single device fared.
#[derive(Debug)]
pub enum DeviceStatus {
    Sent,
    /// Unrecognised platform; nothing was sent.
    Skipped,
    Failed(PushError),
}

#[derive(Debug)]
pub struct DeviceOutcome {
    pub device_id: DbId,
    pub platform: Option<Platform>,
    pub status: DeviceStatus,
}

/// Per-device results of one dispatch.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<DeviceOutcome>,
}

impl DispatchReport {
    pub fn sent(&self) -> usize {
        self.count(|s| matches!(s, DeviceStatus::Sent))
    }

    pub fn skipped(&self) -> usize {
        self.count(|s| matches!(s, DeviceStatus::Skipped))
    }

    pub fn failed(&self) -> usize {
        self.count(|s| matches!(s, DeviceStatus::Failed(_)))
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    fn count(&self, pred: impl Fn(&DeviceStatus) -> bool) -> usize {
        self.outcomes.iter().filter(|o| pred(&o.status)).count()
    }
}

// ---------------------------------------------------------------------------
// PushDispatcher
// ---------------------------------------------------------------------------

/// Sends platform-shaped pushes to every device of a user.
pub struct PushDispatcher {
    config: PushConfig,
    devices: Arc<dyn DeviceRegistry>,
    domain: Arc<dyn DomainModel>,
    ios: Arc<dyn PushTransport>,
    android: Arc<dyn PushTransport>,
}

impl PushDispatcher {
    pub fn new(
        config: PushConfig,
        devices: Arc<dyn DeviceRegistry>,
        domain: Arc<dyn DomainModel>,
        ios: Arc<dyn PushTransport>,
        android: Arc<dyn PushTransport>,
    ) -> Self {
        Self {
            config,
            devices,
            domain,
            ios,
            android,
        }
    }

    pub fn config(&self) -> &PushConfig {
        &self.config
    }

    /// Push `request` to every device registered to `target`.
    ///
    /// Best effort: a registry failure yields an empty report, and each
    /// device's build or send failure is logged and recorded on its own
    /// outcome.
    pub async fn dispatch(&self, target: &User, request: &PushRequest) -> DispatchReport {
        let devices = match self.devices.devices_of(target.id).await {
            Ok(devices) => devices,
            Err(e) => {
                tracing::error!(user_id = target.id, error = %e, "Failed to load devices, push skipped");
                return DispatchReport::default();
            }
        };

        let sends = devices
            .iter()
            .map(|device| self.send_to_device(target, device, request));
        let report = DispatchReport {
            outcomes: join_all(sends).await,
        };

        if !report.is_empty() {
            tracing::info!(
                user_id = target.id,
                sent = report.sent(),
                skipped = report.skipped(),
                failed = report.failed(),
                "Push dispatch finished"
            );
        }
        report
    }

    /// Send the fixed test alert to one explicit device token.
    ///
    /// Diagnostic path: unlike [`dispatch`](Self::dispatch), failures are
    /// returned. `app` overrides the configured registration (e.g. to probe
    /// a development APNs app).
    pub async fn test_push(
        &self,
        platform: Platform,
        device_token: &str,
        app: Option<&str>,
    ) -> Result<(), PushError> {
        let app = match app {
            Some(app) => app,
            None => self.config.app_for(platform)?,
        };

        let mut payload = PushPayload::new(platform, app, device_token);
        payload.alert_text = Some(self.config.test_alert.clone());
        if platform == Platform::Android {
            payload
                .data
                .insert("message".into(), Value::String(self.config.test_alert.clone()));
            payload.content_available = true;
            payload.icon = Some(self.config.android_icon.clone());
            payload.provider_priority = Some(ProviderPriority::High);
        }

        self.transport(platform).send(&payload).await?;
        tracing::info!(%platform, app, "Test push sent");
        Ok(())
    }

    async fn send_to_device(&self, target: &User, device: &Device, request: &PushRequest) -> DeviceOutcome {
        let platform = match device.platform() {
            Ok(platform) => platform,
            Err(_) => {
                tracing::debug!(
                    device_id = device.id,
                    platform = %device.platform,
                    "Skipping device with unrecognised platform"
                );
                return DeviceOutcome {
                    device_id: device.id,
                    platform: None,
                    status: DeviceStatus::Skipped,
                };
            }
        };

        let result = match self.build_payload(target, device, platform, request).await {
            Ok(payload) => self.transport(platform).send(&payload).await,
            Err(e) => Err(e),
        };

        let status = match result {
            Ok(()) => DeviceStatus::Sent,
            Err(e) => {
                tracing::warn!(
                    user_id = target.id,
                    device_id = device.id,
                    %platform,
                    error = %e,
                    "Push to device failed"
                );
                DeviceStatus::Failed(e)
            }
        };

        DeviceOutcome {
            device_id: device.id,
            platform: Some(platform),
            status,
        }
    }

    async fn build_payload(
        &self,
        target: &User,
        device: &Device,
        platform: Platform,
        request: &PushRequest,
    ) -> Result<PushPayload, PushError> {
        let app = self.config.app_for(platform)?;
        let unread = match request.kind {
            Some(PushKind::NewMessage) => Some(self.domain.unread_received_count(target.id).await?),
            _ => None,
        };
        Ok(shape_payload(&self.config, app, platform, device, target, request, unread))
    }

    fn transport(&self, platform: Platform) -> &dyn PushTransport {
        match platform {
            Platform::Ios => self.ios.as_ref(),
            Platform::Android => self.android.as_ref(),
        }
    }
}

// ---------------------------------------------------------------------------
// Payload shaping
// ---------------------------------------------------------------------------

/// Shape the payload for one device. `unread` is set for new-message pushes.
fn shape_payload(
    config: &PushConfig,
    app: &str,
    platform: Platform,
    device: &Device,
    target: &User,
    request: &PushRequest,
    unread: Option<u64>,
) -> PushPayload {
    let mut payload = PushPayload::new(platform, app, device.token.as_str());
    let mut data = request.data.clone();
    if let Some(kind) = request.kind {
        data.insert(DATA_TYPE_KEY.into(), Value::String(kind.code().into()));
    }

    let alert = request
        .alert
        .clone()
        .or_else(|| request.test.then(|| config.test_alert.clone()));
    let muted = request.mutes_for(target);

    match platform {
        Platform::Ios => {
            payload.alert_text = alert;
            match request.kind {
                Some(PushKind::NewMessage) => {
                    payload.badge = unread;
                    if muted {
                        mute_ios(&mut payload);
                    }
                }
                Some(PushKind::ReadSentMessage) => mute_ios(&mut payload),
                None => {}
            }
        }
        Platform::Android => {
            payload.alert_text = Some(alert.unwrap_or_else(|| config.default_title.clone()));
            payload.icon = Some(config.android_icon.clone());
            payload.provider_priority = Some(ProviderPriority::High);
            if request.kind == Some(PushKind::NewMessage) {
                payload.badge = unread;
                if let Some(count) = unread {
                    data.insert("badge".into(), Value::String(count.to_string()));
                }
                if muted {
                    data.insert("no_sound".into(), Value::String("Y".into()));
                    payload.silent = true;
                }
            }
        }
    }

    payload.data = data;
    payload
}

/// Wake the app without a banner or sound.
fn mute_ios(payload: &mut PushPayload) {
    payload.silent = true;
    payload.content_available = true;
    payload.sound = Some(String::new());
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
