//! In-memory collaborators shared by the events integration tests.
//!
//! Each fake records what it was asked to do so tests can assert on the
//! outbound traffic without a push provider or broker.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatnotify_core::models::{Device, GroupMember, Message, RootMessage, User};
use chatnotify_core::types::DbId;
use chatnotify_core::{AlertTextBuilder, Localizer};
use chatnotify_events::{
    ChannelRouter, CollaboratorError, DeviceRegistry, DomainModel, PublishError, PublishTransport,
    PushConfig, PushDispatcher, PushError, PushPayload, PushTransport,
};
use serde_json::{json, Map, Value};

// ---------------------------------------------------------------------------
// Domain model
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDomain {
    /// (blocker, blocked) pairs.
    pub blocks: Mutex<HashSet<(DbId, DbId)>>,
    pub unread: Mutex<HashMap<DbId, u64>>,
    /// Root records keyed by the per-recipient message id.
    pub roots: Mutex<HashMap<DbId, RootMessage>>,
    pub memberships: Mutex<Vec<GroupMember>>,
    pub offices: Mutex<HashMap<DbId, Vec<Value>>>,
    /// When set, every lookup fails with this message.
    pub failure: Mutex<Option<String>>,
}

impl FakeDomain {
    pub fn block(&self, blocker: DbId, blocked: DbId) {
        self.blocks.lock().unwrap().insert((blocker, blocked));
    }

    pub fn set_unread(&self, user_id: DbId, count: u64) {
        self.unread.lock().unwrap().insert(user_id, count);
    }

    pub fn set_root(&self, message_id: DbId, root: RootMessage) {
        self.roots.lock().unwrap().insert(message_id, root);
    }

    pub fn fail_with(&self, msg: &str) {
        *self.failure.lock().unwrap() = Some(msg.to_string());
    }

    fn check(&self) -> Result<(), CollaboratorError> {
        match self.failure.lock().unwrap().as_ref() {
            Some(msg) => Err(CollaboratorError::Lookup(msg.clone())),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl DomainModel for FakeDomain {
    async fn is_blocking(&self, user_id: DbId, other_id: DbId) -> Result<bool, CollaboratorError> {
        self.check()?;
        Ok(self.blocks.lock().unwrap().contains(&(user_id, other_id)))
    }

    async fn unread_received_count(&self, user_id: DbId) -> Result<u64, CollaboratorError> {
        self.check()?;
        Ok(self.unread.lock().unwrap().get(&user_id).copied().unwrap_or(0))
    }

    async fn original_group_message(
        &self,
        message: &Message,
    ) -> Result<Option<RootMessage>, CollaboratorError> {
        self.check()?;
        Ok(self.roots.lock().unwrap().get(&message.id).copied())
    }

    async fn group_memberships(
        &self,
        user_id: DbId,
        group_ids: &[DbId],
    ) -> Result<Vec<GroupMember>, CollaboratorError> {
        self.check()?;
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.member.id == user_id && group_ids.contains(&m.group.id))
            .cloned()
            .collect())
    }

    async fn office_list(&self, user: &User) -> Result<Vec<Value>, CollaboratorError> {
        self.check()?;
        Ok(self.offices.lock().unwrap().get(&user.id).cloned().unwrap_or_default())
    }

    async fn message_view(&self, message: &Message, spoofed: bool) -> Result<Value, CollaboratorError> {
        self.check()?;
        let mut view = json!({ "id": message.id, "app_message_id": message.app_message_id });
        if spoofed {
            view["is_spoof"] = Value::Bool(true);
        }
        Ok(view)
    }

    async fn user_view(&self, user: &User) -> Result<Value, CollaboratorError> {
        self.check()?;
        Ok(json!({ "id": user.id, "full_name": user.full_name }))
    }

    async fn group_view_for(&self, group: &User, viewer: &User) -> Result<Value, CollaboratorError> {
        self.check()?;
        let is_admin = self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .any(|m| m.group.id == group.id && m.member.id == viewer.id && m.is_admin);
        Ok(json!({ "id": group.id, "group_name": group.display_group_name(), "is_admin": is_admin }))
    }

    async fn user_search_view(&self, user: &User) -> Result<Map<String, Value>, CollaboratorError> {
        self.check()?;
        let mut view = Map::new();
        view.insert("id".into(), json!(user.id));
        view.insert("full_name".into(), json!(user.full_name));
        Ok(view)
    }

    async fn membership_view(&self, membership: &GroupMember) -> Result<Value, CollaboratorError> {
        self.check()?;
        Ok(json!({
            "id": membership.id,
            "group_id": membership.group.id,
            "member_id": membership.member.id,
            "is_active": membership.is_active,
        }))
    }
}

// ---------------------------------------------------------------------------
// Device registry
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeRegistry {
    pub devices: Mutex<HashMap<DbId, Vec<Device>>>,
    pub fail: Mutex<bool>,
}

impl FakeRegistry {
    pub fn register(&self, device: Device) {
        self.devices
            .lock()
            .unwrap()
            .entry(device.owner_user_id)
            .or_default()
            .push(device);
    }
}

#[async_trait]
impl DeviceRegistry for FakeRegistry {
    async fn devices_of(&self, user_id: DbId) -> Result<Vec<Device>, CollaboratorError> {
        if *self.fail.lock().unwrap() {
            return Err(CollaboratorError::Lookup("registry offline".into()));
        }
        Ok(self.devices.lock().unwrap().get(&user_id).cloned().unwrap_or_default())
    }
}

// ---------------------------------------------------------------------------
// Transports
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct RecordingPush {
    pub sent: Mutex<Vec<PushPayload>>,
    pub fail_tokens: Mutex<HashSet<String>>,
}

impl RecordingPush {
    pub fn fail_token(&self, token: &str) {
        self.fail_tokens.lock().unwrap().insert(token.to_string());
    }

    pub fn sent(&self) -> Vec<PushPayload> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl PushTransport for RecordingPush {
    async fn send(&self, payload: &PushPayload) -> Result<(), PushError> {
        if self.fail_tokens.lock().unwrap().contains(&payload.device_token) {
            return Err(PushError::Rejected("BadDeviceToken".into()));
        }
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Published {
    pub channel: String,
    pub payload: Value,
    pub durable: bool,
}

#[derive(Default)]
pub struct RecordingPublisher {
    pub published: Mutex<Vec<Published>>,
    pub fail: Mutex<bool>,
}

impl RecordingPublisher {
    pub fn published(&self) -> Vec<Published> {
        self.published.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishTransport for RecordingPublisher {
    async fn publish(&self, channel: &str, payload: &Value, durable: bool) -> Result<u16, PublishError> {
        if *self.fail.lock().unwrap() {
            return Err(PublishError::Transport("broker unreachable".into()));
        }
        self.published.lock().unwrap().push(Published {
            channel: channel.to_string(),
            payload: payload.clone(),
            durable,
        });
        Ok(200)
    }
}

// ---------------------------------------------------------------------------
// Localizer
// ---------------------------------------------------------------------------

/// Renders `key|locale|k=v,...` so assertions can see the template choice.
pub struct EchoLocalizer;

impl Localizer for EchoLocalizer {
    fn translate(&self, key: &str, locale: &str, args: &[(&str, &str)]) -> String {
        let args: Vec<String> = args.iter().map(|(k, v)| format!("{k}={v}")).collect();
        format!("{key}|{locale}|{}", args.join(","))
    }
}

// ---------------------------------------------------------------------------
// Harnesses
// ---------------------------------------------------------------------------

pub struct RouterHarness {
    pub domain: Arc<FakeDomain>,
    pub publisher: Arc<RecordingPublisher>,
    pub router: ChannelRouter,
}

pub fn router_harness() -> RouterHarness {
    let domain = Arc::new(FakeDomain::default());
    let publisher = Arc::new(RecordingPublisher::default());
    let router = ChannelRouter::new(
        domain.clone(),
        publisher.clone(),
        AlertTextBuilder::new(Arc::new(EchoLocalizer), "en"),
    );
    RouterHarness {
        domain,
        publisher,
        router,
    }
}

pub struct PushHarness {
    pub domain: Arc<FakeDomain>,
    pub registry: Arc<FakeRegistry>,
    pub ios: Arc<RecordingPush>,
    pub android: Arc<RecordingPush>,
    pub dispatcher: PushDispatcher,
}

pub fn push_harness(config: PushConfig) -> PushHarness {
    let domain = Arc::new(FakeDomain::default());
    let registry = Arc::new(FakeRegistry::default());
    let ios = Arc::new(RecordingPush::default());
    let android = Arc::new(RecordingPush::default());
    let dispatcher = PushDispatcher::new(
        config,
        registry.clone(),
        domain.clone(),
        ios.clone(),
        android.clone(),
    );
    PushHarness {
        domain,
        registry,
        ios,
        android,
        dispatcher,
    }
}

pub fn default_push_harness() -> PushHarness {
    push_harness(PushConfig::with_apps("ios_app", "android_app"))
}
