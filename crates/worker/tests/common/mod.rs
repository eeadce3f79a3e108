//! Minimal collaborators for driving the worker end to end.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chatnotify_core::models::{Device, GroupMember, Message, RootMessage, User};
use chatnotify_core::types::DbId;
use chatnotify_core::{AlertTextBuilder, Localizer};
use chatnotify_events::{
    ChannelRouter, CollaboratorError, DeviceRegistry, DomainModel, PublishError, PublishTransport,
    PushConfig, PushDispatcher, PushError, PushPayload, PushTransport,
};
use chatnotify_worker::NotificationWorker;
use serde_json::{json, Map, Value};

/// Domain with no blocks, no unread messages and flat views.
#[derive(Default)]
pub struct StubDomain {
    pub memberships: Mutex<Vec<GroupMember>>,
}

impl StubDomain {
    pub fn add_membership(&self, id: DbId, group: User, member: User) {
        self.memberships.lock().unwrap().push(GroupMember {
            id,
            group,
            member,
            is_admin: false,
            is_active: false,
        });
    }
}

#[async_trait]
impl DomainModel for StubDomain {
    async fn is_blocking(&self, _user_id: DbId, _other_id: DbId) -> Result<bool, CollaboratorError> {
        Ok(false)
    }

    async fn unread_received_count(&self, _user_id: DbId) -> Result<u64, CollaboratorError> {
        Ok(0)
    }

    async fn original_group_message(
        &self,
        _message: &Message,
    ) -> Result<Option<RootMessage>, CollaboratorError> {
        Ok(None)
    }

    async fn group_memberships(
        &self,
        user_id: DbId,
        group_ids: &[DbId],
    ) -> Result<Vec<GroupMember>, CollaboratorError> {
        Ok(self
            .memberships
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.member.id == user_id && group_ids.contains(&m.group.id))
            .cloned()
            .collect())
    }

    async fn office_list(&self, _user: &User) -> Result<Vec<Value>, CollaboratorError> {
        Ok(Vec::new())
    }

    async fn message_view(&self, message: &Message, _spoofed: bool) -> Result<Value, CollaboratorError> {
        Ok(json!({ "id": message.id }))
    }

    async fn user_view(&self, user: &User) -> Result<Value, CollaboratorError> {
        Ok(json!({ "id": user.id }))
    }

    async fn group_view_for(&self, group: &User, _viewer: &User) -> Result<Value, CollaboratorError> {
        Ok(json!({ "id": group.id }))
    }

    async fn user_search_view(&self, user: &User) -> Result<Map<String, Value>, CollaboratorError> {
        let mut view = Map::new();
        view.insert("id".into(), json!(user.id));
        Ok(view)
    }

    async fn membership_view(&self, membership: &GroupMember) -> Result<Value, CollaboratorError> {
        Ok(json!({ "id": membership.id }))
    }
}

#[derive(Default)]
pub struct StubRegistry {
    pub devices: Mutex<HashMap<DbId, Vec<Device>>>,
}

impl StubRegistry {
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
impl DeviceRegistry for StubRegistry {
    async fn devices_of(&self, user_id: DbId) -> Result<Vec<Device>, CollaboratorError> {
        Ok(self.devices.lock().unwrap().get(&user_id).cloned().unwrap_or_default())
    }
}

#[derive(Default)]
pub struct RecordingPush {
    pub sent: Mutex<Vec<PushPayload>>,
}

#[async_trait]
impl PushTransport for RecordingPush {
    async fn send(&self, payload: &PushPayload) -> Result<(), PushError> {
        self.sent.lock().unwrap().push(payload.clone());
        Ok(())
    }
}

/// Records channel names in publish order.
#[derive(Default)]
pub struct RecordingPublisher {
    pub channels: Mutex<Vec<String>>,
}

impl RecordingPublisher {
    pub fn channels(&self) -> Vec<String> {
        self.channels.lock().unwrap().clone()
    }
}

#[async_trait]
impl PublishTransport for RecordingPublisher {
    async fn publish(&self, channel: &str, _payload: &Value, _durable: bool) -> Result<u16, PublishError> {
        self.channels.lock().unwrap().push(channel.to_string());
        Ok(200)
    }
}

pub struct PlainLocalizer;

impl Localizer for PlainLocalizer {
    fn translate(&self, key: &str, _locale: &str, _args: &[(&str, &str)]) -> String {
        key.to_string()
    }
}

pub struct WorkerHarness {
    pub domain: Arc<StubDomain>,
    pub registry: Arc<StubRegistry>,
    pub ios: Arc<RecordingPush>,
    pub publisher: Arc<RecordingPublisher>,
    pub worker: NotificationWorker,
}

pub fn worker_harness() -> WorkerHarness {
    let domain = Arc::new(StubDomain::default());
    let registry = Arc::new(StubRegistry::default());
    let ios = Arc::new(RecordingPush::default());
    let publisher = Arc::new(RecordingPublisher::default());

    let router = ChannelRouter::new(
        domain.clone(),
        publisher.clone(),
        AlertTextBuilder::new(Arc::new(PlainLocalizer), "en"),
    );
    let dispatcher = PushDispatcher::new(
        PushConfig::with_apps("ios_app", "android_app"),
        registry.clone(),
        domain.clone(),
        ios.clone(),
        Arc::new(RecordingPush::default()),
    );

    WorkerHarness {
        domain,
        registry,
        ios,
        publisher,
        worker: NotificationWorker::new(Arc::new(router), Arc::new(dispatcher)),
    }
}
