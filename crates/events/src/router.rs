//! Event-to-channel routing for the pub/sub broker.
//!
//! [`ChannelRouter`] maps each [`NotificationEvent`] to at most one
//! [`PublishEnvelope`]: it picks the channel subject, applies the suppression
//! rules (blocking, repeat group reads, identity mismatches), and builds the
//! payload from the domain model's API views.
//!
//! Routing and publishing are best effort. Suppressed events and collaborator
//! failures both come back as "nothing to send"; publish failures are logged
//! and reported but never retried here.

use std::sync::Arc;

use chatnotify_core::channels::{
    CHANNEL_GROUP_DETAILS, CHANNEL_GROUP_MEMBER_ACTION, CHANNEL_MESSAGE_READ, CHANNEL_NEW_MESSAGE,
    CHANNEL_USER_DETAILS,
};
use chatnotify_core::models::{GroupMember, Message, User};
use chatnotify_core::types::DbId;
use chatnotify_core::{AlertTextBuilder, ChannelKey, NotificationEvent};
use serde_json::{json, Map, Value};

use crate::collaborators::{CollaboratorError, DomainModel};
use crate::delivery::publish::{PublishEnvelope, PublishError, PublishTransport};

/// Result of handing one envelope to the broker.
#[derive(Debug)]
pub struct PublishOutcome {
    pub channel: ChannelKey,
    pub result: Result<u16, PublishError>,
}

impl PublishOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Routes domain events onto per-user pub/sub channels.
pub struct ChannelRouter {
    domain: Arc<dyn DomainModel>,
    publisher: Arc<dyn PublishTransport>,
    alerts: AlertTextBuilder,
}

impl ChannelRouter {
    pub fn new(
        domain: Arc<dyn DomainModel>,
        publisher: Arc<dyn PublishTransport>,
        alerts: AlertTextBuilder,
    ) -> Self {
        Self {
            domain,
            publisher,
            alerts,
        }
    }

    /// Route and publish one event.
    pub async fn notify(&self, event: &NotificationEvent) -> Vec<PublishOutcome> {
        let mut outcomes = Vec::new();
        for envelope in self.route(event).await {
            outcomes.push(self.publish(envelope).await);
        }
        outcomes
    }

    /// Compute the envelopes for `event`: zero or one.
    ///
    /// Never fails. Collaborator errors are logged and the event is dropped.
    pub async fn route(&self, event: &NotificationEvent) -> Vec<PublishEnvelope> {
        match self.try_route(event).await {
            Ok(Some(envelope)) => vec![envelope],
            Ok(None) => Vec::new(),
            Err(e) => {
                tracing::error!(event = event.name(), error = %e, "Failed to route event");
                Vec::new()
            }
        }
    }

    /// Publish a `GroupMemberAction` for each membership of `user_id` in `group_ids`.
    ///
    /// Used when a user is dropped from several groups at once. No ordering
    /// between the individual publishes is implied.
    pub async fn group_member_bulk_action(&self, user_id: DbId, group_ids: &[DbId]) -> Vec<PublishOutcome> {
        let memberships = match self.domain.group_memberships(user_id, group_ids).await {
            Ok(memberships) => memberships,
            Err(e) => {
                tracing::error!(user_id, error = %e, "Failed to load memberships for bulk action");
                return Vec::new();
            }
        };

        tracing::debug!(user_id, count = memberships.len(), "Routing group member bulk action");

        let mut outcomes = Vec::with_capacity(memberships.len());
        for group_member in memberships {
            let event = NotificationEvent::GroupMemberAction { group_member };
            outcomes.extend(self.notify(&event).await);
        }
        outcomes
    }

    /// Hand one envelope to the broker and log the provider status.
    pub async fn publish(&self, envelope: PublishEnvelope) -> PublishOutcome {
        let result = self
            .publisher
            .publish(envelope.channel.as_str(), &envelope.payload, envelope.durable)
            .await;

        match &result {
            Ok(status) => {
                tracing::info!(channel = %envelope.channel, status, "Published notification");
            }
            Err(e) => {
                tracing::warn!(channel = %envelope.channel, error = %e, "Publish failed");
            }
        }

        PublishOutcome {
            channel: envelope.channel,
            result,
        }
    }

    async fn try_route(&self, event: &NotificationEvent) -> Result<Option<PublishEnvelope>, CollaboratorError> {
        match event {
            NotificationEvent::NewMessage {
                message,
                include_alert,
            } => self.new_message(message, *include_alert).await,
            NotificationEvent::MessageRead { message } => self.message_read(message).await,
            NotificationEvent::UserChanged {
                user,
                server_change,
            } => self.user_changed(user, *server_change).await,
            NotificationEvent::GroupChanged { group } => self.group_changed(group).await,
            NotificationEvent::GroupMemberAction { group_member } => {
                self.group_member_action(group_member).await.map(Some)
            }
        }
    }

    // -- Per-event routing -----------------------------------------------------

    async fn new_message(
        &self,
        message: &Message,
        include_alert: bool,
    ) -> Result<Option<PublishEnvelope>, CollaboratorError> {
        if self.recipient_blocks_sender(message).await? {
            return Ok(None);
        }

        let sender = if message.sender.is_group() {
            self.domain
                .group_view_for(&message.sender, &message.recipient)
                .await?
        } else {
            self.domain.user_view(&message.sender).await?
        };
        let group_sender = match &message.group_sender {
            Some(user) => self.domain.user_view(user).await?,
            None => Value::Null,
        };

        let mut payload = Map::new();
        payload.insert(
            "message".into(),
            self.domain.message_view(message, message.is_spoof).await?,
        );
        payload.insert("sender".into(), sender);
        payload.insert("group_sender".into(), group_sender);
        if message.is_spoof {
            payload.insert("spoof_users".into(), Value::Array(message.spoof_users.clone()));
        }
        if include_alert {
            payload.insert(
                "alert".into(),
                Value::String(self.alerts.new_message(message, None)),
            );
        }

        Ok(Some(PublishEnvelope::durable(
            ChannelKey::new(message.recipient.id, CHANNEL_NEW_MESSAGE),
            Value::Object(payload),
        )))
    }

    async fn message_read(&self, message: &Message) -> Result<Option<PublishEnvelope>, CollaboratorError> {
        if self.recipient_blocks_sender(message).await? {
            return Ok(None);
        }

        let subject = if message.is_group_broadcast() {
            let Some(root) = self.domain.original_group_message(message).await? else {
                tracing::debug!(message_id = message.id, "No root message for group read, suppressed");
                return Ok(None);
            };
            if !root.is_first_read() {
                tracing::debug!(
                    message_id = message.id,
                    root_id = root.id,
                    read_count = root.read_count,
                    "Repeat read of group broadcast, suppressed"
                );
                return Ok(None);
            }
            root.sender_id
        } else {
            message.sender.id
        };

        let payload = json!({
            "read_message": message.app_message_id,
            "sender": message.sender.id.to_string(),
            "group_sender": message.group_sender_id().map(|id| id.to_string()).unwrap_or_default(),
            "recipient": message.recipient.id.to_string(),
        });

        Ok(Some(PublishEnvelope::durable(
            ChannelKey::new(subject, CHANNEL_MESSAGE_READ),
            payload,
        )))
    }

    async fn user_changed(
        &self,
        user: &User,
        server_change: bool,
    ) -> Result<Option<PublishEnvelope>, CollaboratorError> {
        if user.is_group() {
            tracing::debug!(user_id = user.id, "Group accounts do not publish user details");
            return Ok(None);
        }

        let mut payload = self.domain.user_search_view(user).await?;
        payload.insert(
            "server_change".into(),
            Value::String(if server_change { "1" } else { "0" }.into()),
        );
        if server_change {
            payload.insert("offices".into(), Value::Array(self.domain.office_list(user).await?));
        }

        Ok(Some(PublishEnvelope::durable(
            ChannelKey::new(user.id, CHANNEL_USER_DETAILS),
            Value::Object(payload),
        )))
    }

    async fn group_changed(&self, group: &User) -> Result<Option<PublishEnvelope>, CollaboratorError> {
        if !group.is_group() {
            tracing::debug!(user_id = group.id, "Not a group account, group details not published");
            return Ok(None);
        }

        Ok(Some(PublishEnvelope::durable(
            ChannelKey::new(group.id, CHANNEL_GROUP_DETAILS),
            self.domain.user_view(group).await?,
        )))
    }

    async fn group_member_action(&self, group_member: &GroupMember) -> Result<PublishEnvelope, CollaboratorError> {
        let payload = json!({
            "group": self.domain.group_view_for(&group_member.group, &group_member.member).await?,
            "member": self.domain.membership_view(group_member).await?,
        });

        Ok(PublishEnvelope::durable(
            ChannelKey::new(group_member.member.id, CHANNEL_GROUP_MEMBER_ACTION),
            payload,
        ))
    }

    async fn recipient_blocks_sender(&self, message: &Message) -> Result<bool, CollaboratorError> {
        let blocking = self
            .domain
            .is_blocking(message.recipient.id, message.sender.id)
            .await?;
        if blocking {
            tracing::debug!(
                message_id = message.id,
                recipient_id = message.recipient.id,
                sender_id = message.sender.id,
                "Recipient blocks sender, suppressed"
            );
        }
        Ok(blocking)
    }
}
