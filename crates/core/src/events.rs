//! The domain events the notification layer reacts to.

use serde::Serialize;

use crate::models::{GroupMember, Message, User};

/// A domain event that may produce pub/sub and push notifications.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum NotificationEvent {
    /// A message was delivered to its recipient.
    NewMessage {
        message: Message,
        /// Whether the pub/sub payload carries rendered alert text.
        include_alert: bool,
    },

    /// The recipient read a message.
    MessageRead { message: Message },

    /// A user's profile changed. `server_change` marks admin-side edits,
    /// which also ship the user's office list.
    UserChanged { user: User, server_change: bool },

    /// A group's public profile changed.
    GroupChanged { group: User },

    /// A member was added to or dropped from a group.
    GroupMemberAction { group_member: GroupMember },
}

impl NotificationEvent {
    /// A new-message event carrying alert text.
    pub fn new_message(message: Message) -> Self {
        Self::NewMessage {
            message,
            include_alert: true,
        }
    }

    pub fn message_read(message: Message) -> Self {
        Self::MessageRead { message }
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::NewMessage { .. } => "new_message",
            Self::MessageRead { .. } => "message_read",
            Self::UserChanged { .. } => "user_changed",
            Self::GroupChanged { .. } => "group_changed",
            Self::GroupMemberAction { .. } => "group_member_action",
        }
    }
}
