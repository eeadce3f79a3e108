//! Domain records referenced by the notification layer.
//!
//! These mirror the shape of the chat domain model closely enough to drive
//! routing decisions. The notification layer never persists them; they are
//! loaded by the caller and handed in with each event.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// `notification_app` value meaning the user only wants in-app banners.
///
/// New-message pushes to such users at normal priority are delivered silently.
pub const NOTIFICATION_APP_BANNER: i16 = 0;

// ---------------------------------------------------------------------------
// Users and groups
// ---------------------------------------------------------------------------

/// Whether an account is a person or a group identity.
///
/// Groups are accounts too: they send broadcast messages and own a public
/// profile, but they never broadcast personal-detail changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountKind {
    Individual,
    Group,
}

/// A user or group account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: DbId,
    /// Display name used in alert texts.
    pub full_name: String,
    pub kind: AccountKind,
    /// Group display name; only meaningful for [`AccountKind::Group`].
    pub group_name: Option<String>,
    /// Notification display preference (see [`NOTIFICATION_APP_BANNER`]).
    pub notification_app: i16,
}

impl User {
    /// Build an individual account with the default (audible) preference.
    pub fn individual(id: DbId, full_name: impl Into<String>) -> Self {
        Self {
            id,
            full_name: full_name.into(),
            kind: AccountKind::Individual,
            group_name: None,
            notification_app: 1,
        }
    }

    /// Build a group account.
    pub fn group(id: DbId, group_name: impl Into<String>) -> Self {
        let group_name = group_name.into();
        Self {
            id,
            full_name: group_name.clone(),
            kind: AccountKind::Group,
            group_name: Some(group_name),
            notification_app: 1,
        }
    }

    pub fn with_notification_app(mut self, notification_app: i16) -> Self {
        self.notification_app = notification_app;
        self
    }

    pub fn is_group(&self) -> bool {
        self.kind == AccountKind::Group
    }

    /// Whether this user only wants banner notifications.
    pub fn prefers_banner(&self) -> bool {
        self.notification_app == NOTIFICATION_APP_BANNER
    }

    /// Group name, falling back to the account's display name.
    pub fn display_group_name(&self) -> &str {
        self.group_name.as_deref().unwrap_or(&self.full_name)
    }
}

/// A membership of `member` in `group`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupMember {
    pub id: DbId,
    pub group: User,
    pub member: User,
    pub is_admin: bool,
    pub is_active: bool,
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

/// Message priority level. Ordered: `Low < Normal < High`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
}

impl Priority {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Normal => "normal",
            Self::High => "high",
        }
    }
}

impl FromStr for Priority {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "low" => Ok(Self::Low),
            "normal" => Ok(Self::Normal),
            "high" => Ok(Self::High),
            other => Err(CoreError::UnknownPriority(other.to_string())),
        }
    }
}

/// A chat message as seen by one recipient.
///
/// Group broadcasts fan out into one `Message` per member; all of them point
/// back at a single root record (see [`RootMessage`]).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: DbId,
    /// Client-generated message id, echoed back in read receipts.
    pub app_message_id: String,
    pub sender: User,
    pub recipient: User,
    /// The group member who actually wrote a group broadcast.
    pub group_sender: Option<User>,
    pub is_spoof: bool,
    /// Alternate identities shown on a spoofed message.
    pub spoof_users: Vec<serde_json::Value>,
    pub priority: Priority,
}

impl Message {
    /// A plain direct message at normal priority.
    pub fn direct(id: DbId, app_message_id: impl Into<String>, sender: User, recipient: User) -> Self {
        Self {
            id,
            app_message_id: app_message_id.into(),
            sender,
            recipient,
            group_sender: None,
            is_spoof: false,
            spoof_users: Vec::new(),
            priority: Priority::Normal,
        }
    }

    pub fn with_group_sender(mut self, group_sender: User) -> Self {
        self.group_sender = Some(group_sender);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_spoof_users(mut self, spoof_users: Vec<serde_json::Value>) -> Self {
        self.is_spoof = true;
        self.spoof_users = spoof_users;
        self
    }

    pub fn is_group_broadcast(&self) -> bool {
        self.sender.is_group()
    }

    pub fn group_sender_id(&self) -> Option<DbId> {
        self.group_sender.as_ref().map(|u| u.id)
    }
}

/// The root record of a group broadcast, carrying the aggregate read count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootMessage {
    pub id: DbId,
    /// Sender of the root record; read receipts are addressed here.
    pub sender_id: DbId,
    /// Number of members who have read the broadcast, including this read.
    pub read_count: i64,
}

impl RootMessage {
    /// Whether the aggregate count says this is the first read of the broadcast.
    pub fn is_first_read(&self) -> bool {
        self.read_count <= 1
    }
}

// ---------------------------------------------------------------------------
// Devices
// ---------------------------------------------------------------------------

/// Push platforms the dispatcher knows how to address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Ios,
    Android,
}

impl Platform {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Android => "android",
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "ios" => Ok(Self::Ios),
            "android" => Ok(Self::Android),
            other => Err(CoreError::UnknownPlatform(other.to_string())),
        }
    }
}

/// A registered push device.
///
/// `platform` is kept as the raw stored string: rows with platforms this
/// layer does not recognise are skipped, not rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: DbId,
    pub owner_user_id: DbId,
    pub platform: String,
    pub token: String,
}

impl Device {
    pub fn new(id: DbId, owner_user_id: DbId, platform: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            id,
            owner_user_id,
            platform: platform.into(),
            token: token.into(),
        }
    }

    /// Parse the stored platform string.
    pub fn platform(&self) -> Result<Platform, CoreError> {
        self.platform.parse()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
