//! Pub/sub channel tags and channel key composition.
//!
//! A channel key is `<subject_id>_<tag>`. Clients subscribe to the keys for
//! their own user id, so the subject decides who hears an event. The tags
//! must match what the mobile clients subscribe to.

use std::fmt;

use serde::Serialize;

use crate::types::DbId;

/// A new message arrived for the subject.
pub const CHANNEL_NEW_MESSAGE: &str = "NewMessage";

/// A message the subject sent was read.
pub const CHANNEL_MESSAGE_READ: &str = "MessageRead";

/// The subject's own profile details changed.
pub const CHANNEL_USER_DETAILS: &str = "UserDetails";

/// A group's public details changed.
pub const CHANNEL_GROUP_DETAILS: &str = "GroupDetails";

/// The subject was added to, or removed from, a group.
pub const CHANNEL_GROUP_MEMBER_ACTION: &str = "GroupMemberAction";

/// Fully-composed pub/sub channel name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChannelKey(String);

impl ChannelKey {
    pub fn new(subject_id: DbId, tag: &str) -> Self {
        Self(format!("{subject_id}_{tag}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ChannelKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
