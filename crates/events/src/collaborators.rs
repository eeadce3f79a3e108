//! Read-only seams onto the chat domain model and the device registry.
//!
//! Both are owned by the application. Implementations are expected to read
//! current state at call time; the routers never cache what they return.

use async_trait::async_trait;
use chatnotify_core::models::{Device, GroupMember, Message, RootMessage, User};
use chatnotify_core::types::DbId;
use chatnotify_core::CoreError;
use serde_json::{Map, Value};

/// Error returned by a collaborator lookup.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// A domain-level error, e.g. a referenced record is gone.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// The backing store failed or was unreachable.
    #[error("Lookup failed: {0}")]
    Lookup(String),
}

/// Registered push devices, keyed by owner.
#[async_trait]
pub trait DeviceRegistry: Send + Sync {
    /// All devices currently registered to `user_id`. Empty is valid.
    async fn devices_of(&self, user_id: DbId) -> Result<Vec<Device>, CollaboratorError>;
}

/// Domain lookups and API views used to shape notification payloads.
#[async_trait]
pub trait DomainModel: Send + Sync {
    /// Whether `user_id` is blocking `other_id`.
    async fn is_blocking(&self, user_id: DbId, other_id: DbId) -> Result<bool, CollaboratorError>;

    /// Number of received messages `user_id` has not read yet.
    async fn unread_received_count(&self, user_id: DbId) -> Result<u64, CollaboratorError>;

    /// Root record of the group broadcast `message` belongs to.
    ///
    /// The returned read count must come from the same snapshot that applied
    /// the read being routed, otherwise concurrent readers can each see a
    /// count of one.
    async fn original_group_message(
        &self,
        message: &Message,
    ) -> Result<Option<RootMessage>, CollaboratorError>;

    /// Memberships of `user_id` in any of `group_ids`.
    async fn group_memberships(
        &self,
        user_id: DbId,
        group_ids: &[DbId],
    ) -> Result<Vec<GroupMember>, CollaboratorError>;

    /// Offices listed on the user's own profile.
    async fn office_list(&self, user: &User) -> Result<Vec<Value>, CollaboratorError>;

    /// API view of a message; `spoofed` selects the variant carrying the spoof flag.
    async fn message_view(&self, message: &Message, spoofed: bool) -> Result<Value, CollaboratorError>;

    /// Public API view of a user or group account.
    async fn user_view(&self, user: &User) -> Result<Value, CollaboratorError>;

    /// Group view masked for what `viewer` may see as a (non-)admin.
    async fn group_view_for(&self, group: &User, viewer: &User) -> Result<Value, CollaboratorError>;

    /// Search-visible user fields.
    async fn user_search_view(&self, user: &User) -> Result<Map<String, Value>, CollaboratorError>;

    /// API view of a membership record.
    async fn membership_view(&self, membership: &GroupMember) -> Result<Value, CollaboratorError>;
}
