//! Human-readable alert text for notifications.
//!
//! [`AlertTextBuilder`] picks a template key from the actors present on an
//! event and renders it through a [`Localizer`]. It never fails: missing
//! actors select a different template rather than an error.

use std::sync::Arc;

use crate::models::{Message, User};

// ---------------------------------------------------------------------------
// Template keys
// ---------------------------------------------------------------------------

/// New message sent by a group; args: `group_sender_name`, `group_name`.
pub const KEY_NEW_MESSAGE_GROUP: &str = "alert_texts.new_message.group";

/// New message sent by an individual; args: `sender_name`.
pub const KEY_NEW_MESSAGE_USER: &str = "alert_texts.new_message.user";

/// Member added with both actors known; args: `inviter_name`, `invited_name`.
pub const KEY_GROUP_ADD_WITH_INVITER_WITH_INVITED: &str =
    "alert_texts.group_user_add_by_system.with_inviter.with_invited";

/// Member added by a known inviter; args: `inviter_name`.
pub const KEY_GROUP_ADD_WITH_INVITER_WITHOUT_INVITED: &str =
    "alert_texts.group_user_add_by_system.with_inviter.without_invited";

/// Known member added by the system; args: `invited_name`.
pub const KEY_GROUP_ADD_WITHOUT_INVITER_WITH_INVITED: &str =
    "alert_texts.group_user_add_by_system.without_inviter.with_invited";

/// Neither actor known; no args.
pub const KEY_GROUP_ADD_WITHOUT_INVITER_WITHOUT_INVITED: &str =
    "alert_texts.group_user_add_by_system.without_inviter.without_invited";

/// Locale used when neither the caller nor `APP_LOCALE` names one.
pub const DEFAULT_LOCALE: &str = "en";

// ---------------------------------------------------------------------------
// Localizer
// ---------------------------------------------------------------------------

/// String-table lookup owned by the application.
pub trait Localizer: Send + Sync {
    /// Render `key` for `locale`, substituting the named `args`.
    fn translate(&self, key: &str, locale: &str, args: &[(&str, &str)]) -> String;
}

// ---------------------------------------------------------------------------
// AlertTextBuilder
// ---------------------------------------------------------------------------

/// Renders alert text for new messages and group membership changes.
#[derive(Clone)]
pub struct AlertTextBuilder {
    localizer: Arc<dyn Localizer>,
    default_locale: String,
}

impl AlertTextBuilder {
    pub fn new(localizer: Arc<dyn Localizer>, default_locale: impl Into<String>) -> Self {
        Self {
            localizer,
            default_locale: default_locale.into(),
        }
    }

    /// Build with the default locale taken from `APP_LOCALE` (falls back to `en`).
    pub fn from_env(localizer: Arc<dyn Localizer>) -> Self {
        let locale = std::env::var("APP_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string());
        Self::new(localizer, locale)
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Alert for a newly received message.
    ///
    /// Group broadcasts name both the group and the member who wrote it.
    pub fn new_message(&self, message: &Message, locale: Option<&str>) -> String {
        let locale = self.resolve(locale);
        if message.sender.is_group() {
            let group_sender_name = message
                .group_sender
                .as_ref()
                .map(|u| u.full_name.as_str())
                .unwrap_or_default();
            self.localizer.translate(
                KEY_NEW_MESSAGE_GROUP,
                locale,
                &[
                    ("group_sender_name", group_sender_name),
                    ("group_name", message.sender.display_group_name()),
                ],
            )
        } else {
            self.localizer.translate(
                KEY_NEW_MESSAGE_USER,
                locale,
                &[("sender_name", message.sender.full_name.as_str())],
            )
        }
    }

    /// Alert for a member added to a group by the system.
    pub fn group_user_added(
        &self,
        invited: Option<&User>,
        inviter: Option<&User>,
        locale: Option<&str>,
    ) -> String {
        let locale = self.resolve(locale);
        match (inviter, invited) {
            (Some(inviter), Some(invited)) => self.localizer.translate(
                KEY_GROUP_ADD_WITH_INVITER_WITH_INVITED,
                locale,
                &[
                    ("inviter_name", inviter.full_name.as_str()),
                    ("invited_name", invited.full_name.as_str()),
                ],
            ),
            (Some(inviter), None) => self.localizer.translate(
                KEY_GROUP_ADD_WITH_INVITER_WITHOUT_INVITED,
                locale,
                &[("inviter_name", inviter.full_name.as_str())],
            ),
            (None, Some(invited)) => self.localizer.translate(
                KEY_GROUP_ADD_WITHOUT_INVITER_WITH_INVITED,
                locale,
                &[("invited_name", invited.full_name.as_str())],
            ),
            (None, None) => {
                self.localizer
                    .translate(KEY_GROUP_ADD_WITHOUT_INVITER_WITHOUT_INVITED, locale, &[])
            }
        }
    }

    fn resolve<'a>(&'a self, locale: Option<&'a str>) -> &'a str {
        locale.unwrap_or(&self.default_locale)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
