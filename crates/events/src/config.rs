//! Push dispatcher configuration.
//!
//! [`PushConfig`] is resolved once at startup and handed to the
//! [`PushDispatcher`](crate::dispatcher::PushDispatcher). Which provider app
//! registrations to use (development vs production) is decided here, not at
//! send time.

use chatnotify_core::models::Platform;

use crate::delivery::push::PushError;

/// Android notification title used when no alert text is supplied.
pub const DEFAULT_TITLE: &str = "SimpleChat Notification";

/// Android notification icon.
pub const DEFAULT_ANDROID_ICON: &str = "ic_launcher.png";

/// Fixed alert used by manual and diagnostic test pushes.
pub const DEFAULT_TEST_ALERT: &str = "Test! This is a test notification from SimpleChat!";

/// Configuration for the push dispatcher.
#[derive(Debug, Clone)]
pub struct PushConfig {
    /// iOS (APNs) app registration name.
    pub ios_app: Option<String>,
    /// Android (FCM) app registration name.
    pub android_app: Option<String>,
    /// Android title fallback.
    pub default_title: String,
    pub android_icon: String,
    pub test_alert: String,
}

impl PushConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable             | Required | Default                   |
    /// |----------------------|----------|---------------------------|
    /// | `PUSH_IOS_APP`       | no       | none                      |
    /// | `PUSH_ANDROID_APP`   | no       | none                      |
    /// | `PUSH_DEFAULT_TITLE` | no       | `SimpleChat Notification` |
    /// | `PUSH_ANDROID_ICON`  | no       | `ic_launcher.png`         |
    /// | `PUSH_TEST_ALERT`    | no       | fixed SimpleChat string   |
    ///
    /// A platform without an app registration is not an error here: sends to
    /// its devices fail individually and test pushes report it.
    pub fn from_env() -> Self {
        Self {
            ios_app: std::env::var("PUSH_IOS_APP").ok(),
            android_app: std::env::var("PUSH_ANDROID_APP").ok(),
            default_title: std::env::var("PUSH_DEFAULT_TITLE")
                .unwrap_or_else(|_| DEFAULT_TITLE.to_string()),
            android_icon: std::env::var("PUSH_ANDROID_ICON")
                .unwrap_or_else(|_| DEFAULT_ANDROID_ICON.to_string()),
            test_alert: std::env::var("PUSH_TEST_ALERT")
                .unwrap_or_else(|_| DEFAULT_TEST_ALERT.to_string()),
        }
    }

    /// Configuration with both app registrations set and default texts.
    pub fn with_apps(ios_app: impl Into<String>, android_app: impl Into<String>) -> Self {
        Self {
            ios_app: Some(ios_app.into()),
            android_app: Some(android_app.into()),
            ..Self::default()
        }
    }

    /// App registration for `platform`.
    pub fn app_for(&self, platform: Platform) -> Result<&str, PushError> {
        let app = match platform {
            Platform::Ios => self.ios_app.as_deref(),
            Platform::Android => self.android_app.as_deref(),
        };
        app.ok_or(PushError::AppNotConfigured(platform))
    }
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            ios_app: None,
            android_app: None,
            default_title: DEFAULT_TITLE.to_string(),
            android_icon: DEFAULT_ANDROID_ICON.to_string(),
            test_alert: DEFAULT_TEST_ALERT.to_string(),
        }
    }
}
