use chatnotify_core::alert_text::DEFAULT_LOCALE;
use chatnotify_core::models::Platform;
use chatnotify_events::PushConfig;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Load `.env` and the environment, then report which push apps are usable.
///
/// Exits non-zero when neither platform has an app registration.
fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "chatnotify_config_check=debug,chatnotify_events=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = PushConfig::from_env();
    let mut configured = 0;
    for platform in [Platform::Ios, Platform::Android] {
        match config.app_for(platform) {
            Ok(app) => {
                configured += 1;
                tracing::info!(%platform, app, "Push app configured");
            }
            Err(e) => tracing::warn!(%platform, error = %e, "Pushes to this platform will fail"),
        }
    }

    let locale = std::env::var("APP_LOCALE").unwrap_or_else(|_| DEFAULT_LOCALE.to_string());
    tracing::info!(
        locale = %locale,
        default_title = %config.default_title,
        android_icon = %config.android_icon,
        "Notification configuration loaded"
    );

    if configured == 0 {
        tracing::error!("No push app registrations configured");
        std::process::exit(1);
    }
}
