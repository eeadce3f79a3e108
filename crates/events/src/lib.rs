//! Chat notification routing and push dispatch.
//!
//! This crate turns domain events into outbound notifications:
//!
//! - [`ChannelRouter`]: decides the pub/sub channel and payload for each
//!   [`NotificationEvent`](chatnotify_core::NotificationEvent), applies the
//!   suppression rules, and publishes through a [`PublishTransport`].
//! - [`PushDispatcher`]: builds one platform-shaped [`PushPayload`] per
//!   registered device and hands it to the matching [`PushTransport`].
//! - [`collaborators`]: the read-only domain and device-registry seams both
//!   routers depend on.
//! - [`delivery`]: transport seams and their error types.

pub mod collaborators;
pub mod config;
pub mod delivery;
pub mod dispatcher;
pub mod router;

pub use collaborators::{CollaboratorError, DeviceRegistry, DomainModel};
pub use config::PushConfig;
pub use delivery::publish::{PublishEnvelope, PublishError, PublishTransport};
pub use delivery::push::{ProviderPriority, PushError, PushPayload, PushTransport};
pub use dispatcher::{DeviceOutcome, DeviceStatus, DispatchReport, PushDispatcher, PushKind, PushRequest};
pub use router::{ChannelRouter, PublishOutcome};
