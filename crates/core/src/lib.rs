//! Chat notification core: domain types and pure decision helpers.
//!
//! This crate has no I/O. It defines the records the notification layer
//! reasons about and the rendering logic shared by both routers:
//!
//! - [`models`]: users, messages, memberships, devices and their enums.
//! - [`events`]: [`NotificationEvent`], the tagged domain event.
//! - [`channels`]: pub/sub channel tags and [`ChannelKey`].
//! - [`alert_text`]: [`AlertTextBuilder`] over a [`Localizer`].

pub mod alert_text;
pub mod channels;
pub mod error;
pub mod events;
pub mod models;
pub mod types;

pub use alert_text::{AlertTextBuilder, Localizer};
pub use channels::ChannelKey;
pub use error::CoreError;
pub use events::NotificationEvent;
