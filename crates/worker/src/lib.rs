//! Background execution for notification work.
//!
//! Request handlers submit [`NotificationTask`]s to a [`NotificationQueue`]
//! instead of routing inline. A single [`NotificationWorker`] drains two
//! lanes: interactive work (single events, pushes) always goes before bulk
//! work such as dropping a user from many groups at once.

pub mod queue;

pub use queue::{
    notification_queue, Lane, NotificationQueue, NotificationTask, NotificationWorker, QueueError,
    QueueReceiver,
};
