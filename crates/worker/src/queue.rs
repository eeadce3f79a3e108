//! Two-lane notification queue and its worker loop.
//!
//! Lanes are bounded `tokio::sync::mpsc` channels. The worker polls them with
//! a biased `select!`, so a bulk task only runs when no interactive task is
//! waiting. No ordering is promised between tasks beyond that.

use std::sync::Arc;

use chatnotify_core::models::User;
use chatnotify_core::types::{DbId, Timestamp};
use chatnotify_core::NotificationEvent;
use chatnotify_events::{ChannelRouter, PushDispatcher, PushRequest};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio_util::sync::CancellationToken;

/// Default per-lane buffer capacity.
pub const DEFAULT_CAPACITY: usize = 1024;

// ---------------------------------------------------------------------------
// Tasks
// ---------------------------------------------------------------------------

/// Scheduling lane of a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lane {
    Interactive,
    Bulk,
}

/// A unit of deferred notification work.
#[derive(Debug, Clone)]
pub enum NotificationTask {
    /// Route one event and publish the result.
    Route(NotificationEvent),

    /// Push to every device of `target`.
    Push { target: User, request: PushRequest },

    /// Publish a membership change for each of the user's groups in `group_ids`.
    GroupMemberBulkAction { user_id: DbId, group_ids: Vec<DbId> },
}

impl NotificationTask {
    pub fn lane(&self) -> Lane {
        match self {
            Self::GroupMemberBulkAction { .. } => Lane::Bulk,
            Self::Route(_) | Self::Push { .. } => Lane::Interactive,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Route(event) => event.name(),
            Self::Push { .. } => "push",
            Self::GroupMemberBulkAction { .. } => "group_member_bulk_action",
        }
    }
}

struct QueuedTask {
    task: NotificationTask,
    submitted_at: Timestamp,
}

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for task submission.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// The lane's buffer is full; the caller may drop or retry the task.
    #[error("Notification queue is full ({0:?} lane)")]
    Full(Lane),

    /// The worker has shut down.
    #[error("Notification queue is closed")]
    Closed,
}

// ---------------------------------------------------------------------------
// NotificationQueue
// ---------------------------------------------------------------------------

/// Submission handle, cheap to clone into request handlers.
#[derive(Clone)]
pub struct NotificationQueue {
    interactive: mpsc::Sender<QueuedTask>,
    bulk: mpsc::Sender<QueuedTask>,
}

/// Receiving side, consumed by [`NotificationWorker::run`].
pub struct QueueReceiver {
    interactive: mpsc::Receiver<QueuedTask>,
    bulk: mpsc::Receiver<QueuedTask>,
}

/// Create a queue whose lanes each buffer up to `capacity` tasks.
pub fn notification_queue(capacity: usize) -> (NotificationQueue, QueueReceiver) {
    let (interactive_tx, interactive_rx) = mpsc::channel(capacity);
    let (bulk_tx, bulk_rx) = mpsc::channel(capacity);
    (
        NotificationQueue {
            interactive: interactive_tx,
            bulk: bulk_tx,
        },
        QueueReceiver {
            interactive: interactive_rx,
            bulk: bulk_rx,
        },
    )
}

impl NotificationQueue {
    /// Enqueue `task` on its lane without waiting. Returns the lane used.
    pub fn submit(&self, task: NotificationTask) -> Result<Lane, QueueError> {
        let lane = task.lane();
        let sender = match lane {
            Lane::Interactive => &self.interactive,
            Lane::Bulk => &self.bulk,
        };

        sender
            .try_send(QueuedTask {
                task,
                submitted_at: Utc::now(),
            })
            .map_err(|e| match e {
                TrySendError::Full(_) => QueueError::Full(lane),
                TrySendError::Closed(_) => QueueError::Closed,
            })?;
        Ok(lane)
    }

    /// Defer membership-change notifications for a user dropped from `group_ids`.
    pub fn submit_group_member_bulk_action(
        &self,
        user_id: DbId,
        group_ids: Vec<DbId>,
    ) -> Result<Lane, QueueError> {
        self.submit(NotificationTask::GroupMemberBulkAction { user_id, group_ids })
    }
}

// ---------------------------------------------------------------------------
// NotificationWorker
// ---------------------------------------------------------------------------

enum Next {
    Task(QueuedTask),
    InteractiveClosed,
    BulkClosed,
    Stop,
}

/// Executes queued tasks against the router and push dispatcher.
pub struct NotificationWorker {
    router: Arc<ChannelRouter>,
    dispatcher: Arc<PushDispatcher>,
}

impl NotificationWorker {
    pub fn new(router: Arc<ChannelRouter>, dispatcher: Arc<PushDispatcher>) -> Self {
        Self { router, dispatcher }
    }

    /// Run the worker loop.
    ///
    /// Exits when `cancel` fires or when every [`NotificationQueue`] handle
    /// has been dropped and both lanes are drained.
    pub async fn run(self, mut receiver: QueueReceiver, cancel: CancellationToken) {
        let mut interactive_open = true;
        let mut bulk_open = true;

        tracing::info!("Notification worker started");

        while interactive_open || bulk_open {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => Next::Stop,
                task = receiver.interactive.recv(), if interactive_open => {
                    task.map_or(Next::InteractiveClosed, Next::Task)
                }
                task = receiver.bulk.recv(), if bulk_open => {
                    task.map_or(Next::BulkClosed, Next::Task)
                }
            };

            match next {
                Next::Task(queued) => self.execute(queued).await,
                Next::InteractiveClosed => interactive_open = false,
                Next::BulkClosed => bulk_open = false,
                Next::Stop => {
                    tracing::info!("Notification worker cancelled");
                    return;
                }
            }
        }

        tracing::info!("Notification queue closed, worker shutting down");
    }

    async fn execute(&self, queued: QueuedTask) {
        let name = queued.task.name();
        let waited_ms = (Utc::now() - queued.submitted_at).num_milliseconds();

        match queued.task {
            NotificationTask::Route(event) => {
                let outcomes = self.router.notify(&event).await;
                tracing::debug!(task = name, published = outcomes.len(), waited_ms, "Task done");
            }
            NotificationTask::Push { target, request } => {
                let report = self.dispatcher.dispatch(&target, &request).await;
                tracing::debug!(task = name, sent = report.sent(), waited_ms, "Task done");
            }
            NotificationTask::GroupMemberBulkAction { user_id, group_ids } => {
                let outcomes = self.router.group_member_bulk_action(user_id, &group_ids).await;
                let failed = outcomes.iter().filter(|o| !o.is_ok()).count();
                tracing::info!(
                    task = name,
                    user_id,
                    groups = group_ids.len(),
                    published = outcomes.len() - failed,
                    failed,
                    waited_ms,
                    "Bulk group member action done"
                );
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
