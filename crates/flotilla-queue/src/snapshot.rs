//! Immutable status views handed to external callers.
//!
//! The queue owns its batch state exclusively; everything a caller can
//! observe is a clone taken under a short lock, so snapshots are safe to
//! hold, serialize and ship to a UI while the batch keeps running.

use serde::{Deserialize, Serialize};

use crate::item::{ItemStatus, QueueItem};

/// Per-status item counts for a batch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    /// Items still waiting for their turn.
    pub queued: usize,
    /// Items currently being updated (0 or 1).
    pub running: usize,
    /// Items that updated successfully.
    pub success: usize,
    /// Items that failed.
    pub failed: usize,
    /// Items skipped because the device was unreachable.
    pub skipped: usize,
    /// Items cancelled before they started.
    pub cancelled: usize,
}

impl StatusSummary {
    /// Tally the statuses of `items`.
    #[must_use]
    pub fn of(items: &[QueueItem]) -> Self {
        let mut summary = Self::default();
        for item in items {
            match item.status {
                ItemStatus::Queued => summary.queued += 1,
                ItemStatus::Running => summary.running += 1,
                ItemStatus::Success => summary.success += 1,
                ItemStatus::Failed => summary.failed += 1,
                ItemStatus::Skipped => summary.skipped += 1,
                ItemStatus::Cancelled => summary.cancelled += 1,
            }
        }
        summary
    }

    /// Total number of items counted.
    #[must_use]
    pub fn total(&self) -> usize {
        self.queued + self.running + self.success + self.failed + self.skipped + self.cancelled
    }
}

/// Point-in-time view of the queue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSnapshot {
    /// Whether the manager is actively advancing the queue.
    pub is_running: bool,
    /// All items of the current (or most recent) batch, in submission
    /// order.
    pub items: Vec<QueueItem>,
    /// Per-status counts over `items`.
    pub summary: StatusSummary,
}

/// Notification broadcast by the queue as a batch advances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "event", content = "snapshot")]
pub enum QueueEvent {
    /// An item reached a terminal status.
    Progress(QueueSnapshot),
    /// The batch is over and the auxiliary service, if paused, has been
    /// resumed.
    Finished(QueueSnapshot),
}

impl QueueEvent {
    /// The snapshot carried by the event.
    #[must_use]
    pub fn snapshot(&self) -> &QueueSnapshot {
        match self {
            QueueEvent::Progress(snapshot) | QueueEvent::Finished(snapshot) => snapshot,
        }
    }
}
