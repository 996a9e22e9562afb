//! Per-device queue items and their status lattice.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Status of one device update within a batch run.
///
/// The lattice is `Queued -> Running -> {Success, Failed, Skipped}`, plus
/// `Queued -> Cancelled` for items that were never reached. A terminal
/// status is never left again, and `Running` never returns to `Queued`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemStatus {
    /// Waiting for its turn in the batch.
    Queued,
    /// Currently being updated. At most one item per batch is in this
    /// state at any instant.
    Running,
    /// The update completed and the device came back reachable.
    Success,
    /// The update failed; the item's `error_detail` carries the reason.
    Failed,
    /// The device was already unreachable when its turn came.
    Skipped,
    /// Cancelled before the item was ever started.
    Cancelled,
}

impl ItemStatus {
    /// Whether this status is terminal.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        !matches!(self, ItemStatus::Queued | ItemStatus::Running)
    }

    /// Lowercase name, matching the serialized form.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ItemStatus::Queued => "queued",
            ItemStatus::Running => "running",
            ItemStatus::Success => "success",
            ItemStatus::Failed => "failed",
            ItemStatus::Skipped => "skipped",
            ItemStatus::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for ItemStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One device's update attempt within a batch run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueItem {
    /// Identifier of the device's update capability.
    pub target_id: String,
    /// Human-readable label, resolved once at enqueue time so results
    /// stay meaningful even if the device later disappears.
    pub display_name: String,
    /// Current position in the status lattice.
    pub status: ItemStatus,
    /// Failure reason; present only when `status` is
    /// [`ItemStatus::Failed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
    /// When processing of this item began.
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    /// When the item reached a terminal status.
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl QueueItem {
    /// Create a fresh queued item.
    #[must_use]
    pub fn new(target_id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            display_name: display_name.into(),
            status: ItemStatus::Queued,
            error_detail: None,
            started_at: None,
            finished_at: None,
        }
    }

    /// Mark the item as running and stamp `started_at`. No-op once the
    /// item is terminal.
    pub(crate) fn begin(&mut self) {
        if self.status.is_terminal() {
            return;
        }
        self.status = ItemStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Resolve the item to a terminal status and stamp `finished_at`.
    ///
    /// No-op if the item is already terminal, so a late resolution can
    /// never rewrite a settled result. The detail is kept only for
    /// [`ItemStatus::Failed`].
    pub(crate) fn resolve(&mut self, status: ItemStatus, error_detail: Option<String>) {
        if self.status.is_terminal() || !status.is_terminal() {
            return;
        }
        self.status = status;
        self.error_detail = if status == ItemStatus::Failed {
            error_detail
        } else {
            None
        };
        self.finished_at = Some(Utc::now());
    }
}
