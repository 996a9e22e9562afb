//! The external device update capability consumed by the queue.

use serde::{Deserialize, Serialize};

/// Reachability and update progress as currently observed for one device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeviceState {
    /// The device is no longer tracked at all.
    Unknown,
    /// The device is known but not reachable right now.
    Offline,
    /// The device is reachable and reporting.
    Online {
        /// An update is still pending for the device.
        update_pending: bool,
        /// The device reports a flash in flight.
        in_progress: bool,
    },
}

impl DeviceState {
    /// Whether the device is reachable at all.
    #[must_use]
    pub fn is_reachable(self) -> bool {
        matches!(self, DeviceState::Online { .. })
    }

    /// The settled "nothing left to do" observation that serves as the
    /// success signal after an accepted update.
    #[must_use]
    pub fn is_up_to_date(self) -> bool {
        matches!(
            self,
            DeviceState::Online {
                update_pending: false,
                in_progress: false,
            }
        )
    }
}

/// Capability to start a firmware update on one device and to observe the
/// device over time.
///
/// Implementations wrap whatever transport actually reaches the device;
/// the queue only ever consumes this interface and never holds more than
/// one update in flight.
#[async_trait::async_trait]
pub trait UpdateTrigger: Send + Sync {
    /// Start the update for `target_id`.
    ///
    /// An `Err` is a synchronous rejection (compile error, upload error,
    /// insufficient memory); its rendered chain becomes the item's
    /// failure detail. `Ok` means the update was accepted and the queue
    /// should watch [`device_state`](Self::device_state) for the outcome.
    async fn trigger_update(&self, target_id: &str) -> anyhow::Result<()>;

    /// Current observation of the device, polled during the waiting
    /// phase.
    async fn device_state(&self, target_id: &str) -> DeviceState;

    /// Best-effort human-readable name for the device. `None` makes the
    /// queue fall back to the raw identifier.
    async fn display_name(&self, target_id: &str) -> Option<String>;
}
