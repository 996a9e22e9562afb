//! Bounded waiting phase for an accepted update.
//!
//! Once the trigger accepts an update the queue polls the device until a
//! terminal signal arrives. Two clocks bound the wait: a grace window
//! tolerating transient disconnection while the device flashes and
//! reboots, and a hard per-item deadline that force-resolves a hung
//! update. The deadline is owned by the polling loop itself; an early
//! resolution simply stops polling, so no timer can ever fire against an
//! already-settled item.

use std::time::Duration;

use thiserror::Error;
use tokio::time::Instant;

use crate::config::QueueConfig;
use crate::trigger::{DeviceState, UpdateTrigger};

/// Terminal failure reasons produced by the waiting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WaitFailure {
    /// The device stopped being tracked and never reappeared.
    #[error("device disappeared and did not come back")]
    Vanished,

    /// Flashing progress was observed, then the device dropped offline
    /// past the grace window.
    #[error("device went offline during the update and did not recover")]
    OfflineDuringUpdate,

    /// The device dropped offline before any progress was observed.
    #[error("device became unavailable")]
    BecameUnavailable,

    /// The hard deadline passed while the device still reported progress.
    #[error("update timed out: device may still be updating")]
    TimedOutMidUpdate,

    /// The hard deadline passed without any progress ever being observed.
    #[error("update timed out: no progress detected")]
    TimedOutNoProgress,
}

/// Outcome of the waiting phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitVerdict {
    /// The device finished updating and is reachable again.
    Success,
    /// The item must resolve as failed with the given reason.
    Failed(WaitFailure),
}

/// Poll `target_id` until a terminal signal or the hard deadline.
///
/// Cancellation is deliberately not observed here: an in-flight item
/// always reaches its own terminal outcome.
pub(crate) async fn await_outcome(
    trigger: &dyn UpdateTrigger,
    target_id: &str,
    config: &QueueConfig,
) -> WaitVerdict {
    let deadline = Instant::now() + config.update_timeout;
    let mut offline_since: Option<Instant> = None;
    let mut lost_entirely = false;
    let mut saw_progress = false;

    // Let the install call settle before the first poll.
    sleep_capped(deadline, config.settle_delay).await;

    while Instant::now() < deadline {
        let state = trigger.device_state(target_id).await;
        match state {
            DeviceState::Unknown | DeviceState::Offline => {
                lost_entirely = state == DeviceState::Unknown;
                let since = *offline_since.get_or_insert_with(Instant::now);
                if since.elapsed() > config.offline_grace {
                    let failure = if lost_entirely {
                        WaitFailure::Vanished
                    } else if saw_progress {
                        WaitFailure::OfflineDuringUpdate
                    } else {
                        WaitFailure::BecameUnavailable
                    };
                    return WaitVerdict::Failed(failure);
                }
                sleep_capped(deadline, config.idle_poll_interval).await;
            }
            DeviceState::Online {
                update_pending,
                in_progress,
            } => {
                // The device is back; a transient disconnection within the
                // grace window leaves no trace.
                offline_since = None;
                lost_entirely = false;

                if in_progress {
                    saw_progress = true;
                }
                if !in_progress && !update_pending {
                    return WaitVerdict::Success;
                }

                // Still pending without progress means the flash has not
                // started yet, or the read is stale; poll slowly.
                let step = if in_progress {
                    config.poll_interval
                } else {
                    config.idle_poll_interval
                };
                sleep_capped(deadline, step).await;
            }
        }
    }

    WaitVerdict::Failed(if saw_progress {
        WaitFailure::TimedOutMidUpdate
    } else {
        WaitFailure::TimedOutNoProgress
    })
}

/// Sleep for `step`, but never past `deadline`.
async fn sleep_capped(deadline: Instant, step: Duration) {
    let wake = Instant::now()
        .checked_add(step)
        .map_or(deadline, |at| at.min(deadline));
    tokio::time::sleep_until(wake).await;
}
