//! Convenience re-exports for common queue types

pub use crate::auxiliary::{AuxiliaryService, AuxiliaryStatus};
pub use crate::config::{QueueConfig, QueueConfigBuilder};
pub use crate::error::{QueueError, QueueResult};
pub use crate::item::{ItemStatus, QueueItem};
pub use crate::monitor::{WaitFailure, WaitVerdict};
pub use crate::queue::UpdateQueue;
pub use crate::snapshot::{QueueEvent, QueueSnapshot, StatusSummary};
pub use crate::trigger::{DeviceState, UpdateTrigger};
