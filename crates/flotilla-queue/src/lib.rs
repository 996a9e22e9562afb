//! Sequential OTA update queue management for Flotilla
//!
//! This crate is the scheduling core for fleet firmware updates:
//! - Strictly sequential batch processing, one device flashing at a time
//! - A per-item state machine whose terminal results outlive the run
//! - Timeout-based failure detection: a grace window for transient
//!   disconnection while a device reboots, and a hard per-item deadline so
//!   a hung device can never stall the batch
//! - Cooperative mid-run cancellation that never aborts the in-flight item
//! - Optional pause/resume coordination for a memory-heavy auxiliary
//!   service around the whole batch
//!
//! # Architecture
//!
//! - [`queue`]: the update queue manager and its processing loop
//! - [`item`]: per-device queue items and their status lattice
//! - [`monitor`]: the bounded waiting phase for an accepted update
//! - [`trigger`]: the external device update capability
//! - [`auxiliary`]: the optional auxiliary service capability
//! - [`snapshot`]: immutable status views handed to external callers
//! - [`config`]: queue tuning knobs
//! - [`error`]: operator-facing error types
//!
//! # Concurrency
//!
//! Each accepted batch is driven by one background task. The task is the
//! sole mutator of item state; [`status`](queue::UpdateQueue::status),
//! [`cancel`](queue::UpdateQueue::cancel) and
//! [`clear`](queue::UpdateQueue::clear) only touch atomic flags or take a
//! short item-list lock, so they are safe from any task at any time and
//! never block on device communication.
//!
//! # Example
//!
//! ```ignore
//! use flotilla_queue::prelude::*;
//! use std::sync::Arc;
//!
//! # async fn example(fleet: Arc<dyn UpdateTrigger>) -> QueueResult<()> {
//! let queue = UpdateQueue::new(fleet, None, QueueConfig::default());
//!
//! queue
//!     .start(vec!["garage-door".into(), "porch-light".into()], false)
//!     .await?;
//!
//! // The batch runs in the background; poll for results.
//! let snapshot = queue.status();
//! println!("{} devices queued", snapshot.summary.queued);
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod auxiliary;
pub mod config;
pub mod error;
pub mod item;
pub mod monitor;
pub mod prelude;
pub mod queue;
pub mod snapshot;
pub mod trigger;

pub use auxiliary::{AuxiliaryService, AuxiliaryStatus};
pub use config::{QueueConfig, QueueConfigBuilder};
pub use error::{QueueError, QueueResult};
pub use item::{ItemStatus, QueueItem};
pub use monitor::{WaitFailure, WaitVerdict};
pub use queue::UpdateQueue;
pub use snapshot::{QueueEvent, QueueSnapshot, StatusSummary};
pub use trigger::{DeviceState, UpdateTrigger};
