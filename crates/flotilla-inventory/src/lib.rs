//! Fleet roster and firmware version logic for Flotilla
//!
//! The update queue in `flotilla-queue` deliberately knows nothing about
//! where its targets come from. This crate holds the other half the UI
//! needs: turning per-device facts gathered from the host into the rows an
//! operator picks update targets from.
//!
//! - [`version`]: lenient firmware version parsing and comparison
//! - [`roster`]: per-device row assembly and ordering
//!
//! Both are pure: no I/O, no async, no host framework types.

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod roster;
pub mod version;

pub use roster::{Availability, DeviceFacts, DeviceRecord, FirmwareEntity, FirmwareReport, build_roster};
pub use version::{FirmwareVersion, FirmwareVersionError, update_available};
