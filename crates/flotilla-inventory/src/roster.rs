//! Per-device row assembly for the operator-facing fleet roster.
//!
//! The host surface gathers raw facts about each device (what its update
//! capability reports, what the device registry remembers, whether a
//! status signal says it is online) and this module turns them into the
//! rows an operator picks update targets from. The rules mirror how a
//! fleet actually degrades: capabilities get disabled to save resources,
//! devices fall off the network, and a freshly re-enabled capability takes
//! a while before it reports anything.

use serde::{Deserialize, Serialize};

use crate::version::update_available;

/// What the device's firmware update capability currently looks like.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FirmwareEntity {
    /// The device has no update capability registered at all; only
    /// registry data is available.
    NotRegistered,
    /// A capability exists but has been disabled on the host.
    Disabled,
    /// A capability exists and is enabled but has produced no report yet,
    /// which usually means it is still coming up.
    NotReporting,
    /// A capability exists but currently reports itself unavailable.
    Unavailable,
    /// The capability is live.
    Reporting(FirmwareReport),
}

/// A live report from the update capability.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirmwareReport {
    /// Version the device says it runs.
    pub installed: Option<String>,
    /// Version the update channel offers.
    pub latest: Option<String>,
    /// The host flags an update as available.
    pub update_flagged: bool,
    /// A flash is currently in flight.
    pub in_progress: bool,
}

/// Raw facts about one device, gathered by the host surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceFacts {
    /// Identifier of the update capability; `None` when none is
    /// registered.
    pub target_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Firmware version remembered by the device registry, used as a
    /// fallback when the capability is not reporting.
    pub registry_version: Option<String>,
    /// Online according to a status signal; `None` when no signal exists.
    pub online: Option<bool>,
    /// Current shape of the update capability.
    pub firmware_entity: FirmwareEntity,
}

/// Operator-facing availability classification of a roster row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    /// The capability reports and the device can be enqueued.
    Ready,
    /// The capability is disabled or missing; the row is informational.
    Disabled,
    /// The capability should report but does not.
    Unavailable,
    /// The capability was recently enabled and is still coming up.
    Enabling,
}

/// One row of the fleet roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceRecord {
    /// Identifier to enqueue, when the device can be updated at all.
    pub target_id: Option<String>,
    /// Display name.
    pub name: String,
    /// Effective installed version shown to the operator.
    pub installed_version: Option<String>,
    /// Offered version; populated only when an update is genuinely newer.
    pub latest_version: Option<String>,
    /// Whether an update should be offered.
    pub update_available: bool,
    /// Whether a flash is currently in flight.
    pub in_progress: bool,
    /// Online according to the status signal, when one exists.
    pub online: Option<bool>,
    /// Row classification.
    pub availability: Availability,
}

/// Assemble the roster rows, sorted by case-insensitive name.
///
/// `builder_version` is the firmware version the fleet's build toolchain
/// currently produces; it stands in as "latest" for devices whose
/// capability cannot report one itself.
#[must_use]
pub fn build_roster(facts: Vec<DeviceFacts>, builder_version: Option<&str>) -> Vec<DeviceRecord> {
    let mut records: Vec<DeviceRecord> = facts
        .into_iter()
        .map(|facts| assess(facts, builder_version))
        .collect();
    records.sort_by_key(|record| record.name.to_lowercase());
    records
}

/// Build one roster row from raw facts.
#[must_use]
pub fn assess(facts: DeviceFacts, builder_version: Option<&str>) -> DeviceRecord {
    let DeviceFacts {
        target_id,
        name,
        registry_version,
        online,
        firmware_entity,
    } = facts;

    let availability = match firmware_entity {
        FirmwareEntity::Reporting(report) => {
            let installed = report.installed.or(registry_version);
            let latest = report
                .latest
                .or_else(|| builder_version.map(ToOwned::to_owned));

            // The host's flag alone is not enough: devices sometimes
            // report a "latest" older than what they already run.
            let offer =
                report.update_flagged && update_available(installed.as_deref(), latest.as_deref());

            return DeviceRecord {
                target_id,
                name,
                installed_version: installed,
                latest_version: if offer { latest } else { None },
                update_available: offer,
                in_progress: report.in_progress,
                online,
                availability: Availability::Ready,
            };
        }
        FirmwareEntity::NotRegistered | FirmwareEntity::Disabled => Availability::Disabled,
        FirmwareEntity::Unavailable => Availability::Unavailable,
        // Still coming up unless the status signal says the device is
        // positively offline.
        FirmwareEntity::NotReporting => {
            if online == Some(false) {
                Availability::Unavailable
            } else {
                Availability::Enabling
            }
        }
    };

    // No live report: fall back to registry data against the builder.
    let offer = update_available(registry_version.as_deref(), builder_version);
    DeviceRecord {
        target_id,
        name,
        installed_version: registry_version,
        latest_version: if offer {
            builder_version.map(ToOwned::to_owned)
        } else {
            None
        },
        update_available: offer,
        in_progress: false,
        online,
        availability,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn facts(name: &str, entity: FirmwareEntity) -> DeviceFacts {
        DeviceFacts {
            target_id: Some(format!("update.{}", name.to_lowercase())),
            name: name.to_string(),
            registry_version: None,
            online: Some(true),
            firmware_entity: entity,
        }
    }

    #[test]
    fn test_reporting_device_offers_genuinely_newer_update() {
        let record = assess(
            facts(
                "Garage",
                FirmwareEntity::Reporting(FirmwareReport {
                    installed: Some("2025.6.0".into()),
                    latest: Some("2025.7.1".into()),
                    update_flagged: true,
                    in_progress: false,
                }),
            ),
            None,
        );

        assert_eq!(record.availability, Availability::Ready);
        assert!(record.update_available);
        assert_eq!(record.latest_version.as_deref(), Some("2025.7.1"));
    }

    #[test]
    fn test_flag_without_newer_version_is_suppressed() {
        let record = assess(
            facts(
                "Garage",
                FirmwareEntity::Reporting(FirmwareReport {
                    installed: Some("2025.7.1".into()),
                    latest: Some("2025.7.1".into()),
                    update_flagged: true,
                    in_progress: false,
                }),
            ),
            None,
        );

        assert!(!record.update_available);
        assert!(record.latest_version.is_none());
    }

    #[test]
    fn test_disabled_device_falls_back_to_registry_and_builder() {
        let mut input = facts("Attic", FirmwareEntity::Disabled);
        input.registry_version = Some("2025.6.0".into());

        let record = assess(input, Some("2025.7.1"));
        assert_eq!(record.availability, Availability::Disabled);
        assert!(record.update_available);
        assert_eq!(record.installed_version.as_deref(), Some("2025.6.0"));
        assert_eq!(record.latest_version.as_deref(), Some("2025.7.1"));
    }

    #[test]
    fn test_not_reporting_device_is_enabling_unless_offline() {
        let mut input = facts("Porch", FirmwareEntity::NotReporting);
        input.online = None;
        assert_eq!(
            assess(input, None).availability,
            Availability::Enabling
        );

        let mut input = facts("Porch", FirmwareEntity::NotReporting);
        input.online = Some(false);
        assert_eq!(
            assess(input, None).availability,
            Availability::Unavailable
        );
    }

    #[test]
    fn test_reporting_installed_falls_back_to_registry() {
        let mut input = facts(
            "Shed",
            FirmwareEntity::Reporting(FirmwareReport {
                installed: None,
                latest: Some("2025.7.1".into()),
                update_flagged: true,
                in_progress: false,
            }),
        );
        input.registry_version = Some("2025.6.0".into());

        let record = assess(input, None);
        assert_eq!(record.installed_version.as_deref(), Some("2025.6.0"));
        assert!(record.update_available);
    }

    #[test]
    fn test_roster_sorts_by_name_case_insensitively() {
        let roster = build_roster(
            vec![
                facts("porch", FirmwareEntity::NotRegistered),
                facts("Attic", FirmwareEntity::NotRegistered),
                facts("garage", FirmwareEntity::NotRegistered),
            ],
            None,
        );
        let names: Vec<_> = roster.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Attic", "garage", "porch"]);
    }
}
