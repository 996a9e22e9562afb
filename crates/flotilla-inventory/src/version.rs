//! Lenient firmware version parsing and comparison.
//!
//! Device-reported versions are rarely clean semver: build metadata and
//! platform suffixes get appended ("2025.7.1 (ESP32)", "2025.7.1-dev").
//! Parsing keeps the leading numeric components and ignores the rest;
//! ordering compares the component sequences, which is how firmware
//! release channels actually number themselves.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error parsing a firmware version string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FirmwareVersionError {
    /// The input was empty or whitespace.
    #[error("empty version string")]
    Empty,

    /// No leading numeric component could be read.
    #[error("unparseable version string: {0}")]
    Unparseable(String),
}

/// A parsed firmware version.
///
/// Equality and ordering consider only the numeric components, so
/// `"2025.7.1 (ESP32)"` equals `"2025.7.1"` and `"2025.7.1"` is newer than
/// `"2025.7"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FirmwareVersion {
    components: Vec<u64>,
    raw: String,
}

impl FirmwareVersion {
    /// Parse a reported version string.
    ///
    /// # Errors
    ///
    /// Returns [`FirmwareVersionError::Empty`] for blank input and
    /// [`FirmwareVersionError::Unparseable`] when no leading numeric
    /// component exists.
    pub fn parse(input: &str) -> Result<Self, FirmwareVersionError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(FirmwareVersionError::Empty);
        }

        let numeric: String = trimmed
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();

        let mut components = Vec::new();
        for part in numeric.split('.') {
            if part.is_empty() {
                // A trailing dot before a suffix ("1.2.") is tolerated.
                continue;
            }
            match part.parse::<u64>() {
                Ok(value) => components.push(value),
                Err(_) => {
                    return Err(FirmwareVersionError::Unparseable(trimmed.to_string()));
                }
            }
        }
        if components.is_empty() {
            return Err(FirmwareVersionError::Unparseable(trimmed.to_string()));
        }

        Ok(Self {
            components,
            raw: trimmed.to_string(),
        })
    }

    /// The parsed numeric components.
    #[must_use]
    pub fn components(&self) -> &[u64] {
        &self.components
    }

    /// The trimmed string exactly as the device reported it.
    #[must_use]
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Compare two reported version strings, if both parse.
    #[must_use]
    pub fn try_compare(a: &str, b: &str) -> Option<Ordering> {
        let a = Self::parse(a).ok()?;
        let b = Self::parse(b).ok()?;
        Some(a.cmp(&b))
    }
}

impl PartialEq for FirmwareVersion {
    fn eq(&self, other: &Self) -> bool {
        self.components == other.components
    }
}

impl Eq for FirmwareVersion {}

impl PartialOrd for FirmwareVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FirmwareVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        // Tuple semantics: element-wise, then by length, so 1.2 < 1.2.1.
        self.components.cmp(&other.components)
    }
}

impl std::fmt::Display for FirmwareVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Whether `latest` is a strict upgrade over `installed`.
///
/// Unknown or unparseable versions on either side mean no claim is made,
/// matching how an operator panel should behave: never advertise an update
/// it cannot justify.
#[must_use]
pub fn update_available(installed: Option<&str>, latest: Option<&str>) -> bool {
    let Some(installed) = installed.and_then(|v| FirmwareVersion::parse(v).ok()) else {
        return false;
    };
    let Some(latest) = latest.and_then(|v| FirmwareVersion::parse(v).ok()) else {
        return false;
    };
    latest > installed
}
