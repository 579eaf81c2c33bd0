use std::cmp::Ordering;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

const MAX_COMPONENTS: usize = 4;
const COMPONENT_BASE: u64 = 1000;

/// A dotted numeric release version as published by the vendor.
///
/// Ordering weighs up to four numeric components by position, so
/// `"1.2"` and `"1.2.0"` compare equal. The release date only breaks ties
/// and is never filled in by the version check.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VersionInfo {
    pub version: String,
    #[serde(default)]
    pub release_date: Option<NaiveDate>,
}

impl VersionInfo {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            release_date: None,
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.version
    }

    /// Positional weight of the version: each component occupies three
    /// decimal digits, the first component being the most significant.
    #[must_use]
    pub fn weight(&self) -> u64 {
        version_weight(&self.version)
    }
}

#[must_use]
pub fn version_weight(version: &str) -> u64 {
    let mut components = version
        .trim()
        .trim_start_matches(['v', 'V'])
        .split('.')
        .map(leading_number);

    (0..MAX_COMPONENTS).fold(0, |weight, _| {
        let component = components.next().unwrap_or(0).min(COMPONENT_BASE - 1);
        weight * COMPONENT_BASE + component
    })
}

fn leading_number(component: &str) -> u64 {
    let digits_end = component
        .find(|ch: char| !ch.is_ascii_digit())
        .unwrap_or(component.len());
    component[..digits_end].parse().unwrap_or(0)
}

impl Ord for VersionInfo {
    fn cmp(&self, other: &Self) -> Ordering {
        self.weight()
            .cmp(&other.weight())
            .then_with(|| compare_release_dates(self.release_date, other.release_date))
    }
}

fn compare_release_dates(left: Option<NaiveDate>, right: Option<NaiveDate>) -> Ordering {
    match (left, right) {
        (Some(left), Some(right)) => left.cmp(&right),
        _ => Ordering::Equal,
    }
}

impl PartialOrd for VersionInfo {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for VersionInfo {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for VersionInfo {}

impl fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.version)
    }
}
