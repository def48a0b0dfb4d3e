//! Plugin coordinates
//!
//! A locator is the `(group, product, version)` triple identifying a plugin
//! release, rendered as `group:product:version`. Group and product together
//! form the identity of the plugin; version disambiguates releases. Locators
//! order by their rendered string form, which is the tie-breaker for every
//! user-visible enumeration.

use crate::error::{Error, Result};
use crate::osarch::OsArch;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The `(group, product, version)` identity of a plugin
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    pub group: String,
    pub product: String,
    pub version: String,
}

impl Locator {
    /// Create a new locator
    pub fn new(
        group: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            product: product.into(),
            version: version.into(),
        }
    }

    /// True if the other locator names the same plugin, regardless of version
    pub fn same_plugin(&self, other: &Locator) -> bool {
        self.group == other.group && self.product == other.product
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.product, self.version)
    }
}

impl FromStr for Locator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split(':').collect();
        if parts.len() != 3 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::invalid_locator(s));
        }
        Ok(Self::new(parts[0], parts[1], parts[2]))
    }
}

impl Ord for Locator {
    fn cmp(&self, other: &Self) -> Ordering {
        self.to_string().cmp(&other.to_string())
    }
}

impl PartialOrd for Locator {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// A locator plus the expected plugin checksums per build target.
///
/// A missing entry for an OsArch means no check is required on that platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorWithChecksums {
    pub locator: Locator,
    pub checksums: BTreeMap<OsArch, String>,
}

impl LocatorWithChecksums {
    /// A locator with no checksums configured
    pub fn new(locator: Locator) -> Self {
        Self {
            locator,
            checksums: BTreeMap::new(),
        }
    }
}
