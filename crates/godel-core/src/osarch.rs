//! Build-target identity
//!
//! An `OsArch` names the `(os, arch)` pair a plugin binary is built for,
//! rendered as `os-arch` (e.g. `darwin-amd64`). There is one current OsArch
//! per process, derived from the host.

use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// The `(os, arch)` pair identifying a build target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OsArch {
    pub os: String,
    pub arch: String,
}

impl OsArch {
    /// Create a new OsArch
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The OsArch of the host this process runs on
    pub fn current() -> Self {
        Self::new(current_os(), current_arch())
    }
}

/// Map the compiler's OS name onto the name plugins are published under
fn current_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

/// Map the compiler's architecture name onto the name plugins are published under
fn current_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        other => other,
    }
}

impl fmt::Display for OsArch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.os, self.arch)
    }
}

impl FromStr for OsArch {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.split('-').collect();
        if parts.len() != 2 || parts.iter().any(|p| p.is_empty()) {
            return Err(Error::invalid_os_arch(s));
        }
        Ok(Self::new(parts[0], parts[1]))
    }
}
