//! Installation layout
//!
//! Plugin binaries and downloaded archives live under the godel home
//! directory:
//!
//! ```text
//! ~/.godel/plugins/{group}-{product}-{version}
//! ~/.godel/downloads/{group}-{product}-{version}.tgz
//! ```
//!
//! Project-side configuration lives under `{projectDir}/godel/config`. Both
//! home subdirectories are created on first use and never garbage-collected:
//! the downloads directory is an archive cache, the plugins directory holds
//! the canonical installed copies.

use crate::error::{Error, Result};
use crate::locator::Locator;
use std::path::{Path, PathBuf};

/// Environment variable overriding the godel home location
pub const GODEL_HOME_ENV: &str = "GODEL_HOME";

/// Name of the godel home directory under the user's home
const GODEL_HOME_DIR_NAME: &str = ".godel";

/// File name of the top-level project configuration
pub const GODEL_CONFIG_YML: &str = "godel.yml";

/// The godel home directory holding installed plugins and cached downloads
#[derive(Debug, Clone)]
pub struct GodelHome {
    root: PathBuf,
}

impl GodelHome {
    /// Resolve the godel home for this process.
    ///
    /// Honors the GODEL_HOME environment variable, otherwise uses `.godel`
    /// under the user's home directory. Prefers the HOME environment variable
    /// over the platform lookup so shell scripts and this process agree on
    /// the location.
    pub fn resolve() -> Result<Self> {
        if let Ok(root) = std::env::var(GODEL_HOME_ENV) {
            return Ok(Self::at(root));
        }
        let home = match std::env::var("HOME") {
            Ok(home) => PathBuf::from(home),
            Err(_) => dirs::home_dir().ok_or(Error::NoHomeDir)?,
        };
        Ok(Self::at(home.join(GODEL_HOME_DIR_NAME)))
    }

    /// Use an explicit directory as the godel home
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The root of the godel home
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The plugins directory, created on first use
    pub fn plugins_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join("plugins");
        create_dir_0755(&dir)?;
        Ok(dir)
    }

    /// The downloads directory, created on first use
    pub fn downloads_dir(&self) -> Result<PathBuf> {
        let dir = self.root.join("downloads");
        create_dir_0755(&dir)?;
        Ok(dir)
    }
}

fn create_dir_0755(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o755))?;
    }
    Ok(())
}

/// On-disk name of an installed plugin binary: `{group}-{product}-{version}`
pub fn plugin_file_name(locator: &Locator) -> String {
    format!(
        "{}-{}-{}",
        locator.group, locator.product, locator.version
    )
}

/// On-disk name of a plugin archive: `{group}-{product}-{version}.tgz`
pub fn archive_file_name(locator: &Locator) -> String {
    format!("{}.tgz", plugin_file_name(locator))
}

/// Full install path of a plugin binary under the plugins directory
pub fn plugin_path(plugins_dir: &Path, locator: &Locator) -> PathBuf {
    plugins_dir.join(plugin_file_name(locator))
}

/// Full cache path of a plugin archive under the downloads directory
pub fn archive_path(downloads_dir: &Path, locator: &Locator) -> PathBuf {
    downloads_dir.join(archive_file_name(locator))
}

/// The project's godel configuration directory: `{projectDir}/godel/config`
pub fn config_dir_path(project_dir: &Path) -> PathBuf {
    project_dir.join("godel").join("config")
}

/// Path of the top-level godel.yml within a project
pub fn godel_config_path(project_dir: &Path) -> PathBuf {
    config_dir_path(project_dir).join(GODEL_CONFIG_YML)
}
