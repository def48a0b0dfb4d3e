//! Plugin resolution
//!
//! The resolver materializes every plugin declared in the project
//! configuration into the plugins directory:
//!
//! - If the installed binary already exists, fetch and unpack are skipped,
//!   which makes re-runs idempotent and offline-friendly.
//! - Otherwise the archive is fetched into the downloads directory, trying
//!   the plugin's custom resolver (when configured) before the default
//!   resolvers in order. The first successful fetch wins.
//! - The archive is unpacked to the install path, the configured checksum for
//!   the current OS/arch (if any) is verified, and the plugin is interrogated
//!   for its info document.
//!
//! Plugins are processed sequentially in declaration order. Failures are
//! accumulated rather than short-circuiting so the user sees every broken
//! plugin in one report; the summary lists the per-plugin errors in locator
//! order.

use anyhow::{anyhow, bail, Context, Result};
use godel_core::config::{PluginParam, ProjectParams};
use godel_core::layout;
use godel_core::locator::Locator;
use godel_core::osarch::OsArch;
use godel_core::template::UrlTemplate;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::fetcher::{DefaultFetcher, Fetcher};
use crate::pluginapi::{self, PluginInfo};
use crate::{archive, checksum, INDENT};

/// Resolves declared plugins into installed, verified, interrogated binaries
pub struct PluginResolver {
    plugins_dir: PathBuf,
    downloads_dir: PathBuf,
    os_arch: OsArch,
    fetcher: Box<dyn Fetcher>,
}

impl PluginResolver {
    /// Create a resolver over the given plugins and downloads directories,
    /// using the host OS/arch and the default transport
    pub fn new(plugins_dir: impl Into<PathBuf>, downloads_dir: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            plugins_dir: plugins_dir.into(),
            downloads_dir: downloads_dir.into(),
            os_arch: OsArch::current(),
            fetcher: Box::new(DefaultFetcher::new()?),
        })
    }

    /// Resolve for a build target other than the host
    pub fn with_os_arch(mut self, os_arch: OsArch) -> Self {
        self.os_arch = os_arch;
        self
    }

    /// Replace the archive transport
    pub fn with_fetcher(mut self, fetcher: Box<dyn Fetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    /// The build target this resolver resolves for
    pub fn os_arch(&self) -> &OsArch {
        &self.os_arch
    }

    /// Install path of a plugin binary under this resolver's plugins directory
    pub fn plugin_path(&self, locator: &Locator) -> PathBuf {
        layout::plugin_path(&self.plugins_dir, locator)
    }

    /// Resolve all plugins in the params.
    ///
    /// Plugins are attempted in declaration order; progress lines are written
    /// to `stdout` before each fetch. If any plugin fails, the returned error
    /// summarizes every failure, indented four spaces, in locator order.
    pub async fn resolve(
        &self,
        params: &ProjectParams,
        stdout: &mut (dyn Write + Send),
    ) -> Result<BTreeMap<Locator, PluginInfo>> {
        let mut plugins: BTreeMap<Locator, PluginInfo> = BTreeMap::new();
        let mut errors: BTreeMap<Locator, anyhow::Error> = BTreeMap::new();

        for plugin in &params.plugins {
            let locator = plugin.locator().clone();
            match self
                .resolve_single(plugin, &params.default_resolvers, stdout)
                .await
            {
                Ok(info) => {
                    plugins.insert(locator, info);
                }
                Err(err) => {
                    errors.insert(locator, err);
                }
            }
        }

        if errors.is_empty() {
            return Ok(plugins);
        }

        let noun = if errors.len() == 1 { "plugin" } else { "plugins" };
        let mut parts = vec![format!("failed to resolve {} {}:", errors.len(), noun)];
        parts.extend(errors.values().map(|err| format!("{:#}", err)));
        bail!(parts.join(&format!("\n{}", INDENT)))
    }

    /// Resolve one plugin: install (unless present), verify, interrogate
    async fn resolve_single(
        &self,
        plugin: &PluginParam,
        default_resolvers: &[UrlTemplate],
        stdout: &mut (dyn Write + Send),
    ) -> Result<PluginInfo> {
        let locator = plugin.locator();
        let install_path = self.plugin_path(locator);

        if install_path.exists() {
            debug!(
                "plugin {} already installed at {}",
                locator,
                install_path.display()
            );
        } else {
            let archive_path = layout::archive_path(&self.downloads_dir, locator);
            self.resolve_archive(plugin, default_resolvers, &archive_path, stdout)
                .await?;
            archive::unpack_single_file_tgz(&archive_path, &install_path)
                .context("failed to extract plugin from archive into destination")?;
        }

        if let Some(want) = plugin.locator_with_checksums.checksums.get(&self.os_arch) {
            checksum::verify_checksum(&install_path, want)?;
        }

        pluginapi::info_from_plugin(&install_path)
            .await
            .with_context(|| format!("failed to get plugin info for plugin {}", locator))
    }

    /// Fetch the plugin archive, trying the custom resolver (when configured)
    /// before each default resolver in order. First success wins.
    async fn resolve_archive(
        &self,
        plugin: &PluginParam,
        default_resolvers: &[UrlTemplate],
        archive_path: &Path,
        stdout: &mut (dyn Write + Send),
    ) -> Result<()> {
        let locator = plugin.locator();
        let candidates: Vec<&UrlTemplate> =
            plugin.resolver.iter().chain(default_resolvers).collect();
        if candidates.is_empty() {
            bail!("no resolvers configured for plugin {}", locator);
        }

        let mut attempts: Vec<String> = Vec::new();
        for template in candidates {
            let url = match template.render(locator, &self.os_arch) {
                Ok(url) => url,
                Err(err) => {
                    debug!("skipping resolver {}: {}", template, err);
                    attempts.push(err.to_string());
                    continue;
                }
            };

            let _ = writeln!(stdout, "Getting package from {}...", url);
            match self.fetcher.fetch(&url, archive_path).await {
                Ok(()) => return Ok(()),
                Err(err) => {
                    debug!("failed to fetch {}: {:#}", url, err);
                    attempts.push(format!("{:#}", err));
                }
            }
        }

        let mut message = format!(
            "no resolver could retrieve {}",
            layout::archive_file_name(locator)
        );
        for attempt in &attempts {
            message.push_str("\n");
            message.push_str(&INDENT.repeat(2));
            message.push_str(attempt);
        }
        Err(anyhow!(message))
    }
}
