//! Plugin resolution and loading for the godel build orchestrator
//!
//! This crate handles:
//! - Resolving declared plugins into installed binaries (fetch, unpack)
//! - Integrity verification against configured SHA-256 checksums
//! - The plugin info protocol (interrogating plugins for their tasks)
//! - Cross-plugin compatibility checks
//! - Binding declared tasks to runnable descriptors with the launcher's
//!   argv conventions

pub mod archive;
pub mod checksum;
pub mod compatibility;
pub mod fetcher;
pub mod pluginapi;
pub mod resolver;
pub mod task;

pub use compatibility::verify_plugin_compatibility;
pub use fetcher::{DefaultFetcher, Fetcher};
pub use pluginapi::{
    GlobalFlagOptions, PluginInfo, TaskInfo, VerifyOptions, INFO_COMMAND_NAME,
};
pub use resolver::PluginResolver;
pub use task::{GlobalParams, Task};

use anyhow::Result;
use godel_core::config::{PluginsConfig, ProjectParams};
use godel_core::layout::GodelHome;
use std::io::Write;

/// Indentation unit used by multi-line error reports
pub(crate) const INDENT: &str = "    ";

/// Load all tasks defined by the plugins in the given configuration.
///
/// Resolves every declared plugin for the host OS/arch into the godel home
/// plugins and downloads directories, verifies that the resolved plugins are
/// compatible with each other, and returns a runnable task for everything the
/// plugins expose. Progress lines for fetches are written to `stdout`.
///
/// The returned tasks are sorted by plugin locator; within a plugin they keep
/// the order the plugin declared them in.
pub async fn load_plugins_tasks(
    cfg: &PluginsConfig,
    stdout: &mut (dyn Write + Send),
) -> Result<Vec<Task>> {
    let params = ProjectParams::from_config(cfg)?;
    let home = GodelHome::resolve()?;
    let resolver = PluginResolver::new(home.plugins_dir()?, home.downloads_dir()?)?;
    load_tasks(&resolver, &params, stdout).await
}

/// [`load_plugins_tasks`] over an explicit resolver and validated params.
///
/// This is the seam used by tests and by launchers that manage their own
/// directories or transport.
pub async fn load_tasks(
    resolver: &PluginResolver,
    params: &ProjectParams,
    stdout: &mut (dyn Write + Send),
) -> Result<Vec<Task>> {
    let plugins = resolver.resolve(params, stdout).await?;
    verify_plugin_compatibility(&plugins)?;

    let mut tasks = Vec::new();
    for (locator, info) in &plugins {
        let plugin_exe = resolver.plugin_path(locator);
        for task_info in &info.tasks {
            tasks.push(Task::new(task_info.clone(), info, plugin_exe.clone()));
        }
    }
    Ok(tasks)
}
