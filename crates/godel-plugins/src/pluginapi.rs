//! Plugin information protocol
//!
//! Plugins are opaque executables. Invoked with the reserved info command as
//! their only argument, they print a JSON document describing themselves to
//! stdout and exit 0; any other argv executes a task. The document carries
//! the plugin's identity, the name of its config file under the project's
//! godel config directory, and the tasks it exposes together with the flag
//! conventions the launcher must honor when dispatching them.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// The reserved argv[1] value that asks a plugin for its info document
pub const INFO_COMMAND_NAME: &str = "_godelTaskInfo";

/// Schema version of the info document emitted by current plugins
pub const CURRENT_SCHEMA_VERSION: &str = "1";

/// The self-description emitted by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginInfo {
    #[serde(default)]
    pub plugin_schema_version: String,

    pub group: String,
    pub product: String,
    pub version: String,

    /// Name of the plugin's configuration file under `{projectDir}/godel/config`
    #[serde(default)]
    pub config_file_name: String,

    pub tasks: Vec<TaskInfo>,
}

impl PluginInfo {
    /// Create an info document with the current schema version
    pub fn new(
        group: impl Into<String>,
        product: impl Into<String>,
        version: impl Into<String>,
        config_file_name: impl Into<String>,
        tasks: Vec<TaskInfo>,
    ) -> Self {
        Self {
            plugin_schema_version: CURRENT_SCHEMA_VERSION.to_string(),
            group: group.into(),
            product: product.into(),
            version: version.into(),
            config_file_name: config_file_name.into(),
            tasks,
        }
    }
}

/// One task exposed by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInfo {
    /// User-visible task name, unique within the plugin
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// The argv the launcher passes after the global flags to invoke this task
    #[serde(default)]
    pub command: String,

    /// Global flag conventions this task recognizes
    #[serde(default)]
    pub global_flag_options: GlobalFlagOptions,

    /// Flag rewriting applied when the task runs under verify mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verify_options: Option<VerifyOptions>,
}

impl TaskInfo {
    /// Create a task description
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            command: String::new(),
            global_flag_options: GlobalFlagOptions::default(),
            verify_options: None,
        }
    }

    /// Set the task command
    pub fn with_command(mut self, command: impl Into<String>) -> Self {
        self.command = command.into();
        self
    }

    /// Set the recognized global flag conventions
    pub fn with_global_flag_options(mut self, options: GlobalFlagOptions) -> Self {
        self.global_flag_options = options;
        self
    }

    /// Set the verify-mode options
    pub fn with_verify_options(mut self, options: VerifyOptions) -> Self {
        self.verify_options = Some(options);
        self
    }
}

/// The literal flag strings a task expects for the launcher's global state.
///
/// A missing entry means the task does not take that flag.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GlobalFlagOptions {
    /// Lone flag passed when the launcher runs in debug mode
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub debug_flag: Option<String>,

    /// Flag whose value is the project directory
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_dir_flag: Option<String>,

    /// Flag whose value is the path to the project's godel.yml
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub godel_config_flag: Option<String>,

    /// Flag whose value is the path to the plugin's own config file
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_flag: Option<String>,
}

/// Verify-mode flag rewriting declared by a task
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOptions {
    /// Whitespace-separated tokens appended when verify runs with apply=false
    #[serde(default)]
    pub apply_false_args: String,
}

impl VerifyOptions {
    /// Create verify options from the apply=false token string
    pub fn new(apply_false_args: impl Into<String>) -> Self {
        Self {
            apply_false_args: apply_false_args.into(),
        }
    }
}

/// Ask a plugin executable for its info document.
///
/// Runs `<exe> _godelTaskInfo`, requires a zero exit status and parses the
/// JSON printed to stdout. Stderr is folded into the error on failure.
pub async fn info_from_plugin(plugin_exe: &Path) -> Result<PluginInfo> {
    debug!("querying plugin info from {}", plugin_exe.display());
    let output = Command::new(plugin_exe)
        .arg(INFO_COMMAND_NAME)
        .output()
        .await
        .with_context(|| format!("failed to run {}", plugin_exe.display()))?;

    if !output.status.success() {
        bail!(
            "{} {} exited with {}: {}",
            plugin_exe.display(),
            INFO_COMMAND_NAME,
            output.status,
            String::from_utf8_lossy(&output.stderr).trim()
        );
    }

    serde_json::from_slice(&output.stdout).with_context(|| {
        format!(
            "failed to parse plugin info output of {}",
            plugin_exe.display()
        )
    })
}
