//! Runnable task descriptors
//!
//! Each task a plugin declares becomes a [`Task`]: the user-visible name and
//! description plus everything needed to compose the subprocess argv the
//! plugin relies on. The composition is fixed:
//!
//! ```text
//! <exe> [--debug] [--project-dir <dir>] [--godel-config <path>] [--config <path>] <command> [args...]
//! ```
//!
//! where each flag uses the literal string the task declared and is emitted
//! only when declared. In verify mode no user arguments are passed; when
//! verify runs with apply=false the task's declared apply-false tokens are
//! appended instead. The subprocess inherits the caller's environment and
//! stdio.

use anyhow::{bail, Context, Result};
use godel_core::layout;
use std::path::PathBuf;
use tokio::process::Command;
use tracing::debug;

use crate::pluginapi::{GlobalFlagOptions, PluginInfo, TaskInfo, VerifyOptions};

/// The launcher state global flags are derived from
#[derive(Debug, Clone)]
pub struct GlobalParams {
    /// Absolute path of the project directory
    pub project_dir: PathBuf,

    /// Whether the launcher runs in debug mode
    pub debug: bool,
}

impl GlobalParams {
    /// Create global parameters for a project directory
    pub fn new(project_dir: impl Into<PathBuf>) -> Self {
        Self {
            project_dir: project_dir.into(),
            debug: false,
        }
    }

    /// Set debug mode
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }
}

/// A runnable task backed by a plugin executable
#[derive(Debug, Clone)]
pub struct Task {
    name: String,
    description: String,
    plugin_exe: PathBuf,
    config_file_name: String,
    command: String,
    global_flag_options: GlobalFlagOptions,
    verify_options: Option<VerifyOptions>,
}

impl Task {
    /// Bind a declared task to its plugin's installed executable
    pub fn new(info: TaskInfo, plugin: &PluginInfo, plugin_exe: PathBuf) -> Self {
        Self {
            name: info.name,
            description: info.description,
            plugin_exe,
            config_file_name: plugin.config_file_name.clone(),
            command: info.command,
            global_flag_options: info.global_flag_options,
            verify_options: info.verify_options,
        }
    }

    /// The user-visible task name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The short task description
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The argv passed to the plugin executable for a normal invocation
    pub fn args(&self, global: &GlobalParams, task_args: &[String]) -> Vec<String> {
        let mut args = self.leading_args(global);
        args.extend(task_args.iter().cloned());
        args
    }

    /// The argv passed to the plugin executable under verify mode.
    ///
    /// Verify passes no user arguments; with apply=false the declared
    /// apply-false tokens are appended.
    pub fn verify_args(&self, global: &GlobalParams, apply: bool) -> Vec<String> {
        let mut args = self.leading_args(global);
        if !apply {
            if let Some(verify_options) = &self.verify_options {
                args.extend(
                    verify_options
                        .apply_false_args
                        .split_whitespace()
                        .map(String::from),
                );
            }
        }
        args
    }

    /// Run the task with user-supplied arguments
    pub async fn run(&self, global: &GlobalParams, task_args: &[String]) -> Result<()> {
        self.spawn(self.args(global, task_args)).await
    }

    /// Run the task under verify mode
    pub async fn run_verify(&self, global: &GlobalParams, apply: bool) -> Result<()> {
        self.spawn(self.verify_args(global, apply)).await
    }

    /// Global flags followed by the task command
    fn leading_args(&self, global: &GlobalParams) -> Vec<String> {
        let mut args = Vec::new();
        let flags = &self.global_flag_options;

        if global.debug {
            if let Some(flag) = &flags.debug_flag {
                args.push(flag.clone());
            }
        }
        if let Some(flag) = &flags.project_dir_flag {
            args.push(flag.clone());
            args.push(global.project_dir.display().to_string());
        }
        if let Some(flag) = &flags.godel_config_flag {
            args.push(flag.clone());
            args.push(
                layout::godel_config_path(&global.project_dir)
                    .display()
                    .to_string(),
            );
        }
        if let Some(flag) = &flags.config_flag {
            args.push(flag.clone());
            args.push(
                layout::config_dir_path(&global.project_dir)
                    .join(&self.config_file_name)
                    .display()
                    .to_string(),
            );
        }

        if !self.command.is_empty() {
            args.push(self.command.clone());
        }
        args
    }

    /// Spawn the plugin executable, inheriting environment and stdio
    async fn spawn(&self, args: Vec<String>) -> Result<()> {
        debug!(
            "running task {}: {} {}",
            self.name,
            self.plugin_exe.display(),
            args.join(" ")
        );
        let status = Command::new(&self.plugin_exe)
            .args(&args)
            .status()
            .await
            .with_context(|| format!("failed to run {}", self.plugin_exe.display()))?;
        if !status.success() {
            bail!("task {} failed with {}", self.name, status);
        }
        Ok(())
    }
}
