//! Common test utilities for godel-plugins
//!
//! Provides shared infrastructure for resolution tests:
//! - A test environment with isolated plugins/downloads/project directories
//! - Fake plugin executables that answer the info command with canned JSON
//! - Single-file tgz archive staging under a file-based repository
//! - A call-counting fetcher for idempotence assertions

#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use flate2::write::GzEncoder;
use flate2::Compression;
use godel_core::config::GodelConfig;
use godel_core::locator::Locator;
use godel_core::osarch::OsArch;
use godel_core::ProjectParams;
use godel_plugins::{
    DefaultFetcher, Fetcher, GlobalFlagOptions, PluginInfo, PluginResolver, TaskInfo,
    VerifyOptions, INFO_COMMAND_NAME,
};
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tempfile::TempDir;

/// Isolated directories for one resolution test
pub struct TestEnv {
    root: TempDir,
}

impl TestEnv {
    pub fn new() -> Self {
        let root = TempDir::new().expect("failed to create test directory");
        std::fs::create_dir_all(root.path().join("plugins")).unwrap();
        std::fs::create_dir_all(root.path().join("downloads")).unwrap();
        std::fs::create_dir_all(root.path().join("project")).unwrap();
        Self { root }
    }

    pub fn plugins_dir(&self) -> PathBuf {
        self.root.path().join("plugins")
    }

    pub fn downloads_dir(&self) -> PathBuf {
        self.root.path().join("downloads")
    }

    pub fn project_dir(&self) -> PathBuf {
        self.root.path().join("project")
    }

    /// A resolver over this environment's directories
    pub fn resolver(&self) -> PluginResolver {
        PluginResolver::new(self.plugins_dir(), self.downloads_dir()).unwrap()
    }

    /// The file-based repository template rooted in the project directory,
    /// mirroring the layout of a remote repository
    pub fn repo_template(&self) -> String {
        format!(
            "{}/repo/{{{{GroupPath}}}}/{{{{Product}}}}/{{{{Version}}}}/{{{{Product}}}}-{{{{OS}}}}-{{{{Arch}}}}-{{{{Version}}}}.tgz",
            self.project_dir().display()
        )
    }

    /// The URL the repo template renders to for a locator
    pub fn repo_url(&self, locator: &Locator, os_arch: &OsArch) -> String {
        format!(
            "{}/repo/{}/{}/{}/{}-{}-{}.tgz",
            self.project_dir().display(),
            locator.group.replace('.', "/"),
            locator.product,
            locator.version,
            locator.product,
            os_arch,
            locator.version
        )
    }

    /// Stage a fake plugin archive in the file repository for a locator
    pub fn stage_plugin(&self, locator: &Locator, os_arch: &OsArch, info: &PluginInfo) {
        let archive_path = PathBuf::from(self.repo_url(locator, os_arch));
        std::fs::create_dir_all(archive_path.parent().unwrap()).unwrap();
        write_plugin_tgz(&archive_path, info);
    }

    /// Parse a godel.yml document into validated params
    pub fn params_from_yaml(&self, yaml: &str) -> ProjectParams {
        let cfg = GodelConfig::from_yaml(yaml).unwrap();
        ProjectParams::from_config(&cfg.plugins).unwrap()
    }
}

/// The shell script a fake plugin executes: answer the info command with the
/// canned JSON document, echo argv otherwise
pub fn plugin_script(info: &PluginInfo) -> String {
    let info_json = serde_json::to_string(info).unwrap();
    format!(
        "#!/bin/sh\nif [ \"$1\" = \"{}\" ]; then\n    echo '{}'\n    exit 0\nfi\n\necho \"$@\"\n",
        INFO_COMMAND_NAME, info_json
    )
}

/// Write a single-file tgz containing a fake plugin executable
pub fn write_plugin_tgz(archive_path: &Path, info: &PluginInfo) {
    write_tgz_with_script(
        archive_path,
        &format!("{}-{}", info.product, info.version),
        &plugin_script(info),
    );
}

/// Write a single-file tgz containing an arbitrary script
pub fn write_tgz_with_script(archive_path: &Path, entry_name: &str, script: &str) {
    let file = File::create(archive_path).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);

    let mut header = tar::Header::new_gnu();
    header.set_entry_type(tar::EntryType::Regular);
    header.set_size(script.len() as u64);
    header.set_mode(0o755);
    header.set_cksum();
    builder
        .append_data(&mut header, entry_name, script.as_bytes())
        .unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

/// The SHA-256 digest of the installed binary [`stage_plugin`] produces
pub fn staged_plugin_sha256(info: &PluginInfo) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(plugin_script(info).as_bytes());
    format!("{:x}", hasher.finalize())
}

/// An info document matching the echo plugin used throughout the tests
pub fn echo_plugin_info(product: &str, version: &str) -> PluginInfo {
    PluginInfo::new(
        "com.palantir",
        product,
        version,
        "echo.yml",
        vec![echo_task_info("echo-task")],
    )
}

/// A task wired up with the full set of global flag conventions
pub fn echo_task_info(name: &str) -> TaskInfo {
    TaskInfo::new(name, "Echoes input")
        .with_command("echo")
        .with_global_flag_options(GlobalFlagOptions {
            debug_flag: Some("--debug".to_string()),
            project_dir_flag: Some("--project-dir".to_string()),
            godel_config_flag: Some("--godel-config".to_string()),
            config_flag: Some("--config".to_string()),
        })
        .with_verify_options(VerifyOptions::new("--verify"))
}

/// A transport that counts fetches before delegating to the default one
pub struct CountingFetcher {
    inner: DefaultFetcher,
    calls: Arc<AtomicUsize>,
}

impl CountingFetcher {
    pub fn new() -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                inner: DefaultFetcher::new().unwrap(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl Fetcher for CountingFetcher {
    async fn fetch(&self, url: &str, dest: &Path) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.fetch(url, dest).await
    }
}
