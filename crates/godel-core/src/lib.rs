//! # godel-core
//!
//! Core library for the godel build orchestrator providing:
//! - Plugin coordinates (locators) and build-target identity (OS/arch)
//! - Installation layout under the godel home directory
//! - Configuration file parsing (the `plugins` block of godel.yml)
//! - Resolver URL template rendering

pub mod config;
pub mod error;
pub mod layout;
pub mod locator;
pub mod osarch;
pub mod template;

pub use config::{GodelConfig, PluginsConfig, ProjectParams};
pub use error::{Error, Result};
pub use layout::GodelHome;
pub use locator::{Locator, LocatorWithChecksums};
pub use osarch::OsArch;
pub use template::UrlTemplate;
