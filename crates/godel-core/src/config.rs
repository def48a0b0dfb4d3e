//! Configuration file parsing
//!
//! The plugin configuration lives under the `plugins` key of the project's
//! godel.yml:
//!
//! ```yaml
//! plugins:
//!   resolvers:
//!     - "https://repo.example.com/{{GroupPath}}/{{Product}}/{{Version}}/{{Product}}-{{OS}}-{{Arch}}-{{Version}}.tgz"
//!   plugins:
//!     - locator:
//!         id: "com.palantir:echoer:1.0.0"
//!       resolver: "https://mirror.example.com/{{Product}}-{{Version}}.tgz"
//!       checksums:
//!         darwin-amd64: "0123..."
//! ```
//!
//! The serde models mirror the file verbatim; [`ProjectParams`] is the
//! validated form the resolver consumes. Malformed locator ids, duplicate
//! plugin entries, unparseable checksum keys and unknown template
//! placeholders are all configuration errors raised before any resolution is
//! attempted.

use crate::error::{Error, Result};
use crate::locator::{Locator, LocatorWithChecksums};
use crate::osarch::OsArch;
use crate::template::UrlTemplate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// The godel.yml document, reduced to the parts the plugin loader consumes
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GodelConfig {
    /// The `plugins` block
    #[serde(default)]
    pub plugins: PluginsConfig,
}

/// The `plugins` block of godel.yml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PluginsConfig {
    /// Default resolver URL templates, tried in order
    #[serde(default)]
    pub resolvers: Vec<String>,

    /// Declared plugins, in declaration order
    #[serde(default)]
    pub plugins: Vec<SinglePluginConfig>,
}

/// One plugin entry of the `plugins` block
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SinglePluginConfig {
    /// The plugin's coordinates
    pub locator: LocatorConfig,

    /// Optional resolver override, tried before the default resolvers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<String>,

    /// Expected SHA-256 digests keyed by `os-arch`
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub checksums: BTreeMap<String, String>,
}

/// The locator shorthand `group:product:version`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocatorConfig {
    pub id: String,
}

impl GodelConfig {
    /// Parse a godel.yml document. An empty document is an empty config.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml_ng::from_str(content)?)
    }

    /// Read and parse a godel.yml file
    pub fn read(path: &Path) -> Result<Self> {
        Self::from_yaml(&std::fs::read_to_string(path)?)
    }
}

/// A declared plugin in validated form
#[derive(Debug, Clone)]
pub struct PluginParam {
    /// Coordinates plus per-platform checksums
    pub locator_with_checksums: LocatorWithChecksums,

    /// Resolver override, tried before the default resolvers
    pub resolver: Option<UrlTemplate>,
}

impl PluginParam {
    /// The plugin's coordinates
    pub fn locator(&self) -> &Locator {
        &self.locator_with_checksums.locator
    }
}

/// The validated aggregate configuration the resolver consumes
#[derive(Debug, Clone, Default)]
pub struct ProjectParams {
    /// Default resolver URL templates, in configuration order
    pub default_resolvers: Vec<UrlTemplate>,

    /// Declared plugins, in declaration order
    pub plugins: Vec<PluginParam>,
}

impl ProjectParams {
    /// Validate a parsed `plugins` block.
    ///
    /// Locator ids must parse, checksum keys must be well-formed `os-arch`
    /// pairs, templates must draw placeholders from the supported set, and no
    /// locator may appear twice.
    pub fn from_config(cfg: &PluginsConfig) -> Result<Self> {
        let mut default_resolvers = Vec::with_capacity(cfg.resolvers.len());
        for raw in &cfg.resolvers {
            let template = UrlTemplate::new(raw);
            template.validate()?;
            default_resolvers.push(template);
        }

        let mut seen: BTreeSet<String> = BTreeSet::new();
        let mut plugins = Vec::with_capacity(cfg.plugins.len());
        for plugin_cfg in &cfg.plugins {
            let locator: Locator = plugin_cfg.locator.id.parse()?;
            if !seen.insert(locator.to_string()) {
                return Err(Error::duplicate_plugin(locator.to_string()));
            }

            let mut checksums = BTreeMap::new();
            for (key, digest) in &plugin_cfg.checksums {
                let os_arch: OsArch = key.parse()?;
                checksums.insert(os_arch, digest.clone());
            }

            let resolver = match &plugin_cfg.resolver {
                Some(raw) => {
                    let template = UrlTemplate::new(raw);
                    template.validate()?;
                    Some(template)
                }
                None => None,
            };

            plugins.push(PluginParam {
                locator_with_checksums: LocatorWithChecksums { locator, checksums },
                resolver,
            });
        }

        Ok(Self {
            default_resolvers,
            plugins,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
plugins:
  resolvers:
    - "https://repo.example.com/{{GroupPath}}/{{Product}}/{{Version}}/{{Product}}-{{OS}}-{{Arch}}-{{Version}}.tgz"
  plugins:
    - locator:
        id: "com.palantir:echoer:1.0.0"
      resolver: "https://mirror.example.com/{{Product}}-{{Version}}.tgz"
      checksums:
        darwin-amd64: "77af34..."
        linux-amd64: "9ab123..."
    - locator:
        id: "com.palantir:linter:2.0.0"
"#;

    #[test]
    fn test_parse_sample_config() {
        let cfg = GodelConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(cfg.plugins.resolvers.len(), 1);
        assert_eq!(cfg.plugins.plugins.len(), 2);

        let params = ProjectParams::from_config(&cfg.plugins).unwrap();
        assert_eq!(params.default_resolvers.len(), 1);
        assert_eq!(params.plugins.len(), 2);

        let first = &params.plugins[0];
        assert_eq!(first.locator().to_string(), "com.palantir:echoer:1.0.0");
        assert!(first.resolver.is_some());
        assert_eq!(first.locator_with_checksums.checksums.len(), 2);
        assert_eq!(
            first
                .locator_with_checksums
                .checksums
                .get(&OsArch::new("darwin", "amd64"))
                .map(String::as_str),
            Some("77af34...")
        );

        let second = &params.plugins[1];
        assert!(second.resolver.is_none());
        assert!(second.locator_with_checksums.checksums.is_empty());
    }

    #[test]
    fn test_empty_document() {
        let cfg = GodelConfig::from_yaml("").unwrap();
        let params = ProjectParams::from_config(&cfg.plugins).unwrap();
        assert!(params.default_resolvers.is_empty());
        assert!(params.plugins.is_empty());
    }

    #[test]
    fn test_malformed_locator_id() {
        let cfg = GodelConfig::from_yaml(
            "plugins:\n  plugins:\n    - locator:\n        id: \"not-a-locator\"\n",
        )
        .unwrap();
        let err = ProjectParams::from_config(&cfg.plugins).unwrap_err();
        assert!(matches!(err, Error::InvalidLocator { .. }));
    }

    #[test]
    fn test_duplicate_plugin_entry() {
        let cfg = GodelConfig::from_yaml(
            r#"
plugins:
  plugins:
    - locator:
        id: "com.palantir:echoer:1.0.0"
    - locator:
        id: "com.palantir:echoer:1.0.0"
"#,
        )
        .unwrap();
        let err = ProjectParams::from_config(&cfg.plugins).unwrap_err();
        assert!(matches!(err, Error::DuplicatePlugin { .. }));
        assert!(err.to_string().contains("com.palantir:echoer:1.0.0"));
    }

    #[test]
    fn test_bad_checksum_key() {
        let cfg = GodelConfig::from_yaml(
            r#"
plugins:
  plugins:
    - locator:
        id: "com.palantir:echoer:1.0.0"
      checksums:
        notanosarch: "77af34"
"#,
        )
        .unwrap();
        let err = ProjectParams::from_config(&cfg.plugins).unwrap_err();
        assert!(matches!(err, Error::InvalidOsArch { .. }));
    }

    #[test]
    fn test_unknown_resolver_placeholder() {
        let cfg = GodelConfig::from_yaml(
            "plugins:\n  resolvers:\n    - \"https://example.com/{{Bogus}}\"\n",
        )
        .unwrap();
        let err = ProjectParams::from_config(&cfg.plugins).unwrap_err();
        assert!(matches!(err, Error::UnknownPlaceholder { .. }));
    }
}
