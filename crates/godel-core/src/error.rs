//! Error types for godel-core

use thiserror::Error;

/// Result type alias using godel-core's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for godel
#[derive(Error, Debug)]
pub enum Error {
    /// Malformed locator id
    #[error("invalid locator id \"{id}\": must take the form group:product:version")]
    InvalidLocator { id: String },

    /// Malformed OS/arch key
    #[error("invalid OS/arch \"{value}\": must take the form os-arch")]
    InvalidOsArch { value: String },

    /// The same locator appears more than once in the configuration
    #[error("plugin {locator} declared more than once")]
    DuplicatePlugin { locator: String },

    /// A URL template references a placeholder outside the supported set
    #[error("unknown placeholder {{{{{name}}}}} in template \"{template}\"")]
    UnknownPlaceholder { name: String, template: String },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    YamlParse(#[from] serde_yaml_ng::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Home directory could not be determined
    #[error("could not determine home directory")]
    NoHomeDir,
}

impl Error {
    /// Create an invalid locator error
    pub fn invalid_locator(id: impl Into<String>) -> Self {
        Self::InvalidLocator { id: id.into() }
    }

    /// Create an invalid OS/arch error
    pub fn invalid_os_arch(value: impl Into<String>) -> Self {
        Self::InvalidOsArch {
            value: value.into(),
        }
    }

    /// Create a duplicate plugin error
    pub fn duplicate_plugin(locator: impl Into<String>) -> Self {
        Self::DuplicatePlugin {
            locator: locator.into(),
        }
    }

    /// Create an unknown placeholder error
    pub fn unknown_placeholder(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self::UnknownPlaceholder {
            name: name.into(),
            template: template.into(),
        }
    }
}
