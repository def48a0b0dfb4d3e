//! Resolver URL templates
//!
//! A resolver is a URL template that, given a locator and an OsArch, yields
//! the URL a plugin archive can be fetched from. Templates are plain text
//! interleaved with placeholders `{{Name}}` drawn from the closed set
//! `GroupPath`, `Group`, `Product`, `Version`, `OS` and `Arch`. `GroupPath`
//! is the group with `.` replaced by `/`. There are no conditionals and no
//! escape sequence for a literal `{{`.

use crate::error::{Error, Result};
use crate::locator::Locator;
use crate::osarch::OsArch;
use std::fmt;

/// The names a template placeholder may take
const PLACEHOLDER_NAMES: &[&str] = &["GroupPath", "Group", "Product", "Version", "OS", "Arch"];

/// A templated resolver URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlTemplate {
    raw: String,
}

enum Segment<'a> {
    Literal(&'a str),
    Placeholder(&'a str),
}

impl UrlTemplate {
    /// Create a template from its raw string form
    pub fn new(raw: impl Into<String>) -> Self {
        Self { raw: raw.into() }
    }

    /// The raw template string
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Check that every placeholder is drawn from the supported set
    pub fn validate(&self) -> Result<()> {
        for segment in self.segments() {
            if let Segment::Placeholder(name) = segment {
                if !PLACEHOLDER_NAMES.contains(&name) {
                    return Err(Error::unknown_placeholder(name, &self.raw));
                }
            }
        }
        Ok(())
    }

    /// Render the template for a locator and build target.
    ///
    /// Rendering is a pure function of the template, the locator and the
    /// OsArch. An unknown placeholder is a render error.
    pub fn render(&self, locator: &Locator, os_arch: &OsArch) -> Result<String> {
        let mut rendered = String::with_capacity(self.raw.len());
        for segment in self.segments() {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Placeholder(name) => match name {
                    "GroupPath" => rendered.push_str(&locator.group.replace('.', "/")),
                    "Group" => rendered.push_str(&locator.group),
                    "Product" => rendered.push_str(&locator.product),
                    "Version" => rendered.push_str(&locator.version),
                    "OS" => rendered.push_str(&os_arch.os),
                    "Arch" => rendered.push_str(&os_arch.arch),
                    other => return Err(Error::unknown_placeholder(other, &self.raw)),
                },
            }
        }
        Ok(rendered)
    }

    /// Lex the raw template into literal and placeholder segments.
    ///
    /// An unterminated `{{` is treated as literal text.
    fn segments(&self) -> Vec<Segment<'_>> {
        let mut segments = Vec::new();
        let mut rest = self.raw.as_str();
        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(&rest[..open]));
            }
            let after_open = &rest[open + 2..];
            match after_open.find("}}") {
                Some(close) => {
                    segments.push(Segment::Placeholder(&after_open[..close]));
                    rest = &after_open[close + 2..];
                }
                None => {
                    segments.push(Segment::Literal(&rest[open..]));
                    rest = "";
                }
            }
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest));
        }
        segments
    }
}

impl fmt::Display for UrlTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}
