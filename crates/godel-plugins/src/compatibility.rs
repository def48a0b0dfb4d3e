//! Cross-plugin compatibility checks
//!
//! A resolved plugin set is loadable only when no two plugins are different
//! versions of the same plugin and no two plugins provide a task with the
//! same name. Conflicts are reported from both sides so each plugin's entry
//! names every plugin it clashes with; the rendered error is deterministic,
//! with outer entries, inner entries and conflicting task names all in sorted
//! order.

use anyhow::{bail, Result};
use godel_core::locator::Locator;
use std::collections::{BTreeMap, BTreeSet};

use crate::pluginapi::PluginInfo;
use crate::INDENT;

/// Verify that the resolved plugins are compatible with one another
pub fn verify_plugin_compatibility(plugins: &BTreeMap<Locator, PluginInfo>) -> Result<()> {
    let mut conflicts: BTreeMap<&Locator, BTreeMap<&Locator, String>> = BTreeMap::new();
    for (locator, info) in plugins {
        let plugin_conflicts = single_plugin_conflicts(locator, info, plugins);
        if !plugin_conflicts.is_empty() {
            conflicts.insert(locator, plugin_conflicts);
        }
    }

    if conflicts.is_empty() {
        return Ok(());
    }

    let mut message = format!("{} plugins had compatibility issues:", conflicts.len());
    for (locator, plugin_conflicts) in &conflicts {
        message.push_str(&format!("\n{}{}:", INDENT, locator));
        for (other, description) in plugin_conflicts {
            message.push_str(&format!("\n{}{}: {}", INDENT.repeat(2), other, description));
        }
    }
    bail!(message)
}

/// The conflicts one plugin has with every other plugin in the set
fn single_plugin_conflicts<'a>(
    locator: &Locator,
    info: &PluginInfo,
    plugins: &'a BTreeMap<Locator, PluginInfo>,
) -> BTreeMap<&'a Locator, String> {
    let mut conflicts = BTreeMap::new();
    for (other, other_info) in plugins {
        if other == locator {
            continue;
        }

        if locator.same_plugin(other) {
            conflicts.insert(other, "different version of the same plugin".to_string());
            continue;
        }

        let other_tasks: BTreeSet<&str> =
            other_info.tasks.iter().map(|t| t.name.as_str()).collect();
        let common: BTreeSet<&str> = info
            .tasks
            .iter()
            .map(|t| t.name.as_str())
            .filter(|name| other_tasks.contains(name))
            .collect();
        if !common.is_empty() {
            let names: Vec<&str> = common.into_iter().collect();
            conflicts.insert(
                other,
                format!("provides conflicting tasks: [{}]", names.join(" ")),
            );
        }
    }
    conflicts
}
