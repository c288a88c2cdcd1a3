//! Plugin discovery
//!
//! Lists the immediate subdirectories of a tier root and keeps the ones that
//! are neither hidden nor disabled. Entries are returned in directory
//! listing order; the order within a tier is load order, so nothing here
//! sorts.

use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use tracing::{debug, info};

use crate::error::{ManifestError, Result};

use super::types::{PluginDir, Tier};

/// Leading character that marks a plugin directory as hidden.
pub const HIDDEN_MARKER: char = '.';

/// Why a plugin directory was left out of the build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exclusion {
    Hidden,
    Disabled,
}

/// Decide whether a plugin directory name is excluded.
///
/// Only the leading character is checked for the hidden marker.
pub fn exclusion(name: &str, disabled: &HashSet<String>) -> Option<Exclusion> {
    if name.starts_with(HIDDEN_MARKER) {
        Some(Exclusion::Hidden)
    } else if disabled.contains(name) {
        Some(Exclusion::Disabled)
    } else {
        None
    }
}

/// Discover the eligible plugin directories under one tier root.
///
/// A tier root that does not exist yields no plugins. A root that exists but
/// cannot be listed is a [`ManifestError::Discovery`] error.
pub fn discover_tier(
    tier: Tier,
    root: &Path,
    disabled: &HashSet<String>,
) -> Result<Vec<PluginDir>> {
    let entries = match fs::read_dir(root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            info!(%tier, root = %root.display(), "Tier root does not exist, skipping");
            return Ok(Vec::new());
        }
        Err(source) => {
            return Err(ManifestError::Discovery {
                root: root.to_path_buf(),
                source,
            })
        }
    };

    let mut plugins = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| ManifestError::Discovery {
            root: root.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if !path.is_dir() {
            continue;
        }

        let name = entry
            .file_name()
            .into_string()
            .map_err(|_| ManifestError::NonUtf8Path { path: path.clone() })?;
        if let Some(reason) = exclusion(&name, disabled) {
            debug!(%tier, plugin = %name, ?reason, "Skipping plugin");
            continue;
        }

        debug!(%tier, plugin = %name, "Discovered plugin");
        plugins.push(PluginDir { tier, name, path });
    }

    Ok(plugins)
}
