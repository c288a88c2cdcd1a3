//! Artifact resolution
//!
//! Computes which entry points a plugin provides and their import paths.
//! Existence checks go through [`ArtifactProbe`], so resolution is a pure
//! function of the plugin path, the application root and the probe's answers.

use std::path::{Component, Path, PathBuf};

use crate::error::{ManifestError, Result};

use super::types::{ImportPath, PluginArtifacts};

/// Answers whether a file exists. [`FsProbe`] asks the real filesystem.
pub trait ArtifactProbe {
    fn exists(&self, path: &Path) -> bool;
}

/// Probe backed by the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FsProbe;

impl ArtifactProbe for FsProbe {
    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// Fixed sub-paths of the four conditional artifacts beneath a plugin directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    pub client_entry: PathBuf,
    pub server_entry: PathBuf,
    pub register_file: PathBuf,
    pub dependency_manifest: PathBuf,
}

impl ArtifactLayout {
    /// Layout for source files with the given extension, e.g. `js`.
    pub fn new(extension: &str, dependency_manifest: &str) -> Self {
        let index = format!("index.{}", extension);
        Self {
            client_entry: Path::new("client").join(&index),
            server_entry: Path::new("server").join(&index),
            register_file: PathBuf::from(format!("register.{}", extension)),
            dependency_manifest: PathBuf::from(dependency_manifest),
        }
    }
}

impl Default for ArtifactLayout {
    fn default() -> Self {
        Self::new("js", "package.json")
    }
}

/// Resolve the artifacts of one plugin directory.
///
/// Entry points resolve to their containing directory; the registration file
/// resolves to its exact path.
pub fn resolve_artifacts(
    plugin_path: &Path,
    app_root: &Path,
    layout: &ArtifactLayout,
    probe: &dyn ArtifactProbe,
) -> Result<PluginArtifacts> {
    let mut artifacts = PluginArtifacts::default();

    let client = plugin_path.join(&layout.client_entry);
    if probe.exists(&client) {
        artifacts.client = Some(module_dir_import_path(&client, app_root)?);
    }

    let server = plugin_path.join(&layout.server_entry);
    if probe.exists(&server) {
        artifacts.server = Some(module_dir_import_path(&server, app_root)?);
    }

    let register = plugin_path.join(&layout.register_file);
    if probe.exists(&register) {
        artifacts.register = Some(import_path(&register, app_root)?);
    }

    artifacts.has_dependencies = probe.exists(&plugin_path.join(&layout.dependency_manifest));

    Ok(artifacts)
}

/// Import path of a file relative to the application root.
pub fn import_path(file: &Path, app_root: &Path) -> Result<ImportPath> {
    let relative = file.strip_prefix(app_root).map_err(|_| {
        ManifestError::Config(format!(
            "{} is outside the application root {}",
            file.display(),
            app_root.display()
        ))
    })?;

    let parts = relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_str().ok_or_else(|| {
                ManifestError::NonUtf8Path {
                    path: file.to_path_buf(),
                }
            })),
            _ => None,
        })
        .collect::<Result<Vec<_>>>()?;
    let joined = parts.join("/");

    Ok(ImportPath::normalize(&joined))
}

/// Import path of the directory containing an entry file.
fn module_dir_import_path(entry: &Path, app_root: &Path) -> Result<ImportPath> {
    let dir = entry.parent().unwrap_or(entry);
    import_path(dir, app_root)
}
