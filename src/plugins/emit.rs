//! Manifest emission
//!
//! Renders an [`ImportManifest`] as a source file of import statements and
//! replaces the destination in one step. The new content goes to a temporary
//! file next to the destination, which is then renamed over it, so readers
//! see either the previous manifest or the complete new one.
//!
//! Writes are split into [`stage`] and [`StagedManifest::commit`]. Staging
//! both targets before committing either means a destination that cannot be
//! written is reported before the other one is replaced.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::info;

use crate::error::{ManifestError, Result};

use super::types::{ImportManifest, Target};

/// Warning placed at the top of every generated manifest.
pub const GENERATED_HEADER: &str = "\
// THIS FILE IS GENERATED AUTOMATICALLY. DO NOT EDIT IT BY HAND.
// It is rewritten from the plugin directories on every startup,
// so any manual change will be lost.
";

/// Render a manifest: header, blank line, then one import per entry.
pub fn render(manifest: &ImportManifest) -> String {
    let mut out = String::from(GENERATED_HEADER);
    out.push('\n');
    for entry in &manifest.entries {
        out.push_str("import '");
        out.push_str(entry.as_str());
        out.push_str("';\n");
    }
    out
}

/// A rendered manifest sitting in a temporary file beside its destination.
///
/// Dropping a staged manifest without committing it removes the temporary
/// file and leaves the destination untouched.
#[derive(Debug)]
pub struct StagedManifest {
    tmp: NamedTempFile,
    path: PathBuf,
    entries: usize,
    target: Target,
}

impl StagedManifest {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Rename the staged file over the destination.
    pub fn commit(self) -> Result<()> {
        let Self {
            tmp,
            path,
            entries,
            target,
        } = self;
        tmp.persist(&path).map_err(|e| ManifestError::Write {
            path: path.clone(),
            source: e.error,
        })?;
        info!(
            manifest = %target,
            path = %path.display(),
            entries,
            "Wrote plugin manifest"
        );
        Ok(())
    }
}

/// Render a manifest into a temporary file next to `path`.
pub fn stage(manifest: &ImportManifest, path: &Path) -> Result<StagedManifest> {
    Ok(StagedManifest {
        tmp: stage_contents(path, &render(manifest))?,
        path: path.to_path_buf(),
        entries: manifest.len(),
        target: manifest.target,
    })
}

/// Stage every manifest, then commit them in order.
///
/// A destination that cannot be staged fails the call before any
/// destination is replaced.
pub fn emit_all(manifests: &[(&ImportManifest, &Path)]) -> Result<()> {
    let staged = manifests
        .iter()
        .map(|(manifest, path)| stage(manifest, path))
        .collect::<Result<Vec<_>>>()?;
    for manifest in staged {
        manifest.commit()?;
    }
    Ok(())
}

/// Render and write a single manifest to `path`.
pub fn emit(manifest: &ImportManifest, path: &Path) -> Result<()> {
    stage(manifest, path)?.commit()
}

/// Replace `path` with `contents`.
///
/// The destination directory must already exist. Any failure is reported as
/// [`ManifestError::Write`] for `path` and leaves the previous file in place.
pub fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    let tmp = stage_contents(path, contents)?;
    tmp.persist(path).map_err(|e| ManifestError::Write {
        path: path.to_path_buf(),
        source: e.error,
    })?;
    Ok(())
}

fn stage_contents(path: &Path, contents: &str) -> Result<NamedTempFile> {
    let wrap = |source: std::io::Error| ManifestError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(wrap)?;
    tmp.write_all(contents.as_bytes()).map_err(wrap)?;
    tmp.as_file().sync_all().map_err(wrap)?;

    // Temp files are created owner-only; keep the destination readable.
    let permissions = match fs::metadata(path) {
        Ok(meta) => meta.permissions(),
        Err(_) => default_permissions(tmp.as_file()).map_err(wrap)?,
    };
    fs::set_permissions(tmp.path(), permissions).map_err(wrap)?;

    Ok(tmp)
}

// New manifests are loaded by whichever account runs the application, which
// is often not the account that ran the build. They get a fixed 0o644 rather
// than a umask-derived mode so that account can always read them.
#[cfg(unix)]
fn default_permissions(_file: &fs::File) -> std::io::Result<fs::Permissions> {
    use std::os::unix::fs::PermissionsExt;
    Ok(fs::Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn default_permissions(file: &fs::File) -> std::io::Result<fs::Permissions> {
    Ok(file.metadata()?.permissions())
}
