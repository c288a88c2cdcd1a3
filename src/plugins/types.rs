//! Plugin types for the manifest builder
//!
//! Everything here is ephemeral: a run discovers [`PluginDir`]s, resolves
//! their [`PluginArtifacts`], and folds the import paths into one
//! [`ImportManifest`] per [`Target`].

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;

/// Directory, relative to the application root, that holds the tier roots.
pub const PLUGINS_DIR: &str = "imports/plugins";

/// One of the three fixed discovery roots. Declaration order is load order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Core,
    Included,
    Custom,
}

impl Tier {
    /// All tiers in precedence order.
    pub const ALL: [Tier; 3] = [Tier::Core, Tier::Included, Tier::Custom];

    /// Directory name of this tier under [`PLUGINS_DIR`].
    pub fn dir_name(self) -> &'static str {
        match self {
            Tier::Core => "core",
            Tier::Included => "included",
            Tier::Custom => "custom",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// An eligible plugin directory found under a tier root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PluginDir {
    /// Tier the plugin was discovered in.
    pub tier: Tier,

    /// Directory basename.
    pub name: String,

    /// Absolute path of the plugin directory.
    pub path: PathBuf,
}

impl PluginDir {
    /// Short `<tier>/<name>` label used in logs and listings.
    pub fn label(&self) -> String {
        format!("{}/{}", self.tier, self.name)
    }
}

/// A normalized, root-relative module path: leading `/`, forward slashes only.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImportPath(String);

impl ImportPath {
    /// Normalize a root-relative path string into an import path.
    ///
    /// Backslashes become forward slashes and a single leading `/` is
    /// guaranteed, so the result does not depend on the host separator.
    pub fn normalize(relative: &str) -> Self {
        let forward = relative.replace('\\', "/");
        let trimmed = forward.trim_start_matches('/');
        Self(format!("/{}", trimmed))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ImportPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Which of the four conditional artifacts a plugin provides.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginArtifacts {
    /// Client entry module directory, e.g. `/imports/plugins/core/foo/client`.
    pub client: Option<ImportPath>,

    /// Server entry module directory.
    pub server: Option<ImportPath>,

    /// Registration file, imported by exact file path.
    pub register: Option<ImportPath>,

    /// Whether a dependency manifest is present.
    pub has_dependencies: bool,
}

impl PluginArtifacts {
    /// True when the plugin contributes nothing to either manifest.
    pub fn is_empty(&self) -> bool {
        self.client.is_none() && self.server.is_none() && self.register.is_none()
    }

    /// Names of the artifacts present, in a fixed order.
    pub fn present(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.client.is_some() {
            out.push("client");
        }
        if self.server.is_some() {
            out.push("server");
        }
        if self.register.is_some() {
            out.push("register");
        }
        if self.has_dependencies {
            out.push("deps");
        }
        out
    }
}

/// A discovered plugin together with its resolved artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedPlugin {
    #[serde(flatten)]
    pub dir: PluginDir,
    pub artifacts: PluginArtifacts,
}

/// The runtime a manifest is generated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Client,
    Server,
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Client => f.write_str("client"),
            Target::Server => f.write_str("server"),
        }
    }
}

/// Ordered list of import paths loaded as a unit by one runtime.
///
/// Order is load order; entries are neither deduplicated nor re-sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportManifest {
    pub target: Target,
    pub entries: Vec<ImportPath>,
}

impl ImportManifest {
    pub fn new(target: Target) -> Self {
        Self {
            target,
            entries: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The client and server manifests produced by one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Manifests {
    pub client: ImportManifest,
    pub server: ImportManifest,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_order() {
        assert_eq!(Tier::ALL, [Tier::Core, Tier::Included, Tier::Custom]);
        assert!(Tier::Core < Tier::Included);
        assert!(Tier::Included < Tier::Custom);
    }

    #[test]
    fn test_tier_dir_names() {
        let names: Vec<&str> = Tier::ALL.iter().map(|t| t.dir_name()).collect();
        assert_eq!(names, vec!["core", "included", "custom"]);
        assert_eq!(Tier::Included.to_string(), "included");
    }

    #[test]
    fn test_import_path_normalize_backslashes() {
        let path = ImportPath::normalize(r"imports\plugins\core\foo\client");
        assert_eq!(path.as_str(), "/imports/plugins/core/foo/client");
    }

    #[test]
    fn test_import_path_normalize_single_leading_slash() {
        assert_eq!(
            ImportPath::normalize("/imports/plugins/core/foo").as_str(),
            "/imports/plugins/core/foo"
        );
        assert_eq!(
            ImportPath::normalize(r"\imports\plugins").as_str(),
            "/imports/plugins"
        );
    }

    #[test]
    fn test_artifacts_present_and_empty() {
        let mut artifacts = PluginArtifacts::default();
        assert!(artifacts.is_empty());
        assert!(artifacts.present().is_empty());

        artifacts.has_dependencies = true;
        assert!(artifacts.is_empty());
        assert_eq!(artifacts.present(), vec!["deps"]);

        artifacts.server = Some(ImportPath::normalize("a/server"));
        artifacts.register = Some(ImportPath::normalize("a/register.js"));
        assert!(!artifacts.is_empty());
        assert_eq!(artifacts.present(), vec!["server", "register", "deps"]);
    }

    #[test]
    fn test_plugin_dir_label() {
        let dir = PluginDir {
            tier: Tier::Custom,
            name: "reviews".to_string(),
            path: PathBuf::from("/app/imports/plugins/custom/reviews"),
        };
        assert_eq!(dir.label(), "custom/reviews");
    }
}
