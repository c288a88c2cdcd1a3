//! Configuration for the plugin manifest builder
//!
//! A [`Config`] is resolved once, up front, and handed to the builder. Values
//! come from defaults, then the optional `.plugin-manifest.json` settings
//! file in the application root, then `PLUGIN_MANIFEST_*` environment
//! variables. The CLI applies its own flags last.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{ManifestError, Result};
use crate::plugins::installer::DEFAULT_INSTALL_COMMAND;
use crate::plugins::resolver::ArtifactLayout;
use crate::plugins::types::{Tier, PLUGINS_DIR};

/// Settings file looked up in the application root.
pub const SETTINGS_FILE: &str = ".plugin-manifest.json";

/// Marker directory that identifies the application root.
pub const DEFAULT_ROOT_MARKER: &str = ".meteor";

pub const ENV_APP_ROOT: &str = "PLUGIN_MANIFEST_APP_ROOT";
pub const ENV_ROOT_MARKER: &str = "PLUGIN_MANIFEST_ROOT_MARKER";
pub const ENV_DISABLED: &str = "PLUGIN_MANIFEST_DISABLED";
pub const ENV_SKIP_INSTALL: &str = "PLUGIN_MANIFEST_SKIP_INSTALL";

/// Fully resolved builder configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Application root all import paths are relative to.
    pub app_root: PathBuf,

    /// Plugin directory names to exclude from both manifests.
    pub disabled_plugins: Vec<String>,

    /// Extension of entry, registration and output files.
    pub extension: String,

    /// File name whose presence triggers a dependency install.
    pub dependency_manifest: String,

    /// Package manager program followed by its arguments.
    pub install_command: Vec<String>,

    /// Skip dependency installs entirely.
    pub skip_install: bool,

    /// Client manifest path; relative paths are joined to `app_root`.
    /// Defaults to `client/plugins.<extension>`.
    pub client_output: Option<PathBuf>,

    /// Server manifest path; defaults to `server/plugins.<extension>`.
    pub server_output: Option<PathBuf>,
}

/// Partial overlay read from [`SETTINGS_FILE`]. Every field is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsFile {
    #[serde(default)]
    pub disabled_plugins: Option<Vec<String>>,
    #[serde(default)]
    pub extension: Option<String>,
    #[serde(default)]
    pub dependency_manifest: Option<String>,
    #[serde(default)]
    pub install_command: Option<Vec<String>>,
    #[serde(default)]
    pub skip_install: Option<bool>,
    #[serde(default)]
    pub client_output: Option<PathBuf>,
    #[serde(default)]
    pub server_output: Option<PathBuf>,
}

impl Config {
    /// Defaults for an application rooted at `app_root`.
    pub fn new(app_root: impl Into<PathBuf>) -> Self {
        Self {
            app_root: app_root.into(),
            disabled_plugins: Vec::new(),
            extension: "js".to_string(),
            dependency_manifest: "package.json".to_string(),
            install_command: DEFAULT_INSTALL_COMMAND.iter().map(|s| s.to_string()).collect(),
            skip_install: false,
            client_output: None,
            server_output: None,
        }
    }

    /// Resolve the configuration for a run started in `cwd`.
    ///
    /// `explicit_root` (from the CLI) wins over `PLUGIN_MANIFEST_APP_ROOT`,
    /// which wins over marker discovery. Without any of them the working
    /// directory is used.
    pub fn load(cwd: &Path, explicit_root: Option<PathBuf>) -> Result<Self> {
        Self::load_with_env(cwd, explicit_root, |key| std::env::var(key).ok())
    }

    /// [`Config::load`] with an injectable environment lookup.
    pub fn load_with_env<F>(cwd: &Path, explicit_root: Option<PathBuf>, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let app_root = match explicit_root.or_else(|| env(ENV_APP_ROOT).map(PathBuf::from)) {
            Some(root) => absolutize(cwd, root),
            None => {
                let marker =
                    env(ENV_ROOT_MARKER).unwrap_or_else(|| DEFAULT_ROOT_MARKER.to_string());
                discover_app_root(cwd, &marker).unwrap_or_else(|| {
                    warn!(
                        cwd = %cwd.display(),
                        marker = %marker,
                        "No application root marker found, using the working directory"
                    );
                    cwd.to_path_buf()
                })
            }
        };
        debug!(app_root = %app_root.display(), "Resolved application root");

        let mut config = Self::new(app_root);
        let settings_path = config.app_root.join(SETTINGS_FILE);
        if settings_path.is_file() {
            let settings = SettingsFile::load(&settings_path)?;
            config.apply_settings(settings);
            debug!(path = %settings_path.display(), "Applied settings file");
        }
        config.apply_env(env)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay values present in a settings file.
    pub fn apply_settings(&mut self, settings: SettingsFile) {
        if let Some(disabled) = settings.disabled_plugins {
            self.disabled_plugins = disabled;
        }
        if let Some(extension) = settings.extension {
            self.extension = extension;
        }
        if let Some(manifest) = settings.dependency_manifest {
            self.dependency_manifest = manifest;
        }
        if let Some(command) = settings.install_command {
            self.install_command = command;
        }
        if let Some(skip) = settings.skip_install {
            self.skip_install = skip;
        }
        if settings.client_output.is_some() {
            self.client_output = settings.client_output;
        }
        if settings.server_output.is_some() {
            self.server_output = settings.server_output;
        }
    }

    /// Overlay `PLUGIN_MANIFEST_DISABLED` and `PLUGIN_MANIFEST_SKIP_INSTALL`.
    ///
    /// Disabled names from the environment are appended to the existing list.
    pub fn apply_env<F>(&mut self, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(list) = env(ENV_DISABLED) {
            self.disabled_plugins.extend(
                list.split(',')
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .map(String::from),
            );
        }
        if let Some(value) = env(ENV_SKIP_INSTALL) {
            self.skip_install = parse_bool(&value).ok_or_else(|| {
                ManifestError::Config(format!(
                    "{} must be a boolean, got '{}'",
                    ENV_SKIP_INSTALL, value
                ))
            })?;
        }
        Ok(())
    }

    /// Reject values the builder cannot work with.
    pub fn validate(&self) -> Result<()> {
        let extension = self.extension.trim();
        if extension.is_empty() || extension.contains(|c: char| matches!(c, '/' | '\\' | '.')) {
            return Err(ManifestError::Config(format!(
                "Invalid extension '{}': expected a bare extension such as 'js'",
                self.extension
            )));
        }
        if self.dependency_manifest.trim().is_empty() {
            return Err(ManifestError::Config(
                "dependencyManifest must not be empty".to_string(),
            ));
        }
        if self.install_command.first().map_or(true, |p| p.trim().is_empty()) {
            return Err(ManifestError::Config(
                "installCommand must name a program".to_string(),
            ));
        }
        Ok(())
    }

    /// The Disabled-Plugins Set.
    pub fn disabled_set(&self) -> HashSet<String> {
        self.disabled_plugins.iter().cloned().collect()
    }

    /// Root directory of one tier, e.g. `<root>/imports/plugins/core`.
    pub fn tier_root(&self, tier: Tier) -> PathBuf {
        self.app_root.join(PLUGINS_DIR).join(tier.dir_name())
    }

    /// Where each plugin's artifacts are expected.
    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout::new(&self.extension, &self.dependency_manifest)
    }

    pub fn client_output_path(&self) -> PathBuf {
        self.output_path(self.client_output.as_deref(), "client")
    }

    pub fn server_output_path(&self) -> PathBuf {
        self.output_path(self.server_output.as_deref(), "server")
    }

    fn output_path(&self, configured: Option<&Path>, side: &str) -> PathBuf {
        match configured {
            Some(path) => self.app_root.join(path),
            None => self
                .app_root
                .join(side)
                .join(format!("plugins.{}", self.extension)),
        }
    }
}

impl SettingsFile {
    /// Parse a settings file. Malformed JSON is a configuration error.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ManifestError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        serde_json::from_str(&content).map_err(|e| {
            ManifestError::Config(format!("Invalid settings file {}: {}", path.display(), e))
        })
    }
}

/// Locate the application root for a working directory.
///
/// When `start` lies inside a marker directory the root is the path before
/// it. Otherwise the nearest ancestor that contains the marker directory is
/// the root.
pub fn discover_app_root(start: &Path, marker: &str) -> Option<PathBuf> {
    let mut prefix = PathBuf::new();
    for component in start.components() {
        if component.as_os_str() == marker {
            return Some(prefix);
        }
        prefix.push(component);
    }

    start
        .ancestors()
        .find(|dir| dir.join(marker).is_dir())
        .map(Path::to_path_buf)
}

fn absolutize(cwd: &Path, path: PathBuf) -> PathBuf {
    if path.is_absolute() {
        path
    } else {
        cwd.join(path)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    fn no_env() -> impl Fn(&str) -> Option<String> {
        env_from(&[])
    }

    #[test]
    fn test_defaults() {
        let config = Config::new("/app");
        assert_eq!(config.extension, "js");
        assert_eq!(config.dependency_manifest, "package.json");
        assert_eq!(config.install_command, vec!["npm", "install"]);
        assert!(!config.skip_install);
        assert_eq!(config.client_output_path(), PathBuf::from("/app/client/plugins.js"));
        assert_eq!(config.server_output_path(), PathBuf::from("/app/server/plugins.js"));
        assert_eq!(
            config.tier_root(Tier::Included),
            PathBuf::from("/app/imports/plugins/included")
        );
    }

    #[test]
    fn test_discover_root_from_inside_marker() {
        let root = discover_app_root(Path::new("/srv/shop/.meteor/local/build"), ".meteor");
        assert_eq!(root, Some(PathBuf::from("/srv/shop")));
    }

    #[test]
    fn test_discover_root_walks_up_to_marker() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join(".meteor")).unwrap();
        let nested = tmp.path().join("imports").join("plugins");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(
            discover_app_root(&nested, ".meteor"),
            Some(tmp.path().to_path_buf())
        );
    }

    #[test]
    fn test_discover_root_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(discover_app_root(tmp.path(), ".no-such-marker-dir"), None);
    }

    #[test]
    fn test_load_explicit_root_wins() {
        let tmp = TempDir::new().unwrap();
        let env = env_from(&[(ENV_APP_ROOT, "/from/env")]);
        let config = Config::load_with_env(Path::new("/cwd"), Some(tmp.path().to_path_buf()), env)
            .unwrap();
        assert_eq!(config.app_root, tmp.path());
    }

    #[test]
    fn test_load_root_from_env_relative_to_cwd() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("shop")).unwrap();
        let config =
            Config::load_with_env(tmp.path(), None, env_from(&[(ENV_APP_ROOT, "shop")])).unwrap();
        assert_eq!(config.app_root, tmp.path().join("shop"));
    }

    #[test]
    fn test_load_falls_back_to_cwd() {
        let tmp = TempDir::new().unwrap();
        let env = env_from(&[(ENV_ROOT_MARKER, ".no-such-marker-dir")]);
        let config = Config::load_with_env(tmp.path(), None, env).unwrap();
        assert_eq!(config.app_root, tmp.path());
    }

    #[test]
    fn test_load_applies_settings_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(SETTINGS_FILE),
            r#"{
                "disabledPlugins": ["payments"],
                "extension": "ts",
                "installCommand": ["pnpm", "install"],
                "serverOutput": "server/generated/plugins.ts"
            }"#,
        )
        .unwrap();

        let config =
            Config::load_with_env(tmp.path(), Some(tmp.path().to_path_buf()), no_env()).unwrap();
        assert_eq!(config.disabled_plugins, vec!["payments"]);
        assert_eq!(config.extension, "ts");
        assert_eq!(config.install_command, vec!["pnpm", "install"]);
        assert_eq!(config.client_output_path(), tmp.path().join("client/plugins.ts"));
        assert_eq!(
            config.server_output_path(),
            tmp.path().join("server/generated/plugins.ts")
        );
    }

    #[test]
    fn test_load_malformed_settings_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SETTINGS_FILE), "{ broken json").unwrap();

        let result = Config::load_with_env(tmp.path(), Some(tmp.path().to_path_buf()), no_env());
        assert!(matches!(result, Err(ManifestError::Config(_))));
    }

    #[test]
    fn test_load_rejects_unknown_settings_keys() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(SETTINGS_FILE), r#"{"disabled": ["typo"]}"#).unwrap();

        let result = Config::load_with_env(tmp.path(), Some(tmp.path().to_path_buf()), no_env());
        assert!(result.is_err());
    }

    #[test]
    fn test_env_appends_disabled_plugins() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(SETTINGS_FILE),
            r#"{"disabledPlugins": ["payments"]}"#,
        )
        .unwrap();
        let env = env_from(&[(ENV_DISABLED, " reviews, ,shipping ")]);

        let config =
            Config::load_with_env(tmp.path(), Some(tmp.path().to_path_buf()), env).unwrap();
        assert_eq!(config.disabled_plugins, vec!["payments", "reviews", "shipping"]);
        assert!(config.disabled_set().contains("shipping"));
    }

    #[test]
    fn test_env_skip_install() {
        let mut config = Config::new("/app");
        config.apply_env(env_from(&[(ENV_SKIP_INSTALL, "TRUE")])).unwrap();
        assert!(config.skip_install);

        config.apply_env(env_from(&[(ENV_SKIP_INSTALL, "0")])).unwrap();
        assert!(!config.skip_install);

        assert!(config.apply_env(env_from(&[(ENV_SKIP_INSTALL, "maybe")])).is_err());
    }

    #[test]
    fn test_validate() {
        let mut config = Config::new("/app");
        assert!(config.validate().is_ok());

        config.extension = ".js".to_string();
        assert!(config.validate().is_err());

        config.extension = "js".to_string();
        config.install_command = vec![];
        assert!(config.validate().is_err());

        config.install_command = vec!["npm".to_string()];
        config.dependency_manifest = " ".to_string();
        assert!(config.validate().is_err());
    }
}
