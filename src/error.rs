//! Error types for the plugin manifest builder
//!
//! Every failure the builder can hit is a variant of [`ManifestError`].
//! Install and write failures are fatal to a run; the binary logs them once
//! and exits non-zero.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for manifest builder operations.
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Configuration-related errors (malformed settings file, bad overrides, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// A tier root exists but could not be listed
    #[error("Failed to read plugin directory {}", root.display())]
    Discovery {
        root: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Dependency installation for a plugin failed
    #[error("Dependency install failed for plugin '{plugin}': {reason}")]
    Install { plugin: String, reason: String },

    /// A manifest could not be written to its destination
    #[error("Failed to write manifest {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A plugin directory name that cannot appear in an import path
    #[error("Plugin path is not valid UTF-8: {}", path.display())]
    NonUtf8Path { path: PathBuf },

    /// Standard I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized `Result` type for manifest builder operations.
pub type Result<T> = std::result::Result<T, ManifestError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ManifestError::Config("bad settings".to_string());
        assert_eq!(err.to_string(), "Configuration error: bad settings");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ManifestError = io_err.into();
        assert!(matches!(err, ManifestError::Io(_)));
    }

    #[test]
    fn test_install_error_names_plugin() {
        let err = ManifestError::Install {
            plugin: "payments".to_string(),
            reason: "exited with status 1".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'payments'"));
        assert!(msg.contains("exited with status 1"));
    }

    #[test]
    fn test_write_error_names_destination() {
        let err = ManifestError::Write {
            path: PathBuf::from("/app/server/plugins.js"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/app/server/plugins.js"));
    }

    #[test]
    fn test_write_error_chain_mentions_cause_once() {
        let err = ManifestError::Write {
            path: PathBuf::from("/app/server/plugins.js"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such directory"),
        };
        assert!(!err.to_string().contains("no such directory"));
        assert!(std::error::Error::source(&err).is_some());

        let chain = format!("{:#}", anyhow::Error::from(err));
        assert_eq!(chain.matches("no such directory").count(), 1);
        assert_eq!(chain.matches("/app/server/plugins.js").count(), 1);
    }

    #[test]
    fn test_discovery_error_names_root() {
        let err = ManifestError::Discovery {
            root: PathBuf::from("/app/imports/plugins/core"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("imports/plugins/core"));
        assert!(!msg.contains("denied"));
    }

    #[test]
    fn test_non_utf8_error_names_path() {
        let err = ManifestError::NonUtf8Path {
            path: PathBuf::from("/app/imports/plugins/core/bad"),
        };
        assert!(err.to_string().contains("/app/imports/plugins/core/bad"));
    }
}
