//! Dependency installation
//!
//! A plugin that ships a dependency manifest gets its dependencies installed
//! before it is considered load-ready. Installs run one at a time, in
//! discovery order, with the package manager's output streamed straight to
//! the operator.

use std::process::{Command, ExitStatus};

use tracing::info;

use crate::error::{ManifestError, Result};

use super::types::PluginDir;

/// Installs the declared dependencies of one plugin.
#[cfg_attr(test, mockall::automock)]
pub trait Installer {
    /// Block until the install finishes. Any failure is fatal to the build.
    fn install(&self, plugin: &PluginDir) -> Result<()>;
}

/// Default package manager invocation.
pub const DEFAULT_INSTALL_COMMAND: [&str; 2] = ["npm", "install"];

/// Runs a package manager command inside the plugin directory.
///
/// The child inherits stdin, stdout and stderr.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandInstaller {
    program: String,
    args: Vec<String>,
}

impl CommandInstaller {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a `[program, args...]` list.
    pub fn from_command_line(command: &[String]) -> Result<Self> {
        let (program, args) = command
            .split_first()
            .ok_or_else(|| ManifestError::Config("install command is empty".to_string()))?;
        if program.trim().is_empty() {
            return Err(ManifestError::Config(
                "install command has an empty program name".to_string(),
            ));
        }
        Ok(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    fn display_command(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Default for CommandInstaller {
    fn default() -> Self {
        Self::new(
            DEFAULT_INSTALL_COMMAND[0],
            DEFAULT_INSTALL_COMMAND[1..]
                .iter()
                .map(|a| a.to_string())
                .collect(),
        )
    }
}

impl Installer for CommandInstaller {
    fn install(&self, plugin: &PluginDir) -> Result<()> {
        let command_line = self.display_command();
        info!(
            plugin = %plugin.label(),
            dir = %plugin.path.display(),
            command = %command_line,
            "Installing plugin dependencies"
        );

        let status = Command::new(&self.program)
            .args(&self.args)
            .current_dir(&plugin.path)
            .status()
            .map_err(|e| ManifestError::Install {
                plugin: plugin.label(),
                reason: format!("failed to run `{}`: {}", command_line, e),
            })?;

        if status.success() {
            return Ok(());
        }

        // Reported once by the caller that aborts the run.
        Err(ManifestError::Install {
            plugin: plugin.label(),
            reason: describe_failure(&command_line, status),
        })
    }
}

fn describe_failure(command_line: &str, status: ExitStatus) -> String {
    match status.code() {
        Some(code) => format!("`{}` exited with status {}", command_line, code),
        None => format!("`{}` was terminated by a signal", command_line),
    }
}
