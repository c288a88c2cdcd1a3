//! CLI command handlers for the plugin-manifest binary.

use std::path::PathBuf;

use anyhow::{Context, Result};

use plugin_manifest::config::Config;

mod build;
mod list;

pub(crate) use build::{cmd_build, BuildArgs};
pub(crate) use list::cmd_list;

/// Flags shared by every subcommand.
pub(crate) struct GlobalArgs {
    pub root: Option<PathBuf>,
    pub disabled: Vec<String>,
}

/// Resolve the configuration for this invocation and apply global flags.
pub(crate) fn load_config(global: &GlobalArgs) -> Result<Config> {
    let cwd = std::env::current_dir().context("Failed to determine the working directory")?;
    let mut config = Config::load(&cwd, global.root.clone())?;
    config
        .disabled_plugins
        .extend(global.disabled.iter().cloned());
    Ok(config)
}
