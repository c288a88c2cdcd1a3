//! Build command: discover, install, and write the plugin manifests.

use anyhow::{bail, Result};

use plugin_manifest::config::Config;
use plugin_manifest::plugins::{render, ManifestBuilder, Manifests};

use super::{load_config, GlobalArgs};

#[derive(Debug, Default)]
pub(crate) struct BuildArgs {
    pub dry_run: bool,
    pub skip_install: bool,
    pub install_command: Option<String>,
}

pub(crate) fn cmd_build(global: GlobalArgs, args: BuildArgs) -> Result<()> {
    let mut config = load_config(&global)?;
    apply_build_args(&mut config, &args)?;

    let builder = ManifestBuilder::new(config)?;

    if args.dry_run {
        let prepared = builder.prepare()?;
        print!("{}", dry_run_output(builder.config(), &prepared.manifests));
        return Ok(());
    }

    builder.build()?;
    Ok(())
}

fn apply_build_args(config: &mut Config, args: &BuildArgs) -> Result<()> {
    if let Some(command) = &args.install_command {
        let parts: Vec<String> = command.split_whitespace().map(String::from).collect();
        if parts.is_empty() {
            bail!("--install-command must name a program");
        }
        config.install_command = parts;
    }
    if args.skip_install || args.dry_run {
        config.skip_install = true;
    }
    config.validate()?;
    Ok(())
}

/// Both rendered manifests, each preceded by a comment naming its destination.
fn dry_run_output(config: &Config, manifests: &Manifests) -> String {
    format!(
        "// ==> {} <==\n{}\n// ==> {} <==\n{}",
        config.client_output_path().display(),
        render(&manifests.client),
        config.server_output_path().display(),
        render(&manifests.server),
    )
}
