//! List command: show eligible plugins without installing or writing anything.

use anyhow::Result;

use plugin_manifest::plugins::{ManifestBuilder, ResolvedPlugin};

use super::{load_config, GlobalArgs};

pub(crate) fn cmd_list(global: GlobalArgs, json: bool) -> Result<()> {
    let config = load_config(&global)?;
    let plugins = ManifestBuilder::new(config)?.scan()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&plugins)?);
    } else if plugins.is_empty() {
        println!("No plugins found.");
    } else {
        for plugin in &plugins {
            println!("{}", format_plugin(plugin));
        }
    }
    Ok(())
}

fn format_plugin(plugin: &ResolvedPlugin) -> String {
    let present = plugin.artifacts.present();
    if present.is_empty() {
        format!("{:<32} (no artifacts)", plugin.dir.label())
    } else {
        format!("{:<32} {}", plugin.dir.label(), present.join(" "))
    }
}
