//! Manifest assembly and orchestration
//!
//! [`ManifestBuilder`] runs discovery, resolution, dependency installation
//! and emission in that order. Tiers are visited core, included, custom, and
//! plugins within a tier in discovery order. Nothing is written until every
//! install has succeeded and both manifests have been assembled.

use std::collections::HashSet;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::Result;

use super::discovery::discover_tier;
use super::emit::emit_all;
use super::installer::{CommandInstaller, Installer};
use super::resolver::{resolve_artifacts, ArtifactLayout, ArtifactProbe, FsProbe};
use super::types::{ImportManifest, Manifests, ResolvedPlugin, Target, Tier};

/// Plugins and manifests assembled in memory, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedBuild {
    pub plugins: Vec<ResolvedPlugin>,
    pub manifests: Manifests,
    pub installs: usize,
}

/// Summary of a completed build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub plugins: usize,
    pub installs: usize,
    pub client_path: PathBuf,
    pub client_entries: usize,
    pub server_path: PathBuf,
    pub server_entries: usize,
}

/// Builds the client and server import manifests for one application.
pub struct ManifestBuilder {
    config: Config,
    layout: ArtifactLayout,
    disabled: HashSet<String>,
    installer: Box<dyn Installer>,
    probe: Box<dyn ArtifactProbe>,
}

impl ManifestBuilder {
    /// Builder that probes the real filesystem and installs with the
    /// configured package manager command.
    pub fn new(config: Config) -> Result<Self> {
        let installer = CommandInstaller::from_command_line(&config.install_command)?;
        Ok(Self::with_parts(config, Box::new(installer), Box::new(FsProbe)))
    }

    /// Builder with explicit installer and probe capabilities.
    pub fn with_parts(
        config: Config,
        installer: Box<dyn Installer>,
        probe: Box<dyn ArtifactProbe>,
    ) -> Self {
        Self {
            layout: config.layout(),
            disabled: config.disabled_set(),
            config,
            installer,
            probe,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Discover and resolve every eligible plugin without installing anything.
    pub fn scan(&self) -> Result<Vec<ResolvedPlugin>> {
        self.collect(false).map(|(plugins, _)| plugins)
    }

    /// Discover, resolve and install, then assemble both manifests in memory.
    ///
    /// Installs are skipped when `skip_install` is set in the config.
    pub fn prepare(&self) -> Result<PreparedBuild> {
        let (plugins, installs) = self.collect(!self.config.skip_install)?;
        let manifests = assemble(&plugins);
        Ok(PreparedBuild {
            plugins,
            manifests,
            installs,
        })
    }

    /// Run the full pipeline and write both manifests.
    pub fn build(&self) -> Result<BuildReport> {
        let PreparedBuild {
            plugins,
            manifests,
            installs,
        } = self.prepare()?;

        let client_path = self.config.client_output_path();
        let server_path = self.config.server_output_path();
        emit_all(&[
            (&manifests.client, client_path.as_path()),
            (&manifests.server, server_path.as_path()),
        ])?;

        let report = BuildReport {
            plugins: plugins.len(),
            installs,
            client_path,
            client_entries: manifests.client.len(),
            server_path,
            server_entries: manifests.server.len(),
        };
        info!(
            plugins = report.plugins,
            installs = report.installs,
            client_entries = report.client_entries,
            server_entries = report.server_entries,
            "Plugin manifests generated"
        );
        Ok(report)
    }

    /// Walk the tiers in order. Each plugin is resolved and, if `install` is
    /// set and it has a dependency manifest, installed before the next one is
    /// looked at.
    fn collect(&self, install: bool) -> Result<(Vec<ResolvedPlugin>, usize)> {
        let mut plugins = Vec::new();
        let mut installs = 0;

        for tier in Tier::ALL {
            let root = self.config.tier_root(tier);
            for dir in discover_tier(tier, &root, &self.disabled)? {
                let artifacts = resolve_artifacts(
                    &dir.path,
                    &self.config.app_root,
                    &self.layout,
                    self.probe.as_ref(),
                )?;
                debug!(plugin = %dir.label(), artifacts = ?artifacts.present(), "Resolved plugin");

                if install && artifacts.has_dependencies {
                    self.installer.install(&dir)?;
                    installs += 1;
                }

                plugins.push(ResolvedPlugin { dir, artifacts });
            }
        }

        Ok((plugins, installs))
    }
}

/// Fold resolved plugins into the client and server manifests.
///
/// `plugins` must already be in tier order. The client manifest lists client
/// entries; the server manifest lists every server entry followed by every
/// registration file.
pub fn assemble(plugins: &[ResolvedPlugin]) -> Manifests {
    let mut client = ImportManifest::new(Target::Client);
    let mut server = ImportManifest::new(Target::Server);
    let mut registrations = Vec::new();

    for plugin in plugins {
        let artifacts = &plugin.artifacts;
        if let Some(path) = &artifacts.client {
            client.entries.push(path.clone());
        }
        if let Some(path) = &artifacts.server {
            server.entries.push(path.clone());
        }
        if let Some(path) = &artifacts.register {
            registrations.push(path.clone());
        }
    }
    server.entries.extend(registrations);

    Manifests { client, server }
}
