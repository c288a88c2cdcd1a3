//! Plugin discovery and import manifest generation
//!
//! Plugins live in three tiers under the application root. Each plugin is a
//! directory that may provide a client entry, a server entry, a registration
//! file and a dependency manifest. The builder turns them into two generated
//! files of import statements whose order is the runtime load order.
//!
//! # Architecture
//!
//! - **types**: Core data structures (`Tier`, `PluginDir`, `PluginArtifacts`, `ImportManifest`)
//! - **discovery**: Tier listing with hidden and disabled filtering
//! - **resolver**: Artifact detection and import path computation
//! - **installer**: Dependency installation through the package manager
//! - **emit**: Manifest rendering and all-or-nothing writes
//! - **builder**: Tier-ordered assembly and the end-to-end pipeline
//!
//! # Plugin Directory Structure
//!
//! ```text
//! <root>/imports/plugins/
//! ├── core/
//! │   └── accounts/
//! │       ├── client/index.js
//! │       ├── server/index.js
//! │       ├── register.js
//! │       └── package.json
//! ├── included/
//! │   └── shipping/
//! │       └── server/index.js
//! └── custom/
//!     └── reviews/
//!         └── client/index.js
//! ```
//!
//! # Generated Files
//!
//! `<root>/client/plugins.js` imports every client entry directory, core
//! first, then included, then custom. `<root>/server/plugins.js` imports
//! every server entry directory in the same tier order, followed by every
//! registration file in tier order.
//!
//! # Usage
//!
//! ```rust,no_run
//! use plugin_manifest::config::Config;
//! use plugin_manifest::plugins::ManifestBuilder;
//!
//! let config = Config::new("/srv/shop");
//! let report = ManifestBuilder::new(config).unwrap().build().unwrap();
//! println!(
//!     "{} plugins, {} client imports, {} server imports",
//!     report.plugins, report.client_entries, report.server_entries
//! );
//! ```

pub mod builder;
pub mod discovery;
pub mod emit;
pub mod installer;
pub mod resolver;
pub mod types;

pub use builder::{assemble, BuildReport, ManifestBuilder, PreparedBuild};
pub use discovery::discover_tier;
pub use emit::{emit_all, render, stage, StagedManifest, GENERATED_HEADER};
pub use installer::{CommandInstaller, Installer};
pub use resolver::{resolve_artifacts, ArtifactLayout, ArtifactProbe, FsProbe};
pub use types::{
    ImportManifest, ImportPath, Manifests, PluginArtifacts, PluginDir, ResolvedPlugin, Target, Tier,
};
