//! plugin-manifest - tiered plugin discovery and import manifest generation

pub mod config;
pub mod error;
pub mod plugins;

pub use config::Config;
pub use error::{ManifestError, Result};
