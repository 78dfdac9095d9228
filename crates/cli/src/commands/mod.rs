//! Command implementations.

mod emit;
mod info;
mod validate;

pub use emit::run_emit;
pub use info::run_info;
pub use validate::run_validate;

use anyhow::{Context, Result};
use contracts::TopologyBlueprint;
use std::path::Path;

use crate::error::CliError;

/// Load and validate the configuration at `path`
fn load_blueprint(path: &Path) -> Result<TopologyBlueprint> {
    if !path.exists() {
        return Err(CliError::config_not_found(path.display().to_string()).into());
    }
    config_loader::ConfigLoader::load_from_path(path)
        .with_context(|| format!("Failed to load config from {}", path.display()))
}
