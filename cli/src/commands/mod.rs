pub mod areas;
pub mod coverage;
pub mod render;

use std::path::Path;

use anyhow::Result;
use choromap::{ChoroplethConfig, FactorId};

use crate::cli::SelectionArgs;

/// Load the config file if one was given, otherwise the built-in defaults.
pub fn load_config(path: Option<&Path>) -> Result<ChoroplethConfig> {
    match path {
        Some(path) => ChoroplethConfig::from_json_file(path),
        None => Ok(ChoroplethConfig::default()),
    }
}

/// Year and factor to show, falling back to the configured defaults.
pub fn selection(config: &ChoroplethConfig, args: &SelectionArgs) -> (i32, FactorId) {
    let year = args.year.unwrap_or(config.default_year);
    let factor = args.factor.as_deref().map_or_else(|| config.default_factor.clone(), FactorId::from);
    (year, factor)
}
