use anyhow::{Context, Result};
use choromap::{AreaCatalog, GeometrySource};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::AreasArgs) -> Result<()> {
    let config = super::load_config(args.config.as_deref())?;

    let bytes = std::fs::read(&args.geojson)
        .with_context(|| format!("[areas] Failed to read {}", args.geojson.display()))?;
    let geometry = GeometrySource::from_geojson_bytes(&bytes, config.matching_property.as_str())?;

    let catalog = AreaCatalog::build(&geometry);
    tracing::info!(features = geometry.len(), areas = catalog.len(), "read boundaries");
    for name in catalog.names() {
        println!("{name}");
    }

    Ok(())
}
