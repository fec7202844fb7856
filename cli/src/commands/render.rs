use anyhow::{anyhow, bail, Result};
use choromap::{ChoroplethController, FetchOutcome, FileSource, SceneViewport};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::RenderArgs) -> Result<()> {
    let config = super::load_config(args.selection.config.as_deref())?;
    let (year, factor) = super::selection(&config, &args.selection);
    let out_path = &args.output.clone().unwrap_or("./map.svg".into());

    println!("[render] loading {} and {}", args.geojson.display(), args.values.display());
    let source = FileSource::open(&args.geojson, &args.values)?;

    let mut map = ChoroplethController::new(config, SceneViewport::new())?;
    map.load_geometry_from(&source)?;

    match map.refresh_from(&source, year, factor.clone()) {
        FetchOutcome::Rendered { coverage, .. } => println!(
            "[render] {factor} {year}: {} regions colored, {} without data",
            coverage.matched,
            coverage.only_in_geometry.len(),
        ),
        FetchOutcome::NoData { reason, .. } => println!("[render] {reason}; drawing every region as no data"),
        FetchOutcome::Failed(e) | FetchOutcome::Discarded(e) => bail!("[render] {e}"),
    }

    if let Some(area) = &args.select {
        map.on_area_picked(area)?;
        println!("[render] focused on {area}");
    }

    let geometry = map.geometry().ok_or_else(|| anyhow!("[render] no geometry loaded"))?;
    println!("[render] writing map to {}", out_path.display());
    map.viewport().scene().write_svg(out_path, geometry, args.width)?;

    Ok(())
}
