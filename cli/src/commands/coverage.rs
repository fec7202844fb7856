use anyhow::{bail, Result};
use choromap::{DataSource, FileSource, GeometrySource, JoinIndex};

pub fn run(_cli: &crate::cli::Cli, args: &crate::cli::CoverageArgs) -> Result<()> {
    let config = super::load_config(args.selection.config.as_deref())?;
    let (year, factor) = super::selection(&config, &args.selection);

    let source = FileSource::open(&args.geojson, &args.values)?;
    let geometry = GeometrySource::from_geojson(&source.fetch_geometry()?, config.matching_property.as_str())?;

    let response = source.fetch_values(year, &factor)?;
    if !response.success {
        bail!("[coverage] {}", response.error.unwrap_or_else(|| format!("no values for {factor} in {year}")));
    }

    let join = JoinIndex::build(&response.data);
    let coverage = join.coverage(&geometry);

    println!("{factor} {year}: {} regions matched", coverage.matched);
    if join.overwritten() > 0 {
        println!("{} repeated region keys (last value kept)", join.overwritten());
    }

    println!("\nIn values but not in boundaries ({}):", coverage.only_in_values.len());
    for key in &coverage.only_in_values {
        println!("  - {key}");
    }

    println!("\nIn boundaries but not in values ({}):", coverage.only_in_geometry.len());
    for key in &coverage.only_in_geometry {
        println!("  - {key}");
    }

    Ok(())
}
