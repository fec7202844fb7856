use std::path::PathBuf;

/// Choropleth map CLI
#[derive(clap::Parser, Debug)]
#[command(name = "choromap", version, about, propagate_version = true)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Render a choropleth of one year/factor to SVG
    Render(RenderArgs),

    /// List the region names found in a boundary file
    Areas(AreasArgs),

    /// Report which regions match between a boundary file and a value table
    Coverage(CoverageArgs),
}

#[derive(clap::Args, Debug)]
pub struct SelectionArgs {
    /// Year to show, defaults to the configured default year
    #[arg(short, long)]
    pub year: Option<i32>,

    /// Factor to show, e.g. air_quality
    #[arg(short, long)]
    pub factor: Option<String>,

    /// JSON config file (matching property, factors, palettes)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct RenderArgs {
    /// Region boundaries (GeoJSON FeatureCollection)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub geojson: PathBuf,

    /// Long-format value table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub values: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,

    /// Region to focus and emphasize
    #[arg(short, long)]
    pub select: Option<String>,

    /// Output SVG file, defaults to "./map.svg"
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Image width in pixels
    #[arg(short, long, default_value_t = 1200.0)]
    pub width: f64,
}

#[derive(clap::Args, Debug)]
pub struct AreasArgs {
    /// Region boundaries (GeoJSON FeatureCollection)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub geojson: PathBuf,

    /// JSON config file (matching property)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct CoverageArgs {
    /// Region boundaries (GeoJSON FeatureCollection)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub geojson: PathBuf,

    /// Long-format value table (CSV)
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub values: PathBuf,

    #[command(flatten)]
    pub selection: SelectionArgs,
}
