mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::{areas, coverage, render};
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

/// Log to stderr; `-v` / `-vv` raise the default level, RUST_LOG overrides it.
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::INFO,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };

    let _ = tracing_subscriber::fmt::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(level.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

pub fn run() -> anyhow::Result<()> {
    use clap::Parser;

    let cli = Cli::parse();
    init_logging(cli.verbose);

    match &cli.command {
        Commands::Render(args) => render::run(&cli, args),
        Commands::Areas(args) => areas::run(&cli, args),
        Commands::Coverage(args) => coverage::run(&cli, args),
    }
}

fn main() -> anyhow::Result<()> { run() }
