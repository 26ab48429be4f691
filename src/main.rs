//! urqr entrypoint

use clap::Parser;
use std::path::PathBuf;
use urqr::logging::{self, Console};
use urqr::{Result, UrqrConfig};

#[derive(Parser, Debug)]
#[command(
    name = "urqr",
    version,
    about = "Render the project URL as a QR code PNG and open it"
)]
struct Cli {
    /// Optional configuration file (toml/yaml). Defaults to urqr.{toml,yaml} in cwd/XDG config.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the generation report as JSON instead of human-readable text
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = UrqrConfig::load(cli.config.as_deref())?;

    logging::init(&config.logging, Console::for_report(cli.json))?;
    match &config.source {
        Some(path) => tracing::info!("Using configuration file: {}", path.display()),
        None => tracing::debug!("No urqr.toml / urqr.yaml found, using defaults"),
    }

    let report = urqr::run(&config)?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report.to_json()?)?);
    } else {
        for line in report.human_lines() {
            println!("{line}");
        }
    }

    Ok(())
}
