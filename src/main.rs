extern crate log;
pub mod batch;
pub mod convert;
pub mod crs;
pub mod geofile;
use crate::batch::runner::{run_batch, BatchError};
use crate::geofile::drivers::enable_kml_drivers;
use anyhow::anyhow;
use clap::Parser;
use serde::Deserialize;
use std::path::PathBuf;
use std::{fs::read_to_string, path::Path};

const DEFAULT_INPUT_DIR: &str = "input_kml";
const DEFAULT_OUTPUT_DIR: &str = "output_geojson";

/// Convert every KML/KMZ file in a directory into a GeoJSON file.
#[derive(Parser, Debug, Default)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to an optional YAML config file.
    #[arg(short, long)]
    config_filepath: Option<PathBuf>,

    /// Directory to read KML/KMZ files from. Overrides the config file.
    #[arg(short, long)]
    input_dir: Option<PathBuf>,

    /// Directory to write GeoJSON files to. Overrides the config file.
    #[arg(short, long)]
    output_dir: Option<PathBuf>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(default)]
struct Config {
    input_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

#[derive(Debug, PartialEq)]
struct Directories {
    input_dir: PathBuf,
    output_dir: PathBuf,
}

fn read_config(config_filepath: &Path) -> anyhow::Result<Config> {
    if !config_filepath.exists() {
        return Err(anyhow!("Config file {:?} not found", config_filepath));
    }
    let config_contents = read_to_string(config_filepath)?;
    Ok(serde_yaml::from_str(&config_contents)?)
}

/// Command line flags take precedence over the config file, which takes precedence over the
/// defaults.
fn resolve_directories(args: Args, config: Config) -> Directories {
    Directories {
        input_dir: args
            .input_dir
            .or(config.input_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_INPUT_DIR)),
        output_dir: args
            .output_dir
            .or(config.output_dir)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
    }
}

fn try_main() -> anyhow::Result<()> {
    let args = Args::parse();
    let config = match &args.config_filepath {
        Some(config_filepath) => read_config(config_filepath)?,
        None => Config::default(),
    };
    let directories = resolve_directories(args, config);

    enable_kml_drivers();

    match run_batch(&directories.input_dir, &directories.output_dir) {
        Ok(_) => Ok(()),
        // Reported, but not a failure of the process.
        Err(err @ BatchError::MissingInputDirectory { .. }) => {
            log::error!("Error: {}", err);
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

fn main() {
    if std::env::var("RUST_LOG").is_err() {
        std::env::set_var("RUST_LOG", "info")
    }
    env_logger::init();
    if let Err(e) = try_main() {
        eprintln!("Error: {:?}", e);
        std::process::exit(1)
    }
}
