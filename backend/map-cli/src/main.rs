// Reads a custom map from JSON, and prints its colored board and destination tickets.

use clap::Parser;
use log::{debug, LevelFilter};
use map_builder::place::MapDescription;
use map_builder::{generate, GeneratorConfig, MapError};
use std::fs::read_to_string;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;


/// Generate the board and the tickets of a custom Ticket To Ride map.
#[derive(Debug, Parser)]
#[command(about, long_about = None, version)]
struct Args {
    /// JSON file listing the locations and the connections of the map
    #[arg(short, long)]
    map: PathBuf,

    /// JSON file tuning the budgets, the ticket counts and the seeds
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the colors, tunnels and locomotives (overrides the config file)
    #[arg(long)]
    seed_board: Option<u64>,

    /// Seed for both decks of tickets (overrides the config file)
    #[arg(long)]
    seed_tickets: Option<u64>,

    /// Indent the printed JSON
    #[arg(short, long, default_value_t = false)]
    pretty: bool,

    /// Enable debug messages
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Could not read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not parse {what}: {source}")]
    Json {
        what: String,
        source: serde_json::Error,
    },

    #[error(transparent)]
    Map(#[from] MapError),
}

fn read_file(path: &Path) -> Result<String, CliError> {
    read_to_string(path).map_err(|source| CliError::Io {
        path: path.to_owned(),
        source,
    })
}

fn parse_config(config_json: Option<&str>) -> Result<GeneratorConfig, CliError> {
    match config_json {
        Some(json) => serde_json::from_str(json).map_err(|source| CliError::Json {
            what: String::from("the config"),
            source,
        }),
        None => Ok(GeneratorConfig::default()),
    }
}

/// Generates the assets of the map, and renders them as JSON.
fn render(map_json: &str, config: &GeneratorConfig, pretty: bool) -> Result<String, CliError> {
    let map: MapDescription = serde_json::from_str(map_json).map_err(|source| CliError::Json {
        what: String::from("the map"),
        source,
    })?;
    debug!(
        "Parsed {} locations and {} connections.",
        map.locations.len(),
        map.connections.len()
    );

    let assets = generate(&map, config)?;

    let rendered = if pretty {
        serde_json::to_string_pretty(&assets)
    } else {
        serde_json::to_string(&assets)
    };
    rendered.map_err(|source| CliError::Json {
        what: String::from("the generated assets"),
        source,
    })
}

fn run(args: &Args) -> Result<String, CliError> {
    let map_json = read_file(&args.map)?;
    let config_json = args.config.as_deref().map(read_file).transpose()?;

    let mut config = parse_config(config_json.as_deref())?;
    if let Some(seed) = args.seed_board {
        config.board_seed = seed;
    }
    if let Some(seed) = args.seed_tickets {
        config.ticket_seed = seed;
    }

    render(&map_json, &config, args.pretty)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let mut logger = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("warn"),
    );
    if args.verbose {
        logger.filter_level(LevelFilter::Debug);
    }
    logger.init();

    match run(&args) {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
