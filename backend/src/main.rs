//! KonOpas CLI - Publish convention program sheets and pocket schedules
//!
//! # Main Commands
//!
//! ```bash
//! konopas sync                         # Fetch sheets from konopas.json, write data files
//! konopas sync --config con.json       # Same, with an explicit config
//! konopas decode program.csv           # Decode a local CSV export to a data file
//! konopas pocket --output pocket.html  # Render the pocket schedule from data/program.js
//! ```
//!
//! Set `RUST_LOG=debug` for per-cell decoding traces.

use clap::{Parser, Subcommand};
use konopas::{
    build_pocket_schedule, decode_csv_file, sync_sheets, to_js_var, GridOptions,
    SyncConfig,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "konopas")]
#[command(about = "Publish Google Sheets as KonOpas data files and pocket schedules", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch every configured sheet and write its data file
    Sync {
        /// Config file (default: $KONOPAS_CONFIG or konopas.json)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Decode a local CSV export into a data file
    Decode {
        /// Input CSV file
        input: PathBuf,

        /// Variable name in the data file
        #[arg(short, long, default_value = "program")]
        name: String,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Render the pocket schedule of a program data file
    Pocket {
        /// Program data file
        #[arg(short, long, default_value = "data/program.js")]
        program: PathBuf,

        /// Config file providing column options
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Columns shown first, in this order
        #[arg(short, long, value_delimiter = ',')]
        locations: Vec<String>,

        /// Columns never shown
        #[arg(short, long, value_delimiter = ',')]
        exclude: Vec<String>,

        /// Output HTML file
        #[arg(short, long, default_value = "pocket.html")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    // Load .env file (if present)
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Sync { config } => cmd_sync(config).await,

        Commands::Decode {
            input,
            name,
            output,
        } => cmd_decode(&input, &name, output.as_deref()),

        Commands::Pocket {
            program,
            config,
            locations,
            exclude,
            output,
        } => cmd_pocket(&program, config.as_deref(), locations, exclude, &output),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn cmd_sync(config: Option<PathBuf>) -> Result<(), Box<dyn std::error::Error>> {
    let path = config.unwrap_or_else(SyncConfig::default_path);
    eprintln!("Using config: {}", path.display());

    let config = SyncConfig::load(&path)?;
    let report = sync_sheets(&config).await?;

    for sheet in &report.sheets {
        eprintln!(
            "   {}: {} rows, {} records, {} dropped",
            sheet.name, sheet.row_count, sheet.record_count, sheet.skipped_count
        );
    }
    eprintln!(
        "Published {} records in {} sheet(s)",
        report.record_count(),
        report.sheets.len()
    );
    Ok(())
}

fn cmd_decode(
    input: &Path,
    name: &str,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Decoding CSV: {}", input.display());

    let result = decode_csv_file(input)?;
    eprintln!("   {}", result.summary());

    let js = to_js_var(name, &result.records)?;
    write_output(&js, output)?;
    Ok(())
}

fn cmd_pocket(
    program: &Path,
    config: Option<&Path>,
    locations: Vec<String>,
    exclude: Vec<String>,
    output: &Path,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = match config {
        Some(path) => SyncConfig::load(path)?.schedule,
        None => GridOptions::default(),
    };
    if !locations.is_empty() {
        options.locations = locations;
    }
    if !exclude.is_empty() {
        options.exclude = exclude;
    }

    eprintln!("Building pocket schedule: {}", program.display());
    let schedule = build_pocket_schedule(program, &options, output)?;

    eprintln!(
        "   {} day(s), {} column(s), {} warning(s)",
        schedule.days.len(),
        schedule.locations.len(),
        schedule.diagnostics.warning_count()
    );
    eprintln!("Output written to: {}", output.display());
    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
