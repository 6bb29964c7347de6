//! Biochart CLI
//!
//! Builds time-of-day chart datasets from a JSON file of biometric readings.

use biochart::{
    build_chart, Config, IntervalPreset, MemoryStore, Reading, ReadingStore, ReadingType, VERSION,
};
use chrono::NaiveDateTime;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "biochart")]
#[command(version = VERSION)]
#[command(about = "Temporal-binning and aggregation engine for biometric chart data", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a chart dataset from a readings file
    Build {
        /// JSON file mapping person ids to arrays of readings
        #[arg(long, short)]
        input: PathBuf,

        /// Person whose readings to chart
        #[arg(long)]
        person: String,

        /// Inclusive range start (e.g. 2022-09-01T00:00:00)
        #[arg(long)]
        from: String,

        /// Inclusive range end
        #[arg(long)]
        to: String,

        /// Restrict the build to one reading type
        #[arg(long)]
        reading_type: Option<String>,

        /// Named interval preset (hourly = 120 minute buckets)
        #[arg(long)]
        preset: Option<String>,

        /// Bucket interval in minutes (overrides the preset)
        #[arg(long)]
        interval: Option<i64>,

        /// Write the dataset here instead of stdout
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// List named interval presets
    Presets,

    /// Show configuration
    Config,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Build {
            input,
            person,
            from,
            to,
            reading_type,
            preset,
            interval,
            output,
        } => cmd_build(
            &input,
            &person,
            &from,
            &to,
            reading_type.as_deref(),
            preset.as_deref(),
            interval,
            output.as_deref(),
        ),
        Commands::Presets => cmd_presets(),
        Commands::Config => cmd_config(),
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_build(
    input: &PathBuf,
    person: &str,
    from: &str,
    to: &str,
    reading_type: Option<&str>,
    preset: Option<&str>,
    interval: Option<i64>,
    output: Option<&std::path::Path>,
) {
    let config = Config::load().unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}");
        std::process::exit(1);
    });

    let start = parse_datetime(from);
    let end = parse_datetime(to);
    let type_filter = reading_type.map(|s| {
        s.parse::<ReadingType>().unwrap_or_else(|e| {
            eprintln!("{e}");
            std::process::exit(1);
        })
    });

    let interval_minutes = match (interval, preset) {
        (Some(minutes), _) => minutes,
        (None, Some("hourly")) => IntervalPreset::Hourly.interval_minutes(),
        (None, Some(other)) => {
            eprintln!("Unknown preset: {other} (see `biochart presets`)");
            std::process::exit(1);
        }
        (None, None) => config.default_interval_minutes,
    };

    let content = std::fs::read_to_string(input).unwrap_or_else(|e| {
        eprintln!("Failed to read {}: {e}", input.display());
        std::process::exit(1);
    });
    let readings_by_person: HashMap<String, Vec<Reading>> = serde_json::from_str(&content)
        .unwrap_or_else(|e| {
            eprintln!("Failed to parse readings: {e}");
            std::process::exit(1);
        });

    let mut store = MemoryStore::new();
    for (person_id, readings) in readings_by_person {
        store.insert_batch(person_id, readings);
    }
    let store: Arc<dyn ReadingStore> = Arc::new(store);

    let dataset = build_chart(
        store,
        person,
        start,
        end,
        type_filter,
        interval_minutes,
        Duration::from_secs(config.fetch_timeout_secs),
    )
    .unwrap_or_else(|e| {
        eprintln!("Chart build failed: {e}");
        std::process::exit(1);
    });

    if dataset.is_empty() {
        eprintln!("No readings for {person} in the requested range");
    }

    let json = serde_json::to_string_pretty(&dataset).unwrap_or_else(|e| {
        eprintln!("Failed to serialize dataset: {e}");
        std::process::exit(1);
    });

    match output {
        Some(path) => {
            if let Err(e) = std::fs::write(path, json) {
                eprintln!("Failed to write {}: {e}", path.display());
                std::process::exit(1);
            }
            println!("Dataset written to {}", path.display());
        }
        None => println!("{json}"),
    }
}

fn cmd_presets() {
    println!(
        "hourly  {} minute buckets",
        IntervalPreset::Hourly.interval_minutes()
    );
}

fn cmd_config() {
    match Config::load() {
        Ok(config) => {
            println!("Config path: {}", Config::config_path().display());
            println!("Default interval: {} minutes", config.default_interval_minutes);
            println!("Fetch timeout: {}s", config.fetch_timeout_secs);
        }
        Err(e) => {
            eprintln!("Failed to load config: {e}");
            std::process::exit(1);
        }
    }
}

fn parse_datetime(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap_or_else(|e| {
        eprintln!("Invalid datetime {s:?} (expected e.g. 2022-09-01T00:00:00): {e}");
        std::process::exit(1);
    })
}
