mod registry;
mod settings;

use std::path::PathBuf;
use std::time::Instant;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use registry::{ReferenceFiles, RunContext, init_run_logging, start_run};
use thiserror::Error;
use uuid::Uuid;

use airseed_generate::output::{write_batch_csv, write_report_json};
use airseed_generate::{GenerateOptions, GenerationEngine, GenerationError, ReferenceData};
use airseed_store::{SqliteStore, StoreError, StoreOptions, persist_batch};

#[derive(Debug, Error)]
enum CliError {
    #[error("registry error: {0}")]
    Registry(#[from] registry::RegistryError),
    #[error("settings error: {0}")]
    Settings(#[from] settings::SettingsError),
    #[error("generation error: {0}")]
    Generation(#[from] GenerationError),
    #[error("store error: {0}")]
    Store(#[from] StoreError),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Parser, Debug)]
#[command(name = "airseed", version, about = "Deterministic flight-booking dataset generator")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a dataset into a new run directory.
    Generate(GenerateArgs),
    /// Print the JSON Schema of the configuration file.
    ConfigSchema(OutputArgs),
    /// Print the default configuration as TOML.
    ConfigDefaults(OutputArgs),
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// TOML configuration file.
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,
    /// Random seed.
    #[arg(long)]
    seed: Option<u64>,
    /// Multiplier applied to every base cardinality.
    #[arg(long)]
    scale: Option<f64>,
    /// Days between the anchor date and the first scheduled day.
    #[arg(long, allow_negative_numbers = true)]
    start_offset_days: Option<i64>,
    /// Number of scheduled days.
    #[arg(long, allow_negative_numbers = true)]
    days: Option<i64>,
    /// Date treated as "now" (YYYY-MM-DD); defaults to today in UTC.
    #[arg(long, value_name = "DATE")]
    anchor: Option<NaiveDate>,
    /// City receiving airports; repeat to replace the configured list.
    #[arg(long = "city", value_name = "NAME")]
    cities: Vec<String>,
    /// OpenFlights `airports.dat` with real airport codes.
    #[arg(long, value_name = "FILE")]
    airports_file: Option<PathBuf>,
    /// OpenFlights `airlines.dat` with real airline codes.
    #[arg(long, value_name = "FILE")]
    airlines_file: Option<PathBuf>,
    /// Output directory for runs.
    #[arg(long, default_value = "runs")]
    run_dir: PathBuf,
    /// SQLite database to persist the dataset into.
    #[arg(long, value_name = "FILE")]
    db: Option<PathBuf>,
}

impl GenerateArgs {
    /// Layer command-line values over `options` and pin the window anchor to
    /// `today` when none is set, so `config.json` replays the same window.
    fn apply_overrides(&self, options: &mut GenerateOptions, today: NaiveDate) {
        if let Some(seed) = self.seed {
            options.seed = seed;
        }
        if let Some(scale) = self.scale {
            options.scale = scale;
        }
        if let Some(offset) = self.start_offset_days {
            options.window.start_offset_days = offset;
        }
        if let Some(days) = self.days {
            options.window.duration_days = days;
        }
        if let Some(anchor) = self.anchor {
            options.window.anchor = Some(anchor);
        }
        if !self.cities.is_empty() {
            options.cities = self.cities.clone();
        }
        options.window.anchor.get_or_insert(today);
    }
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write to this file instead of stdout.
    #[arg(long)]
    out: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), CliError> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate(args) => run_generate(args).await,
        Command::ConfigSchema(args) => {
            let schema = settings::config_schema();
            emit(args.out, &serde_json::to_string_pretty(&schema)?)
        }
        Command::ConfigDefaults(args) => emit(args.out, &settings::default_options_toml()?),
    }
}

async fn run_generate(args: GenerateArgs) -> Result<(), CliError> {
    let mut options = settings::load_options(args.config.as_deref())?;
    args.apply_overrides(&mut options, chrono::Utc::now().date_naive());

    let run_id = Uuid::new_v4().to_string();
    let run_ctx = RunContext {
        run_id: run_id.clone(),
        started_at: chrono::Utc::now(),
        run_dir: args.run_dir.clone(),
        options: options.clone(),
        reference: ReferenceFiles {
            airports: args.airports_file.clone(),
            airlines: args.airlines_file.clone(),
        },
        database: args.db.clone(),
    };

    let run_paths = start_run(&run_ctx)?;
    init_run_logging(&run_paths.logs_path)?;

    tracing::info!(
        event = "run_started",
        run_id = %run_id,
        config = %run_paths.config_path.display(),
        seed = options.seed,
        scale = options.scale
    );
    let timer = Instant::now();

    let mut engine = GenerationEngine::new(options);
    if args.airports_file.is_some() || args.airlines_file.is_some() {
        let reference = ReferenceData::from_paths(
            args.airports_file.as_deref(),
            args.airlines_file.as_deref(),
        )?;
        tracing::info!(
            event = "reference_loaded",
            airports = reference.airports.len(),
            airlines = reference.airlines.len()
        );
        engine = engine.with_reference(reference);
    }

    let output = engine.run()?;

    let artifacts = write_batch_csv(&run_paths.root, &output.batch).map_err(GenerationError::from)?;
    for artifact in &artifacts {
        tracing::info!(
            event = "csv_written",
            table = %artifact.kind,
            rows = artifact.rows,
            bytes = artifact.bytes,
            path = %artifact.path.display()
        );
    }
    let report_path = write_report_json(&run_paths.root, &output.report)?;
    tracing::info!(event = "report_written", path = %report_path.display());

    if let Some(db) = &args.db {
        let mut store = SqliteStore::connect(&StoreOptions::file(db)).await?;
        let persisted = persist_batch(&mut store, &output.batch).await?;
        let inserted: u64 = persisted.tables.iter().map(|table| table.inserted).sum();
        tracing::info!(event = "dataset_persisted", path = %db.display(), inserted);
    }

    let duration_ms = timer.elapsed().as_millis() as u64;
    tracing::info!(
        event = "run_finished",
        status = "success",
        warnings = output.report.warnings.len(),
        duration_ms
    );

    println!("{}", run_paths.root.display());
    Ok(())
}

fn emit(out: Option<PathBuf>, content: &str) -> Result<(), CliError> {
    match out {
        Some(path) => std::fs::write(path, content)?,
        None => println!("{content}"),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generate_args(argv: &[&str]) -> GenerateArgs {
        let cli = Cli::try_parse_from(argv).expect("parse arguments");
        match cli.command {
            Command::Generate(args) => args,
            other => panic!("expected generate, got {other:?}"),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn missing_anchor_is_pinned_to_today() {
        let args = generate_args(&["airseed", "generate", "--seed", "9"]);
        let mut options = GenerateOptions::default();
        args.apply_overrides(&mut options, date(2025, 7, 4));
        assert_eq!(options.seed, 9);
        assert_eq!(options.window.anchor, Some(date(2025, 7, 4)));

        let recorded = serde_json::to_value(&options).expect("encode options");
        assert_eq!(recorded["window"]["anchor"], "2025-07-04");
    }

    #[test]
    fn explicit_anchor_is_kept() {
        let args = generate_args(&[
            "airseed",
            "generate",
            "--anchor",
            "2025-01-15",
            "--city",
            "Athens",
            "--city",
            "Rome",
        ]);
        let mut options = GenerateOptions::default();
        args.apply_overrides(&mut options, date(2025, 7, 4));
        assert_eq!(options.window.anchor, Some(date(2025, 1, 15)));
        assert_eq!(options.cities, vec!["Athens", "Rome"]);
    }
}
