use std::env;
use std::path::PathBuf;

use airseed_generate::output::{write_batch_csv, write_report_json};
use airseed_generate::{GenerateOptions, GenerationEngine};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut args = env::args().skip(1);
    let mut options = GenerateOptions::default();
    let mut out_dir: Option<PathBuf> = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--seed" => options.seed = args.next().ok_or("missing --seed value")?.parse()?,
            "--scale" => options.scale = args.next().ok_or("missing --scale value")?.parse()?,
            "--days" => {
                options.window.duration_days = args.next().ok_or("missing --days value")?.parse()?
            }
            "--out" => out_dir = args.next().map(PathBuf::from),
            _ => return Err(format!("unexpected argument '{arg}'").into()),
        }
    }

    let out_dir = out_dir.ok_or("missing --out directory")?;
    std::fs::create_dir_all(&out_dir)?;

    let output = GenerationEngine::new(options).run()?;
    for artifact in write_batch_csv(&out_dir, &output.batch)? {
        println!("{}={} rows", artifact.kind, artifact.rows);
    }
    let report = write_report_json(&out_dir, &output.report)?;
    println!("report={}", report.display());
    Ok(())
}
