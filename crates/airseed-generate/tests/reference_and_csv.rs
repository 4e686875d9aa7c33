use std::fs;
use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use airseed_generate::output::{REPORT_FILE, write_batch_csv, write_report_json};
use airseed_generate::{GenerateOptions, GenerationEngine, ReferenceData, ScheduleWindow};

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn temp_out_dir(label: &str) -> PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!("airseed_generate_{label}_{}", uuid::Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp out dir");
    dir
}

fn hash_file(path: &Path) -> String {
    let bytes = fs::read(path).unwrap_or_else(|_| panic!("missing file {}", path.display()));
    hex::encode(Sha256::digest(&bytes))
}

fn anchor() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 11, 20).expect("valid date")
}

fn options() -> GenerateOptions {
    GenerateOptions {
        seed: 1234,
        scale: 0.01,
        window: ScheduleWindow {
            anchor: Some(anchor()),
            start_offset_days: 2,
            duration_days: 10,
        },
        ..GenerateOptions::default()
    }
}

#[test]
fn reference_files_are_parsed() {
    let reference = ReferenceData::from_paths(
        Some(fixture("airports.dat").as_path()),
        Some(fixture("airlines.dat").as_path()),
    )
    .expect("load reference data");

    let codes: Vec<&str> = reference.airports.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(codes, vec!["LHR", "LGW", "VIE", "ATH", "JFK"]);
    let airlines: Vec<&str> = reference.airlines.iter().map(|a| a.code.as_str()).collect();
    assert_eq!(airlines, vec!["BA", "A3"]);
}

#[test]
fn reference_names_flow_into_the_batch() {
    let reference = ReferenceData::from_paths(
        Some(fixture("airports.dat").as_path()),
        Some(fixture("airlines.dat").as_path()),
    )
    .expect("load reference data");
    let output = GenerationEngine::new(options())
        .with_reference(reference)
        .run_at(anchor())
        .expect("run generation");

    let athens: Vec<&str> = output
        .batch
        .airports
        .iter()
        .filter(|a| a.city == "Athens")
        .map(|a| a.id.as_str())
        .collect();
    assert_eq!(athens.first().copied(), Some("ATH"));
    assert_eq!(output.batch.airlines[0].name, "British Airways");
    assert!(
        output
            .batch
            .airports
            .iter()
            .any(|a| a.id == "JFK" && a.city == "New York" && a.country == "United States")
    );
}

#[test]
fn csv_files_are_byte_identical_across_runs() {
    let dirs = [temp_out_dir("csv_a"), temp_out_dir("csv_b")];
    let mut hashes = Vec::new();
    for dir in &dirs {
        let output = GenerationEngine::new(options())
            .run_at(anchor())
            .expect("run generation");
        let artifacts = write_batch_csv(dir, &output.batch).expect("write csv");
        assert_eq!(artifacts.len(), 6);
        hashes.push(
            artifacts
                .iter()
                .map(|artifact| hash_file(&artifact.path))
                .collect::<Vec<_>>(),
        );
    }
    assert_eq!(hashes[0], hashes[1]);
}

#[test]
fn csv_headers_and_timestamps_use_text_format() {
    let dir = temp_out_dir("csv_format");
    let output = GenerationEngine::new(options())
        .run_at(anchor())
        .expect("run generation");
    let artifacts = write_batch_csv(&dir, &output.batch).expect("write csv");
    for artifact in &artifacts {
        assert_eq!(artifact.rows, output.batch.len_of(artifact.kind) as u64);
        assert!(artifact.bytes > 0);
    }

    let flights = fs::read_to_string(dir.join("flight.csv")).expect("read flight.csv");
    let mut lines = flights.lines();
    assert_eq!(
        lines.next(),
        Some("id,airline_id,departure_airport_id,arrival_airport_id,departure_time,arrival_time,seat_capacity")
    );
    let first = lines.next().expect("one flight row");
    let fields: Vec<&str> = first.split(',').collect();
    assert_eq!(fields.len(), 7);
    assert!(
        chrono::NaiveDateTime::parse_from_str(fields[4], airseed_core::TIMESTAMP_FORMAT).is_ok(),
        "unexpected timestamp {}",
        fields[4]
    );

    let tickets = fs::read_to_string(dir.join("ticket.csv")).expect("read ticket.csv");
    assert!(tickets.starts_with("code,flight_id,airline_id,fare_class,price,availability"));
    assert!(tickets.contains(",economy,"));
}

#[test]
fn report_is_written_as_json() {
    let dir = temp_out_dir("report");
    let output = GenerationEngine::new(options())
        .run_at(anchor())
        .expect("run generation");
    let path = write_report_json(&dir, &output.report).expect("write report");
    assert_eq!(path, dir.join(REPORT_FILE));

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&path).expect("read report")).expect("parse report");
    assert_eq!(report.get("seed").and_then(|v| v.as_u64()), Some(1234));
    assert_eq!(
        report.get("window_start").and_then(|v| v.as_str()),
        Some("2025-11-22")
    );
    let tables = report
        .get("tables")
        .and_then(|v| v.as_array())
        .expect("tables array");
    assert_eq!(tables.len(), 6);
}
