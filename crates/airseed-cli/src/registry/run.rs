use std::fs::{OpenOptions, create_dir_all};
use std::path::{Path, PathBuf};
use std::process::Command;

use chrono::{DateTime, Utc};
use serde::Serialize;

use airseed_generate::GenerateOptions;

use super::{RegistryError, RegistryResult};

/// Metadata captured at run start.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub run_dir: PathBuf,
    pub options: GenerateOptions,
    pub reference: ReferenceFiles,
    pub database: Option<PathBuf>,
}

/// Reference files feeding the entity factory, if any.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceFiles {
    pub airports: Option<PathBuf>,
    pub airlines: Option<PathBuf>,
}

/// JSON config written to each run directory.
#[derive(Debug, Serialize)]
pub struct RunConfig<'a> {
    pub run_id: &'a str,
    pub started_at: String,
    pub version: &'static str,
    pub options: &'a GenerateOptions,
    pub reference: &'a ReferenceFiles,
    pub database: Option<&'a Path>,
    pub git: GitInfo,
}

/// Git metadata for reproducibility.
#[derive(Debug, Serialize)]
pub struct GitInfo {
    pub commit: Option<String>,
    pub dirty: Option<bool>,
}

/// Paths for run artifacts.
#[derive(Debug, Clone)]
pub struct RunPaths {
    pub root: PathBuf,
    pub config_path: PathBuf,
    pub logs_path: PathBuf,
}

/// Create `{timestamp}__run_{id}` under the run dir and write `config.json`.
pub fn start_run(ctx: &RunContext) -> RegistryResult<RunPaths> {
    let timestamp = ctx.started_at.format("%Y-%m-%dT%H-%M-%SZ").to_string();
    let root = ctx.run_dir.join(format!("{timestamp}__run_{}", ctx.run_id));

    create_dir_all(&root)?;

    let config_path = root.join("config.json");
    let logs_path = root.join("logs.ndjson");

    let config = RunConfig {
        run_id: &ctx.run_id,
        started_at: ctx.started_at.to_rfc3339(),
        version: env!("CARGO_PKG_VERSION"),
        options: &ctx.options,
        reference: &ctx.reference,
        database: ctx.database.as_deref(),
        git: collect_git_info(),
    };

    write_json(&config_path, &config)?;

    OpenOptions::new()
        .create(true)
        .append(true)
        .open(&logs_path)?;

    Ok(RunPaths {
        root,
        config_path,
        logs_path,
    })
}

pub fn collect_git_info() -> GitInfo {
    let commit = Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .and_then(|output| {
            if output.status.success() {
                Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
            } else {
                None
            }
        })
        .filter(|value| !value.is_empty());

    let dirty = Command::new("git")
        .args(["status", "--porcelain"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| !output.stdout.is_empty());

    GitInfo { commit, dirty }
}

pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> RegistryResult<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            create_dir_all(parent)?;
        }
    }
    let file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    serde_json::to_writer_pretty(file, value).map_err(RegistryError::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_run_dir(label: &str) -> PathBuf {
        let mut dir = std::env::temp_dir();
        dir.push(format!("airseed_cli_{label}_{}", uuid::Uuid::new_v4()));
        dir
    }

    #[test]
    fn start_run_writes_config_and_log_file() {
        let run_dir = temp_run_dir("registry");
        let ctx = RunContext {
            run_id: "0000-test".to_string(),
            started_at: DateTime::parse_from_rfc3339("2025-05-01T10:20:30Z")
                .expect("parse timestamp")
                .with_timezone(&Utc),
            run_dir: run_dir.clone(),
            options: GenerateOptions::default(),
            reference: ReferenceFiles::default(),
            database: None,
        };

        let paths = start_run(&ctx).expect("start run");
        assert_eq!(
            paths.root,
            run_dir.join("2025-05-01T10-20-30Z__run_0000-test")
        );
        assert!(paths.logs_path.exists());

        let config: serde_json::Value = serde_json::from_str(
            &std::fs::read_to_string(&paths.config_path).expect("read config.json"),
        )
        .expect("parse config.json");
        assert_eq!(config["run_id"], "0000-test");
        assert_eq!(config["options"]["seed"], 42);
        assert_eq!(config["options"]["window"]["duration_days"], 120);
    }
}
