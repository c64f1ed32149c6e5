//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `geotodo_core` linkage and schema bootstrap without a UI shell.
//! - Keep output deterministic for quick local sanity checks.
//!
//! Usage: `geotodo_cli [config.json]`. Without a config file the defaults
//! apply: temp-dir database, logging off.

use geotodo_core::db::migrations::{latest_version, schema_version};
use geotodo_core::{bootstrap, AppConfig, SqliteTaskRepository, TaskListController};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("geotodo_core ping={}", geotodo_core::ping());
    println!("geotodo_core version={}", geotodo_core::core_version());

    match check_store() {
        Ok((version, count)) => {
            println!("geotodo_core schema_version={version} latest={}", latest_version());
            println!("geotodo_core tasks={count}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("geotodo_core store check failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn load_config() -> Result<AppConfig, geotodo_core::ConfigError> {
    match std::env::args_os().nth(1) {
        Some(path) => AppConfig::load(path),
        None => Ok(AppConfig::default()),
    }
}

fn check_store() -> Result<(u32, usize), Box<dyn std::error::Error>> {
    let config = load_config()?;
    let conn = bootstrap(&config)?;
    let version = schema_version(&conn)?;
    let mut tasks = TaskListController::new(SqliteTaskRepository::try_new(&conn)?);
    let count = tasks.load()?;
    Ok((version, count))
}
