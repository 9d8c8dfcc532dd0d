//! Command-line front end for the organization directory.
//!
//! # Responsibility
//! - Map subcommands onto `orgdir_api::DirectoryApi` calls.
//! - Print results as pretty JSON on stdout and errors as JSON on stderr.
//!
//! # Configuration
//! - `ORGDIR_DB_PATH`, `ORGDIR_LOG_LEVEL` and `ORGDIR_LOG_DIR` supply
//!   defaults; `--db`, `--log-level` and `--log-dir` override them.
//!
//! # Exit codes
//! - `0` success, `2` invalid parameter or not found, `1` anything else.

use clap::{Parser, Subcommand};
use log::info;
use orgdir_api::{init_logging_from_config, ApiConfig, ApiError, ApiResult, DirectoryApi};
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "orgdir", version, about = "Query the organization directory")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Log level (trace|debug|info|warn|error).
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off without it.
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// Mirror log records to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the schema and load demo data into an empty database.
    Seed,
    /// Show one organization with building, occupations and phones.
    Get { id: i64 },
    /// List organizations located in a building.
    ByBuilding { building_id: i64 },
    /// List organizations for an occupation and its subtree.
    ByOccupation {
        occupation_id: i64,
        /// Match the occupation itself only.
        #[arg(long)]
        exact: bool,
        /// Subtree depth (1..=10); the effective depth never exceeds 3.
        #[arg(long, conflicts_with = "exact")]
        max_depth: Option<u32>,
    },
    /// Case-insensitive organization name search.
    Search {
        query: String,
        #[arg(long)]
        limit: Option<u32>,
    },
    /// List every building.
    Buildings,
    /// Buildings (or organizations with --orgs) within a radius.
    Radius {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
        /// Radius in meters.
        #[arg(long)]
        meters: f64,
        #[arg(long)]
        orgs: bool,
    },
    /// Buildings (or organizations with --orgs) inside a bounding box.
    Bounds {
        #[arg(long, allow_negative_numbers = true)]
        min_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        max_lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        min_lon: f64,
        #[arg(long, allow_negative_numbers = true)]
        max_lon: f64,
        #[arg(long)]
        orgs: bool,
    },
}

#[derive(Serialize)]
struct ErrorOutput<'a> {
    error: &'a str,
    status: u16,
    message: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = resolve_config(&cli, ApiConfig::from_env());

    if let Err(err) = init_logging_from_config(&config, cli.verbose) {
        eprintln!("orgdir: logging setup failed: {err}");
        return ExitCode::FAILURE;
    }
    info!(
        "event=cli_start module=cli status=ok version={} db_path={}",
        env!("CARGO_PKG_VERSION"),
        config.db_path.display()
    );

    let api = DirectoryApi::from_config(&config);
    run(&api, cli.command).await
}

/// Applies command-line overrides on top of the environment config.
fn resolve_config(cli: &Cli, mut config: ApiConfig) -> ApiConfig {
    if let Some(db) = &cli.db {
        config.db_path = db.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    if let Some(dir) = &cli.log_dir {
        config.log_dir = Some(dir.clone());
    }
    config
}

async fn run(api: &DirectoryApi, command: Command) -> ExitCode {
    match command {
        Command::Seed => emit(api.seed_demo().await),
        Command::Get { id } => emit(api.get_organization(id).await),
        Command::ByBuilding { building_id } => emit(api.list_by_building(building_id).await),
        Command::ByOccupation {
            occupation_id,
            exact,
            max_depth: None,
        } if !exact => emit(api.search_by_occupation_hierarchy(occupation_id).await),
        Command::ByOccupation {
            occupation_id,
            exact,
            max_depth,
        } => emit(api.list_by_occupation(occupation_id, !exact, max_depth).await),
        Command::Search { query, limit } => emit(api.search_by_name(&query, limit).await),
        Command::Buildings => emit(api.list_buildings().await),
        Command::Radius {
            lat,
            lon,
            meters,
            orgs: true,
        } => emit(api.list_organizations_within_radius(lat, lon, meters).await),
        Command::Radius {
            lat, lon, meters, ..
        } => emit(api.list_buildings_within_radius(lat, lon, meters).await),
        Command::Bounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            orgs: true,
        } => emit(
            api.list_organizations_within_bounds(min_lat, max_lat, min_lon, max_lon)
                .await,
        ),
        Command::Bounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
            ..
        } => emit(
            api.list_buildings_within_bounds(min_lat, max_lat, min_lon, max_lon)
                .await,
        ),
    }
}

fn emit<T: Serialize>(result: ApiResult<T>) -> ExitCode {
    match result {
        Ok(value) => match serde_json::to_string_pretty(&value) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(err) => {
                eprintln!("orgdir: failed to encode output: {err}");
                ExitCode::FAILURE
            }
        },
        Err(err) => {
            report(&err);
            ExitCode::from(exit_status(&err))
        }
    }
}

fn report(err: &ApiError) {
    let output = ErrorOutput {
        error: err.code(),
        status: err.status_code(),
        message: err.to_string(),
    };
    match serde_json::to_string(&output) {
        Ok(json) => eprintln!("{json}"),
        Err(_) => eprintln!("orgdir: {err}"),
    }
}

fn exit_status(err: &ApiError) -> u8 {
    if err.status_code() < 500 {
        2
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::{exit_status, resolve_config, Cli, Command};
    use clap::Parser;
    use orgdir_api::config::{DB_PATH_ENV, LOG_LEVEL_ENV};
    use orgdir_api::{ApiConfig, ApiError};
    use std::path::PathBuf;

    #[test]
    fn radius_accepts_negative_coordinates() {
        let cli = Cli::try_parse_from([
            "orgdir", "radius", "--lat", "-33.86", "--lon", "-151.2", "--meters", "250", "--orgs",
        ])
        .unwrap();
        match cli.command {
            Command::Radius {
                lat,
                lon,
                meters,
                orgs,
            } => {
                assert_eq!(lat, -33.86);
                assert_eq!(lon, -151.2);
                assert_eq!(meters, 250.0);
                assert!(orgs);
            }
            _ => panic!("expected radius command"),
        }
    }

    #[test]
    fn global_db_flag_is_accepted_after_subcommand() {
        let cli = Cli::try_parse_from(["orgdir", "get", "7", "--db", "/tmp/x.sqlite3"]).unwrap();
        assert_eq!(cli.db.as_deref(), Some(std::path::Path::new("/tmp/x.sqlite3")));
        assert!(matches!(cli.command, Command::Get { id: 7 }));
    }

    #[test]
    fn exact_conflicts_with_max_depth() {
        assert!(Cli::try_parse_from([
            "orgdir",
            "by-occupation",
            "1",
            "--exact",
            "--max-depth",
            "2"
        ])
        .is_err());
    }

    #[test]
    fn client_errors_exit_with_two() {
        let not_found = ApiError::NotFound {
            entity: "organization",
            id: 1,
        };
        assert_eq!(exit_status(&not_found), 2);
        assert_eq!(exit_status(&ApiError::Worker("cancelled".into())), 1);
    }

    #[test]
    fn flags_override_environment_values() {
        let env = ApiConfig::from_lookup(|key| match key {
            DB_PATH_ENV => Some("/srv/env.sqlite3".to_string()),
            LOG_LEVEL_ENV => Some("warn".to_string()),
            _ => None,
        });
        let cli = Cli::try_parse_from(["orgdir", "--db", "/tmp/flag.sqlite3", "buildings"]).unwrap();

        let config = resolve_config(&cli, env);

        assert_eq!(config.db_path, PathBuf::from("/tmp/flag.sqlite3"));
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.log_dir, None);
    }
}
