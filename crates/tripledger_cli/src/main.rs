//! CLI report probe.
//!
//! # Responsibility
//! - Verify `tripledger_core` linkage (`ping`/version with no arguments).
//! - Print one report as pretty JSON for a store file.
//!
//! Usage:
//!   tripledger_cli
//!   tripledger_cli <db-path> <cost|stats|days|route> <trip-id>
//!   tripledger_cli <db-path> spending <user-id>

use serde_json::Value;
use std::process::ExitCode;
use tripledger_core::{
    AnalyticsError, AnalyticsService, DocumentTravelRepository, RepoError, SqliteDocumentStore,
};

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        println!("tripledger_core ping={}", tripledger_core::ping());
        println!("tripledger_core version={}", tripledger_core::core_version());
        return ExitCode::SUCCESS;
    }

    match run(&args) {
        Ok(report) => {
            println!("{report:#}");
            ExitCode::SUCCESS
        }
        Err(message) => {
            eprintln!("error: {message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<Value, String> {
    let [db_path, command, id] = args else {
        return Err(
            "usage: tripledger_cli <db-path> <cost|stats|days|route|spending> <id>".to_string(),
        );
    };

    let store = SqliteDocumentStore::open(db_path).map_err(|err| err.to_string())?;
    let service = AnalyticsService::new(DocumentTravelRepository::new(store));

    let report = match command.as_str() {
        "cost" => service.cost_report(id).map(to_json),
        "stats" => service.trip_statistics(id).map(to_json),
        "days" => service.day_breakdown(id).map(to_json),
        "route" => service.route_advisory(id).map(to_json),
        "spending" => service.spending_patterns(id).map(to_json),
        other => return Err(format!("unknown report `{other}`")),
    };

    report.map_err(describe_failure)?
}

fn describe_failure(err: AnalyticsError) -> String {
    match err {
        AnalyticsError::TripNotFound(_) => format!("not found: {err}"),
        AnalyticsError::Repo(RepoError::InvalidData { .. }) => format!("invalid data: {err}"),
        AnalyticsError::Repo(RepoError::Store(_)) => format!("storage failure: {err}"),
        AnalyticsError::WorkerPanicked(_) => format!("internal error: {err}"),
    }
}

fn to_json<T: serde::Serialize>(report: T) -> Result<Value, String> {
    serde_json::to_value(report).map_err(|err| err.to_string())
}
