//! CLI inspection entry point.
//!
//! # Responsibility
//! - Verify `appletree_core` linkage against a real database file.
//! - Print schools as JSON lines for quick local checks.
//!
//! Usage: `appletree_cli <db-path> [list [name] | get <id>]`

use appletree_core::{
    core_version, open_db, SchoolListQuery, SchoolService, SqliteSchoolRepository,
};
use std::process::ExitCode;

const USAGE: &str = "usage: appletree_cli <db-path> [list [name] | get <id>]";

fn main() -> ExitCode {
    println!("appletree_core version={}", core_version());

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &[String]) -> Result<(), String> {
    let Some(db_path) = args.first() else {
        return Err(USAGE.to_string());
    };

    let conn = open_db(db_path).map_err(|err| format!("open failed: {err}"))?;
    let repo = SqliteSchoolRepository::try_new(&conn).map_err(|err| err.to_string())?;
    let service = SchoolService::new(repo);

    match args.get(1).map(String::as_str).unwrap_or("list") {
        "list" => {
            let query = SchoolListQuery {
                name: args.get(2).cloned().unwrap_or_default(),
                ..SchoolListQuery::default()
            };
            let page = service.list_schools(&query).map_err(|err| err.to_string())?;
            for school in &page.schools {
                println!("{}", to_json(school)?);
            }
            println!("{}", to_json(&page.metadata)?);
        }
        "get" => {
            let id = args
                .get(2)
                .and_then(|raw| raw.parse::<i64>().ok())
                .ok_or_else(|| USAGE.to_string())?;
            let school = service.get_school(id).map_err(|err| err.to_string())?;
            println!("{}", to_json(&school)?);
        }
        _ => return Err(USAGE.to_string()),
    }

    Ok(())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|err| err.to_string())
}
