//! CLI smoke entry point.
//!
//! Opens the configured database and prints row counts so a deployment can
//! be checked without the web front end.

use log::error;
use seogwipean_core::{core_version, flush_logging, ConnectionFactory, CoreConfig};
use std::process::ExitCode;

const TABLES: [&str; 4] = ["booking", "surf", "coupon_db", "coupon"];

fn main() -> ExitCode {
    let config = CoreConfig::from_env();
    if let Err(err) = config.init_logging() {
        eprintln!("logging disabled: {err}");
    }

    println!("seogwipean_core version={}", core_version());
    println!("db_path={}", config.db_path.display());

    let code = match print_table_counts(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_probe module=cli status=error error={err}");
            eprintln!("database check failed: {err}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn print_table_counts(config: &CoreConfig) -> Result<(), String> {
    let conn = config
        .connection_factory()
        .open()
        .map_err(|err| err.to_string())?;
    for table in TABLES {
        let count: i64 = conn
            .query_row(&format!("SELECT COUNT(*) FROM {table};"), [], |row| {
                row.get(0)
            })
            .map_err(|err| format!("count {table}: {err}"))?;
        println!("{table}={count}");
    }
    Ok(())
}
