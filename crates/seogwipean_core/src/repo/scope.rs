//! Scoped execution of one repository operation.
//!
//! # Invariants
//! - The connection lives exactly as long as one operation body.
//! - Errors and panics from the body are converted to an [`Outcome`].
//! - `Exception` details are written to the log, never returned.

use super::{Outcome, RepoError, RepoResult};
use crate::db::migrations::{current_user_version, latest_version};
use crate::db::{ConnectionFactory, DbError};
use log::{debug, error, warn};
use rusqlite::Connection;
use std::panic::{self, AssertUnwindSafe};
use std::time::Instant;

/// Opens a connection, runs `body` on it and wraps the result.
///
/// The connection is dropped before the outcome is returned, on every path.
pub(crate) fn run_scoped<F, T>(
    factory: &F,
    op: &'static str,
    body: impl FnOnce(&mut Connection) -> RepoResult<T>,
) -> Outcome<T>
where
    F: ConnectionFactory + ?Sized,
{
    let started_at = Instant::now();
    let result = panic::catch_unwind(AssertUnwindSafe(|| -> RepoResult<T> {
        let mut conn = factory.open()?;
        ensure_connection_ready(&conn)?;
        body(&mut conn)
    }));
    let duration_ms = started_at.elapsed().as_millis();

    match result {
        Ok(Ok(data)) => {
            debug!("event=repo_op module=repo op={op} status=ok duration_ms={duration_ms}");
            Outcome::Success(data)
        }
        Ok(Err(err)) if err.is_domain() => {
            warn!(
                "event=repo_op module=repo op={op} status=fail duration_ms={duration_ms} reason={err}"
            );
            Outcome::fail(err.to_string())
        }
        Ok(Err(err)) => {
            error!(
                "event=repo_op module=repo op={op} status=exception duration_ms={duration_ms} error_code={} error={err}",
                error_code(&err)
            );
            Outcome::Exception
        }
        Err(_) => {
            // Payload already reported by the panic hook when logging is active.
            error!(
                "event=repo_op module=repo op={op} status=exception duration_ms={duration_ms} error_code=panic"
            );
            Outcome::Exception
        }
    }
}

/// Verifies that `conn` carries the schema this binary was built against.
pub fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version = current_user_version(conn)?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }
    Ok(())
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::Db(DbError::Open { .. }) => "db_open_failed",
        RepoError::Db(_) => "db_error",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::UninitializedConnection { .. } => "uninitialized_connection",
        RepoError::Validation(_) | RepoError::Domain(_) => "domain",
    }
}
