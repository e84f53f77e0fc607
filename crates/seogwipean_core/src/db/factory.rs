//! Scoped connection acquisition for repository operations.
//!
//! # Invariants
//! - Every `open()` call returns a fresh, migrated connection.
//! - Connections are owned by the caller and closed on drop; factories never
//!   cache or share them.

use super::{open_db, DbResult};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Source of short-lived database connections.
///
/// Repositories hold a factory instead of a connection so that each operation
/// gets its own handle, released when the operation returns.
pub trait ConnectionFactory {
    fn open(&self) -> DbResult<Connection>;
}

impl<F: ConnectionFactory + ?Sized> ConnectionFactory for &F {
    fn open(&self) -> DbResult<Connection> {
        (**self).open()
    }
}

/// File-backed factory that opens `path` on every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SqliteConnectionFactory {
    path: PathBuf,
}

impl SqliteConnectionFactory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionFactory for SqliteConnectionFactory {
    fn open(&self) -> DbResult<Connection> {
        open_db(&self.path)
    }
}
