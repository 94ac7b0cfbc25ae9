//! SQLite-backed persistent store for NPI projects
//!
//! One row per project plus child tables for the MES entry, the three
//! reference matrices (typed by kind), checklist items, and handover
//! documents. Every write is a single statement; there are no
//! multi-statement transactions and no automatic retries.

mod queries;
mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use rusqlite::Connection;
use thiserror::Error;

use crate::entities::ProjectDetails;

/// Bumped on incompatible schema changes. The store is primary data, so a
/// mismatch is an error rather than a silent rebuild.
const SCHEMA_VERSION: i32 = 1;

/// Store failures, distinguished so callers can tell a broken uniqueness or
/// reference rule from an I/O or engine problem
#[derive(Debug, Error, Diagnostic)]
pub enum StoreError {
    #[error("constraint violation: {0}")]
    #[diagnostic(code(npi::store::constraint))]
    Constraint(String),

    #[error("schema version mismatch: database has {found}, this build expects {expected}")]
    #[diagnostic(
        code(npi::store::schema_version),
        help("there is no migration support; open the file with a matching build or start a fresh database")
    )]
    SchemaVersion { found: i32, expected: i32 },

    #[error("database error: {0}")]
    #[diagnostic(code(npi::store::database))]
    Database(rusqlite::Error),

    #[error("io error: {0}")]
    #[diagnostic(code(npi::store::io))]
    Io(#[from] std::io::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, message)
                if code.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                let detail = message.clone().unwrap_or_else(|| code.to_string());
                StoreError::Constraint(detail)
            }
            _ => StoreError::Database(err),
        }
    }
}

/// A project row as stored, without child collections
#[derive(Debug, Clone)]
pub struct StoredProject {
    pub project_id: i64,
    pub product_name: String,
    pub details: ProjectDetails,
}

/// The persistent store, owning the single database connection
pub struct ProjectStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl ProjectStore {
    /// Open or create the store at the given path
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.init()?;
        Ok(store)
    }

    /// In-memory store, used by tests
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn, path: None };
        store.init()?;
        Ok(store)
    }

    /// Path of the backing database file, if file-backed
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Raw SQL escape hatch for tests that need to break the schema
    #[cfg(test)]
    pub(crate) fn execute_raw(&self, sql: &str) -> Result<(), StoreError> {
        self.conn.execute_batch(sql)?;
        Ok(())
    }

    fn init(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        self.init_schema()?;

        let found: i32 = self
            .conn
            .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| {
                row.get(0)
            })?;
        if found != SCHEMA_VERSION {
            return Err(StoreError::SchemaVersion {
                found,
                expected: SCHEMA_VERSION,
            });
        }
        Ok(())
    }
}
