use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::Connection;
use tracing::{error, info, warn};

use crate::error::{StoreError, StoreResult};

/// SQLite file name used when neither the config nor the CLI names one.
pub const DEFAULT_DB_FILE: &str = "hospital.db";

/// Table definitions, applied in order. Foreign keys are declared but SQLite
/// enforcement stays off, so deleting a patient or doctor never touches
/// appointments.
const TABLES: &[(&str, &str)] = &[
    (
        "patients",
        "CREATE TABLE IF NOT EXISTS patients (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            national_id TEXT UNIQUE NOT NULL,
            birth_date DATE,
            phone TEXT,
            address TEXT,
            emergency_contact TEXT,
            blood_type TEXT,
            allergies TEXT
        )",
    ),
    (
        "doctors",
        "CREATE TABLE IF NOT EXISTS doctors (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            specialty TEXT NOT NULL,
            phone TEXT,
            email TEXT,
            license_number TEXT UNIQUE,
            office_number TEXT,
            consultation_fee REAL DEFAULT 0
        )",
    ),
    (
        "appointments",
        "CREATE TABLE IF NOT EXISTS appointments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            patient_id INTEGER NOT NULL,
            doctor_id INTEGER NOT NULL,
            appointment_date DATE NOT NULL,
            appointment_time TIME NOT NULL,
            status TEXT DEFAULT 'active',
            notes TEXT,
            FOREIGN KEY (patient_id) REFERENCES patients (id),
            FOREIGN KEY (doctor_id) REFERENCES doctors (id)
        )",
    ),
];

/// Handle to the file-backed store. It only remembers where the file lives;
/// every caller acquires its own connection through [`Database::connect`] and
/// drops it when done.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Build a handle and make sure the schema exists.
    ///
    /// Initialization failures are logged and swallowed: the handle is
    /// returned regardless and missing tables surface on first use.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let db = Self { path: path.into() };

        if let Some(parent) = db.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = fs::create_dir_all(parent) {
                    warn!(dir = %parent.display(), error = %err, "failed to create database directory");
                }
            }
        }

        match db.ensure_schema() {
            Ok(()) => info!(path = %db.path.display(), "database initialized"),
            Err(err) => {
                error!(path = %db.path.display(), error = %err, "failed to initialize database")
            }
        }

        db
    }

    /// Create any missing tables inside a single transaction. A failure rolls
    /// the whole batch back.
    pub fn ensure_schema(&self) -> StoreResult<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        for (table, ddl) in TABLES {
            if let Err(err) = tx.execute(ddl, []) {
                error!(table, error = %err, "failed to create table");
                return Err(err.into());
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Open a fresh connection owned by the caller. Foreign-key enforcement
    /// is switched off explicitly since bundled SQLite defaults it on.
    pub fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path).map_err(|source| StoreError::Open {
            path: self.path.clone(),
            source,
        })?;
        conn.pragma_update(None, "foreign_keys", false)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
