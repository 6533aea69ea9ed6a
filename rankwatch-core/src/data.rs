use crate::credentials::CredentialSet;
use crate::error::Result;
use crate::model::Project;
use rusqlite::{Connection, OptionalExtension, params};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::warn;

pub const PROJECTS_SLOT: &str = "keyword-checker-projects";
pub const CREDENTIALS_SLOT: &str = "gemini-api-keys";

/// Durable key-value slots backed by SQLite. Each slot holds one JSON document.
pub struct Database {
    conn: Connection,
}

fn current_timestamp() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

impl Database {
    pub fn drop(path: &Path) -> std::io::Result<()> {
        fs::remove_file(path)
    }

    pub fn exists(path: &Path) -> bool {
        path.exists()
    }

    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
            ",
        )?;

        let db = Database { conn };
        db.init_schema()?;
        Ok(db)
    }

    fn init_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS slots (
                name TEXT PRIMARY KEY,
                value TEXT NOT NULL,   -- JSON document
                updated_at INTEGER NOT NULL
            );
            ",
        )?;
        Ok(())
    }

    pub fn read_slot(&self, name: &str) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM slots WHERE name = ?1")?;
        let value = stmt
            .query_row(params![name], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    pub fn write_slot(&self, name: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT INTO slots (name, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(name) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![name, value, current_timestamp()],
        )?;
        Ok(())
    }

    /// Missing, unreadable or corrupt slots come back as the empty default.
    pub fn load_slot<T: DeserializeOwned + Default>(&self, name: &str) -> T {
        let raw = match self.read_slot(name) {
            Ok(Some(raw)) => raw,
            Ok(None) => return T::default(),
            Err(e) => {
                warn!("Could not read slot {}: {}", name, e);
                return T::default();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!("Slot {} holds invalid data, starting empty: {}", name, e);
            T::default()
        })
    }

    pub fn save_slot<T: Serialize + ?Sized>(&self, name: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)?;
        self.write_slot(name, &raw)
    }

    pub fn load_projects(&self) -> Vec<Project> {
        self.load_slot(PROJECTS_SLOT)
    }

    pub fn save_projects(&self, projects: &[Project]) -> Result<()> {
        self.save_slot(PROJECTS_SLOT, projects)
    }

    pub fn load_credentials(&self) -> CredentialSet {
        self.load_slot(CREDENTIALS_SLOT)
    }

    pub fn save_credentials(&self, credentials: &CredentialSet) -> Result<()> {
        self.save_slot(CREDENTIALS_SLOT, credentials)
    }

    pub fn get_connection(&self) -> &Connection {
        &self.conn
    }
}
