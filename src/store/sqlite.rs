use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection};
use rusqlite_migration::{Migrations, M};

use crate::app::{Result, TidelineError};
use crate::domain::Watermarks;
use crate::store::WatermarkStore;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        if let Some(parent) = path.as_ref().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.run_migrations()?;
        Ok(store)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| {
            TidelineError::Database(rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error::new(1),
                Some(e.to_string()),
            ))
        })
    }

    fn run_migrations(&self) -> Result<()> {
        let migrations = Migrations::new(vec![M::up(include_str!(
            "../../migrations/001-initial/up.sql"
        ))]);

        let mut conn = self.lock()?;
        migrations
            .to_latest(&mut conn)
            .map_err(|_| TidelineError::Database(rusqlite::Error::InvalidQuery))?;

        Ok(())
    }
}

impl WatermarkStore for SqliteStore {
    fn load(&self) -> Result<Watermarks> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare("SELECT feed_id, seen_at FROM watermarks")?;

        let watermarks = stmt
            .query_map([], |row| {
                let feed_id: String = row.get(0)?;
                let seen_at: String = row.get(1)?;
                let at = DateTime::parse_from_rfc3339(&seen_at).map_err(|e| {
                    rusqlite::Error::FromSqlConversionFailure(1, Type::Text, Box::new(e))
                })?;
                Ok((feed_id, at.with_timezone(&Utc)))
            })?
            .collect::<std::result::Result<Watermarks, _>>()?;

        Ok(watermarks)
    }

    fn save(&self, watermarks: &Watermarks) -> Result<()> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM watermarks", [])?;
        {
            let mut stmt =
                tx.prepare("INSERT INTO watermarks (feed_id, seen_at) VALUES (?1, ?2)")?;
            for (feed_id, at) in watermarks.iter() {
                stmt.execute(params![feed_id, at.to_rfc3339()])?;
            }
        }

        tx.commit()?;
        Ok(())
    }
}
