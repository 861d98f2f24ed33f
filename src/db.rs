use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use r2d2::Pool;
use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::{Connection, params};
use uuid::Uuid;

use crate::calendar::MonthRange;
use crate::error::StoreError;
use crate::models::{NewRecord, Record, RecordKind};
use crate::store::RecordStore;

pub type DbPool = Pool<SqliteConnectionManager>;

pub const MEMORY_URL: &str = ":memory:";

const COLUMNS: &str = "id, name, sector, amount, note, date_ms, created_at_ms, updated_at_ms";

/// Opens the pool for `database_url` and creates the collections.
///
/// `database_url` is a file path, optionally prefixed with `sqlite://`, or
/// `:memory:`.
pub fn init_db(database_url: &str) -> Result<DbPool, StoreError> {
    let location = database_url
        .strip_prefix("sqlite://")
        .unwrap_or(database_url);
    let pool = if location == MEMORY_URL {
        // each in-memory connection is a separate database
        Pool::builder()
            .max_size(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .build(SqliteConnectionManager::memory())?
    } else {
        let path = Path::new(location);
        if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        Pool::new(SqliteConnectionManager::file(path))?
    };
    {
        let conn = pool.get()?;
        run_migrations(&conn)?;
    }
    Ok(pool)
}

fn run_migrations(conn: &Connection) -> rusqlite::Result<()> {
    for kind in RecordKind::ALL {
        let table = kind.table();
        conn.execute_batch(&format!(
            "
            CREATE TABLE IF NOT EXISTS {table} (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                sector TEXT NOT NULL,
                amount REAL NOT NULL,
                note TEXT NOT NULL DEFAULT '',
                date_ms INTEGER NOT NULL,
                created_at_ms INTEGER NOT NULL,
                updated_at_ms INTEGER NOT NULL
            );

            CREATE INDEX IF NOT EXISTS {table}_date ON {table} (date_ms);
            CREATE INDEX IF NOT EXISTS {table}_sector_date ON {table} (sector, date_ms);
            "
        ))?;
    }
    Ok(())
}

/// Row as stored; ids and timestamps are converted after the read.
struct RecordRow {
    id: String,
    name: String,
    sector: String,
    amount: f64,
    note: String,
    date_ms: i64,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl RecordRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(RecordRow {
            id: row.get(0)?,
            name: row.get(1)?,
            sector: row.get(2)?,
            amount: row.get(3)?,
            note: row.get(4)?,
            date_ms: row.get(5)?,
            created_at_ms: row.get(6)?,
            updated_at_ms: row.get(7)?,
        })
    }
}

impl TryFrom<RecordRow> for Record {
    type Error = StoreError;

    fn try_from(row: RecordRow) -> Result<Self, Self::Error> {
        let id = Uuid::parse_str(&row.id)
            .map_err(|err| StoreError::Corrupt(format!("id {:?}: {err}", row.id)))?;
        Ok(Record {
            id,
            name: row.name,
            sector: row.sector,
            amount: row.amount,
            note: row.note,
            date: from_millis(row.date_ms)?,
            created_at: from_millis(row.created_at_ms)?,
            updated_at: from_millis(row.updated_at_ms)?,
        })
    }
}

fn from_millis(millis: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp {millis} out of range")))
}

/// Drops sub-millisecond precision so returned records match what a read gives back.
fn truncate(at: DateTime<Utc>) -> Result<DateTime<Utc>, StoreError> {
    from_millis(at.timestamp_millis())
}

pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn open(database_url: &str) -> Result<Self, StoreError> {
        init_db(database_url).map(Self::new)
    }
}

impl RecordStore for SqliteStore {
    fn insert(&self, kind: RecordKind, record: NewRecord) -> Result<Record, StoreError> {
        let now = truncate(Utc::now())?;
        let stored = Record {
            id: Uuid::new_v4(),
            name: record.name,
            sector: record.sector,
            amount: record.amount,
            note: record.note,
            date: truncate(record.date)?,
            created_at: now,
            updated_at: now,
        };

        let conn = self.pool.get()?;
        conn.execute(
            &format!(
                "INSERT INTO {} ({COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                kind.table()
            ),
            params![
                stored.id.to_string(),
                stored.name,
                stored.sector,
                stored.amount,
                stored.note,
                stored.date.timestamp_millis(),
                stored.created_at.timestamp_millis(),
                stored.updated_at.timestamp_millis(),
            ],
        )?;
        Ok(stored)
    }

    fn find(&self, kind: RecordKind, id: Uuid) -> Result<Option<Record>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {COLUMNS} FROM {} WHERE id = ?1",
            kind.table()
        ))?;
        let mut rows = stmt.query(params![id.to_string()])?;
        if let Some(row) = rows.next()? {
            Ok(Some(Record::try_from(RecordRow::read(row)?)?))
        } else {
            Ok(None)
        }
    }

    fn delete(&self, kind: RecordKind, id: Uuid) -> Result<bool, StoreError> {
        let conn = self.pool.get()?;
        let deleted = conn.execute(
            &format!("DELETE FROM {} WHERE id = ?1", kind.table()),
            params![id.to_string()],
        )?;
        Ok(deleted > 0)
    }

    fn list_in_range(
        &self,
        kind: RecordKind,
        range: &MonthRange<Utc>,
        sector: Option<&str>,
    ) -> Result<Vec<Record>, StoreError> {
        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&format!(
            "
            SELECT {COLUMNS}
            FROM {}
            WHERE date_ms >= ?1
              AND date_ms < ?2
              AND (?3 IS NULL OR sector = ?3)
            ORDER BY date_ms DESC, created_at_ms DESC
            ",
            kind.table()
        ))?;
        let rows = stmt.query_map(
            params![
                range.start.timestamp_millis(),
                range.end.timestamp_millis(),
                sector
            ],
            RecordRow::read,
        )?;

        let mut out = Vec::new();
        for row in rows {
            out.push(Record::try_from(row?)?);
        }
        Ok(out)
    }
}
