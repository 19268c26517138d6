//! SQLite-based segment storage.
//!
//! Provides persistent storage for:
//! - The segment list, in insertion order
//! - Key-value store for preferences (the repeat flag lives under `repeat`)
//!
//! Every mutation republishes the full list on a watch channel so a running
//! timer sees it on its next tick. Commits made through other connections
//! (another process, another handle on the same file) are picked up by
//! [`SegmentStore::refresh`], which the timer calls before each tick.

use std::path::Path;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Mutex, MutexGuard};

use rusqlite::{params, Connection};
use tokio::sync::watch;
use tracing::{debug, info};

use super::data_dir;
use crate::error::{DatabaseError, Result};
use crate::ports::{RepeatPreference, SegmentRepository};
use crate::timer::{Segment, SegmentId, SegmentList, StoredSegment};

const REPEAT_KEY: &str = "repeat";

/// SQLite store implementing both the segment repository and the repeat preference.
pub struct SegmentStore {
    conn: Mutex<Connection>,
    /// Last `PRAGMA data_version` seen; only touched with `conn` locked.
    data_version: AtomicI64,
    segments: watch::Sender<SegmentList>,
    repeat: watch::Sender<bool>,
}

impl SegmentStore {
    /// Open the database at `~/.config/interval/interval.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        let path = data_dir()?.join("interval.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "opened segment database");
        Self::from_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        migrate(&conn)?;
        let segments = load_segments(&conn)?;
        let repeat = load_repeat(&conn)?;
        let version = data_version(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            data_version: AtomicI64::new(version),
            segments: watch::Sender::new(segments),
            repeat: watch::Sender::new(repeat),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Re-read the table and publish it. Called with the connection lock held.
    fn republish(&self, conn: &Connection) -> Result<()> {
        let list = load_segments(conn)?;
        debug!(segments = list.len(), "segment list changed");
        self.segments.send_replace(list);
        Ok(())
    }

    /// Store `default` as the repeat flag unless one was ever saved.
    pub fn seed_repeat(&self, default: bool) -> Result<()> {
        let conn = self.conn();
        if kv_get(&conn, REPEAT_KEY)?.is_none() {
            conn.execute(
                "INSERT INTO kv (key, value) VALUES (?1, ?2)",
                params![REPEAT_KEY, default.to_string()],
            )?;
            self.repeat.send_replace(default);
        }
        Ok(())
    }

    /// Pull in changes committed by other connections since the last check.
    ///
    /// Observers are only notified when the list or flag actually differs.
    /// Returns whether the database changed underneath this handle.
    pub fn refresh(&self) -> Result<bool> {
        let conn = self.conn();
        let version = data_version(&conn)?;
        if version == self.data_version.swap(version, Ordering::Relaxed) {
            return Ok(false);
        }
        let list = load_segments(&conn)?;
        let repeat = load_repeat(&conn)?;
        let list_changed = self.segments.send_if_modified(|current| {
            if *current == list {
                return false;
            }
            *current = list;
            true
        });
        let repeat_changed = self.repeat.send_if_modified(|current| {
            let changed = *current != repeat;
            *current = repeat;
            changed
        });
        debug!(
            version,
            list_changed, repeat_changed, "picked up external database changes"
        );
        Ok(true)
    }
}

fn migrate(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS segments (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            name          TEXT NOT NULL,
            duration_secs INTEGER NOT NULL CHECK (duration_secs >= 0)
        );

        CREATE TABLE IF NOT EXISTS kv (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );",
    )
    .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
    Ok(())
}

/// Changes whenever another connection commits; unaffected by our own writes.
fn data_version(conn: &Connection) -> Result<i64> {
    Ok(conn.query_row("PRAGMA data_version", [], |row| row.get(0))?)
}

fn load_segments(conn: &Connection) -> Result<SegmentList> {
    let mut stmt = conn.prepare("SELECT id, name, duration_secs FROM segments ORDER BY id")?;
    let rows = stmt.query_map([], |row| {
        Ok(StoredSegment {
            id: SegmentId(row.get(0)?),
            segment: Segment {
                name: row.get(1)?,
                duration_secs: row.get(2)?,
            },
        })
    })?;
    let entries = rows.collect::<Result<Vec<_>, _>>()?;
    Ok(SegmentList::from_entries(entries))
}

fn kv_get(conn: &Connection, key: &str) -> Result<Option<String>> {
    let mut stmt = conn.prepare("SELECT value FROM kv WHERE key = ?1")?;
    let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
    match result {
        Ok(v) => Ok(Some(v)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// A missing value counts as not repeating.
fn load_repeat(conn: &Connection) -> Result<bool> {
    Ok(kv_get(conn, REPEAT_KEY)?.is_some_and(|v| v == "true"))
}

impl SegmentRepository for SegmentStore {
    fn observe(&self) -> watch::Receiver<SegmentList> {
        self.segments.subscribe()
    }

    fn list(&self) -> Result<SegmentList> {
        load_segments(&self.conn())
    }

    fn insert(&self, segment: Segment) -> Result<SegmentId> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO segments (name, duration_secs) VALUES (?1, ?2)",
            params![segment.name, segment.duration_secs],
        )?;
        let id = SegmentId(conn.last_insert_rowid());
        self.republish(&conn)?;
        Ok(id)
    }

    fn remove(&self, id: SegmentId) -> Result<bool> {
        let conn = self.conn();
        let removed = conn.execute("DELETE FROM segments WHERE id = ?1", params![id.0])? > 0;
        if removed {
            self.republish(&conn)?;
        }
        Ok(removed)
    }

    fn clear(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute("DELETE FROM segments", [])?;
        self.republish(&conn)
    }

    fn refresh(&self) -> Result<()> {
        SegmentStore::refresh(self).map(|_| ())
    }
}

impl RepeatPreference for SegmentStore {
    fn observe(&self) -> watch::Receiver<bool> {
        self.repeat.subscribe()
    }

    fn toggle(&self) -> Result<bool> {
        let conn = self.conn();
        let next = !load_repeat(&conn)?;
        conn.execute(
            "INSERT OR REPLACE INTO kv (key, value) VALUES (?1, ?2)",
            params![REPEAT_KEY, next.to_string()],
        )?;
        self.repeat.send_replace(next);
        info!(repeat = next, "repeat preference toggled");
        Ok(next)
    }

    fn refresh(&self) -> Result<()> {
        SegmentStore::refresh(self).map(|_| ())
    }
}
