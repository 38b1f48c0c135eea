//! SQLite-backed event store.
//!
//! The store is the only source of truth for ingested events; nothing keeps a
//! separate in-memory copy. Rows are keyed by an internal surrogate id in
//! insertion order, and `(source, event_id)` is unique: re-ingesting a
//! listing that is already stored leaves the first stored version in place.
//!
//! All access goes through one connection behind a mutex, so writes are
//! serialized and a read never observes a half-applied `insert_all`.
//!
//! Events are stored exactly as given: tags are kept as a JSON array and
//! nothing is trimmed or lowercased on the way in or out.

use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use chrono::Utc;
use eventscout_core::Event;
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::error::{StoreError, StoreResult};

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS events (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    source      TEXT NOT NULL,
    event_id    TEXT NOT NULL,
    title       TEXT NOT NULL,
    date        TEXT NOT NULL DEFAULT '',
    link        TEXT NOT NULL DEFAULT '',
    short_desc  TEXT NOT NULL DEFAULT '',
    tags        TEXT NOT NULL DEFAULT '[]',
    ingested_at TEXT NOT NULL,
    UNIQUE (source, event_id)
);";

const INSERT_EVENT: &str = "
INSERT INTO events (source, event_id, title, date, link, short_desc, tags, ingested_at)
VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
ON CONFLICT (source, event_id) DO NOTHING";

const SELECT_EVENTS: &str = "
SELECT id, source, event_id, title, date, link, short_desc, tags
FROM events
ORDER BY id";

/// Outcome of an [`EventStore::insert_all`] call.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InsertReport {
    /// Rows written.
    pub inserted: usize,
    /// Events skipped because their `(source, event_id)` was already stored.
    pub skipped: usize,
}

impl InsertReport {
    /// Returns the number of events offered to the store.
    pub fn total(&self) -> usize {
        self.inserted + self.skipped
    }
}

/// An event together with its surrogate row id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredEvent {
    /// Surrogate id assigned at insert time.
    pub id: i64,
    pub event: Event,
}

/// Durable event store.
pub struct EventStore {
    conn: Mutex<Connection>,
    path: Option<PathBuf>,
}

impl std::fmt::Debug for EventStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStore")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

impl EventStore {
    /// Opens (creating if needed) the database at `path` and runs [`init`].
    ///
    /// [`init`]: EventStore::init
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::create_dir(parent, e))?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA busy_timeout = 5000;",
        )?;

        let store = Self {
            conn: Mutex::new(conn),
            path: Some(path.to_path_buf()),
        };
        store.init()?;
        debug!(path = %path.display(), "event store opened");
        Ok(store)
    }

    /// Opens a private in-memory store.
    pub fn open_in_memory() -> StoreResult<Self> {
        let store = Self {
            conn: Mutex::new(Connection::open_in_memory()?),
            path: None,
        };
        store.init()?;
        Ok(store)
    }

    /// Returns the database path, `None` for in-memory stores.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::LockPoisoned)
    }

    /// Creates the events table if absent. Safe to call repeatedly.
    pub fn init(&self) -> StoreResult<()> {
        self.lock()?.execute_batch(SCHEMA)?;
        Ok(())
    }

    /// Appends events in one transaction.
    ///
    /// Events whose `(source, external_id)` is already stored are skipped.
    /// On error the transaction is rolled back and nothing is written.
    pub fn insert_all(&self, events: &[Event]) -> StoreResult<InsertReport> {
        let mut conn = self.lock()?;
        let report = insert_events(&mut conn, events)?;
        info!(
            inserted = report.inserted,
            skipped = report.skipped,
            "events stored"
        );
        Ok(report)
    }

    /// Inserts `events` only when the store holds no events at all.
    pub fn seed_if_empty(&self, events: &[Event]) -> StoreResult<InsertReport> {
        let mut conn = self.lock()?;
        if count_rows(&conn)? > 0 {
            debug!("store not empty, skipping seed");
            return Ok(InsertReport::default());
        }
        insert_events(&mut conn, events)
    }

    /// Returns every stored event in insertion order.
    pub fn read_all(&self) -> StoreResult<Vec<Event>> {
        Ok(self
            .read_all_stored()?
            .into_iter()
            .map(|stored| stored.event)
            .collect())
    }

    /// Returns every stored event with its surrogate id, in insertion order.
    pub fn read_all_stored(&self) -> StoreResult<Vec<StoredEvent>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(SELECT_EVENTS)?;
        let rows = stmt.query_map([], parse_row)?;
        let events = rows.collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// Returns the number of stored events.
    pub fn count(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        count_rows(&conn)
    }

    /// Deletes every stored event and returns how many were removed.
    pub fn clear(&self) -> StoreResult<usize> {
        let removed = self.lock()?.execute("DELETE FROM events", [])?;
        info!(removed, "event store cleared");
        Ok(removed)
    }
}

fn insert_events(conn: &mut Connection, events: &[Event]) -> StoreResult<InsertReport> {
    let ingested_at = Utc::now().to_rfc3339();
    let tx = conn.transaction()?;
    // Dropping `tx` on an early return rolls back.
    let mut report = InsertReport::default();
    {
        let mut stmt = tx.prepare(INSERT_EVENT)?;
        for event in events {
            let tags = serde_json::to_string(&event.tags)?;
            let changed = stmt.execute(params![
                event.source,
                event.external_id,
                event.title,
                event.occurs_at,
                event.link,
                event.summary,
                tags,
                ingested_at,
            ])?;
            if changed == 0 {
                debug!(key = %event.key(), "already stored, skipped");
                report.skipped += 1;
            } else {
                report.inserted += 1;
            }
        }
    }
    tx.commit()?;
    Ok(report)
}

fn count_rows(conn: &Connection) -> StoreResult<usize> {
    let count: i64 = conn.query_row("SELECT COUNT(*) FROM events", [], |row| row.get(0))?;
    Ok(usize::try_from(count).unwrap_or_default())
}

fn parse_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<StoredEvent> {
    let tags: String = row.get(7)?;
    let tags = serde_json::from_str(&tags).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(7, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(StoredEvent {
        id: row.get(0)?,
        event: Event {
            source: row.get(1)?,
            external_id: row.get(2)?,
            title: row.get(3)?,
            occurs_at: row.get(4)?,
            link: row.get(5)?,
            summary: row.get(6)?,
            tags,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expo() -> Event {
        Event::new("kudago", "1", "Expo")
            .with_occurs_at("2025-02-11 17:00")
            .with_link("https://kudago.com/ekb/event/expo/")
            .with_summary("Local artists")
            .with_tag_field("art,culture")
    }

    fn jazz() -> Event {
        Event::new("eventbrite", "9", "Jazz Night").with_tag_field("music")
    }

    #[test]
    fn round_trip_preserves_fields() {
        let store = EventStore::open_in_memory().unwrap();
        let events = vec![expo(), jazz(), Event::new("timepad", "5", "")];

        let report = store.insert_all(&events).unwrap();
        assert_eq!(report.inserted, 3);
        assert_eq!(report.skipped, 0);

        assert_eq!(store.read_all().unwrap(), events);
    }

    #[test]
    fn events_come_back_exactly_as_stored() {
        let store = EventStore::open_in_memory().unwrap();
        let raw = Event {
            source: "kudago".to_string(),
            external_id: "77".to_string(),
            title: " Expo ".to_string(),
            occurs_at: String::new(),
            link: String::new(),
            summary: "  ".to_string(),
            tags: vec!["Art".to_string(), "rock, pop".to_string(), String::new()],
        };

        store.insert_all(std::slice::from_ref(&raw)).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![raw]);
    }

    #[test]
    fn corrupt_tags_column_is_an_error() {
        let store = EventStore::open_in_memory().unwrap();
        store.insert_all(&[expo()]).unwrap();
        store
            .lock()
            .unwrap()
            .execute("UPDATE events SET tags = 'art,culture'", [])
            .unwrap();

        let err = store.read_all().unwrap_err();
        assert!(matches!(err, StoreError::Sqlite(_)));
    }

    #[test]
    fn count_tracks_inserts() {
        let store = EventStore::open_in_memory().unwrap();
        assert_eq!(store.count().unwrap(), 0);
        store.insert_all(&[expo(), jazz(), expo()]).unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }

    #[test]
    fn surrogate_ids_follow_insertion_order() {
        let store = EventStore::open_in_memory().unwrap();
        store.insert_all(&[expo()]).unwrap();
        store.insert_all(&[jazz()]).unwrap();

        let stored = store.read_all_stored().unwrap();
        assert_eq!(stored.len(), 2);
        assert!(stored[0].id < stored[1].id);
        assert_eq!(stored[0].event.source, "kudago");
        assert_eq!(stored[1].event.source, "eventbrite");
    }

    #[test]
    fn duplicate_keys_are_skipped_first_wins() {
        let store = EventStore::open_in_memory().unwrap();
        store.insert_all(&[expo()]).unwrap();

        let renamed = Event::new("kudago", "1", "Expo (updated)");
        let report = store.insert_all(&[renamed, jazz()]).unwrap();
        assert_eq!(report, InsertReport { inserted: 1, skipped: 1 });
        assert_eq!(report.total(), 2);

        let events = store.read_all().unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].title, "Expo");
    }

    #[test]
    fn same_id_from_different_sources_is_distinct() {
        let store = EventStore::open_in_memory().unwrap();
        let report = store
            .insert_all(&[
                Event::new("kudago", "7", "Expo"),
                Event::new("timepad", "7", "Expo"),
            ])
            .unwrap();
        assert_eq!(report.inserted, 2);
    }

    #[test]
    fn duplicates_within_one_batch() {
        let store = EventStore::open_in_memory().unwrap();
        let report = store.insert_all(&[expo(), expo()]).unwrap();
        assert_eq!(report, InsertReport { inserted: 1, skipped: 1 });
    }

    #[test]
    fn init_is_idempotent() {
        let store = EventStore::open_in_memory().unwrap();
        store.insert_all(&[expo()]).unwrap();
        store.init().unwrap();
        store.init().unwrap();
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn clear_removes_everything() {
        let store = EventStore::open_in_memory().unwrap();
        store.insert_all(&[expo(), jazz()]).unwrap();
        assert_eq!(store.clear().unwrap(), 2);
        assert_eq!(store.count().unwrap(), 0);
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn seed_only_when_empty() {
        let store = EventStore::open_in_memory().unwrap();
        let report = store.seed_if_empty(&[expo()]).unwrap();
        assert_eq!(report.inserted, 1);

        let report = store.seed_if_empty(&[jazz()]).unwrap();
        assert_eq!(report, InsertReport::default());
        assert_eq!(store.count().unwrap(), 1);
    }

    #[test]
    fn empty_store_reads_empty() {
        let store = EventStore::open_in_memory().unwrap();
        assert!(store.read_all().unwrap().is_empty());
        assert_eq!(store.insert_all(&[]).unwrap(), InsertReport::default());
    }

    #[test]
    fn on_disk_store_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("events.db");

        {
            let store = EventStore::open(&path).unwrap();
            assert_eq!(store.path(), Some(path.as_path()));
            store.insert_all(&[expo()]).unwrap();
        }

        let store = EventStore::open(&path).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![expo()]);
    }

    #[test]
    fn open_fails_when_directory_cannot_be_created() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();

        let err = EventStore::open(blocker.join("events.db")).unwrap_err();
        assert!(matches!(err, StoreError::CreateDir { .. }));
    }
}
