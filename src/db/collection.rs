//! Collection storage helpers.
//!
//! Everything here is synchronous over a plain [`rusqlite::Connection`], so
//! the incremental session can run it inside `conn.call(..)` closures and the
//! bulk builder can call it directly. The collection row (id = 1) is created
//! once per database; its `decks` and `models` columns hold JSON maps keyed
//! by id-as-string, seeded with exactly one default entry each and grafted
//! with caller metadata afterwards.

use std::collections::BTreeMap;

use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::models::{Deck, NoteType, NoteTypeOptions};

use super::schema::{DEFAULT_CONF, DEFAULT_DCONF, SCHEMA};

/// Id of the seeded default deck, option group and note type.
pub(crate) const DEFAULT_ENTRY_ID: i64 = 1;

/// Collection schema version understood by the consuming application.
const SCHEMA_VERSION: i64 = 11;

/// `usn` value marking rows as never synced.
const USN_PENDING: i64 = -1;

/// `due` value assigned to freshly synthesized cards.
const DUE_NEW: i64 = 179;

/// One row of the `notes` table, new-note defaults filled in on insert.
pub(crate) struct NoteRow {
    pub id: i64,
    pub guid: String,
    pub mid: i64,
    pub modified: i64,
    pub tags: String,
    pub flds: String,
    pub sfld: String,
    pub csum: i64,
}

/// One row of the `cards` table; scheduling columns are static defaults.
pub(crate) struct CardRow {
    pub id: i64,
    pub nid: i64,
    pub did: i64,
    pub ord: i64,
    pub modified: i64,
}

/// Create the base tables and the singleton collection row, seeding one
/// default deck, one default option group and one default note type.
pub(crate) fn create_base_schema(conn: &Connection, now_ms: i64) -> rusqlite::Result<()> {
    conn.execute_batch(SCHEMA)?;

    let mut decks = BTreeMap::new();
    decks.insert(
        DEFAULT_ENTRY_ID.to_string(),
        Deck::new(DEFAULT_ENTRY_ID, "Default", ""),
    );
    let mut models = BTreeMap::new();
    models.insert(
        DEFAULT_ENTRY_ID.to_string(),
        NoteType::basic(
            DEFAULT_ENTRY_ID,
            "Default",
            DEFAULT_ENTRY_ID,
            &NoteTypeOptions::default(),
        ),
    );

    conn.execute(
        "INSERT INTO col VALUES (1, ?1, ?2, ?3, ?4, 0, 0, 0, ?5, ?6, ?7, ?8, '{}')",
        params![
            now_ms / 1000,
            now_ms,
            now_ms,
            SCHEMA_VERSION,
            DEFAULT_CONF,
            to_json(&models)?,
            to_json(&decks)?,
            DEFAULT_DCONF,
        ],
    )?;
    Ok(())
}

/// Read one of the collection's JSON map columns. `None` means the collection
/// row itself is missing, which callers treat as a fatal setup error.
pub(crate) fn read_col_map<T: DeserializeOwned>(
    conn: &Connection,
    column: &str,
) -> rusqlite::Result<Option<BTreeMap<String, T>>> {
    let sql = format!("SELECT {column} FROM col WHERE id = 1");
    let raw: Option<String> = conn.query_row(&sql, [], |row| row.get(0)).optional()?;
    match raw {
        None => Ok(None),
        Some(json) => from_json(&json).map(Some),
    }
}

pub(crate) fn write_col_map<T: Serialize>(
    conn: &Connection,
    column: &str,
    map: &BTreeMap<String, T>,
) -> rusqlite::Result<()> {
    let sql = format!("UPDATE col SET {column} = ?1 WHERE id = 1");
    conn.execute(&sql, params![to_json(map)?])?;
    Ok(())
}

/// Split off the final entry of an id-keyed map. The seeded maps hold exactly
/// one default entry prior to grafting, so "last" is the default entry.
pub(crate) fn take_last<T>(
    mut map: BTreeMap<String, T>,
) -> Option<(BTreeMap<String, T>, String, T)> {
    let key = map.keys().next_back()?.clone();
    let value = map.remove(&key)?;
    Some((map, key, value))
}

/// Note id for an existing guid, if any. Duplicate content reuses the id so
/// a re-insert updates the row in place.
pub(crate) fn note_id_for_guid(conn: &Connection, guid: &str) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM notes WHERE guid = ?1 ORDER BY id DESC LIMIT 1",
        params![guid],
        |row| row.get(0),
    )
    .optional()
}

/// Card id for an existing (note, ordinal) pair, if any.
pub(crate) fn card_id_for(conn: &Connection, nid: i64, ord: i64) -> rusqlite::Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM cards WHERE nid = ?1 AND ord = ?2 ORDER BY id DESC LIMIT 1",
        params![nid, ord],
        |row| row.get(0),
    )
    .optional()
}

pub(crate) fn upsert_note(conn: &Connection, note: &NoteRow) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO notes VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, 0, '')",
        params![
            note.id,
            note.guid,
            note.mid,
            note.modified,
            USN_PENDING,
            note.tags,
            note.flds,
            note.sfld,
            note.csum,
        ],
    )?;
    Ok(())
}

pub(crate) fn upsert_card(conn: &Connection, card: &CardRow) -> rusqlite::Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO cards VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7, 0, 0, 0, 0, 0, 0, 0, 0, '')",
        params![
            card.id,
            card.nid,
            card.did,
            card.ord,
            card.modified,
            USN_PENDING,
            DUE_NEW,
        ],
    )?;
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> rusqlite::Result<String> {
    serde_json::to_string(value)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

fn from_json<T: DeserializeOwned>(json: &str) -> rusqlite::Result<T> {
    serde_json::from_str(json).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(0, rusqlite::types::Type::Text, Box::new(e))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh_collection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        create_base_schema(&conn, 1_700_000_000_000).unwrap();
        conn
    }

    #[test]
    fn base_schema_seeds_one_default_deck_and_model() {
        let conn = fresh_collection();
        let decks: BTreeMap<String, Deck> = read_col_map(&conn, "decks").unwrap().unwrap();
        assert_eq!(decks.len(), 1);
        assert_eq!(decks["1"].name, "Default");

        let models: BTreeMap<String, NoteType> = read_col_map(&conn, "models").unwrap().unwrap();
        assert_eq!(models.len(), 1);
        assert_eq!(models["1"].flds.len(), 2);
    }

    #[test]
    fn take_last_returns_remaining_and_entry() {
        let mut map = BTreeMap::new();
        map.insert("1".to_string(), "default");
        let (remaining, key, value) = take_last(map).unwrap();
        assert!(remaining.is_empty());
        assert_eq!(key, "1");
        assert_eq!(value, "default");

        assert!(take_last::<()>(BTreeMap::new()).is_none());
    }

    #[test]
    fn guid_lookup_finds_inserted_note() {
        let conn = fresh_collection();
        let note = NoteRow {
            id: 42,
            guid: "abc".to_string(),
            mid: 1,
            modified: 0,
            tags: String::new(),
            flds: "f\u{001f}b".to_string(),
            sfld: "f".to_string(),
            csum: 0,
        };
        upsert_note(&conn, &note).unwrap();
        assert_eq!(note_id_for_guid(&conn, "abc").unwrap(), Some(42));
        assert_eq!(note_id_for_guid(&conn, "missing").unwrap(), None);

        // Re-inserting the same id replaces rather than appends.
        upsert_note(&conn, &note).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM notes", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }
}
