//! One-pass collection construction.
//!
//! The incremental session is convenient for front/back decks; this module
//! builds a whole collection from a fully-specified plan instead: any number
//! of decks, any mix of standard and cloze note types, each with its notes
//! embedded. Ids use the running-counter policy, so output is reproducible
//! without touching the clock (the optional timestamp only feeds the
//! collection metadata and `mod` columns).

use std::collections::BTreeMap;

use chrono::Utc;
use rusqlite::Connection;

use crate::db::collection::{self, CardRow, NoteRow, DEFAULT_ENTRY_ID};
use crate::error::{PackageError, Result};
use crate::hash::{field_checksum, join_fields, sha1_hex};
use crate::ids::IdAllocator;
use crate::models::{Deck, Note, NoteType};
use crate::template;

/// A note type together with the notes authored against it.
#[derive(Debug, Clone)]
pub struct NoteTypePlan {
    pub note_type: NoteType,
    pub notes: Vec<Note>,
}

impl NoteTypePlan {
    pub fn new(note_type: NoteType, notes: Vec<Note>) -> Self {
        Self { note_type, notes }
    }
}

/// Everything needed to build a collection in one pass.
#[derive(Debug, Clone, Default)]
pub struct CollectionPlan {
    pub decks: Vec<Deck>,
    pub note_types: Vec<NoteTypePlan>,
    /// Collection timestamp in epoch milliseconds; defaults to now.
    pub timestamp_ms: Option<i64>,
}

/// Build the collection database and return its bytes.
pub fn make_collection(plan: &CollectionPlan) -> Result<Vec<u8>> {
    let conn = Connection::open_in_memory()?;
    let now = plan
        .timestamp_ms
        .unwrap_or_else(|| Utc::now().timestamp_millis());
    collection::create_base_schema(&conn, now)?;

    // Deck and note-type marks start past the seeded defaults.
    let mut deck_ids = IdAllocator::starting_at(DEFAULT_ENTRY_ID);
    let mut note_type_ids = IdAllocator::starting_at(DEFAULT_ENTRY_ID);
    let mut note_ids = IdAllocator::new();
    let mut card_ids = IdAllocator::new();

    let Some(mut decks) = collection::read_col_map::<Deck>(&conn, "decks")? else {
        return Err(PackageError::Setup(
            "collection row missing; base schema was not initialized".to_string(),
        ));
    };
    for deck in &plan.decks {
        let mut deck = deck.clone();
        deck.id = deck_ids.next(deck.id);
        deck.modified = now;
        decks.insert(deck.id.to_string(), deck);
    }
    collection::write_col_map(&conn, "decks", &decks)?;

    let mut models: BTreeMap<String, NoteType> = BTreeMap::new();
    for note_type_plan in &plan.note_types {
        let mut model = note_type_plan.note_type.clone();
        model.id = note_type_ids.next(model.id);
        model.modified = now;

        for note in &note_type_plan.notes {
            insert_note(&conn, &model, note, now, &mut note_ids, &mut card_ids)?;
        }
        models.insert(model.id.to_string(), model);
    }
    collection::write_col_map(&conn, "models", &models)?;

    tracing::debug!(
        decks = plan.decks.len(),
        note_types = plan.note_types.len(),
        "collection built"
    );
    export_database(&conn)
}

fn insert_note(
    conn: &Connection,
    model: &NoteType,
    note: &Note,
    now: i64,
    note_ids: &mut IdAllocator,
    card_ids: &mut IdAllocator,
) -> Result<()> {
    let flds = join_fields(&note.fields);
    let guid = note.guid.clone().unwrap_or_else(|| sha1_hex(&flds));
    let csum = i64::from(field_checksum(&flds));
    let id = match collection::note_id_for_guid(conn, &guid)? {
        Some(existing) => existing,
        None => note_ids.next(note.id.unwrap_or(0)),
    };
    let sort_index = usize::try_from(model.sortf).unwrap_or(0);
    let sfld = note
        .fields
        .get(sort_index)
        .cloned()
        .unwrap_or_default();

    collection::upsert_note(
        conn,
        &NoteRow {
            id,
            guid,
            mid: model.id,
            modified: now,
            tags: note.tags.normalized(),
            flds,
            sfld,
            csum,
        },
    )?;

    for ord in template::card_ordinals(model, &note.fields) {
        let card_id = match collection::card_id_for(conn, id, ord)? {
            Some(existing) => existing,
            None => card_ids.next(0),
        };
        collection::upsert_card(
            conn,
            &CardRow {
                id: card_id,
                nid: id,
                did: model.did,
                ord,
                modified: now,
            },
        )?;
    }
    Ok(())
}

/// One export per build: a consistent snapshot written to a scratch path.
fn export_database(conn: &Connection) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("collection.anki2");
    let target = path.to_string_lossy().into_owned();
    conn.execute("VACUUM INTO ?1", rusqlite::params![target])?;
    Ok(std::fs::read(&path)?)
}
