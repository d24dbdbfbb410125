//! Incremental deck synthesis.
//!
//! A session owns one in-memory collection database and one media list, and
//! progresses strictly sequentially: each note is inserted together with its
//! cards before the next note starts. Saving resolves all media, exports the
//! database exactly once and serializes the archive exactly once.

use chrono::Utc;
use rusqlite::params;
use tokio_rusqlite::Connection;

use crate::db::collection::{self, CardRow, NoteRow};
use crate::error::{PackageError, Result};
use crate::hash::{field_checksum, join_fields, sha1_hex};
use crate::media::{self, MediaEntry, MediaSource};
use crate::models::{Deck, NoteType, NoteTypeOptions, Tags};
use crate::package::{make_package, ArchiveWriter, ZipArchiveWriter};
use crate::template;

/// Millisecond clock feeding id generation. Sessions built with a fixed
/// clock produce byte-identical archives for identical input.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    System,
    Fixed(i64),
}

impl Clock {
    fn now_ms(self) -> i64 {
        match self {
            Clock::System => Utc::now().timestamp_millis(),
            Clock::Fixed(ms) => ms,
        }
    }
}

/// An in-progress study-deck package.
pub struct DeckSession {
    conn: Connection,
    deck_id: i64,
    note_type_id: i64,
    note_type: NoteType,
    media: Vec<MediaEntry>,
    clock: Clock,
}

impl DeckSession {
    /// Create a package session: initialize the base schema and graft one
    /// deck and one note type carrying the caller's metadata.
    pub async fn new(deck_name: &str, options: NoteTypeOptions) -> Result<Self> {
        Self::with_clock(deck_name, options, Clock::System).await
    }

    /// Like [`DeckSession::new`], with an explicit clock for reproducible
    /// output.
    pub async fn with_clock(
        deck_name: &str,
        options: NoteTypeOptions,
        clock: Clock,
    ) -> Result<Self> {
        let conn = Connection::open_in_memory().await?;
        let now = clock.now_ms();

        conn.call(move |conn| {
            collection::create_base_schema(conn, now)?;
            Ok(())
        })
        .await?;

        let deck_id = conn
            .call(move |conn| Ok(crate::ids::probe_next(conn, "cards", "did", now)?))
            .await?;
        let note_type_id = conn
            .call(move |conn| Ok(crate::ids::probe_next(conn, "notes", "mid", now)?))
            .await?;

        let name = deck_name.to_string();
        let graft_options = options.clone();
        let note_type = conn
            .call(move |conn| {
                let Some(decks) = collection::read_col_map::<Deck>(conn, "decks")? else {
                    return Ok(None);
                };
                let Some((mut decks, _, mut deck)) = collection::take_last(decks) else {
                    return Ok(None);
                };
                deck.name = name.clone();
                deck.id = deck_id;
                decks.insert(deck_id.to_string(), deck);
                collection::write_col_map(conn, "decks", &decks)?;

                let Some(models) = collection::read_col_map::<NoteType>(conn, "models")? else {
                    return Ok(None);
                };
                let Some((mut models, _, mut model)) = collection::take_last(models) else {
                    return Ok(None);
                };
                model.name = name;
                model.did = deck_id;
                model.id = note_type_id;
                model.css = graft_options.css;
                if let Some(tmpl) = model.tmpls.first_mut() {
                    tmpl.qfmt = graft_options.question_format;
                    tmpl.afmt = graft_options.answer_format;
                }
                models.insert(note_type_id.to_string(), model.clone());
                collection::write_col_map(conn, "models", &models)?;
                Ok(Some(model))
            })
            .await?
            .ok_or_else(|| {
                PackageError::Setup(
                    "collection row or default entries missing; base schema was not initialized"
                        .to_string(),
                )
            })?;

        tracing::debug!(deck_id, note_type_id, "session created");

        Ok(Self {
            conn,
            deck_id,
            note_type_id,
            note_type,
            media: Vec::new(),
            clock,
        })
    }

    /// The id of the grafted deck every generated card belongs to.
    pub fn deck_id(&self) -> i64 {
        self.deck_id
    }

    /// Add a two-field note and its cards. Returns the note id.
    pub async fn add_card(&self, front: &str, back: &str) -> Result<i64> {
        self.add_card_tagged(front, back, Tags::default()).await
    }

    /// Add a two-field note with tags.
    ///
    /// The note guid is a fingerprint of the field content, so adding the
    /// same front/back twice updates the existing rows instead of creating
    /// duplicates.
    pub async fn add_card_tagged(
        &self,
        front: &str,
        back: &str,
        tags: impl Into<Tags>,
    ) -> Result<i64> {
        let fields = vec![front.to_string(), back.to_string()];
        let flds = join_fields(&fields);
        let guid = sha1_hex(&flds);
        let csum = i64::from(field_checksum(&flds));
        let sfld = front.to_string();
        let tags = tags.into().normalized();
        let ordinals = template::card_ordinals(&self.note_type, &fields);
        let now = self.clock.now_ms();
        let mid = self.note_type_id;
        let did = self.deck_id;

        let note_id = self
            .conn
            .call(move |conn| {
                let id = match collection::note_id_for_guid(conn, &guid)? {
                    Some(existing) => {
                        tracing::debug!(id = existing, "duplicate guid, updating in place");
                        existing
                    }
                    None => crate::ids::probe_next(conn, "notes", "id", now)?,
                };
                collection::upsert_note(
                    conn,
                    &NoteRow {
                        id,
                        guid,
                        mid,
                        modified: crate::ids::probe_next(conn, "notes", "mod", now)?,
                        tags,
                        flds,
                        sfld,
                        csum,
                    },
                )?;

                for ord in ordinals {
                    let card_id = match collection::card_id_for(conn, id, ord)? {
                        Some(existing) => existing,
                        None => crate::ids::probe_next(conn, "cards", "id", now)?,
                    };
                    collection::upsert_card(
                        conn,
                        &CardRow {
                            id: card_id,
                            nid: id,
                            did,
                            ord,
                            modified: crate::ids::probe_next(conn, "cards", "mod", now)?,
                        },
                    )?;
                }
                Ok(id)
            })
            .await?;
        Ok(note_id)
    }

    /// Register a media file under the given archive filename. Content may
    /// be bytes or a deferred source; resolution happens at save time.
    pub fn add_media(&mut self, filename: impl Into<String>, content: impl Into<MediaSource>) {
        self.media.push(MediaEntry {
            filename: filename.into(),
            source: content.into(),
        });
    }

    /// Resolve media, export the database and assemble the archive.
    pub async fn save(self) -> Result<Vec<u8>> {
        self.save_with(ZipArchiveWriter::new()).await
    }

    /// Like [`DeckSession::save`], with a caller-supplied archive writer.
    pub async fn save_with<W: ArchiveWriter>(self, writer: W) -> Result<Vec<u8>> {
        let DeckSession { conn, media, .. } = self;

        let resolved = media::resolve_all(media).await?;
        let database = export_database(&conn).await?;
        make_package(&database, &resolved, writer)
    }
}

/// Write a consistent snapshot of the collection to a scratch path and read
/// it back as bytes.
async fn export_database(conn: &Connection) -> Result<Vec<u8>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("collection.anki2");
    let target = path.to_string_lossy().into_owned();
    conn.call(move |conn| {
        conn.execute("VACUUM INTO ?1", params![target])?;
        Ok(())
    })
    .await?;
    Ok(std::fs::read(&path)?)
}

impl std::fmt::Debug for DeckSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeckSession")
            .field("deck_id", &self.deck_id)
            .field("note_type_id", &self.note_type_id)
            .field("media", &self.media.len())
            .finish()
    }
}
