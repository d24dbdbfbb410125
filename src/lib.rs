//! Build Anki-compatible `.apkg` study decks.
//!
//! A [`DeckSession`] accumulates front/back cards and media, then saves a
//! single archive the importing application understands:
//!
//! ```no_run
//! use cardpress::{DeckSession, NoteTypeOptions};
//!
//! # async fn demo() -> cardpress::Result<()> {
//! let mut session = DeckSession::new("Spanish Vocab", NoteTypeOptions::default()).await?;
//! session.add_card("hola", "hello").await?;
//! session.add_card_tagged("adiós", "goodbye", vec!["greetings"]).await?;
//! session.add_media("hola.mp3", std::fs::read("audio/hola.mp3")?);
//! let archive = session.save().await?;
//! std::fs::write("spanish.apkg", archive)?;
//! # Ok(())
//! # }
//! ```
//!
//! For whole collections with custom note types (including cloze deletion),
//! build a [`CollectionPlan`] and run it through [`make_collection`] and
//! [`make_package`] instead.

mod bulk;
mod db;
pub mod deckfile;
mod error;
mod hash;
mod ids;
mod media;
mod models;
mod package;
mod session;
mod template;

pub use bulk::{make_collection, CollectionPlan, NoteTypePlan};
pub use error::{PackageError, Result};
pub use hash::FIELD_SEPARATOR;
pub use ids::IdAllocator;
pub use media::MediaSource;
pub use models::{Deck, Field, Note, NoteType, NoteTypeOptions, Tags, Template};
pub use package::{
    make_package, ArchiveWriter, ZipArchiveWriter, COLLECTION_ENTRY, MEDIA_MANIFEST_ENTRY,
};
pub use session::{Clock, DeckSession};
