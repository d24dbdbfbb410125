//! TOML deck definitions consumed by the CLI.
//!
//! ```toml
//! name = "Spanish Vocab"
//!
//! [[cards]]
//! front = "hola"
//! back = "hello"
//! tags = ["greetings"]
//!
//! [[media]]
//! path = "audio/hola.mp3"
//! ```

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::Result;

#[derive(Debug, Deserialize)]
pub struct Deckfile {
    /// Deck (and note type) name shown in the importing application.
    pub name: String,

    /// Optional overrides for the default front/back rendering.
    pub question_format: Option<String>,
    pub answer_format: Option<String>,
    pub css: Option<String>,

    #[serde(default)]
    pub cards: Vec<CardEntry>,

    #[serde(default)]
    pub media: Vec<MediaFileEntry>,
}

#[derive(Debug, Deserialize)]
pub struct CardEntry {
    pub front: String,
    pub back: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct MediaFileEntry {
    /// Path on disk, relative to the deck file.
    pub path: PathBuf,
    /// Filename inside the package; defaults to the file's name.
    pub name: Option<String>,
}

impl Deckfile {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let deckfile: Deckfile = toml::from_str(&content)?;
        Ok(deckfile)
    }
}

impl MediaFileEntry {
    /// The filename this entry is registered under in the package.
    pub fn package_name(&self) -> String {
        match &self.name {
            Some(name) => name.clone(),
            None => self
                .path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deckfile_parses_cards_and_media() {
        let deckfile: Deckfile = toml::from_str(
            r#"
            name = "Spanish"

            [[cards]]
            front = "hola"
            back = "hello"
            tags = ["greetings"]

            [[cards]]
            front = "uno"
            back = "one"

            [[media]]
            path = "audio/hola.mp3"

            [[media]]
            path = "img/flag.png"
            name = "spain.png"
            "#,
        )
        .unwrap();

        assert_eq!(deckfile.name, "Spanish");
        assert_eq!(deckfile.cards.len(), 2);
        assert_eq!(deckfile.cards[0].tags, vec!["greetings"]);
        assert!(deckfile.cards[1].tags.is_empty());
        assert_eq!(deckfile.media[0].package_name(), "hola.mp3");
        assert_eq!(deckfile.media[1].package_name(), "spain.png");
    }
}
