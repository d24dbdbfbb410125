//! Package assembly: one database entry, one media manifest, one entry per
//! media file, zipped with deflate.

use std::io::{Cursor, Write};

use serde_json::Value;
use zip::{write::SimpleFileOptions, CompressionMethod, ZipWriter};

use crate::error::Result;

/// Archive entry holding the exported collection database.
pub const COLLECTION_ENTRY: &str = "collection.anki2";

/// Archive entry holding the media manifest: a JSON object mapping
/// zero-based indices (as strings) to original filenames.
pub const MEDIA_MANIFEST_ENTRY: &str = "media";

/// The archive capability: package assembly writes named entries and then
/// serializes the whole archive once.
pub trait ArchiveWriter {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()>;

    fn finish(self) -> Result<Vec<u8>>
    where
        Self: Sized;
}

/// Deflate-compressed zip archive, built in memory.
pub struct ZipArchiveWriter {
    writer: ZipWriter<Cursor<Vec<u8>>>,
    options: SimpleFileOptions,
}

impl ZipArchiveWriter {
    pub fn new() -> Self {
        // Entry timestamps are pinned so identical input produces identical
        // archive bytes.
        let options = SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .last_modified_time(zip::DateTime::default());
        Self {
            writer: ZipWriter::new(Cursor::new(Vec::new())),
            options,
        }
    }
}

impl Default for ZipArchiveWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl ArchiveWriter for ZipArchiveWriter {
    fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
        self.writer.start_file(name, self.options)?;
        self.writer.write_all(bytes)?;
        Ok(())
    }

    fn finish(self) -> Result<Vec<u8>> {
        Ok(self.writer.finish()?.into_inner())
    }
}

/// Assemble the final package from the exported database and resolved media.
///
/// Manifest keys are contiguous indices starting at 0, in media input order,
/// and each index is also the name of the entry holding that file's bytes.
pub fn make_package<W: ArchiveWriter>(
    database: &[u8],
    media: &[(String, Vec<u8>)],
    mut writer: W,
) -> Result<Vec<u8>> {
    writer.add_entry(COLLECTION_ENTRY, database)?;

    let mut manifest = serde_json::Map::new();
    for (index, (filename, _)) in media.iter().enumerate() {
        manifest.insert(index.to_string(), Value::String(filename.clone()));
    }
    writer.add_entry(
        MEDIA_MANIFEST_ENTRY,
        serde_json::to_string(&manifest)?.as_bytes(),
    )?;

    for (index, (_, bytes)) in media.iter().enumerate() {
        writer.add_entry(&index.to_string(), bytes)?;
    }

    tracing::debug!(media = media.len(), "package assembled");
    writer.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records entries instead of compressing them; `finish` serializes the
    /// recorded entries so tests can inspect what was written.
    #[derive(Default)]
    struct CollectingWriter {
        entries: Vec<(String, Vec<u8>)>,
    }

    impl ArchiveWriter for CollectingWriter {
        fn add_entry(&mut self, name: &str, bytes: &[u8]) -> Result<()> {
            self.entries.push((name.to_string(), bytes.to_vec()));
            Ok(())
        }

        fn finish(self) -> Result<Vec<u8>> {
            Ok(serde_json::to_vec(&self.entries)?)
        }
    }

    fn collect(media: &[(String, Vec<u8>)]) -> Vec<(String, Vec<u8>)> {
        let out = make_package(b"db-bytes", media, CollectingWriter::default()).unwrap();
        serde_json::from_slice(&out).unwrap()
    }

    #[test]
    fn entries_cover_database_manifest_and_media() {
        let media = vec![
            ("anki.png".to_string(), vec![1, 2, 3]),
            ("voice clip.mp3".to_string(), vec![4]),
        ];
        let entries = collect(&media);
        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["collection.anki2", "media", "0", "1"]);
        assert_eq!(entries[0].1, b"db-bytes");
        assert_eq!(entries[2].1, vec![1, 2, 3]);
        assert_eq!(entries[3].1, vec![4]);
    }

    #[test]
    fn manifest_maps_indices_to_filenames_in_order() {
        let media = vec![
            ("a.png".to_string(), vec![0]),
            ("b.mp3".to_string(), vec![0]),
        ];
        let entries = collect(&media);
        let manifest: serde_json::Value = serde_json::from_slice(&entries[1].1).unwrap();
        assert_eq!(manifest["0"], "a.png");
        assert_eq!(manifest["1"], "b.mp3");
        assert_eq!(manifest.as_object().unwrap().len(), 2);
    }
}
