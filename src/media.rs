//! Media registration and deferred content resolution.

use std::fmt;
use std::future::Future;
use std::io;

use futures::future::{try_join_all, BoxFuture};

use crate::error::{PackageError, Result};

/// Media content: either bytes supplied up front, or a deferred source that
/// is resolved once, at save time.
pub enum MediaSource {
    Bytes(Vec<u8>),
    Deferred(BoxFuture<'static, io::Result<Vec<u8>>>),
}

impl MediaSource {
    /// Defer content resolution to save time, e.g. a `tokio::fs::read` call
    /// or a download that has not completed yet.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = io::Result<Vec<u8>>> + Send + 'static,
    {
        MediaSource::Deferred(Box::pin(future))
    }

    async fn resolve(self) -> io::Result<Vec<u8>> {
        match self {
            MediaSource::Bytes(bytes) => Ok(bytes),
            MediaSource::Deferred(future) => future.await,
        }
    }
}

impl fmt::Debug for MediaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MediaSource::Bytes(bytes) => f.debug_tuple("Bytes").field(&bytes.len()).finish(),
            MediaSource::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

impl From<Vec<u8>> for MediaSource {
    fn from(bytes: Vec<u8>) -> Self {
        MediaSource::Bytes(bytes)
    }
}

impl From<&[u8]> for MediaSource {
    fn from(bytes: &[u8]) -> Self {
        MediaSource::Bytes(bytes.to_vec())
    }
}

/// A registered media file, waiting for package assembly.
#[derive(Debug)]
pub(crate) struct MediaEntry {
    pub filename: String,
    pub source: MediaSource,
}

/// Resolve every registered source in one gather. Any failure aborts the
/// whole save; no partial archive is produced.
pub(crate) async fn resolve_all(entries: Vec<MediaEntry>) -> Result<Vec<(String, Vec<u8>)>> {
    try_join_all(entries.into_iter().map(|entry| async move {
        let bytes = entry
            .source
            .resolve()
            .await
            .map_err(|e| PackageError::Media {
                filename: entry.filename.clone(),
                message: e.to_string(),
            })?;
        Ok::<_, PackageError>((entry.filename, bytes))
    }))
    .await
}
