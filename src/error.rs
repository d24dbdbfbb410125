use thiserror::Error;

pub type Result<T> = std::result::Result<T, PackageError>;

#[derive(Debug, Error)]
pub enum PackageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("database connection error: {0}")]
    Connection(#[from] tokio_rusqlite::Error),

    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("deck file error: {0}")]
    Deckfile(#[from] toml::de::Error),

    #[error("collection not initialized: {0}")]
    Setup(String),

    #[error("media \"{filename}\" could not be resolved: {message}")]
    Media { filename: String, message: String },
}
