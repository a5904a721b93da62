//! Error types shared by the parser, the music-theory tables and the renderer.

use thiserror::Error;

/// Errors raised while reading a score or rendering it.
#[derive(Debug, Error)]
pub enum RenderError {
    /// The requested hymn or its metadata does not exist.
    #[error("hymn {0} not found")]
    NotFound(u32),

    /// The score (or a fragment of it) could not be read.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// A key-signature / mode combination missing from the static tables.
    #[error("no {table} entry for fifths={fifths} mode={mode}")]
    LookupMiss {
        table: &'static str,
        fifths: i32,
        mode: String,
    },

    /// Metadata was found but could not be used (e.g. undecodable verse
    /// content).
    #[error("invalid metadata: {0}")]
    Metadata(String),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("archive error: {0}")]
    Archive(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The canvas refused a write.
    #[error("output error")]
    Output(#[from] std::fmt::Error),
}

/// Failure of the (best-effort) web-font fetch.
#[derive(Debug, Clone, Error)]
pub enum FontError {
    #[error("font fetch exceeded its deadline")]
    DeadlineExceeded,

    #[error("font service unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, RenderError>;
