use std::path::PathBuf;

/// Failure taxonomy for score storage.
///
/// `Initialization` is fatal to one open attempt. `Write` and `Read` are
/// recovered by the degrading entry points on [`crate::ScoreStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to initialize score database at {path}: {reason}")]
    Initialization { path: PathBuf, reason: String },

    #[error("write failed: {0}")]
    Write(String),

    #[error("read failed: {0}")]
    Read(String),

    #[error("score database is closed")]
    Closed,
}

impl StoreError {
    pub(crate) fn init(path: &std::path::Path, reason: impl std::fmt::Display) -> Self {
        StoreError::Initialization {
            path: path.to_owned(),
            reason: reason.to_string(),
        }
    }

    pub(crate) fn write(e: rusqlite::Error) -> Self {
        StoreError::Write(e.to_string())
    }

    pub(crate) fn read(e: rusqlite::Error) -> Self {
        StoreError::Read(e.to_string())
    }

    /// Short label used in diagnostics and log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Initialization { .. } => "initialization",
            StoreError::Write(_) => "write",
            StoreError::Read(_) => "read",
            StoreError::Closed => "closed",
        }
    }
}
