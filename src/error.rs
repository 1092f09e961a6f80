use thiserror::Error;

pub type Result<T> = std::result::Result<T, StockError>;

#[derive(Error, Debug)]
pub enum StockError {
    #[error("Git error: {0}")]
    Git(#[from] git2::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Mailmap error: {path}:{line}: {reason}")]
    Mailmap {
        path: String,
        line: usize,
        reason: String,
    },
    #[error("Invalid exclude pattern: {0}")]
    ExcludePattern(String),
    #[error("Not a commit: {0}")]
    NotACommit(String),
    #[error("Worker thread panicked")]
    WorkerPanic,
}
