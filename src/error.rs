use std::path::PathBuf;

use thiserror::Error;

/// Coarse classification of an import failure, as reported to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Storage,
    Source,
}

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("CSV file not found at '{}'", .0.display())]
    NotFound(PathBuf),

    #[error("{0}")]
    Storage(#[from] rusqlite::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV file '{}' has no header row", .0.display())]
    EmptySource(PathBuf),

    #[error("row at line {line} has {found} fields, header has {expected}")]
    RowLength {
        line: u64,
        expected: usize,
        found: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ImportError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ImportError::NotFound(_) => ErrorKind::NotFound,
            ImportError::Storage(_) => ErrorKind::Storage,
            ImportError::Csv(_)
            | ImportError::EmptySource(_)
            | ImportError::RowLength { .. }
            | ImportError::Io(_) => ErrorKind::Source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ImportError>;
