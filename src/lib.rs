pub mod config;
pub mod db;
pub mod error;
pub mod import;
pub mod logger;
pub mod transform;

pub use db::{ColumnType, ColumnTypes, ImportMode};
pub use error::{ErrorKind, ImportError};
pub use import::{import_csv, report, ImportRequest, ImportSummary};
