use std::path::{Path, PathBuf};

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection, Transaction};

use super::TableSpec;
use crate::error::Result;
use crate::logger::{debug, info, trace};

/// A file-backed SQLite destination. The connection is released on drop.
pub struct Sqlite {
    conn: Connection,
    path: PathBuf,
}

impl Sqlite {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        debug(&format!("sqlite: opening {}", path.display()));
        let conn = Connection::open(&path)?;
        debug("sqlite: opened");
        Ok(Self { conn, path })
    }

    /// Runs `CREATE TABLE IF NOT EXISTS`; an existing table keeps its schema.
    pub fn create_table(&self, spec: &TableSpec) -> Result<()> {
        let sql = spec.create_sql();
        debug(&format!("sqlite: {sql}"));
        self.conn.execute(&sql, [])?;
        info(&format!("sqlite: table '{}' ready", spec.table));
        Ok(())
    }

    /// Starts the single transaction that all rows of an import go through.
    pub fn writer(&mut self, spec: &TableSpec) -> Result<TableWriter<'_>> {
        let insert_sql = spec.insert_sql();
        debug(&format!("sqlite: {insert_sql}"));
        let tx = self.conn.transaction()?;
        // Surface a bad statement before the first row is read.
        tx.prepare_cached(&insert_sql)?;
        Ok(TableWriter {
            tx,
            insert_sql,
            rows: 0,
        })
    }

    pub fn close(self) -> Result<()> {
        debug(&format!("sqlite: closing {}", self.path.display()));
        self.conn.close().map_err(|(_, e)| e)?;
        Ok(())
    }
}

/// Inserts rows inside an open transaction. Dropping it without
/// [`TableWriter::commit`] rolls every row back.
pub struct TableWriter<'c> {
    tx: Transaction<'c>,
    insert_sql: String,
    rows: usize,
}

impl TableWriter<'_> {
    pub fn insert(&mut self, values: &[Value]) -> Result<()> {
        let mut stmt = self.tx.prepare_cached(&self.insert_sql)?;
        stmt.execute(params_from_iter(values.iter()))?;
        self.rows += 1;
        trace(&format!("sqlite: inserted row {}", self.rows));
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn commit(self) -> Result<usize> {
        let rows = self.rows;
        self.tx.commit()?;
        info(&format!("sqlite: committed {rows} rows"));
        Ok(rows)
    }
}

/// Expands a leading `~` and `$VAR` (or `%VAR%` on Windows) path segments.
pub fn expand_path(path: &Path) -> Option<PathBuf> {
    let mut expanded_path = PathBuf::new();
    let mut path_iter = path.iter();
    if path.starts_with("~") {
        path_iter.next()?;
        expanded_path = expanded_path.join(dirs_next::home_dir()?);
    }
    for path in path_iter {
        let path = path.to_str()?;
        expanded_path = if cfg!(unix) && path.starts_with('$') {
            expanded_path.join(std::env::var(path.strip_prefix('$')?).unwrap_or_default())
        } else if cfg!(windows) && path.starts_with('%') && path.ends_with('%') {
            expanded_path
                .join(std::env::var(path.strip_prefix('%')?.strip_suffix('%')?).unwrap_or_default())
        } else {
            expanded_path.join(path)
        }
    }
    Some(expanded_path)
}
