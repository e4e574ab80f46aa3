use std::fs::File;
use std::io;
use std::path::{Path, PathBuf};

use crate::db::{ColumnTypes, ImportMode, Sqlite, TableSpec};
use crate::error::{ImportError, Result};
use crate::logger::{debug, error, info};
use crate::transform::{RowTransform, DEFAULT_BOOLEAN_COLUMNS};

/// One CSV -> SQLite load.
#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub table: String,
    pub mode: ImportMode,
    /// Header names whose yes/no values become booleans (typed mode only).
    pub boolean_columns: Vec<String>,
}

impl ImportRequest {
    pub fn plain(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        table: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
            table: table.into(),
            mode: ImportMode::Plain,
            boolean_columns: Vec::new(),
        }
    }

    pub fn typed(
        source: impl Into<PathBuf>,
        destination: impl Into<PathBuf>,
        table: impl Into<String>,
        column_types: ColumnTypes,
    ) -> Self {
        Self {
            mode: ImportMode::Typed(column_types),
            boolean_columns: DEFAULT_BOOLEAN_COLUMNS.iter().map(|s| s.to_string()).collect(),
            ..Self::plain(source, destination, table)
        }
    }

    pub fn with_boolean_columns(mut self, columns: Vec<String>) -> Self {
        self.boolean_columns = columns;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ImportSummary {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub table: String,
    pub rows: usize,
}

/// Loads every data row of `req.source` into `req.table`, committing once.
///
/// The source is opened before the database, so a missing CSV never
/// creates a database file. Any failure after that rolls back the
/// pending rows and still releases the connection.
pub fn import_csv(req: &ImportRequest) -> Result<ImportSummary> {
    info(&format!(
        "import: '{}' -> '{}' table '{}' ({})",
        req.source.display(),
        req.destination.display(),
        req.table,
        if req.mode.is_typed() { "typed" } else { "plain" }
    ));

    let result = run(req);
    if let Err(e) = &result {
        error(&format!("import: {e}"));
    }
    result
}

fn run(req: &ImportRequest) -> Result<ImportSummary> {
    let mut reader = open_source(&req.source)?;

    let header = reader.headers()?.clone();
    if header.is_empty() {
        return Err(ImportError::EmptySource(req.source.clone()));
    }

    let spec = TableSpec::from_header(&req.table, header.iter(), &req.mode)
        .with_boolean_columns(&req.boolean_columns, &req.mode);
    let transform = match &req.mode {
        ImportMode::Plain => RowTransform::verbatim(&spec),
        ImportMode::Typed(_) => RowTransform::typed(&spec, &req.boolean_columns),
    };
    debug(&format!(
        "import: header {:?}",
        spec.column_names().collect::<Vec<_>>()
    ));

    let mut db = Sqlite::open(&req.destination)?;
    let rows = load(&mut db, &spec, &transform, &mut reader)?;
    db.close()?;

    Ok(ImportSummary {
        source: req.source.clone(),
        destination: req.destination.clone(),
        table: req.table.clone(),
        rows,
    })
}

fn open_source(path: &Path) -> Result<csv::Reader<File>> {
    let file = File::open(path).map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => ImportError::NotFound(path.to_path_buf()),
        _ => ImportError::Io(e),
    })?;
    Ok(csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(file))
}

fn load(
    db: &mut Sqlite,
    spec: &TableSpec,
    transform: &RowTransform,
    reader: &mut csv::Reader<File>,
) -> Result<usize> {
    db.create_table(spec)?;
    let mut writer = db.writer(spec)?;

    for record in reader.records() {
        let record = record?;
        if record.len() != transform.width() {
            return Err(ImportError::RowLength {
                line: record.position().map_or(0, |p| p.line()),
                expected: transform.width(),
                found: record.len(),
            });
        }
        writer.insert(&transform.apply(record.iter()))?;
    }
    debug(&format!("import: {} rows read, committing", writer.rows()));

    writer.commit()
}

/// Human-readable status line for the outcome of an import.
pub fn report(req: &ImportRequest, result: &Result<ImportSummary>) -> String {
    match result {
        Ok(s) => format!(
            "Successfully imported '{}' to table '{}' in '{}' ({} rows).",
            s.source.display(),
            s.table,
            s.destination.display(),
            s.rows
        ),
        Err(ImportError::NotFound(_)) => {
            format!("Error: CSV file not found at '{}'.", req.source.display())
        }
        Err(ImportError::Storage(e)) => format!("SQLite error: {e}"),
        Err(e) => format!("Error: {e}"),
    }
}
