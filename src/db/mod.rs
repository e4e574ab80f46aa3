mod sqlite;

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Deserialize;

pub use sqlite::{expand_path, Sqlite, TableWriter};

/// Declared storage type of a destination column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub enum ColumnType {
    #[default]
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "integer")]
    Integer,
    #[serde(rename = "real")]
    Real,
    /// yes/no stored as 1/0; other values are kept as text.
    #[serde(rename = "boolean")]
    Boolean,
}

impl ColumnType {
    pub fn sql(self) -> &'static str {
        match self {
            ColumnType::Text => "TEXT",
            ColumnType::Integer => "INTEGER",
            ColumnType::Real => "REAL",
            ColumnType::Boolean => "BOOLEAN",
        }
    }
}

impl fmt::Display for ColumnType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sql())
    }
}

impl FromStr for ColumnType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "string" => Ok(ColumnType::Text),
            "integer" | "int" => Ok(ColumnType::Integer),
            "real" | "float" => Ok(ColumnType::Real),
            "boolean" | "bool" => Ok(ColumnType::Boolean),
            other => Err(anyhow::anyhow!(
                "unknown column type '{other}' (expected text, integer, real or boolean)"
            )),
        }
    }
}

/// Column name -> declared type. Anything not listed is TEXT.
pub type ColumnTypes = BTreeMap<String, ColumnType>;

/// How the header is turned into a table.
#[derive(Debug, Clone, PartialEq)]
pub enum ImportMode {
    /// Every column TEXT, header used verbatim, no identity column.
    Plain,
    /// Identity column first, trimmed header, types from the map.
    Typed(ColumnTypes),
}

impl ImportMode {
    pub fn is_typed(&self) -> bool {
        matches!(self, ImportMode::Typed(_))
    }

    pub fn declared_type(&self, column: &str) -> Option<ColumnType> {
        match self {
            ImportMode::Plain => None,
            ImportMode::Typed(types) => types.get(column).copied(),
        }
    }

    pub fn column_type(&self, column: &str) -> ColumnType {
        match self {
            ImportMode::Plain => ColumnType::Text,
            ImportMode::Typed(_) => self.declared_type(column).unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnInfo {
    pub name: String,
    pub data_type: ColumnType,
}

/// Shape of the destination table, derived from a CSV header.
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
    /// Name of the auto-incrementing identity column, if any.
    pub identity: Option<String>,
}

impl TableSpec {
    pub fn from_header<'a>(
        table: &str,
        header: impl IntoIterator<Item = &'a str>,
        mode: &ImportMode,
    ) -> Self {
        let columns: Vec<ColumnInfo> = header
            .into_iter()
            .map(|raw| {
                let name = if mode.is_typed() { raw.trim() } else { raw };
                ColumnInfo {
                    name: name.to_string(),
                    data_type: mode.column_type(name),
                }
            })
            .collect();

        let identity = mode.is_typed().then(|| {
            let mut id = "id".to_string();
            while columns.iter().any(|c| c.name == id) {
                id.insert(0, '_');
            }
            id
        });

        Self {
            table: table.to_string(),
            columns,
            identity,
        }
    }

    /// Gives the listed columns BOOLEAN type unless the mode declares
    /// another type for them. Plain tables are left as they are.
    pub fn with_boolean_columns(mut self, names: &[String], mode: &ImportMode) -> Self {
        if !mode.is_typed() {
            return self;
        }
        for c in &mut self.columns {
            if names.contains(&c.name) && mode.declared_type(&c.name).is_none() {
                c.data_type = ColumnType::Boolean;
            }
        }
        self
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn create_sql(&self) -> String {
        let mut defs = Vec::with_capacity(self.columns.len() + 1);
        if let Some(id) = &self.identity {
            defs.push(format!("{} INTEGER PRIMARY KEY AUTOINCREMENT", quote_ident(id)));
        }
        for c in &self.columns {
            defs.push(format!("{} {}", quote_ident(&c.name), c.data_type));
        }
        format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_ident(&self.table),
            defs.join(", ")
        )
    }

    pub fn insert_sql(&self) -> String {
        let placeholders = vec!["?"; self.columns.len()].join(", ");
        if self.identity.is_some() {
            let names = self
                .column_names()
                .map(quote_ident)
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "INSERT INTO {} ({}) VALUES ({})",
                quote_ident(&self.table),
                names,
                placeholders
            )
        } else {
            format!(
                "INSERT INTO {} VALUES ({})",
                quote_ident(&self.table),
                placeholders
            )
        }
    }
}

/// Double-quote an identifier, doubling any embedded quotes.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}
