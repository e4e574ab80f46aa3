use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::db::{expand_path, ColumnTypes, ImportMode};
use crate::import::ImportRequest;
use crate::logger::warn;
use crate::transform::DEFAULT_BOOLEAN_COLUMNS;

const APP_NAME: &str = "csv2sqlite";
const IMPORTS_FILE: &str = "imports.yaml";
pub const LOG_FILE: &str = "csv2sqlite.log";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileMode {
    Plain,
    #[default]
    Typed,
}

/// A named, reusable import, as written in `imports.yaml`.
#[derive(Debug, Clone, Deserialize)]
pub struct ImportProfile {
    pub name: String,
    pub source: PathBuf,
    pub destination: PathBuf,
    pub table: String,
    #[serde(default)]
    pub mode: ProfileMode,
    #[serde(default)]
    pub columns: ColumnTypes,
    #[serde(default)]
    pub boolean_columns: Option<Vec<String>>,
}

impl ImportProfile {
    pub fn to_request(&self) -> Result<ImportRequest> {
        let mut req =
            ImportRequest::plain(expand(&self.source)?, expand(&self.destination)?, &self.table);
        req.mode = ImportMode::from(self);
        match self.mode {
            ProfileMode::Typed => {
                req.boolean_columns = self.boolean_columns.clone().unwrap_or_else(|| {
                    DEFAULT_BOOLEAN_COLUMNS.iter().map(|s| s.to_string()).collect()
                });
            }
            ProfileMode::Plain => {
                if !self.columns.is_empty() || self.boolean_columns.is_some() {
                    warn(&format!(
                        "profile '{}': column settings are ignored in plain mode",
                        self.name
                    ));
                }
            }
        }
        Ok(req)
    }
}

fn expand(path: &Path) -> Result<PathBuf> {
    expand_path(path).ok_or_else(|| anyhow::anyhow!("cannot expand path {}", path.display()))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub imports: Vec<ImportProfile>,
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    /// A missing file yields an empty config.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::app_config_dir()?.join(IMPORTS_FILE),
        };
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml(&data)
            .with_context(|| format!("failed to parse YAML at {}", path.display()))
    }

    pub fn from_yaml(data: &[u8]) -> Result<Self> {
        let config: Config = serde_yaml::from_slice(data)?;
        Ok(config)
    }

    pub fn profile(&self, name: &str) -> Result<&ImportProfile> {
        self.imports
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| anyhow::anyhow!("no import profile named '{name}'"))
    }

    /// Return the application config directory path, creating it if missing.
    pub fn app_config_dir() -> Result<PathBuf> {
        let mut path = if cfg!(target_os = "macos") {
            dirs_next::home_dir().map(|h| h.join(".config"))
        } else {
            dirs_next::config_dir()
        }
        .ok_or_else(|| anyhow::anyhow!("failed to find os config dir."))?;

        path.push(APP_NAME);
        fs::create_dir_all(&path)?;
        Ok(path)
    }
}

impl From<&ImportProfile> for ImportMode {
    fn from(p: &ImportProfile) -> Self {
        match p.mode {
            ProfileMode::Plain => ImportMode::Plain,
            ProfileMode::Typed => ImportMode::Typed(p.columns.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::ColumnType;

    const SAMPLE: &str = r#"
imports:
  - name: songs
    source: light_spotify_dataset.csv
    destination: database.db
    table: song
    columns:
      Popularity: integer
      Tempo: real
  - name: raw
    source: raw.csv
    destination: raw.db
    table: raw
    mode: plain
"#;

    #[test]
    fn parses_profiles_with_defaults() {
        let config = Config::from_yaml(SAMPLE.as_bytes()).unwrap();
        assert_eq!(config.imports.len(), 2);

        let songs = config.profile("songs").unwrap();
        assert_eq!(songs.mode, ProfileMode::Typed);
        assert_eq!(songs.columns.get("Tempo"), Some(&ColumnType::Real));

        let req = songs.to_request().unwrap();
        assert!(req.mode.is_typed());
        assert_eq!(req.boolean_columns, vec!["Explicit".to_string()]);
        assert_eq!(req.table, "song");
    }

    #[test]
    fn plain_profile_builds_plain_request() {
        let config = Config::from_yaml(SAMPLE.as_bytes()).unwrap();
        let raw = config.profile("raw").unwrap();
        assert_eq!(ImportMode::from(raw), ImportMode::Plain);
        assert_eq!(raw.to_request().unwrap().mode, ImportMode::Plain);
    }

    #[test]
    fn unknown_profile_is_an_error() {
        let config = Config::from_yaml(SAMPLE.as_bytes()).unwrap();
        assert!(config.profile("missing").is_err());
    }

    #[test]
    fn rejects_unknown_column_type() {
        let yaml = concat!(
            "imports:\n",
            "  - {name: a, source: a.csv, destination: a.db, table: a, columns: {x: blob}}\n"
        );
        assert!(Config::from_yaml(yaml.as_bytes()).is_err());
    }

    #[test]
    fn missing_file_is_empty_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(Some(dir.path().join("nope.yaml").as_path())).unwrap();
        assert!(config.imports.is_empty());
    }

    #[test]
    fn custom_boolean_columns_override_default() {
        let yaml = concat!(
            "imports:\n",
            "  - {name: a, source: a.csv, destination: a.db, table: a, boolean_columns: [Live]}\n"
        );
        let config = Config::from_yaml(yaml.as_bytes()).unwrap();
        let req = config.profile("a").unwrap().to_request().unwrap();
        assert_eq!(req.boolean_columns, vec!["Live".to_string()]);
    }
}
