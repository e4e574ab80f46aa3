use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use csv2sqlite::config::{Config, LOG_FILE};
use csv2sqlite::logger::{self, error};
use csv2sqlite::{import_csv, report, ColumnType, ColumnTypes, ImportRequest};

const DEFAULT_SOURCE: &str = "../light_spotify_dataset.csv";
const DEFAULT_DESTINATION: &str = "../database.db";
const DEFAULT_TABLE: &str = "song";

#[derive(Parser)]
#[command(name = "csv2sqlite", version, about = "Load a CSV file into a SQLite table")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Import a CSV file into a table
    Import(ImportArgs),
    /// Run a named import profile from the config file
    Run {
        profile: String,
        #[arg(long)]
        config: Option<PathBuf>,
    },
    /// List configured import profiles
    Profiles {
        #[arg(long)]
        config: Option<PathBuf>,
    },
}

#[derive(Args)]
struct ImportArgs {
    #[arg(default_value = DEFAULT_SOURCE)]
    source: PathBuf,
    #[arg(default_value = DEFAULT_DESTINATION)]
    destination: PathBuf,
    #[arg(default_value = DEFAULT_TABLE)]
    table: String,
    /// Add an identity column, trim headers and coerce typed columns
    #[arg(long)]
    typed: bool,
    /// Declare a column type (implies --typed)
    #[arg(long = "column", value_name = "NAME=TYPE", value_parser = parse_column)]
    columns: Vec<(String, ColumnType)>,
    /// Column whose yes/no values are stored as booleans (implies --typed)
    #[arg(long = "bool-column", value_name = "NAME")]
    bool_columns: Vec<String>,
}

impl Default for ImportArgs {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.into(),
            destination: DEFAULT_DESTINATION.into(),
            table: DEFAULT_TABLE.into(),
            typed: false,
            columns: Vec::new(),
            bool_columns: Vec::new(),
        }
    }
}

impl ImportArgs {
    fn into_request(self) -> ImportRequest {
        if !(self.typed || !self.columns.is_empty() || !self.bool_columns.is_empty()) {
            return ImportRequest::plain(self.source, self.destination, self.table);
        }
        let types: ColumnTypes = self.columns.into_iter().collect();
        let req = ImportRequest::typed(self.source, self.destination, self.table, types);
        if self.bool_columns.is_empty() {
            req
        } else {
            req.with_boolean_columns(self.bool_columns)
        }
    }
}

fn parse_column(s: &str) -> Result<(String, ColumnType), String> {
    let (name, ty) = s
        .split_once('=')
        .ok_or_else(|| format!("expected NAME=TYPE, got '{s}'"))?;
    let ty = ty.parse::<ColumnType>().map_err(|e| e.to_string())?;
    Ok((name.trim().to_string(), ty))
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize file logging under the app config directory
    if let Ok(dir) = Config::app_config_dir() {
        let _ = logger::init(dir.join(LOG_FILE));
    }

    let cli = Cli::parse();
    if let Err(err) = run(cli.command.unwrap_or_else(|| Command::Import(ImportArgs::default()))) {
        println!("Error: {:#}", err);
        error(&format!("fatal error: {:?}", err));
    }

    Ok(())
}

fn run(command: Command) -> Result<()> {
    match command {
        Command::Import(args) => execute(&args.into_request()),
        Command::Run { profile, config } => {
            let config = Config::load(config.as_deref())?;
            execute(&config.profile(&profile)?.to_request()?)
        }
        Command::Profiles { config } => {
            let config = Config::load(config.as_deref())?;
            if config.imports.is_empty() {
                println!("No import profiles configured.");
            }
            for p in &config.imports {
                println!(
                    "{}: {} -> {} ({})",
                    p.name,
                    p.source.display(),
                    p.destination.display(),
                    p.table
                );
            }
            Ok(())
        }
    }
}

fn execute(req: &ImportRequest) -> Result<()> {
    let result = import_csv(req);
    println!("{}", report(req, &result));
    Ok(())
}
