//! JSON file import with skip-and-count failure handling.
//!
//! The entity type is inferred from the file name (`characters.json`,
//! `episodes.json`, `locations.json`). A malformed item is warned about and
//! counted as failed; the rest of the file still imports.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::plugins::{characters, episodes, locations};
use clap::Parser;
use colored::Colorize;
use rusqlite::Connection;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Character,
    Episode,
    Location,
}

impl EntityKind {
    /// Entity type keyed off the import file name, matching the layout
    /// `export` writes.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        match file_name {
            "characters.json" => Some(EntityKind::Character),
            "episodes.json" => Some(EntityKind::Episode),
            "locations.json" => Some(EntityKind::Location),
            _ => None,
        }
    }

    pub fn singular(&self) -> &'static str {
        match self {
            EntityKind::Character => "character",
            EntityKind::Episode => "episode",
            EntityKind::Location => "location",
        }
    }

    pub fn plural(&self) -> &'static str {
        match self {
            EntityKind::Character => "characters",
            EntityKind::Episode => "episodes",
            EntityKind::Location => "locations",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImportOutcome {
    pub imported: usize,
    pub failed: usize,
}

fn import_items<D, F>(
    conn: &Connection,
    kind: EntityKind,
    items: &[serde_json::Value],
    apply: F,
) -> ImportOutcome
where
    D: DeserializeOwned,
    F: Fn(&Connection, D) -> Result<(), error::MortydexError>,
{
    let mut outcome = ImportOutcome {
        imported: 0,
        failed: 0,
    };

    for item in items {
        let item_id = item
            .get("id")
            .map(|id| id.to_string())
            .unwrap_or_else(|| "N/A".to_string());

        let result = serde_json::from_value::<D>(item.clone())
            .map_err(error::MortydexError::JsonError)
            .and_then(|document| apply(conn, document));

        match result {
            Ok(()) => outcome.imported += 1,
            Err(e) => {
                outcome.failed += 1;
                eprintln!(
                    "{} Failed to import {} with id {}: {}",
                    "⚠".bright_yellow(),
                    kind.singular(),
                    item_id,
                    e
                );
            }
        }
    }

    outcome
}

/// Import every item of `items` as `kind`. One broker operation covers the
/// whole file; individual item failures do not abort it.
pub fn import_entities(
    store: &Store,
    kind: EntityKind,
    items: &[serde_json::Value],
) -> Result<ImportOutcome, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    let op_name = format!("import.{}", kind.plural());

    broker.with_conn(&db_path, "mortydex", None, &op_name, |conn| {
        let outcome = match kind {
            EntityKind::Location => {
                import_items(conn, kind, items, |conn, document: locations::LocationDocument| {
                    locations::upsert_location_row(conn, &document.into_row())
                })
            }
            EntityKind::Episode => import_items(conn, kind, items, episodes::denormalize_episode),
            EntityKind::Character => {
                import_items(conn, kind, items, characters::denormalize_character)
            }
        };
        Ok(outcome)
    })
}

/// Import one JSON array file, inferring the entity type from its name.
pub fn import_file(store: &Store, path: &Path) -> Result<ImportOutcome, error::MortydexError> {
    if !path.exists() {
        return Err(error::MortydexError::NotFound(format!(
            "File not found: {}",
            path.display()
        )));
    }

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_default();
    let Some(kind) = EntityKind::from_file_name(&file_name) else {
        return Err(error::MortydexError::ValidationError(format!(
            "Cannot determine entity type from filename: {}",
            file_name
        )));
    };

    let content = fs::read_to_string(path).map_err(error::MortydexError::IoError)?;
    let items: Vec<serde_json::Value> = serde_json::from_str(&content).map_err(|_| {
        error::MortydexError::ValidationError("Invalid JSON format".to_string())
    })?;

    println!("Starting import of {} {}...", items.len(), kind.plural());
    import_entities(store, kind, &items)
}

#[derive(Parser, Debug)]
#[clap(name = "import", about = "Import data from a JSON file into the catalog.")]
pub struct ImportCli {
    /// Path to the JSON file to import (characters.json, episodes.json or locations.json).
    pub file: PathBuf,
}

pub fn run_import_cli(store: &Store, cli: ImportCli) -> Result<(), error::MortydexError> {
    let outcome = import_file(store, &cli.file)?;

    if outcome.failed > 0 {
        println!(
            "{} Imported {} items, {} failed",
            "⚠".bright_yellow(),
            outcome.imported,
            outcome.failed
        );
    } else {
        println!(
            "{} Imported {} items successfully",
            "✓".bright_green(),
            outcome.imported
        );
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "import",
        "version": "0.1.0",
        "description": "JSON file importer with skip-and-count failure handling",
        "commands": [
            { "name": "import", "parameters": ["file"] }
        ],
        "storage": ["catalog.db"]
    })
}
