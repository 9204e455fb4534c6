//! JSON file export in the upstream wire shape.

use crate::core::broker::DbBroker;
use crate::core::config;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::plugins::import::EntityKind;
use crate::plugins::{characters, episodes, locations};
use clap::Parser;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

pub fn entity_kind_from_arg(entity_type: &str) -> Option<EntityKind> {
    match entity_type.to_lowercase().as_str() {
        "character" => Some(EntityKind::Character),
        "episode" => Some(EntityKind::Episode),
        "location" => Some(EntityKind::Location),
        _ => None,
    }
}

/// Serialize every row of one entity type into the wire shape, with all
/// reference URLs pointing at the configured public base URL.
pub fn export_entities(
    store: &Store,
    kind: EntityKind,
) -> Result<Vec<serde_json::Value>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    let op_name = format!("export.{}", kind.plural());
    let base_url = config::public_base_url();

    broker.with_conn(&db_path, "mortydex", None, &op_name, |conn| {
        let mut documents = Vec::new();
        match kind {
            EntityKind::Location => {
                for location in locations::list_location_rows(conn)? {
                    let document = locations::normalize_location(conn, &location, &base_url)?;
                    documents.push(serde_json::to_value(document)?);
                }
            }
            EntityKind::Episode => {
                for episode in episodes::list_episode_rows(conn)? {
                    let document = episodes::normalize_episode(conn, &episode, &base_url)?;
                    documents.push(serde_json::to_value(document)?);
                }
            }
            EntityKind::Character => {
                for character in characters::list_character_rows(conn)? {
                    let document = characters::normalize_character(conn, &character, &base_url)?;
                    documents.push(serde_json::to_value(document)?);
                }
            }
        }
        Ok(documents)
    })
}

#[derive(Parser, Debug)]
#[clap(name = "export", about = "Export catalog data to a JSON file.")]
pub struct ExportCli {
    /// The entity type to export (character, episode or location).
    pub entity_type: String,
    /// Output path. Defaults to data/<type>s.json.
    pub output_file: Option<PathBuf>,
}

pub fn run_export_cli(store: &Store, cli: ExportCli) -> Result<(), error::MortydexError> {
    let Some(kind) = entity_kind_from_arg(&cli.entity_type) else {
        return Err(error::MortydexError::ValidationError(format!(
            "Entity '{}' not found. Supported types: character, episode, location",
            cli.entity_type
        )));
    };

    let output_file = cli
        .output_file
        .unwrap_or_else(|| PathBuf::from(format!("data/{}.json", kind.plural())));

    let documents = export_entities(store, kind)?;
    let json = serde_json::to_string_pretty(&documents)?;

    if let Some(dir) = output_file.parent() {
        if !dir.as_os_str().is_empty() {
            fs::create_dir_all(dir).map_err(error::MortydexError::IoError)?;
        }
    }
    fs::write(&output_file, json).map_err(error::MortydexError::IoError)?;

    println!(
        "{} Exported {} {} to {}",
        "✓".bright_green(),
        documents.len(),
        kind.plural(),
        output_file.display()
    );
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "export",
        "version": "0.1.0",
        "description": "Wire-shape JSON exporter",
        "commands": [
            { "name": "export", "parameters": ["entity_type", "output_file"] }
        ],
        "storage": ["catalog.db"]
    })
}
