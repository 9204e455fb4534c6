//! Location entity: storage, wire mapping and query CLI.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

/// A location row, keyed by the upstream API id.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Location {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub dimension: Option<String>,
    pub url: Option<String>,
    pub created: Option<String>,
}

/// Wire-shape location document, mirroring the upstream API JSON.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LocationDocument {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub dimension: Option<String>,
    #[serde(default)]
    pub residents: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

impl LocationDocument {
    /// Residents are derived from character rows, never imported directly.
    pub fn into_row(self) -> Location {
        Location {
            id: self.id,
            name: self.name,
            kind: self.kind,
            dimension: self.dimension,
            url: self.url,
            created: self.created,
        }
    }
}

pub fn upsert_location_row(conn: &Connection, location: &Location) -> Result<(), error::MortydexError> {
    conn.execute(
        "INSERT INTO locations(id, name, type, dimension, url, created)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             type = excluded.type,
             dimension = excluded.dimension,
             url = excluded.url,
             created = excluded.created",
        params![
            location.id,
            location.name,
            location.kind,
            location.dimension,
            location.url,
            location.created
        ],
    )?;
    Ok(())
}

pub fn upsert_location(store: &Store, location: &Location) -> Result<(), error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "locations.upsert", |conn| {
        upsert_location_row(conn, location)
    })
}

pub fn location_exists(conn: &Connection, id: i64) -> Result<bool, error::MortydexError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM locations WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn row_to_location(row: &rusqlite::Row<'_>) -> rusqlite::Result<Location> {
    Ok(Location {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        dimension: row.get(3)?,
        url: row.get(4)?,
        created: row.get(5)?,
    })
}

pub fn get_location_row(conn: &Connection, id: i64) -> Result<Option<Location>, error::MortydexError> {
    let location = conn
        .query_row(
            "SELECT id, name, type, dimension, url, created FROM locations WHERE id = ?1",
            params![id],
            row_to_location,
        )
        .optional()?;
    Ok(location)
}

pub fn list_location_rows(conn: &Connection) -> Result<Vec<Location>, error::MortydexError> {
    let mut stmt =
        conn.prepare("SELECT id, name, type, dimension, url, created FROM locations ORDER BY id")?;
    let rows = stmt.query_map([], row_to_location)?;

    let mut results = Vec::new();
    for r in rows {
        results.push(r?);
    }
    Ok(results)
}

pub fn get_location(store: &Store, id: i64) -> Result<Option<Location>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "locations.get", |conn| {
        get_location_row(conn, id)
    })
}

pub fn list_locations(store: &Store) -> Result<Vec<Location>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "locations.list", |conn| {
        list_location_rows(conn)
    })
}

/// Build the wire document for one location, with resident links pointing at
/// `base_url`.
pub fn normalize_location(
    conn: &Connection,
    location: &Location,
    base_url: &str,
) -> Result<LocationDocument, error::MortydexError> {
    let mut stmt =
        conn.prepare("SELECT id FROM characters WHERE location_id = ?1 ORDER BY id")?;
    let ids = stmt.query_map(params![location.id], |row| row.get::<_, i64>(0))?;

    let mut residents = Vec::new();
    for id in ids {
        residents.push(format!("{}/api/characters/{}", base_url, id?));
    }

    Ok(LocationDocument {
        id: location.id,
        name: location.name.clone(),
        kind: location.kind.clone(),
        dimension: location.dimension.clone(),
        residents,
        url: Some(format!("{}/api/locations/{}", base_url, location.id)),
        created: location.created.clone(),
    })
}

#[derive(Parser, Debug)]
#[clap(name = "location", about = "Query locations in the local catalog.")]
pub struct LocationsCli {
    #[clap(subcommand)]
    pub command: LocationsCommand,
}

#[derive(Subcommand, Debug)]
pub enum LocationsCommand {
    /// List all locations.
    List,
    /// Show one location as a wire-shape JSON document.
    Get {
        #[clap(long)]
        id: i64,
    },
}

pub fn run_locations_cli(store: &Store, cli: LocationsCli) -> Result<(), error::MortydexError> {
    match cli.command {
        LocationsCommand::List => {
            let locations = list_locations(store)?;
            println!("{}", serde_json::to_string_pretty(&locations)?);
        }
        LocationsCommand::Get { id } => {
            let broker = DbBroker::new(&store.root);
            let db_path = db::catalog_db_path(&store.root);
            let document =
                broker.with_conn(&db_path, "mortydex", None, "locations.get", |conn| {
                    match get_location_row(conn, id)? {
                        Some(location) => Ok(Some(normalize_location(
                            conn,
                            &location,
                            &crate::core::config::public_base_url(),
                        )?)),
                        None => Ok(None),
                    }
                })?;
            match document {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => {
                    return Err(error::MortydexError::NotFound(format!("location {}", id)));
                }
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "locations",
        "version": "0.1.0",
        "description": "Location catalog entity",
        "commands": [
            { "name": "list", "parameters": [] },
            { "name": "get", "parameters": ["id"] }
        ],
        "storage": ["catalog.db"]
    })
}
