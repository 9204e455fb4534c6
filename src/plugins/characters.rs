//! Character entity: storage, wire mapping, reference resolution and query CLI.
//!
//! Characters carry the cross-entity references: origin and last-known
//! location (many-to-one) and episode appearances (many-to-many). On the
//! wire these are URLs; locally they are foreign keys resolved by parsing
//! the id out of the URL path.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::plugins::{api_id_from_url, episodes, locations};
use clap::{Parser, Subcommand};
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Character {
    pub id: i64,
    pub name: String,
    pub status: String,
    pub species: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub gender: Option<String>,
    pub image: Option<String>,
    pub url: Option<String>,
    pub created: Option<String>,
    pub origin_id: Option<i64>,
    pub location_id: Option<i64>,
}

/// Named reference to another resource, as the upstream API encodes it.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ResourceRef {
    pub name: String,
    pub url: String,
}

/// Wire-shape character document, mirroring the upstream API JSON.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct CharacterDocument {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub species: Option<String>,
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub origin: Option<ResourceRef>,
    #[serde(default)]
    pub location: Option<ResourceRef>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub episode: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

pub fn upsert_character_row(
    conn: &Connection,
    character: &Character,
) -> Result<(), error::MortydexError> {
    conn.execute(
        "INSERT INTO characters(id, name, status, species, type, gender, image, url, created, origin_id, location_id)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             status = excluded.status,
             species = excluded.species,
             type = excluded.type,
             gender = excluded.gender,
             image = excluded.image,
             url = excluded.url,
             created = excluded.created,
             origin_id = excluded.origin_id,
             location_id = excluded.location_id",
        params![
            character.id,
            character.name,
            character.status,
            character.species,
            character.kind,
            character.gender,
            character.image,
            character.url,
            character.created,
            character.origin_id,
            character.location_id
        ],
    )?;
    Ok(())
}

pub fn character_exists(conn: &Connection, id: i64) -> Result<bool, error::MortydexError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM characters WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

/// Record a character appearance in an episode. Duplicate links are ignored.
pub fn link_episode(
    conn: &Connection,
    character_id: i64,
    episode_id: i64,
) -> Result<(), error::MortydexError> {
    conn.execute(
        "INSERT OR IGNORE INTO character_episodes(character_id, episode_id) VALUES(?1, ?2)",
        params![character_id, episode_id],
    )?;
    Ok(())
}

/// Resolve a location reference URL against the local catalog.
/// Only references to locations already present resolve; anything else
/// (empty URL, non-numeric id, unknown row) yields None.
fn resolve_location_ref(
    conn: &Connection,
    reference: Option<&ResourceRef>,
) -> Result<Option<i64>, error::MortydexError> {
    let Some(reference) = reference else {
        return Ok(None);
    };
    let Some(id) = api_id_from_url(&reference.url) else {
        return Ok(None);
    };
    if locations::location_exists(conn, id)? {
        Ok(Some(id))
    } else {
        Ok(None)
    }
}

/// Upsert the character, resolving origin/location references and linking
/// any referenced episodes that already exist in the catalog.
pub fn denormalize_character(
    conn: &Connection,
    document: CharacterDocument,
) -> Result<(), error::MortydexError> {
    let origin_id = resolve_location_ref(conn, document.origin.as_ref())?;
    let location_id = resolve_location_ref(conn, document.location.as_ref())?;

    let character = Character {
        id: document.id,
        name: document.name,
        status: document.status.unwrap_or_else(|| "unknown".to_string()),
        species: document.species.unwrap_or_default(),
        kind: document.kind.unwrap_or_default(),
        gender: document.gender,
        image: document.image,
        url: document.url,
        created: document.created,
        origin_id,
        location_id,
    };
    upsert_character_row(conn, &character)?;

    for url in &document.episode {
        if let Some(episode_id) = api_id_from_url(url) {
            if episodes::episode_exists(conn, episode_id)? {
                link_episode(conn, character.id, episode_id)?;
            }
        }
    }
    Ok(())
}

fn row_to_character(row: &rusqlite::Row<'_>) -> rusqlite::Result<Character> {
    Ok(Character {
        id: row.get(0)?,
        name: row.get(1)?,
        status: row.get(2)?,
        species: row.get(3)?,
        kind: row.get(4)?,
        gender: row.get(5)?,
        image: row.get(6)?,
        url: row.get(7)?,
        created: row.get(8)?,
        origin_id: row.get(9)?,
        location_id: row.get(10)?,
    })
}

const CHARACTER_COLUMNS: &str =
    "id, name, status, species, type, gender, image, url, created, origin_id, location_id";

pub fn get_character_row(
    conn: &Connection,
    id: i64,
) -> Result<Option<Character>, error::MortydexError> {
    let character = conn
        .query_row(
            &format!("SELECT {} FROM characters WHERE id = ?1", CHARACTER_COLUMNS),
            params![id],
            row_to_character,
        )
        .optional()?;
    Ok(character)
}

pub fn list_character_rows(conn: &Connection) -> Result<Vec<Character>, error::MortydexError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM characters ORDER BY id",
        CHARACTER_COLUMNS
    ))?;
    let rows = stmt.query_map([], row_to_character)?;

    let mut results = Vec::new();
    for r in rows {
        results.push(r?);
    }
    Ok(results)
}

pub fn episode_ids(conn: &Connection, character_id: i64) -> Result<Vec<i64>, error::MortydexError> {
    let mut stmt = conn.prepare(
        "SELECT episode_id FROM character_episodes WHERE character_id = ?1 ORDER BY episode_id",
    )?;
    let rows = stmt.query_map(params![character_id], |row| row.get::<_, i64>(0))?;

    let mut ids = Vec::new();
    for id in rows {
        ids.push(id?);
    }
    Ok(ids)
}

pub fn get_character(store: &Store, id: i64) -> Result<Option<Character>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "characters.get", |conn| {
        get_character_row(conn, id)
    })
}

pub fn list_characters(store: &Store) -> Result<Vec<Character>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "characters.list", |conn| {
        list_character_rows(conn)
    })
}

fn location_ref(
    conn: &Connection,
    location_id: Option<i64>,
    base_url: &str,
) -> Result<ResourceRef, error::MortydexError> {
    // The upstream API uses a named empty reference for unknown locations.
    let Some(id) = location_id else {
        return Ok(ResourceRef {
            name: "unknown".to_string(),
            url: String::new(),
        });
    };
    let name = match locations::get_location_row(conn, id)? {
        Some(location) => location.name,
        None => "unknown".to_string(),
    };
    Ok(ResourceRef {
        name,
        url: format!("{}/api/locations/{}", base_url, id),
    })
}

/// Build the wire document for one character, with every reference URL
/// pointing at `base_url`.
pub fn normalize_character(
    conn: &Connection,
    character: &Character,
    base_url: &str,
) -> Result<CharacterDocument, error::MortydexError> {
    let episode_urls = episode_ids(conn, character.id)?
        .into_iter()
        .map(|id| format!("{}/api/episodes/{}", base_url, id))
        .collect();

    Ok(CharacterDocument {
        id: character.id,
        name: character.name.clone(),
        status: Some(character.status.clone()),
        species: Some(character.species.clone()),
        kind: Some(character.kind.clone()),
        gender: character.gender.clone(),
        origin: Some(location_ref(conn, character.origin_id, base_url)?),
        location: Some(location_ref(conn, character.location_id, base_url)?),
        image: character.image.clone(),
        episode: episode_urls,
        url: Some(format!("{}/api/characters/{}", base_url, character.id)),
        created: character.created.clone(),
    })
}

#[derive(Parser, Debug)]
#[clap(name = "character", about = "Query characters in the local catalog.")]
pub struct CharactersCli {
    #[clap(subcommand)]
    pub command: CharactersCommand,
}

#[derive(Subcommand, Debug)]
pub enum CharactersCommand {
    /// List all characters.
    List,
    /// Show one character as a wire-shape JSON document.
    Get {
        #[clap(long)]
        id: i64,
    },
}

pub fn run_characters_cli(store: &Store, cli: CharactersCli) -> Result<(), error::MortydexError> {
    match cli.command {
        CharactersCommand::List => {
            let characters = list_characters(store)?;
            println!("{}", serde_json::to_string_pretty(&characters)?);
        }
        CharactersCommand::Get { id } => {
            let broker = DbBroker::new(&store.root);
            let db_path = db::catalog_db_path(&store.root);
            let document =
                broker.with_conn(&db_path, "mortydex", None, "characters.get", |conn| {
                    match get_character_row(conn, id)? {
                        Some(character) => Ok(Some(normalize_character(
                            conn,
                            &character,
                            &crate::core::config::public_base_url(),
                        )?)),
                        None => Ok(None),
                    }
                })?;
            match document {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => {
                    return Err(error::MortydexError::NotFound(format!("character {}", id)));
                }
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "characters",
        "version": "0.1.0",
        "description": "Character catalog entity with location and episode references",
        "commands": [
            { "name": "list", "parameters": [] },
            { "name": "get", "parameters": ["id"] }
        ],
        "storage": ["catalog.db"]
    })
}
