//! Episode entity: storage, wire mapping and query CLI.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::plugins::{api_id_from_url, characters};
use clap::{Parser, Subcommand};
use regex::Regex;
use rusqlite::{Connection, OptionalExtension, params};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Episode {
    pub id: i64,
    pub name: Option<String>,
    pub air_date: Option<String>,
    pub episode: Option<String>,
    pub url: Option<String>,
    pub created: Option<String>,
}

/// Wire-shape episode document, mirroring the upstream API JSON.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct EpisodeDocument {
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode: Option<String>,
    #[serde(default)]
    pub characters: Vec<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
}

impl EpisodeDocument {
    pub fn into_row(self) -> Episode {
        Episode {
            id: self.id,
            name: self.name,
            air_date: self.air_date,
            episode: self.episode,
            url: self.url,
            created: self.created,
        }
    }
}

/// Episode codes follow the `S01E01` convention upstream. A nonempty code
/// that does not match is treated as a malformed item on import.
pub fn validate_episode_code(code: &str) -> Result<(), error::MortydexError> {
    let re = Regex::new(r"^S\d{2}E\d{2}$").map_err(|e| {
        error::MortydexError::ValidationError(format!("episode code pattern: {}", e))
    })?;
    if !re.is_match(code) {
        return Err(error::MortydexError::ValidationError(format!(
            "Invalid episode code: '{}'. Expected format like 'S01E01'",
            code
        )));
    }
    Ok(())
}

pub fn upsert_episode_row(conn: &Connection, episode: &Episode) -> Result<(), error::MortydexError> {
    conn.execute(
        "INSERT INTO episodes(id, name, air_date, episode, url, created)
         VALUES(?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(id) DO UPDATE SET
             name = excluded.name,
             air_date = excluded.air_date,
             episode = excluded.episode,
             url = excluded.url,
             created = excluded.created",
        params![
            episode.id,
            episode.name,
            episode.air_date,
            episode.episode,
            episode.url,
            episode.created
        ],
    )?;
    Ok(())
}

/// Upsert the episode and link any referenced characters that already exist
/// in the catalog. Unknown character references are skipped.
pub fn denormalize_episode(
    conn: &Connection,
    document: EpisodeDocument,
) -> Result<(), error::MortydexError> {
    if let Some(code) = document.episode.as_deref() {
        if !code.is_empty() {
            validate_episode_code(code)?;
        }
    }

    let character_urls = document.characters.clone();
    let episode_id = document.id;
    upsert_episode_row(conn, &document.into_row())?;

    for url in &character_urls {
        if let Some(character_id) = api_id_from_url(url) {
            if characters::character_exists(conn, character_id)? {
                characters::link_episode(conn, character_id, episode_id)?;
            }
        }
    }
    Ok(())
}

pub fn episode_exists(conn: &Connection, id: i64) -> Result<bool, error::MortydexError> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM episodes WHERE id = ?1", params![id], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(found.is_some())
}

fn row_to_episode(row: &rusqlite::Row<'_>) -> rusqlite::Result<Episode> {
    Ok(Episode {
        id: row.get(0)?,
        name: row.get(1)?,
        air_date: row.get(2)?,
        episode: row.get(3)?,
        url: row.get(4)?,
        created: row.get(5)?,
    })
}

pub fn get_episode_row(conn: &Connection, id: i64) -> Result<Option<Episode>, error::MortydexError> {
    let episode = conn
        .query_row(
            "SELECT id, name, air_date, episode, url, created FROM episodes WHERE id = ?1",
            params![id],
            row_to_episode,
        )
        .optional()?;
    Ok(episode)
}

pub fn list_episode_rows(conn: &Connection) -> Result<Vec<Episode>, error::MortydexError> {
    let mut stmt =
        conn.prepare("SELECT id, name, air_date, episode, url, created FROM episodes ORDER BY id")?;
    let rows = stmt.query_map([], row_to_episode)?;

    let mut results = Vec::new();
    for r in rows {
        results.push(r?);
    }
    Ok(results)
}

pub fn get_episode(store: &Store, id: i64) -> Result<Option<Episode>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "episodes.get", |conn| {
        get_episode_row(conn, id)
    })
}

pub fn list_episodes(store: &Store) -> Result<Vec<Episode>, error::MortydexError> {
    let broker = DbBroker::new(&store.root);
    let db_path = db::catalog_db_path(&store.root);
    broker.with_conn(&db_path, "mortydex", None, "episodes.list", |conn| {
        list_episode_rows(conn)
    })
}

/// Build the wire document for one episode, with character links pointing at
/// `base_url`.
pub fn normalize_episode(
    conn: &Connection,
    episode: &Episode,
    base_url: &str,
) -> Result<EpisodeDocument, error::MortydexError> {
    let mut stmt = conn.prepare(
        "SELECT character_id FROM character_episodes WHERE episode_id = ?1 ORDER BY character_id",
    )?;
    let ids = stmt.query_map(params![episode.id], |row| row.get::<_, i64>(0))?;

    let mut character_urls = Vec::new();
    for id in ids {
        character_urls.push(format!("{}/api/characters/{}", base_url, id?));
    }

    Ok(EpisodeDocument {
        id: episode.id,
        name: episode.name.clone(),
        air_date: episode.air_date.clone(),
        episode: episode.episode.clone(),
        characters: character_urls,
        url: Some(format!("{}/api/episodes/{}", base_url, episode.id)),
        created: episode.created.clone(),
    })
}

#[derive(Parser, Debug)]
#[clap(name = "episode", about = "Query episodes in the local catalog.")]
pub struct EpisodesCli {
    #[clap(subcommand)]
    pub command: EpisodesCommand,
}

#[derive(Subcommand, Debug)]
pub enum EpisodesCommand {
    /// List all episodes.
    List,
    /// Show one episode as a wire-shape JSON document.
    Get {
        #[clap(long)]
        id: i64,
    },
}

pub fn run_episodes_cli(store: &Store, cli: EpisodesCli) -> Result<(), error::MortydexError> {
    match cli.command {
        EpisodesCommand::List => {
            let episodes = list_episodes(store)?;
            println!("{}", serde_json::to_string_pretty(&episodes)?);
        }
        EpisodesCommand::Get { id } => {
            let broker = DbBroker::new(&store.root);
            let db_path = db::catalog_db_path(&store.root);
            let document = broker.with_conn(&db_path, "mortydex", None, "episodes.get", |conn| {
                match get_episode_row(conn, id)? {
                    Some(episode) => Ok(Some(normalize_episode(
                        conn,
                        &episode,
                        &crate::core::config::public_base_url(),
                    )?)),
                    None => Ok(None),
                }
            })?;
            match document {
                Some(document) => println!("{}", serde_json::to_string_pretty(&document)?),
                None => {
                    return Err(error::MortydexError::NotFound(format!("episode {}", id)));
                }
            }
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "episodes",
        "version": "0.1.0",
        "description": "Episode catalog entity",
        "commands": [
            { "name": "list", "parameters": [] },
            { "name": "get", "parameters": ["id"] }
        ],
        "storage": ["catalog.db"]
    })
}
