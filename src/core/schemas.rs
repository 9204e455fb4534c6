//! Centralized SQLite schema definitions for the catalog database.
//!
//! A single database holds all three entity tables plus the
//! character/episode join table. Rows are keyed by the numeric id the
//! upstream API assigns, never by a locally generated key.

pub const CATALOG_DB_NAME: &str = "catalog.db";

pub const CATALOG_DB_SCHEMA_LOCATIONS: &str = "
    CREATE TABLE IF NOT EXISTS locations (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        type TEXT,
        dimension TEXT,
        url TEXT,
        created TEXT
    )
";

pub const CATALOG_DB_SCHEMA_EPISODES: &str = "
    CREATE TABLE IF NOT EXISTS episodes (
        id INTEGER PRIMARY KEY,
        name TEXT,
        air_date TEXT,
        episode TEXT,
        url TEXT,
        created TEXT
    )
";

pub const CATALOG_DB_SCHEMA_CHARACTERS: &str = "
    CREATE TABLE IF NOT EXISTS characters (
        id INTEGER PRIMARY KEY,
        name TEXT NOT NULL,
        status TEXT NOT NULL DEFAULT 'unknown',
        species TEXT NOT NULL DEFAULT '',
        type TEXT NOT NULL DEFAULT '',
        gender TEXT,
        image TEXT,
        url TEXT,
        created TEXT,
        origin_id INTEGER,
        location_id INTEGER,
        FOREIGN KEY(origin_id) REFERENCES locations(id),
        FOREIGN KEY(location_id) REFERENCES locations(id)
    )
";

pub const CATALOG_DB_SCHEMA_CHARACTER_EPISODES: &str = "
    CREATE TABLE IF NOT EXISTS character_episodes (
        character_id INTEGER NOT NULL,
        episode_id INTEGER NOT NULL,
        UNIQUE(character_id, episode_id),
        FOREIGN KEY(character_id) REFERENCES characters(id) ON DELETE CASCADE,
        FOREIGN KEY(episode_id) REFERENCES episodes(id) ON DELETE CASCADE
    )
";

pub const CATALOG_DB_INDEX_CHARACTERS_LOCATION: &str =
    "CREATE INDEX IF NOT EXISTS idx_characters_location ON characters(location_id)";
pub const CATALOG_DB_INDEX_CHARACTERS_ORIGIN: &str =
    "CREATE INDEX IF NOT EXISTS idx_characters_origin ON characters(origin_id)";
pub const CATALOG_DB_INDEX_CHARACTER_EPISODES_CHARACTER: &str =
    "CREATE INDEX IF NOT EXISTS idx_character_episodes_character ON character_episodes(character_id)";
pub const CATALOG_DB_INDEX_CHARACTER_EPISODES_EPISODE: &str =
    "CREATE INDEX IF NOT EXISTS idx_character_episodes_episode ON character_episodes(episode_id)";

/// Every statement needed to bring an empty database up to the current schema.
pub const CATALOG_DB_STATEMENTS: &[&str] = &[
    CATALOG_DB_SCHEMA_LOCATIONS,
    CATALOG_DB_SCHEMA_EPISODES,
    CATALOG_DB_SCHEMA_CHARACTERS,
    CATALOG_DB_SCHEMA_CHARACTER_EPISODES,
    CATALOG_DB_INDEX_CHARACTERS_LOCATION,
    CATALOG_DB_INDEX_CHARACTERS_ORIGIN,
    CATALOG_DB_INDEX_CHARACTER_EPISODES_CHARACTER,
    CATALOG_DB_INDEX_CHARACTER_EPISODES_EPISODE,
];
