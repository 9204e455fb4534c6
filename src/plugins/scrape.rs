//! Paginated scraping client for the upstream Rick and Morty API.
//!
//! Each collection endpoint returns pages shaped as `{info, results}` where
//! `info.next` is the cursor URL of the following page (null on the last
//! page). The importer walks that chain, upserting every result row and
//! sleeping a fixed delay between page fetches. Collections are imported
//! locations first, then episodes, then characters, so that reference URLs
//! resolve against rows that already exist.

use crate::core::broker::DbBroker;
use crate::core::config;
use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::plugins::{characters, episodes, locations};
use clap::Parser;
use colored::Colorize;
use rusqlite::Connection;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::thread;
use std::time::Duration;

/// Delay between page fetches, matching the upstream rate-limit etiquette.
pub const PAGE_DELAY: Duration = Duration::from_millis(200);

/// Fetch seam so tests can feed canned pages instead of hitting the network.
pub trait Transport {
    fn fetch(&self, url: &str) -> Result<String, error::MortydexError>;
}

pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        Self {
            agent: ureq::agent(),
        }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn fetch(&self, url: &str) -> Result<String, error::MortydexError> {
        let body = self.agent.get(url).call()?.into_string()?;
        Ok(body)
    }
}

#[derive(Debug, Deserialize)]
pub struct PageInfo {
    pub count: u64,
    #[serde(default)]
    pub pages: u64,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub prev: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Page<T> {
    pub info: PageInfo,
    pub results: Vec<T>,
}

pub struct RickAndMortyClient<'a, T: Transport> {
    transport: &'a T,
    base_url: String,
    page_delay: Duration,
}

impl<'a, T: Transport> RickAndMortyClient<'a, T> {
    pub fn new(transport: &'a T, base_url: &str) -> Self {
        Self {
            transport,
            base_url: base_url.trim_end_matches('/').to_string(),
            page_delay: PAGE_DELAY,
        }
    }

    /// Tests use a zero delay; production keeps [`PAGE_DELAY`].
    pub fn with_page_delay(mut self, page_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self
    }

    pub fn characters_url(&self) -> String {
        format!("{}/character", self.base_url)
    }

    pub fn episodes_url(&self) -> String {
        format!("{}/episode", self.base_url)
    }

    pub fn locations_url(&self) -> String {
        format!("{}/location", self.base_url)
    }

    fn collection_count(&self, url: &str) -> Result<u64, error::MortydexError> {
        let body = self.transport.fetch(url)?;
        let page: Page<serde_json::Value> = serde_json::from_str(&body)?;
        Ok(page.info.count)
    }

    pub fn character_count(&self) -> Result<u64, error::MortydexError> {
        self.collection_count(&self.characters_url())
    }

    pub fn episode_count(&self) -> Result<u64, error::MortydexError> {
        self.collection_count(&self.episodes_url())
    }

    pub fn location_count(&self) -> Result<u64, error::MortydexError> {
        self.collection_count(&self.locations_url())
    }

    /// Walk the `info.next` chain from `start_url`, applying `apply` to every
    /// result row. One broker operation per page. Returns the number of rows
    /// processed.
    fn import_paged<D, F>(
        &self,
        store: &Store,
        start_url: String,
        op_name: &str,
        apply: F,
        progress: &mut dyn FnMut(),
    ) -> Result<u64, error::MortydexError>
    where
        D: DeserializeOwned,
        F: Fn(&Connection, D) -> Result<(), error::MortydexError>,
    {
        let broker = DbBroker::new(&store.root);
        let db_path = db::catalog_db_path(&store.root);
        let mut processed = 0u64;
        let mut url = Some(start_url);

        while let Some(page_url) = url {
            let body = self.transport.fetch(&page_url)?;
            let page: Page<D> = serde_json::from_str(&body)?;

            broker.with_conn(&db_path, "mortydex", None, op_name, |conn| {
                for item in page.results {
                    apply(conn, item)?;
                    processed += 1;
                    progress();
                }
                Ok(())
            })?;

            url = page.info.next;
            if url.is_some() && !self.page_delay.is_zero() {
                thread::sleep(self.page_delay);
            }
        }

        Ok(processed)
    }

    pub fn import_locations(
        &self,
        store: &Store,
        progress: &mut dyn FnMut(),
    ) -> Result<u64, error::MortydexError> {
        self.import_paged(
            store,
            self.locations_url(),
            "scrape.locations",
            |conn, document: locations::LocationDocument| {
                locations::upsert_location_row(conn, &document.into_row())
            },
            progress,
        )
    }

    pub fn import_episodes(
        &self,
        store: &Store,
        progress: &mut dyn FnMut(),
    ) -> Result<u64, error::MortydexError> {
        self.import_paged(
            store,
            self.episodes_url(),
            "scrape.episodes",
            episodes::denormalize_episode,
            progress,
        )
    }

    pub fn import_characters(
        &self,
        store: &Store,
        progress: &mut dyn FnMut(),
    ) -> Result<u64, error::MortydexError> {
        self.import_paged(
            store,
            self.characters_url(),
            "scrape.characters",
            characters::denormalize_character,
            progress,
        )
    }
}

#[derive(Parser, Debug)]
#[clap(name = "scrape", about = "Scrape the upstream API into the local catalog.")]
pub struct ScrapeCli {}

pub fn run_scrape_cli(store: &Store, _cli: ScrapeCli) -> Result<(), error::MortydexError> {
    let transport = UreqTransport::new();
    let client = RickAndMortyClient::new(&transport, &config::api_base_url());

    let location_count = client.location_count()?;
    let episode_count = client.episode_count()?;
    let character_count = client.character_count()?;

    println!("Starting data import from {}", config::api_base_url());

    println!("Importing locations...");
    let imported = client.import_locations(store, &mut || {})?;
    println!(
        "  {} {}/{} locations",
        "✓".bright_green(),
        imported,
        location_count
    );

    println!("Importing episodes...");
    let imported = client.import_episodes(store, &mut || {})?;
    println!(
        "  {} {}/{} episodes",
        "✓".bright_green(),
        imported,
        episode_count
    );

    println!("Importing characters...");
    let imported = client.import_characters(store, &mut || {})?;
    println!(
        "  {} {}/{} characters",
        "✓".bright_green(),
        imported,
        character_count
    );

    println!("{}", "Data imported successfully".bright_green());
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "scrape",
        "version": "0.1.0",
        "description": "Paginated importer for the upstream API",
        "commands": [
            { "name": "scrape", "parameters": [] }
        ],
        "storage": ["catalog.db"]
    })
}
