//! Mortydex: a local Rick and Morty catalog.
//!
//! One binary, one SQLite database. The catalog holds three related
//! entities (characters, episodes, locations) keyed by the upstream API's
//! numeric ids, and the CLI moves data in and out of it:
//!
//! - `scrape` walks the upstream API's paginated collections and upserts
//!   every row, resolving cross-entity references from URL paths
//! - `import` / `export` round-trip JSON files in the upstream wire shape
//! - `fixtures load` seeds the catalog from embedded sample data
//! - `character` / `episode` / `location` query the catalog
//!
//! All mutations route through the [`crate::core::broker::DbBroker`] thin waist,
//! which serializes access and appends a JSONL audit event per operation.

pub mod core;
pub mod plugins;

use crate::core::{db, error, store::Store};
use crate::plugins::{characters, episodes, export, fixtures, import, locations, scrape};

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

pub const MORTYDEX_VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Parser, Debug)]
#[clap(
    name = "mortydex",
    version = env!("CARGO_PKG_VERSION"),
    about = "Local Rick and Morty catalog: scrape, import, export, query."
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(clap::Args, Debug)]
struct InitCli {
    /// Directory to initialize (defaults to current working directory).
    #[clap(short, long)]
    dir: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
struct SchemaCli {
    /// Optional: filter by subsystem name
    #[clap(long)]
    subsystem: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Initialize the catalog database in this directory
    #[clap(name = "init", visible_alias = "i")]
    Init(InitCli),

    /// Scrape the upstream API into the catalog
    #[clap(name = "scrape")]
    Scrape(scrape::ScrapeCli),

    /// Import entities from a JSON file
    #[clap(name = "import")]
    Import(import::ImportCli),

    /// Export entities to a JSON file
    #[clap(name = "export")]
    Export(export::ExportCli),

    /// Embedded seed data
    #[clap(name = "fixtures")]
    Fixtures(fixtures::FixturesCli),

    /// Query characters
    #[clap(name = "character", visible_alias = "c")]
    Character(characters::CharactersCli),

    /// Query episodes
    #[clap(name = "episode", visible_alias = "e")]
    Episode(episodes::EpisodesCli),

    /// Query locations
    #[clap(name = "location", visible_alias = "l")]
    Location(locations::LocationsCli),

    /// Show the audit log of brokered mutations
    #[clap(name = "audit")]
    Audit,

    /// Subsystem schemas and discovery
    #[clap(name = "schema")]
    Schema(SchemaCli),

    /// Show version information
    #[clap(name = "version")]
    Version,
}

fn find_project_root(start_dir: &Path) -> Result<PathBuf, error::MortydexError> {
    let mut current_dir = PathBuf::from(start_dir);
    loop {
        if current_dir.join(".mortydex").exists() {
            return Ok(current_dir);
        }
        if !current_dir.pop() {
            return Err(error::MortydexError::NotFound(
                "'.mortydex' directory not found in current or parent directories. Run `mortydex init` first.".to_string(),
            ));
        }
    }
}

fn run_init(init_cli: InitCli, current_dir: &Path) -> Result<(), error::MortydexError> {
    let target_dir = match init_cli.dir {
        Some(d) => d,
        None => current_dir.to_path_buf(),
    };
    let target_dir = std::fs::canonicalize(&target_dir).map_err(error::MortydexError::IoError)?;

    let store_root = target_dir.join(".mortydex").join("data");
    let db_path = db::catalog_db_path(&store_root);

    if db_path.exists() {
        println!(
            "    {} {} {}",
            "✓".bright_green(),
            "catalog.db".bright_white(),
            "(preserved - existing data kept)".bright_black()
        );
    } else {
        db::initialize_catalog_db(&store_root)?;
        println!("    {} {}", "●".bright_green(), "catalog.db".bright_white());
    }

    println!(
        "Catalog initialized at {}",
        store_root.display().to_string().bright_cyan()
    );
    Ok(())
}

pub fn run() -> Result<(), error::MortydexError> {
    let cli = Cli::parse();
    let current_dir = std::env::current_dir()?;

    match cli.command {
        Command::Version => {
            // Simple output for scripts/parsing
            println!("v{}", MORTYDEX_VERSION);
            return Ok(());
        }
        Command::Init(init_cli) => {
            run_init(init_cli, &current_dir)?;
            return Ok(());
        }
        _ => {}
    }

    // For other commands, ensure .mortydex exists
    let project_root = find_project_root(&current_dir)?;
    let store_root = project_root.join(".mortydex").join("data");
    db::initialize_catalog_db(&store_root)?;
    let store = Store::new(store_root.clone());

    match cli.command {
        Command::Scrape(scrape_cli) => {
            scrape::run_scrape_cli(&store, scrape_cli)?;
        }
        Command::Import(import_cli) => {
            import::run_import_cli(&store, import_cli)?;
        }
        Command::Export(export_cli) => {
            export::run_export_cli(&store, export_cli)?;
        }
        Command::Fixtures(fixtures_cli) => {
            fixtures::run_fixtures_cli(&store, fixtures_cli)?;
        }
        Command::Character(characters_cli) => {
            characters::run_characters_cli(&store, characters_cli)?;
        }
        Command::Episode(episodes_cli) => {
            episodes::run_episodes_cli(&store, episodes_cli)?;
        }
        Command::Location(locations_cli) => {
            locations::run_locations_cli(&store, locations_cli)?;
        }
        Command::Audit => {
            let audit_log = store_root.join("broker.events.jsonl");
            if audit_log.exists() {
                let content = std::fs::read_to_string(audit_log)?;
                print!("{}", content);
            } else {
                println!("No audit log found.");
            }
        }
        Command::Schema(schema_cli) => {
            let mut schemas = std::collections::BTreeMap::new();
            schemas.insert("broker", crate::core::broker::schema());
            schemas.insert("characters", characters::schema());
            schemas.insert("episodes", episodes::schema());
            schemas.insert("export", export::schema());
            schemas.insert("fixtures", fixtures::schema());
            schemas.insert("import", import::schema());
            schemas.insert("locations", locations::schema());
            schemas.insert("scrape", scrape::schema());

            let output = if let Some(sub) = schema_cli.subsystem {
                schemas
                    .get(sub.as_str())
                    .cloned()
                    .unwrap_or(serde_json::json!({ "error": "subsystem not found" }))
            } else {
                serde_json::json!({
                    "schema_version": "1.0.0",
                    "subsystems": schemas
                })
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Command::Init(_) | Command::Version => unreachable!(),
    }

    Ok(())
}
