//! Embedded seed data for a populated catalog without network access.
//!
//! Fixture files are baked into the binary at compile time and loaded
//! through the regular import path, so seeding exercises the same
//! denormalization and reference resolution as a real import.

use crate::core::error;
use crate::core::store::Store;
use crate::plugins::import::{self, EntityKind, ImportOutcome};
use clap::{Parser, Subcommand};
use colored::Colorize;

macro_rules! embedded_fixtures {
    ($($kind:expr => $path:expr),* $(,)?) => {
        /// Fixture sets in load order: locations and episodes before
        /// characters, so character references resolve.
        pub fn fixture_sets() -> Vec<(EntityKind, &'static str)> {
            vec![
                $( ($kind, include_str!(concat!("../../assets/fixtures/", $path))), )*
            ]
        }
    };
}

embedded_fixtures! {
    EntityKind::Location => "locations.json",
    EntityKind::Episode => "episodes.json",
    EntityKind::Character => "characters.json",
}

pub fn load_fixtures(
    store: &Store,
) -> Result<Vec<(EntityKind, ImportOutcome)>, error::MortydexError> {
    let mut outcomes = Vec::new();
    for (kind, content) in fixture_sets() {
        let items: Vec<serde_json::Value> = serde_json::from_str(content)?;
        let outcome = import::import_entities(store, kind, &items)?;
        outcomes.push((kind, outcome));
    }
    Ok(outcomes)
}

#[derive(Parser, Debug)]
#[clap(name = "fixtures", about = "Seed the catalog with embedded sample data.")]
pub struct FixturesCli {
    #[clap(subcommand)]
    pub command: FixturesCommand,
}

#[derive(Subcommand, Debug)]
pub enum FixturesCommand {
    /// Load all embedded fixture sets into the catalog.
    Load,
}

pub fn run_fixtures_cli(store: &Store, cli: FixturesCli) -> Result<(), error::MortydexError> {
    match cli.command {
        FixturesCommand::Load => {
            for (kind, outcome) in load_fixtures(store)? {
                println!(
                    "  {} {} {} loaded ({} failed)",
                    "●".bright_green(),
                    outcome.imported,
                    kind.plural(),
                    outcome.failed
                );
            }
            println!("{}", "Fixtures loaded".bright_green());
        }
    }
    Ok(())
}

pub fn schema() -> serde_json::Value {
    serde_json::json!({
        "name": "fixtures",
        "version": "0.1.0",
        "description": "Embedded seed data loader",
        "commands": [
            { "name": "load", "parameters": [] }
        ],
        "storage": ["catalog.db"]
    })
}
