use mortydex::core::config::DEFAULT_PUBLIC_URL;
use mortydex::core::db;
use mortydex::core::error::MortydexError;
use mortydex::core::store::Store;
use mortydex::plugins::characters;
use mortydex::plugins::episodes;
use mortydex::plugins::export::{self, entity_kind_from_arg};
use mortydex::plugins::fixtures;
use mortydex::plugins::import::{self, EntityKind};
use mortydex::plugins::locations;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

fn test_store() -> (tempfile::TempDir, Store) {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().to_path_buf();
    db::initialize_catalog_db(&root).expect("catalog init");
    (tmp, Store::new(root))
}

fn write_json(dir: &tempfile::TempDir, name: &str, value: &serde_json::Value) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, serde_json::to_string_pretty(value).expect("serialize")).expect("write");
    path
}

#[test]
fn entity_kind_is_inferred_from_file_name() {
    assert_eq!(
        EntityKind::from_file_name("characters.json"),
        Some(EntityKind::Character)
    );
    assert_eq!(
        EntityKind::from_file_name("episodes.json"),
        Some(EntityKind::Episode)
    );
    assert_eq!(
        EntityKind::from_file_name("locations.json"),
        Some(EntityKind::Location)
    );
    assert_eq!(EntityKind::from_file_name("data.json"), None);

    assert_eq!(entity_kind_from_arg("Character"), Some(EntityKind::Character));
    assert_eq!(entity_kind_from_arg("planet"), None);
}

#[test]
fn import_skips_malformed_items_and_keeps_the_rest() {
    let (tmp, store) = test_store();

    let items = serde_json::json!([
        { "id": 1, "name": "Earth (C-137)", "type": "Planet", "dimension": "Dimension C-137" },
        { "id": "not-a-number", "name": "Broken" },
        { "id": 3, "name": "Citadel of Ricks", "type": "Space station", "dimension": "unknown" }
    ]);
    let path = write_json(&tmp, "locations.json", &items);

    let outcome = import::import_file(&store, &path).expect("import");
    assert_eq!(outcome.imported, 2);
    assert_eq!(outcome.failed, 1);

    let all = locations::list_locations(&store).expect("list");
    assert_eq!(all.len(), 2);
    assert_eq!(all[0].name, "Earth (C-137)");
    assert_eq!(all[1].name, "Citadel of Ricks");
}

#[test]
fn invalid_episode_code_counts_as_a_failed_item() {
    let (tmp, store) = test_store();

    let items = serde_json::json!([
        { "id": 1, "name": "Pilot", "air_date": "December 2, 2013", "episode": "S01E01", "characters": [] },
        { "id": 2, "name": "Lawnmower Dog", "air_date": "December 9, 2013", "episode": "s01e02", "characters": [] }
    ]);
    let path = write_json(&tmp, "episodes.json", &items);

    let outcome = import::import_file(&store, &path).expect("import");
    assert_eq!(outcome.imported, 1);
    assert_eq!(outcome.failed, 1);

    let all = episodes::list_episodes(&store).expect("list");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].episode.as_deref(), Some("S01E01"));
}

#[test]
fn import_rejects_unrecognized_inputs() {
    let (tmp, store) = test_store();

    let missing = tmp.path().join("characters.json");
    assert!(matches!(
        import::import_file(&store, &missing),
        Err(MortydexError::NotFound(_))
    ));

    let unnamed = write_json(&tmp, "data.json", &serde_json::json!([]));
    assert!(matches!(
        import::import_file(&store, &unnamed),
        Err(MortydexError::ValidationError(_))
    ));

    let garbled = tmp.path().join("locations.json");
    fs::write(&garbled, "{ not json").expect("write");
    assert!(matches!(
        import::import_file(&store, &garbled),
        Err(MortydexError::ValidationError(_))
    ));
}

#[test]
fn fixtures_load_cleanly_and_cross_link() {
    let (_tmp, store) = test_store();

    let outcomes = fixtures::load_fixtures(&store).expect("load fixtures");
    let by_kind: Vec<(EntityKind, usize, usize)> = outcomes
        .iter()
        .map(|(kind, outcome)| (*kind, outcome.imported, outcome.failed))
        .collect();
    assert_eq!(
        by_kind,
        vec![
            (EntityKind::Location, 5, 0),
            (EntityKind::Episode, 5, 0),
            (EntityKind::Character, 6, 0),
        ]
    );

    let rick = characters::get_character(&store, 1)
        .expect("get")
        .expect("present");
    assert_eq!(rick.origin_id, Some(1));
    assert_eq!(rick.location_id, Some(3));

    let morty = characters::get_character(&store, 2)
        .expect("get")
        .expect("present");
    assert_eq!(morty.origin_id, None);
}

#[test]
fn export_rewrites_reference_urls_to_the_public_base() {
    let (_tmp, store) = test_store();
    fixtures::load_fixtures(&store).expect("load fixtures");

    let documents =
        export::export_entities(&store, EntityKind::Character).expect("export characters");
    assert_eq!(documents.len(), 6);

    let rick = documents
        .iter()
        .find(|doc| doc["id"] == 1)
        .expect("rick exported");
    assert_eq!(
        rick["url"],
        format!("{}/api/characters/1", DEFAULT_PUBLIC_URL)
    );
    assert_eq!(
        rick["origin"]["url"],
        format!("{}/api/locations/1", DEFAULT_PUBLIC_URL)
    );
    assert_eq!(rick["origin"]["name"], "Earth (C-137)");
    assert_eq!(
        rick["location"]["url"],
        format!("{}/api/locations/3", DEFAULT_PUBLIC_URL)
    );
    let episode_urls: Vec<String> = rick["episode"]
        .as_array()
        .expect("episode array")
        .iter()
        .map(|url| url.as_str().expect("url string").to_string())
        .collect();
    assert_eq!(episode_urls.len(), 5);
    assert!(episode_urls.contains(&format!("{}/api/episodes/28", DEFAULT_PUBLIC_URL)));

    // The unknown origin placeholder survives the round trip.
    let morty = documents
        .iter()
        .find(|doc| doc["id"] == 2)
        .expect("morty exported");
    assert_eq!(morty["origin"]["name"], "unknown");
    assert_eq!(morty["origin"]["url"], "");
}

#[test]
fn exported_locations_list_their_residents() {
    let (_tmp, store) = test_store();
    fixtures::load_fixtures(&store).expect("load fixtures");

    let documents =
        export::export_entities(&store, EntityKind::Location).expect("export locations");
    assert_eq!(documents.len(), 5);

    let citadel = documents
        .iter()
        .find(|doc| doc["id"] == 3)
        .expect("citadel exported");
    let residents: Vec<&str> = citadel["residents"]
        .as_array()
        .expect("residents array")
        .iter()
        .map(|url| url.as_str().expect("url string"))
        .collect();
    assert_eq!(
        residents,
        vec![
            format!("{}/api/characters/1", DEFAULT_PUBLIC_URL),
            format!("{}/api/characters/2", DEFAULT_PUBLIC_URL),
            format!("{}/api/characters/8", DEFAULT_PUBLIC_URL),
        ]
    );
}

#[test]
fn export_round_trips_through_import() {
    let (_tmp, source) = test_store();
    fixtures::load_fixtures(&source).expect("load fixtures");

    let tmp = tempdir().expect("tempdir");
    for kind in [EntityKind::Location, EntityKind::Episode, EntityKind::Character] {
        let documents = export::export_entities(&source, kind).expect("export");
        write_json(&tmp, &format!("{}.json", kind.plural()), &serde_json::json!(documents));
    }

    let (_tmp2, target) = test_store();
    for kind in [EntityKind::Location, EntityKind::Episode, EntityKind::Character] {
        let outcome = import::import_file(
            &target,
            &tmp.path().join(format!("{}.json", kind.plural())),
        )
        .expect("import");
        assert_eq!(outcome.failed, 0);
    }

    let names: Vec<String> = characters::list_characters(&target)
        .expect("list")
        .into_iter()
        .map(|character| character.name)
        .collect();
    assert_eq!(
        names,
        vec![
            "Rick Sanchez",
            "Morty Smith",
            "Summer Smith",
            "Beth Smith",
            "Jerry Smith",
            "Adjudicator Rick",
        ]
    );

    let rick = characters::get_character(&target, 1)
        .expect("get")
        .expect("present");
    assert_eq!(rick.origin_id, Some(1));
    assert_eq!(rick.location_id, Some(3));
}
