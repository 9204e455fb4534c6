use mortydex::core::broker::DbBroker;
use mortydex::core::db;
use mortydex::core::error::MortydexError;
use mortydex::core::store::Store;
use mortydex::plugins::characters;
use mortydex::plugins::episodes;
use mortydex::plugins::locations;
use mortydex::plugins::scrape::{RickAndMortyClient, Transport};
use std::cell::RefCell;
use std::collections::HashMap;
use std::time::Duration;
use tempfile::tempdir;

const BASE_URL: &str = "http://mock.test/api";

/// Serves canned page bodies keyed by URL and records every fetch.
struct MockTransport {
    pages: HashMap<String, String>,
    calls: RefCell<Vec<String>>,
}

impl MockTransport {
    fn new(pages: Vec<(&str, String)>) -> Self {
        Self {
            pages: pages
                .into_iter()
                .map(|(url, body)| (url.to_string(), body))
                .collect(),
            calls: RefCell::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }
}

impl Transport for MockTransport {
    fn fetch(&self, url: &str) -> Result<String, MortydexError> {
        self.calls.borrow_mut().push(url.to_string());
        self.pages
            .get(url)
            .cloned()
            .ok_or_else(|| MortydexError::NotFound(format!("no canned page for {}", url)))
    }
}

fn test_store() -> (tempfile::TempDir, Store) {
    let tmp = tempdir().expect("tempdir");
    let root = tmp.path().to_path_buf();
    db::initialize_catalog_db(&root).expect("catalog init");
    (tmp, Store::new(root))
}

fn location_pages() -> Vec<(&'static str, String)> {
    let page_one = serde_json::json!({
        "info": {
            "count": 3,
            "pages": 2,
            "next": "http://mock.test/api/location?page=2",
            "prev": null
        },
        "results": [
            {
                "id": 1,
                "name": "Earth (C-137)",
                "type": "Planet",
                "dimension": "Dimension C-137",
                "residents": ["http://mock.test/api/character/1"],
                "url": "http://mock.test/api/location/1",
                "created": "2017-11-10T12:42:04.162Z"
            },
            {
                "id": 2,
                "name": "Abadango",
                "type": "Cluster",
                "dimension": "unknown",
                "residents": [],
                "url": "http://mock.test/api/location/2",
                "created": "2017-11-10T13:06:38.182Z"
            }
        ]
    });
    let page_two = serde_json::json!({
        "info": { "count": 3, "pages": 2, "next": null, "prev": "http://mock.test/api/location" },
        "results": [
            {
                "id": 3,
                "name": "Citadel of Ricks",
                "type": "Space station",
                "dimension": "unknown",
                "residents": [],
                "url": "http://mock.test/api/location/3",
                "created": "2017-11-10T13:08:13.191Z"
            }
        ]
    });
    vec![
        ("http://mock.test/api/location", page_one.to_string()),
        ("http://mock.test/api/location?page=2", page_two.to_string()),
    ]
}

fn episode_page() -> (&'static str, String) {
    let page = serde_json::json!({
        "info": { "count": 1, "pages": 1, "next": null, "prev": null },
        "results": [
            {
                "id": 1,
                "name": "Pilot",
                "air_date": "December 2, 2013",
                "episode": "S01E01",
                "characters": ["http://mock.test/api/character/1"],
                "url": "http://mock.test/api/episode/1",
                "created": "2017-11-10T12:56:33.798Z"
            }
        ]
    });
    ("http://mock.test/api/episode", page.to_string())
}

fn character_page() -> (&'static str, String) {
    let page = serde_json::json!({
        "info": { "count": 2, "pages": 1, "next": null, "prev": null },
        "results": [
            {
                "id": 1,
                "name": "Rick Sanchez",
                "status": "Alive",
                "species": "Human",
                "type": "",
                "gender": "Male",
                "origin": { "name": "Earth (C-137)", "url": "http://mock.test/api/location/1" },
                "location": { "name": "Citadel of Ricks", "url": "http://mock.test/api/location/3" },
                "image": "http://mock.test/api/character/avatar/1.jpeg",
                "episode": ["http://mock.test/api/episode/1"],
                "url": "http://mock.test/api/character/1",
                "created": "2017-11-04T18:48:46.250Z"
            },
            {
                "id": 2,
                "name": "Morty Smith",
                "status": "Alive",
                "species": "Human",
                "type": "",
                "gender": "Male",
                "origin": { "name": "unknown", "url": "" },
                "location": { "name": "Nuptia 4", "url": "http://mock.test/api/location/541" },
                "image": "http://mock.test/api/character/avatar/2.jpeg",
                "episode": ["http://mock.test/api/episode/1"],
                "url": "http://mock.test/api/character/2",
                "created": "2017-11-04T18:50:21.651Z"
            }
        ]
    });
    ("http://mock.test/api/character", page.to_string())
}

fn all_pages() -> Vec<(&'static str, String)> {
    let mut pages = location_pages();
    pages.push(episode_page());
    pages.push(character_page());
    pages
}

#[test]
fn pagination_follows_next_cursor_until_null() {
    let (_tmp, store) = test_store();
    let transport = MockTransport::new(location_pages());
    let client =
        RickAndMortyClient::new(&transport, BASE_URL).with_page_delay(Duration::ZERO);

    let imported = client
        .import_locations(&store, &mut || {})
        .expect("import locations");
    assert_eq!(imported, 3);
    assert_eq!(
        transport.calls(),
        vec![
            "http://mock.test/api/location".to_string(),
            "http://mock.test/api/location?page=2".to_string(),
        ]
    );

    let all = locations::list_locations(&store).expect("list");
    assert_eq!(all.len(), 3);
    assert_eq!(all[2].name, "Citadel of Ricks");
}

#[test]
fn collection_counts_come_from_page_info() {
    let (_tmp, _store) = test_store();
    let transport = MockTransport::new(all_pages());
    let client =
        RickAndMortyClient::new(&transport, BASE_URL).with_page_delay(Duration::ZERO);

    assert_eq!(client.location_count().expect("location count"), 3);
    assert_eq!(client.episode_count().expect("episode count"), 1);
    assert_eq!(client.character_count().expect("character count"), 2);
}

#[test]
fn full_scrape_resolves_cross_collection_references() {
    let (_tmp, store) = test_store();
    let transport = MockTransport::new(all_pages());
    let client =
        RickAndMortyClient::new(&transport, BASE_URL).with_page_delay(Duration::ZERO);

    let mut progress_ticks = 0u64;
    client
        .import_locations(&store, &mut || progress_ticks += 1)
        .expect("locations");
    client
        .import_episodes(&store, &mut || progress_ticks += 1)
        .expect("episodes");
    client
        .import_characters(&store, &mut || progress_ticks += 1)
        .expect("characters");
    assert_eq!(progress_ticks, 6);

    let rick = characters::get_character(&store, 1)
        .expect("get")
        .expect("rick present");
    assert_eq!(rick.origin_id, Some(1));
    assert_eq!(rick.location_id, Some(3));

    // Morty's origin is the unknown placeholder and his location was never
    // scraped, so both stay unlinked.
    let morty = characters::get_character(&store, 2)
        .expect("get")
        .expect("morty present");
    assert_eq!(morty.origin_id, None);
    assert_eq!(morty.location_id, None);

    let db_path = db::catalog_db_path(&store.root);
    let broker = DbBroker::new(&store.root);
    let linked = broker
        .with_conn(&db_path, "tester", None, "test.links", |conn| {
            characters::episode_ids(conn, 1)
        })
        .expect("episode links");
    assert_eq!(linked, vec![1]);

    let pilot = episodes::get_episode(&store, 1)
        .expect("get")
        .expect("pilot present");
    assert_eq!(pilot.episode.as_deref(), Some("S01E01"));
}

#[test]
fn repeated_scrape_is_idempotent() {
    let (_tmp, store) = test_store();
    let transport = MockTransport::new(all_pages());
    let client =
        RickAndMortyClient::new(&transport, BASE_URL).with_page_delay(Duration::ZERO);

    for _ in 0..2 {
        client.import_locations(&store, &mut || {}).expect("locations");
        client.import_episodes(&store, &mut || {}).expect("episodes");
        client.import_characters(&store, &mut || {}).expect("characters");
    }

    assert_eq!(locations::list_locations(&store).expect("list").len(), 3);
    assert_eq!(episodes::list_episodes(&store).expect("list").len(), 1);
    assert_eq!(characters::list_characters(&store).expect("list").len(), 2);
}

#[test]
fn malformed_page_body_aborts_the_scrape() {
    let (_tmp, store) = test_store();
    let transport = MockTransport::new(vec![(
        "http://mock.test/api/location",
        "<html>rate limited</html>".to_string(),
    )]);
    let client =
        RickAndMortyClient::new(&transport, BASE_URL).with_page_delay(Duration::ZERO);

    let result = client.import_locations(&store, &mut || {});
    assert!(matches!(result, Err(MortydexError::JsonError(_))));
    assert!(locations::list_locations(&store).expect("list").is_empty());
}
