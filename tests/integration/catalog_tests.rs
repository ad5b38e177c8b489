use httpmock::prelude::*;

use homeguide::config::CatalogConfig;
use homeguide::core::{parse_payload, Catalog, CatalogSource};
use homeguide::error::ErrorCode;

const PAYLOAD: &str = r#"{
  "guides": [
    {"id": "attic-001", "title": "Attic Insulation Check", "category": "seasonal",
     "difficulty": "medium", "timeEstimate": "1 hour", "tools": ["flashlight"],
     "keywords": ["attic", "insulation"]},
    {"id": "attic-001", "title": "Duplicate, dropped"},
    42
  ]
}"#;

fn config(source: String) -> CatalogConfig {
    CatalogConfig {
        source,
        timeout_secs: 2,
    }
}

#[test]
fn remote_payload_is_fetched_and_cleaned() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/content/guides.json");
        then.status(200)
            .header("content-type", "application/json")
            .body(PAYLOAD);
    });

    let url = server.url("/content/guides.json");
    let catalog = Catalog::try_load(&config(url.clone())).unwrap();
    mock.assert();

    assert_eq!(catalog.source(), &CatalogSource::Remote(url));
    assert_eq!(catalog.len(), 1);
    assert_eq!(catalog.guides()[0].title, "Attic Insulation Check");
}

#[test]
fn http_error_falls_back_to_built_in_guides() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/guides.json");
        then.status(503);
    });

    let source = config(server.url("/guides.json"));
    let err = Catalog::try_load(&source).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PayloadInvalid);

    let catalog = Catalog::load(&source, false);
    assert_eq!(catalog.source(), &CatalogSource::Fallback);
    assert!(catalog.get("kitchen-001").is_some());
}

#[test]
fn offline_mode_skips_the_network() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method(GET).path("/guides.json");
        then.status(200).body(PAYLOAD);
    });

    let catalog = Catalog::load(&config(server.url("/guides.json")), true);
    assert_eq!(catalog.source(), &CatalogSource::Fallback);
    mock.assert_calls(0);
}

#[test]
fn malformed_payload_is_rejected() {
    let err = parse_payload(r#"{"items": []}"#).unwrap_err();
    assert_eq!(err.code(), ErrorCode::PayloadInvalid);
    assert!(parse_payload("not json").is_err());
}

#[test]
fn missing_file_falls_back() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.json");
    let catalog = Catalog::load(&config(missing.display().to_string()), false);
    assert_eq!(catalog.source(), &CatalogSource::Fallback);
}
