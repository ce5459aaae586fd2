//! Integration tests for `SqliteStore` against an in-memory database.

use std::collections::BTreeMap;

use psgc_core::{
  classify::Classifier,
  code::GeographicCode,
  entity::{Entity, Level},
  reconcile::{ExistingCodes, reconcile},
  record::RawRecord,
  store::{AncestorFilter, GeoStore, SearchQuery},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory().await.expect("in-memory store")
}

fn code(s: &str) -> GeographicCode {
  GeographicCode::normalize(s).unwrap()
}

fn entity(pairs: &[(&str, &str)]) -> Entity {
  Classifier::new()
    .classify(&RawRecord::from_pairs(pairs.iter().copied()))
    .unwrap()
}

/// A reconciled Manila-flavoured batch: one region, one district
/// province, one city, one municipality, two barangays.
fn sample_batch() -> Vec<Entity> {
  let raw = vec![
    entity(&[
      ("code", "130000000"),
      ("name", "National Capital Region"),
      ("island group", "Luzon"),
    ]),
    entity(&[("code", "137400000"), ("name", "NCR, First District")]),
    entity(&[
      ("code", "137401000"),
      ("name", "City of Manila"),
      ("city_class", "HUC"),
      ("is_capital", "true"),
    ]),
    entity(&[("code", "137402000"), ("name", "Municipality of Pateros")]),
    entity(&[("code", "137401001"), ("name", "Barangay 1")]),
    entity(&[("code", "137402001"), ("name", "Aguho")]),
  ];
  reconcile(raw, &ExistingCodes::default()).unwrap().entities
}

// ─── Writes ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn upsert_batch_and_counts() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  let counts = s.counts().await.unwrap();
  let expected = BTreeMap::from([
    (Level::Region, 1),
    (Level::Province, 1),
    (Level::City, 1),
    (Level::Municipality, 1),
    (Level::Barangay, 2),
  ]);
  assert_eq!(counts, expected);
}

#[tokio::test]
async fn upsert_replaces_by_code() {
  let s = store().await;
  s.upsert(entity(&[("code", "130000000"), ("name", "First Import")]))
    .await
    .unwrap();
  s.upsert(entity(&[("code", "130000000"), ("name", "Second Import")]))
    .await
    .unwrap();

  let fetched = s
    .get(Level::Region, code("130000000"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(fetched.name(), "Second Import");

  let counts = s.counts().await.unwrap();
  assert_eq!(counts.get(&Level::Region), Some(&1));
}

#[tokio::test]
async fn reimport_of_referenced_parent_preserves_children() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  // Re-importing a region that provinces reference must not trip the
  // foreign keys.
  s.upsert(entity(&[
    ("code", "130000000"),
    ("name", "NCR (revised)"),
  ]))
  .await
  .unwrap();

  let provinces = s.list(Level::Province, None).await.unwrap();
  assert_eq!(provinces.len(), 1);
  let region = s
    .get(Level::Region, code("130000000"))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(region.name(), "NCR (revised)");
}

// ─── Reads ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn get_missing_returns_none() {
  let s = store().await;
  assert!(
    s.get(Level::Region, code("990000000"))
      .await
      .unwrap()
      .is_none()
  );
  assert!(!s.exists(Level::Region, code("990000000")).await.unwrap());
}

#[tokio::test]
async fn find_prefers_city_over_municipality_shape() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  let city = s.find(code("137401000")).await.unwrap().unwrap();
  assert!(matches!(city, Entity::City(_)));

  let municipality = s.find(code("137402000")).await.unwrap().unwrap();
  assert!(matches!(municipality, Entity::Municipality(_)));

  let barangay = s.find(code("137401001")).await.unwrap().unwrap();
  assert!(matches!(barangay, Entity::Barangay(_)));
}

#[tokio::test]
async fn list_is_in_code_order() {
  let s = store().await;
  s.upsert_batch(
    reconcile(
      vec![
        entity(&[("code", "130000000"), ("name", "NCR")]),
        entity(&[("code", "010000000"), ("name", "Ilocos Region")]),
        entity(&[("code", "040000000"), ("name", "Calabarzon")]),
      ],
      &ExistingCodes::default(),
    )
    .unwrap()
    .entities,
  )
  .await
  .unwrap();

  let regions = s.list(Level::Region, None).await.unwrap();
  let codes: Vec<&str> = regions.iter().map(|e| e.code().as_str()).collect();
  assert_eq!(codes, ["010000000", "040000000", "130000000"]);
}

#[tokio::test]
async fn barangay_listings_distinguish_city_and_municipality_parents() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  let of_city = s
    .list(
      Level::Barangay,
      Some(AncestorFilter { level: Level::City, code: code("137401000") }),
    )
    .await
    .unwrap();
  assert_eq!(of_city.len(), 1);
  assert_eq!(of_city[0].code().as_str(), "137401001");

  let of_municipality = s
    .list(
      Level::Barangay,
      Some(AncestorFilter {
        level: Level::Municipality,
        code:  code("137402000"),
      }),
    )
    .await
    .unwrap();
  assert_eq!(of_municipality.len(), 1);
  assert_eq!(of_municipality[0].code().as_str(), "137402001");
}

#[tokio::test]
async fn ancestor_filters_follow_declared_columns() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  let in_region = s
    .list(
      Level::Barangay,
      Some(AncestorFilter { level: Level::Region, code: code("130000000") }),
    )
    .await
    .unwrap();
  assert_eq!(in_region.len(), 2);

  let cities = s
    .list(
      Level::City,
      Some(AncestorFilter {
        level: Level::Province,
        code:  code("137400000"),
      }),
    )
    .await
    .unwrap();
  assert_eq!(cities.len(), 1);
}

#[tokio::test]
async fn invalid_ancestor_combination_is_an_error() {
  let s = store().await;
  let result = s
    .list(
      Level::Region,
      Some(AncestorFilter {
        level: Level::Barangay,
        code:  code("137401001"),
      }),
    )
    .await;
  assert!(matches!(result, Err(crate::Error::InvalidAncestor { .. })));
}

// ─── Search ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn search_matches_substrings_across_levels() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  let hits = s
    .search(SearchQuery {
      text:  "manila".to_string(),
      level: None,
      limit: None,
    })
    .await
    .unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0].code().as_str(), "137401000");
}

#[tokio::test]
async fn search_respects_level_filter_and_limit() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  // Everything in the sample is under NCR; "a" matches broadly.
  let all = s
    .search(SearchQuery { text: "a".to_string(), level: None, limit: None })
    .await
    .unwrap();
  assert!(all.len() >= 4);

  let only_barangays = s
    .search(SearchQuery {
      text:  "a".to_string(),
      level: Some(Level::Barangay),
      limit: None,
    })
    .await
    .unwrap();
  assert!(
    only_barangays
      .iter()
      .all(|e| e.level() == Level::Barangay)
  );

  let capped = s
    .search(SearchQuery {
      text:  "a".to_string(),
      level: None,
      limit: Some(2),
    })
    .await
    .unwrap();
  assert_eq!(capped.len(), 2);
}

// ─── Reconciliation seeding ──────────────────────────────────────────────────

#[tokio::test]
async fn existing_codes_cover_the_parent_levels() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  let existing = s.existing_codes().await.unwrap();
  assert!(existing.regions.contains(&code("130000000")));
  assert!(existing.provinces.contains(&code("137400000")));
  assert!(existing.cities.contains(&code("137401000")));
  assert!(existing.municipalities.contains(&code("137402000")));
}

#[tokio::test]
async fn persisted_parents_satisfy_a_later_batch() {
  let s = store().await;
  s.upsert_batch(sample_batch()).await.unwrap();

  // A second batch of barangays alone reconciles against the store's
  // codes without synthesizing anything.
  let existing = s.existing_codes().await.unwrap();
  let batch = reconcile(
    vec![entity(&[("code", "137401002"), ("name", "Barangay 2")])],
    &existing,
  )
  .unwrap();
  assert_eq!(batch.report.synthesized_total(), 0);

  s.upsert_batch(batch.entities).await.unwrap();
  let barangays = s.list(Level::Barangay, None).await.unwrap();
  assert_eq!(barangays.len(), 3);
}
