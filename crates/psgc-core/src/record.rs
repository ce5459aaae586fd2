//! Raw source records — field-name/value mappings with alias resolution.
//!
//! Source files disagree wildly on header names (`code` / `Code` /
//! `PSGC` / `10-digit PSGC`; `name` / `Geographic Area`; …). A
//! [`RawRecord`] stores fields keyed by their lower-cased header and
//! resolves each logical field through a fixed priority list of known
//! aliases, so the classifier never sees the spelling chaos.

use std::collections::HashMap;

// ─── Logical fields ──────────────────────────────────────────────────────────

/// The logical fields the classifier reads from a source record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
  Code,
  Name,
  /// An explicit level/type column, when the source has one.
  LevelHint,
  CityClass,
  IncomeClass,
  UrbanRural,
  IslandGroupCode,
  IslandGroupName,
  IsCapital,
  RegionCode,
  ProvinceCode,
  CityCode,
  MunicipalityCode,
}

impl Field {
  /// Known header aliases, highest priority first. Matching is
  /// case-insensitive after trimming.
  fn aliases(self) -> &'static [&'static str] {
    match self {
      Field::Code => {
        &["code", "psgc", "psgc_code", "10-digit psgc", "correspondence code"]
      }
      Field::Name => &["name", "geographic area", "area_name", "adm_name"],
      Field::LevelHint => &["level", "geographic level", "type", "geo_level"],
      Field::CityClass => &["city_class", "city class", "cityclass", "status"],
      Field::IncomeClass => {
        &["income_class", "income classification", "income class"]
      }
      Field::UrbanRural => &["urban_rural", "urban / rural", "urban-rural"],
      Field::IslandGroupCode => &["island_group_code", "island group code"],
      Field::IslandGroupName => {
        &["island_group_name", "island group name", "island group"]
      }
      Field::IsCapital => &["is_capital", "capital"],
      Field::RegionCode => &["region_code", "reg_code"],
      Field::ProvinceCode => &["province_code", "prov_code"],
      Field::CityCode => &["city_code"],
      Field::MunicipalityCode => {
        &["municipality_code", "mun_code", "municipal_code"]
      }
    }
  }
}

// ─── RawRecord ───────────────────────────────────────────────────────────────

/// One raw record from any source, past the file-format boundary.
///
/// The ingestion front-ends build these from CSV rows, JSON objects, or
/// spreadsheet rows; from here on the pipeline is format-agnostic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
  fields: HashMap<String, String>,
}

impl RawRecord {
  pub fn new() -> Self { Self::default() }

  /// Insert a field under the header as it appeared in the source. The
  /// last write for a header wins.
  pub fn insert(&mut self, header: &str, value: &str) {
    self
      .fields
      .insert(header.trim().to_lowercase(), value.trim().to_string());
  }

  /// Build a record from `(header, value)` pairs.
  pub fn from_pairs<'a>(
    pairs: impl IntoIterator<Item = (&'a str, &'a str)>,
  ) -> Self {
    let mut record = Self::new();
    for (header, value) in pairs {
      record.insert(header, value);
    }
    record
  }

  /// Resolve a logical field through its alias priority list. An empty
  /// value counts as absent.
  pub fn get(&self, field: Field) -> Option<&str> {
    field.aliases().iter().find_map(|alias| {
      self
        .fields
        .get(*alias)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
    })
  }

  pub fn is_empty(&self) -> bool {
    self.fields.values().all(String::is_empty)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn header_lookup_is_case_insensitive() {
    let record = RawRecord::from_pairs([("PSGC", "137401000"), ("Name", "x")]);
    assert_eq!(record.get(Field::Code), Some("137401000"));
    assert_eq!(record.get(Field::Name), Some("x"));
  }

  #[test]
  fn aliases_resolve_in_priority_order() {
    let record = RawRecord::from_pairs([
      ("psgc", "111111111"),
      ("code", "137401000"),
    ]);
    // "code" outranks "psgc".
    assert_eq!(record.get(Field::Code), Some("137401000"));
  }

  #[test]
  fn empty_values_count_as_absent() {
    let record = RawRecord::from_pairs([("code", "  "), ("psgc", "137401000")]);
    assert_eq!(record.get(Field::Code), Some("137401000"));

    let blank = RawRecord::from_pairs([("name", "")]);
    assert_eq!(blank.get(Field::Name), None);
    assert!(blank.is_empty());
  }

  #[test]
  fn last_write_per_header_wins() {
    let mut record = RawRecord::new();
    record.insert("Code", "1");
    record.insert("CODE", "137401000");
    assert_eq!(record.get(Field::Code), Some("137401000"));
  }
}
