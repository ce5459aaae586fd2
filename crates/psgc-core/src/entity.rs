//! The five administrative entities and the tagged [`Entity`] dispatch.
//!
//! Entities are created only by the import pipeline; the serving API is
//! read-only. A record changes only by re-import (upsert-by-code, last
//! import wins) and is never deleted outside a full rebuild.

use serde::{Deserialize, Serialize};

use crate::code::GeographicCode;

// ─── Level ───────────────────────────────────────────────────────────────────

/// The five concrete administrative levels.
///
/// Variant order is foreign-key dependency order (parents first), which
/// the derived `Ord` preserves.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Level {
  Region,
  Province,
  City,
  Municipality,
  Barangay,
}

impl Level {
  /// All levels, parents before children. Store writes follow this order
  /// so foreign-key constraints are satisfiable.
  pub const IN_DEPENDENCY_ORDER: [Level; 5] = [
    Level::Region,
    Level::Province,
    Level::City,
    Level::Municipality,
    Level::Barangay,
  ];

  pub fn as_str(self) -> &'static str {
    match self {
      Level::Region => "region",
      Level::Province => "province",
      Level::City => "city",
      Level::Municipality => "municipality",
      Level::Barangay => "barangay",
    }
  }
}

impl std::fmt::Display for Level {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

// ─── City classification ─────────────────────────────────────────────────────

/// City legal sub-classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CityClass {
  #[serde(rename = "HUC")]
  HighlyUrbanized,
  #[serde(rename = "ICC")]
  IndependentComponent,
  #[serde(rename = "CC")]
  Component,
}

impl CityClass {
  /// Parse the abbreviations and long forms seen in source files.
  /// Returns `None` for anything else; absence is not an error.
  pub fn parse(raw: &str) -> Option<Self> {
    let upper = raw.trim().to_uppercase();
    match upper.as_str() {
      "HUC" | "HIGHLY URBANIZED CITY" => Some(CityClass::HighlyUrbanized),
      "ICC" | "INDEPENDENT COMPONENT CITY" => {
        Some(CityClass::IndependentComponent)
      }
      "CC" | "COMPONENT CITY" => Some(CityClass::Component),
      _ => None,
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      CityClass::HighlyUrbanized => "HUC",
      CityClass::IndependentComponent => "ICC",
      CityClass::Component => "CC",
    }
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
  pub code:              GeographicCode,
  pub name:              String,
  pub island_group_code: Option<String>,
  pub island_group_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Province {
  pub code:              GeographicCode,
  pub name:              String,
  pub island_group_code: Option<String>,
  pub region_code:       GeographicCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
  pub code:          GeographicCode,
  pub name:          String,
  pub city_class:    Option<CityClass>,
  pub income_class:  Option<String>,
  pub is_capital:    bool,
  pub province_code: GeographicCode,
  pub region_code:   GeographicCode,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Municipality {
  pub code:          GeographicCode,
  pub name:          String,
  pub income_class:  Option<String>,
  pub is_capital:    bool,
  pub province_code: GeographicCode,
  pub region_code:   GeographicCode,
}

/// A barangay's parent is exactly one of {city, municipality}. Both
/// fields may be unset straight out of classification; reconciliation
/// resolves the pair to exactly-one-set before anything is persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Barangay {
  pub code:              GeographicCode,
  pub name:              String,
  pub urban_rural:       Option<String>,
  pub city_code:         Option<GeographicCode>,
  pub municipality_code: Option<GeographicCode>,
  pub province_code:     GeographicCode,
  pub region_code:       GeographicCode,
}

// ─── Entity ──────────────────────────────────────────────────────────────────

/// Tagged dispatch over the five entity kinds. The variant name doubles
/// as the `level` discriminant on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "level", rename_all = "lowercase")]
pub enum Entity {
  Region(Region),
  Province(Province),
  City(City),
  Municipality(Municipality),
  Barangay(Barangay),
}

impl Entity {
  pub fn level(&self) -> Level {
    match self {
      Entity::Region(_) => Level::Region,
      Entity::Province(_) => Level::Province,
      Entity::City(_) => Level::City,
      Entity::Municipality(_) => Level::Municipality,
      Entity::Barangay(_) => Level::Barangay,
    }
  }

  pub fn code(&self) -> &GeographicCode {
    match self {
      Entity::Region(e) => &e.code,
      Entity::Province(e) => &e.code,
      Entity::City(e) => &e.code,
      Entity::Municipality(e) => &e.code,
      Entity::Barangay(e) => &e.code,
    }
  }

  pub fn name(&self) -> &str {
    match self {
      Entity::Region(e) => &e.name,
      Entity::Province(e) => &e.name,
      Entity::City(e) => &e.name,
      Entity::Municipality(e) => &e.name,
      Entity::Barangay(e) => &e.name,
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn city_class_parses_abbreviations_and_long_forms() {
    assert_eq!(CityClass::parse("HUC"), Some(CityClass::HighlyUrbanized));
    assert_eq!(CityClass::parse(" cc "), Some(CityClass::Component));
    assert_eq!(
      CityClass::parse("Independent Component City"),
      Some(CityClass::IndependentComponent)
    );
    assert_eq!(CityClass::parse("Mun"), None);
    assert_eq!(CityClass::parse("Capital"), None);
  }

  #[test]
  fn levels_iterate_parents_first() {
    let order = Level::IN_DEPENDENCY_ORDER;
    assert_eq!(order[0], Level::Region);
    assert_eq!(order[4], Level::Barangay);
    assert!(order.windows(2).all(|w| w[0] < w[1]));
  }
}
