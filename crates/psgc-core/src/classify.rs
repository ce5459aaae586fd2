//! Entity Classifier — one raw record to one tagged entity.
//!
//! Classification is idempotent and side-effect-free: the same record
//! always yields byte-identical output. Per-record failures come back as
//! [`RejectReason`] values, never as panics or batch aborts; the caller
//! decides how to log and tally them.

use serde::Serialize;

use crate::{
  code::{self, CodeShape, GeographicCode},
  entity::{
    Barangay, City, CityClass, Entity, Municipality, Province, Region,
  },
  record::{Field, RawRecord},
};

// ─── Rejection ───────────────────────────────────────────────────────────────

/// Why a record was excluded from a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
  MissingCode,
  MissingName,
  InvalidCode { raw: String },
  /// Should be unreachable for a normalized code; treat any hit as an
  /// internal-invariant violation worth a loud log line.
  UnclassifiableCode { code: String },
}

impl std::fmt::Display for RejectReason {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      RejectReason::MissingCode => f.write_str("missing code"),
      RejectReason::MissingName => f.write_str("missing name"),
      RejectReason::InvalidCode { raw } => {
        write!(f, "invalid code {raw:?}")
      }
      RejectReason::UnclassifiableCode { code } => {
        write!(f, "unclassifiable code {code}")
      }
    }
  }
}

// ─── City / municipality disambiguation ──────────────────────────────────────

/// The two divisions sharing the `XXYYZZ000` code shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CivilDivision {
  City,
  Municipality,
}

/// Strategy for separating cities from municipalities when the code
/// shape cannot. Injectable so an authoritative lookup table can replace
/// the name-text guess without touching the rest of the pipeline.
pub trait CivilDivisionResolver {
  fn resolve(&self, record: &RawRecord, name: &str) -> CivilDivision;
}

/// Default resolver, in priority order: an explicit type field, then a
/// parseable city-classification attribute, then name text. A name
/// containing "municipality of" forces Municipality over every other
/// signal; absence of all signals defaults to Municipality.
#[derive(Debug, Default, Clone, Copy)]
pub struct NameHeuristic;

impl CivilDivisionResolver for NameHeuristic {
  fn resolve(&self, record: &RawRecord, name: &str) -> CivilDivision {
    let lower = name.to_lowercase();
    if lower.contains("municipality of") {
      return CivilDivision::Municipality;
    }

    if let Some(hint) = record.get(Field::LevelHint) {
      let hint = hint.to_lowercase();
      if hint.contains("city") {
        return CivilDivision::City;
      }
      if hint.contains("mun") {
        return CivilDivision::Municipality;
      }
    }

    if record
      .get(Field::CityClass)
      .and_then(CityClass::parse)
      .is_some()
    {
      return CivilDivision::City;
    }

    if lower.contains("city of")
      || lower.ends_with(" city")
      || lower.contains("highly urbanized")
      || lower.contains("independent component")
      || lower.contains("component city")
    {
      return CivilDivision::City;
    }

    CivilDivision::Municipality
  }
}

// ─── Classifier ──────────────────────────────────────────────────────────────

/// Classifies raw records into tagged entities.
///
/// Holds only the injected city/municipality resolver; otherwise
/// stateless.
#[derive(Debug, Clone)]
pub struct Classifier<R = NameHeuristic> {
  resolver: R,
}

impl Classifier {
  pub fn new() -> Self {
    Self { resolver: NameHeuristic }
  }
}

impl Default for Classifier {
  fn default() -> Self { Self::new() }
}

impl<R: CivilDivisionResolver> Classifier<R> {
  pub fn with_resolver(resolver: R) -> Self { Self { resolver } }

  /// Classify one raw record into an entity, or explain the rejection.
  pub fn classify(&self, record: &RawRecord) -> Result<Entity, RejectReason> {
    let raw_code =
      record.get(Field::Code).ok_or(RejectReason::MissingCode)?;
    let code = GeographicCode::normalize(raw_code).map_err(|_| {
      RejectReason::InvalidCode { raw: raw_code.to_string() }
    })?;
    let name = record
      .get(Field::Name)
      .ok_or(RejectReason::MissingName)?
      .to_string();

    let shape = code::classify(&code).map_err(|_| {
      RejectReason::UnclassifiableCode { code: code.to_string() }
    })?;

    let entity = match shape {
      CodeShape::Region => Entity::Region(Region {
        island_group_code: owned(record, Field::IslandGroupCode),
        island_group_name: owned(record, Field::IslandGroupName),
        code,
        name,
      }),

      CodeShape::Province => Entity::Province(Province {
        island_group_code: owned(record, Field::IslandGroupCode),
        region_code:       self.parent(
          record,
          &code,
          Field::RegionCode,
          CodeShape::Region,
        )?,
        code,
        name,
      }),

      CodeShape::CityOrMunicipality => {
        let province_code = self.parent(
          record,
          &code,
          Field::ProvinceCode,
          CodeShape::Province,
        )?;
        let region_code =
          self.parent(record, &code, Field::RegionCode, CodeShape::Region)?;
        let income_class = owned(record, Field::IncomeClass);
        let is_capital = record
          .get(Field::IsCapital)
          .map(is_truthy)
          .unwrap_or(false);

        match self.resolver.resolve(record, &name) {
          CivilDivision::City => Entity::City(City {
            city_class: record
              .get(Field::CityClass)
              .and_then(CityClass::parse),
            income_class,
            is_capital,
            province_code,
            region_code,
            code,
            name,
          }),
          CivilDivision::Municipality => Entity::Municipality(Municipality {
            income_class,
            is_capital,
            province_code,
            region_code,
            code,
            name,
          }),
        }
      }

      CodeShape::Barangay => Entity::Barangay(Barangay {
        urban_rural:       owned(record, Field::UrbanRural),
        // Left unset unless the source declares them; reconciliation
        // resolves which sibling table the prefix matches.
        city_code:         self.declared_parent(record, Field::CityCode),
        municipality_code: self
          .declared_parent(record, Field::MunicipalityCode),
        province_code:     self.parent(
          record,
          &code,
          Field::ProvinceCode,
          CodeShape::Province,
        )?,
        region_code:       self.parent(
          record,
          &code,
          Field::RegionCode,
          CodeShape::Region,
        )?,
        code,
        name,
      }),
    };
    Ok(entity)
  }

  /// Parent code for a required slot: an explicit field wins when it
  /// normalizes to the expected shape, otherwise the code's own prefix
  /// decides.
  fn parent(
    &self,
    record: &RawRecord,
    code: &GeographicCode,
    field: Field,
    target: CodeShape,
  ) -> Result<GeographicCode, RejectReason> {
    if let Some(raw) = record.get(field)
      && let Ok(parent) = GeographicCode::normalize(raw)
      && matches!(code::classify(&parent), Ok(shape) if shape == target)
    {
      return Ok(parent);
    }
    code::parent_code(code, target).map_err(|_| {
      RejectReason::UnclassifiableCode { code: code.to_string() }
    })
  }

  /// Optional declared parent (barangay city/municipality slots): kept
  /// only when it normalizes to the city/municipality shape.
  fn declared_parent(
    &self,
    record: &RawRecord,
    field: Field,
  ) -> Option<GeographicCode> {
    let parent = GeographicCode::normalize(record.get(field)?).ok()?;
    matches!(
      code::classify(&parent),
      Ok(CodeShape::CityOrMunicipality)
    )
    .then_some(parent)
  }
}

fn owned(record: &RawRecord, field: Field) -> Option<String> {
  record.get(field).map(str::to_string)
}

fn is_truthy(value: &str) -> bool {
  matches!(
    value.trim().to_lowercase().as_str(),
    "true" | "t" | "yes" | "y" | "1" | "capital"
  )
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  fn classify(pairs: &[(&str, &str)]) -> Result<Entity, RejectReason> {
    Classifier::new().classify(&RawRecord::from_pairs(pairs.iter().copied()))
  }

  #[test]
  fn region_shape_classifies_as_region() {
    let entity = classify(&[
      ("code", "130000000"),
      ("name", "National Capital Region"),
      ("island group", "Luzon"),
    ])
    .unwrap();
    let Entity::Region(region) = entity else {
      panic!("expected region")
    };
    assert_eq!(region.code.as_str(), "130000000");
    assert_eq!(region.island_group_name.as_deref(), Some("Luzon"));
  }

  #[test]
  fn city_of_name_classifies_as_city_with_positional_parents() {
    let entity =
      classify(&[("code", "137401000"), ("name", "City of Manila")]).unwrap();
    let Entity::City(city) = entity else { panic!("expected city") };
    assert_eq!(city.province_code.as_str(), "137400000");
    assert_eq!(city.region_code.as_str(), "130000000");
    assert_eq!(city.city_class, None);
  }

  #[test]
  fn city_class_attribute_alone_classifies_as_city() {
    let entity = classify(&[
      ("code", "042108000"),
      ("name", "Dasmariñas"),
      ("city_class", "CC"),
    ])
    .unwrap();
    let Entity::City(city) = entity else { panic!("expected city") };
    assert_eq!(city.city_class, Some(CityClass::Component));
  }

  #[test]
  fn municipality_of_name_forces_municipality() {
    // Overrides an explicit "City" hint and a city-class column.
    let entity = classify(&[
      ("code", "042111000"),
      ("name", "Municipality of Maragondon"),
      ("type", "City"),
      ("city_class", "CC"),
    ])
    .unwrap();
    assert!(matches!(entity, Entity::Municipality(_)));
  }

  #[test]
  fn no_signal_defaults_to_municipality() {
    let entity =
      classify(&[("code", "042111000"), ("name", "Maragondon")]).unwrap();
    let Entity::Municipality(mun) = entity else {
      panic!("expected municipality")
    };
    assert!(!mun.is_capital);
  }

  #[test]
  fn explicit_type_field_wins_over_name_silence() {
    let entity = classify(&[
      ("code", "031405000"),
      ("name", "Gapan"),
      ("level", "City"),
    ])
    .unwrap();
    assert!(matches!(entity, Entity::City(_)));
  }

  #[test]
  fn barangay_keeps_declared_city_code() {
    let entity = classify(&[
      ("code", "137401001"),
      ("name", "Barangay 1"),
      ("city_code", "137401000"),
    ])
    .unwrap();
    let Entity::Barangay(brgy) = entity else {
      panic!("expected barangay")
    };
    assert_eq!(
      brgy.city_code.as_ref().map(|c| c.as_str()),
      Some("137401000")
    );
    assert_eq!(brgy.municipality_code, None);
    assert_eq!(brgy.province_code.as_str(), "137400000");
    assert_eq!(brgy.region_code.as_str(), "130000000");
  }

  #[test]
  fn barangay_without_declared_parent_leaves_both_unset() {
    let entity =
      classify(&[("code", "042111001"), ("name", "Poblacion")]).unwrap();
    let Entity::Barangay(brgy) = entity else {
      panic!("expected barangay")
    };
    assert_eq!(brgy.city_code, None);
    assert_eq!(brgy.municipality_code, None);
  }

  #[test]
  fn malformed_explicit_parent_falls_back_to_positional() {
    // "Region IV-A" normalizes to a barangay-shaped code, so the
    // positional derivation wins.
    let entity = classify(&[
      ("code", "042111000"),
      ("name", "Maragondon"),
      ("reg_code", "Region IV-A"),
    ])
    .unwrap();
    let Entity::Municipality(mun) = entity else {
      panic!("expected municipality")
    };
    assert_eq!(mun.region_code.as_str(), "040000000");
  }

  #[test]
  fn missing_code_and_name_are_rejected() {
    assert_eq!(
      classify(&[("name", "Ghost")]).unwrap_err(),
      RejectReason::MissingCode
    );
    assert_eq!(
      classify(&[("code", "130000000")]).unwrap_err(),
      RejectReason::MissingName
    );
    assert_eq!(
      classify(&[("code", "000000000"), ("name", "Null Island")])
        .unwrap_err(),
      RejectReason::InvalidCode { raw: "000000000".to_string() }
    );
  }

  #[test]
  fn classification_is_idempotent() {
    let record = RawRecord::from_pairs([
      ("code", "137401000"),
      ("name", "City of Manila"),
      ("income_class", "Special"),
    ]);
    let classifier = Classifier::new();
    assert_eq!(
      classifier.classify(&record).unwrap(),
      classifier.classify(&record).unwrap()
    );
  }

  #[test]
  fn alternate_resolver_replaces_the_name_guess() {
    struct AlwaysCity;
    impl CivilDivisionResolver for AlwaysCity {
      fn resolve(&self, _: &RawRecord, _: &str) -> CivilDivision {
        CivilDivision::City
      }
    }
    let classifier = Classifier::with_resolver(AlwaysCity);
    let record =
      RawRecord::from_pairs([("code", "042111000"), ("name", "Maragondon")]);
    assert!(matches!(
      classifier.classify(&record).unwrap(),
      Entity::City(_)
    ));
  }
}
