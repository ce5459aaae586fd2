//! Hierarchy Reconciler — restores every ancestor invariant over one
//! import batch.
//!
//! After reconciliation each entity has a parent chain that exists in the
//! batch (or in the caller-supplied set of already-persisted codes), each
//! barangay has exactly one of {city_code, municipality_code} set and
//! equal to its own code prefix, and the output is ordered parents-first
//! so a foreign-key-enforcing store can ingest it directly.
//!
//! Missing ancestors are repaired by synthesizing minimal placeholder
//! records, never by dropping children; every synthesis and every
//! duplicate is logged and tallied in the [`ReconcileReport`].

use std::collections::{BTreeMap, HashMap, HashSet};

use serde::Serialize;
use tracing::warn;

use crate::{
  Result,
  code::{self, CodeShape, GeographicCode},
  entity::{Barangay, City, Entity, Level, Municipality, Province, Region},
};

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Codes already persisted, per level.
///
/// Passed in explicitly so each batch run owns its own lookup state —
/// there is no ambient "seen codes" set anywhere in this crate.
#[derive(Debug, Clone, Default)]
pub struct ExistingCodes {
  pub regions:        HashSet<GeographicCode>,
  pub provinces:      HashSet<GeographicCode>,
  pub cities:         HashSet<GeographicCode>,
  pub municipalities: HashSet<GeographicCode>,
}

impl ExistingCodes {
  /// Record a reconciled batch's codes so a later batch can resolve its
  /// ancestors against it.
  pub fn absorb(&mut self, entities: &[Entity]) {
    for entity in entities {
      let code = entity.code().clone();
      match entity.level() {
        Level::Region => {
          self.regions.insert(code);
        }
        Level::Province => {
          self.provinces.insert(code);
        }
        Level::City => {
          self.cities.insert(code);
        }
        Level::Municipality => {
          self.municipalities.insert(code);
        }
        Level::Barangay => {}
      }
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Per-level outcome counts for one reconciliation pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LevelTally {
  /// Entities admitted from the input batch (after deduplication).
  pub created:     usize,
  /// Placeholder ancestors synthesized to close hierarchy gaps.
  pub synthesized: usize,
  /// Input records discarded because a later record had the same code.
  pub duplicates:  usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReconcileReport(pub BTreeMap<Level, LevelTally>);

impl ReconcileReport {
  fn tally_mut(&mut self, level: Level) -> &mut LevelTally {
    self.0.entry(level).or_default()
  }

  pub fn tally(&self, level: Level) -> LevelTally {
    self.0.get(&level).copied().unwrap_or_default()
  }

  pub fn synthesized_total(&self) -> usize {
    self.0.values().map(|t| t.synthesized).sum()
  }

  pub fn duplicates_total(&self) -> usize {
    self.0.values().map(|t| t.duplicates).sum()
  }
}

/// A batch with every invariant restored.
#[derive(Debug, Clone)]
pub struct ReconciledBatch {
  /// Region → Province → City → Municipality → Barangay, each level in
  /// code order.
  pub entities: Vec<Entity>,
  pub report:   ReconcileReport,
}

// ─── Working state ───────────────────────────────────────────────────────────

#[derive(Default)]
struct Batch {
  regions:        BTreeMap<GeographicCode, Region>,
  provinces:      BTreeMap<GeographicCode, Province>,
  cities:         BTreeMap<GeographicCode, City>,
  municipalities: BTreeMap<GeographicCode, Municipality>,
  barangays:      BTreeMap<GeographicCode, Barangay>,
}

impl Batch {
  fn insert(&mut self, entity: Entity) {
    match entity {
      Entity::Region(e) => {
        self.regions.insert(e.code.clone(), e);
      }
      Entity::Province(e) => {
        self.provinces.insert(e.code.clone(), e);
      }
      Entity::City(e) => {
        self.cities.insert(e.code.clone(), e);
      }
      Entity::Municipality(e) => {
        self.municipalities.insert(e.code.clone(), e);
      }
      Entity::Barangay(e) => {
        self.barangays.insert(e.code.clone(), e);
      }
    }
  }

  fn remove(&mut self, level: Level, code: &GeographicCode) {
    match level {
      Level::Region => {
        self.regions.remove(code);
      }
      Level::Province => {
        self.provinces.remove(code);
      }
      Level::City => {
        self.cities.remove(code);
      }
      Level::Municipality => {
        self.municipalities.remove(code);
      }
      Level::Barangay => {
        self.barangays.remove(code);
      }
    }
  }
}

// ─── Reconciliation ──────────────────────────────────────────────────────────

/// Reconcile one classified batch against the set of already-persisted
/// codes.
///
/// An `Err` here means the code grammar failed on a code that was
/// supposed to be canonical — an upstream invariant break that must fail
/// the import run, not be skipped.
pub fn reconcile(
  entities: Vec<Entity>,
  known: &ExistingCodes,
) -> Result<ReconciledBatch> {
  let mut report = ReconcileReport::default();
  let mut batch = Batch::default();

  // Last-seen wins across the whole batch; code is the global primary
  // key, so a city/municipality collision on one code is a duplicate too.
  let mut seen: HashMap<GeographicCode, Level> = HashMap::new();
  for entity in entities {
    let level = entity.level();
    let code = entity.code().clone();
    if let Some(prior) = seen.insert(code.clone(), level) {
      report.tally_mut(level).duplicates += 1;
      warn!(%code, %prior, replacement = %level, "duplicate code in batch, last record wins");
      if prior != level {
        batch.remove(prior, &code);
      }
    }
    batch.insert(entity);
  }

  report.tally_mut(Level::Region).created = batch.regions.len();
  report.tally_mut(Level::Province).created = batch.provinces.len();
  report.tally_mut(Level::City).created = batch.cities.len();
  report.tally_mut(Level::Municipality).created = batch.municipalities.len();
  report.tally_mut(Level::Barangay).created = batch.barangays.len();

  resolve_barangay_parents(&mut batch, known, &mut report)?;

  for city in batch.cities.values() {
    ensure_province(
      &mut batch.provinces,
      &mut batch.regions,
      known,
      &mut report,
      &city.province_code,
    )?;
    ensure_region(&mut batch.regions, known, &mut report, &city.region_code);
  }
  for mun in batch.municipalities.values() {
    ensure_province(
      &mut batch.provinces,
      &mut batch.regions,
      known,
      &mut report,
      &mun.province_code,
    )?;
    ensure_region(&mut batch.regions, known, &mut report, &mun.region_code);
  }
  for province in batch.provinces.values() {
    ensure_region(
      &mut batch.regions,
      known,
      &mut report,
      &province.region_code,
    );
  }

  let mut entities = Vec::with_capacity(
    batch.regions.len()
      + batch.provinces.len()
      + batch.cities.len()
      + batch.municipalities.len()
      + batch.barangays.len(),
  );
  entities.extend(batch.regions.into_values().map(Entity::Region));
  entities.extend(batch.provinces.into_values().map(Entity::Province));
  entities.extend(batch.cities.into_values().map(Entity::City));
  entities.extend(batch.municipalities.into_values().map(Entity::Municipality));
  entities.extend(batch.barangays.into_values().map(Entity::Barangay));

  Ok(ReconciledBatch { entities, report })
}

/// Resolve which sibling table each barangay hangs off, repair declared
/// parents that contradict the code prefix, and close ancestor gaps.
fn resolve_barangay_parents(
  batch: &mut Batch,
  known: &ExistingCodes,
  report: &mut ReconcileReport,
) -> Result<()> {
  let Batch {
    regions,
    provinces,
    cities,
    municipalities,
    barangays,
  } = batch;

  for brgy in barangays.values_mut() {
    let prefix = code::parent_code(&brgy.code, CodeShape::CityOrMunicipality)?;

    // The code prefix is authoritative; a declared parent that
    // contradicts it is discarded.
    if let Some(declared) = &brgy.city_code
      && *declared != prefix
    {
      warn!(code = %brgy.code, %declared, expected = %prefix, "declared city_code contradicts code prefix, discarding");
      brgy.city_code = None;
    }
    if let Some(declared) = &brgy.municipality_code
      && *declared != prefix
    {
      warn!(code = %brgy.code, %declared, expected = %prefix, "declared municipality_code contradicts code prefix, discarding");
      brgy.municipality_code = None;
    }

    // Attach to whichever sibling table actually holds the prefix, the
    // city set consulted first. A surviving declaration only matters
    // when the parent is absent everywhere: it picks which placeholder
    // level to synthesize.
    let in_cities =
      cities.contains_key(&prefix) || known.cities.contains(&prefix);
    let in_municipalities = municipalities.contains_key(&prefix)
      || known.municipalities.contains(&prefix);

    match (in_cities, in_municipalities) {
      (true, _) => {
        brgy.city_code = Some(prefix.clone());
        brgy.municipality_code = None;
      }
      (false, true) => {
        brgy.city_code = None;
        brgy.municipality_code = Some(prefix.clone());
      }
      (false, false) if brgy.city_code.is_some() => {
        warn!(code = %brgy.code, parent = %prefix, "declared city is absent, synthesizing placeholder");
        let placeholder = placeholder_city(&prefix)?;
        ensure_province(
          provinces,
          regions,
          known,
          report,
          &placeholder.province_code,
        )?;
        cities.insert(prefix.clone(), placeholder);
        report.tally_mut(Level::City).synthesized += 1;
        brgy.city_code = Some(prefix.clone());
        brgy.municipality_code = None;
      }
      (false, false) => {
        // Neither sibling table matches: synthesize a municipality
        // placeholder rather than drop the barangay.
        warn!(code = %brgy.code, parent = %prefix, "no city or municipality matches barangay prefix, synthesizing municipality placeholder");
        let placeholder = placeholder_municipality(&prefix)?;
        ensure_province(
          provinces,
          regions,
          known,
          report,
          &placeholder.province_code,
        )?;
        municipalities.insert(prefix.clone(), placeholder);
        report.tally_mut(Level::Municipality).synthesized += 1;
        brgy.city_code = None;
        brgy.municipality_code = Some(prefix.clone());
      }
    }

    ensure_province(provinces, regions, known, report, &brgy.province_code)?;
    ensure_region(regions, known, report, &brgy.region_code);
  }
  Ok(())
}

// ─── Placeholder synthesis ───────────────────────────────────────────────────

fn ensure_region(
  regions: &mut BTreeMap<GeographicCode, Region>,
  known: &ExistingCodes,
  report: &mut ReconcileReport,
  code: &GeographicCode,
) {
  if regions.contains_key(code) || known.regions.contains(code) {
    return;
  }
  warn!(%code, "missing region ancestor, synthesizing placeholder");
  regions.insert(
    code.clone(),
    Region {
      code:              code.clone(),
      name:              format!("Region {code}"),
      island_group_code: None,
      island_group_name: None,
    },
  );
  report.tally_mut(Level::Region).synthesized += 1;
}

fn ensure_province(
  provinces: &mut BTreeMap<GeographicCode, Province>,
  regions: &mut BTreeMap<GeographicCode, Region>,
  known: &ExistingCodes,
  report: &mut ReconcileReport,
  code: &GeographicCode,
) -> Result<()> {
  if provinces.contains_key(code) || known.provinces.contains(code) {
    return Ok(());
  }
  warn!(%code, "missing province ancestor, synthesizing placeholder");
  let region_code = code::parent_code(code, CodeShape::Region)?;
  ensure_region(regions, known, report, &region_code);
  provinces.insert(
    code.clone(),
    Province {
      code:              code.clone(),
      name:              format!("Province {code}"),
      island_group_code: None,
      region_code,
    },
  );
  report.tally_mut(Level::Province).synthesized += 1;
  Ok(())
}

fn placeholder_city(code: &GeographicCode) -> Result<City> {
  Ok(City {
    code:          code.clone(),
    name:          format!("City {code}"),
    city_class:    None,
    income_class:  None,
    is_capital:    false,
    province_code: code::parent_code(code, CodeShape::Province)?,
    region_code:   code::parent_code(code, CodeShape::Region)?,
  })
}

fn placeholder_municipality(code: &GeographicCode) -> Result<Municipality> {
  Ok(Municipality {
    code:          code.clone(),
    name:          format!("Municipality {code}"),
    income_class:  None,
    is_capital:    false,
    province_code: code::parent_code(code, CodeShape::Province)?,
    region_code:   code::parent_code(code, CodeShape::Region)?,
  })
}

// ─── Tests ───────────────────────────────────────────────────────────────────
