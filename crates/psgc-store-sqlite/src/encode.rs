//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Codes are stored as their canonical 9-digit strings; city classes as
//! the standard abbreviations; booleans as 0/1 integers.

use psgc_core::{
  code::GeographicCode,
  entity::{Barangay, City, CityClass, Entity, Municipality, Province, Region},
};

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn decode_code(s: &str) -> Result<GeographicCode> {
  GeographicCode::normalize(s)
    .map_err(|e| Error::Corrupt(format!("stored code {s:?}: {e}")))
}

fn decode_code_opt(s: Option<String>) -> Result<Option<GeographicCode>> {
  s.as_deref().map(decode_code).transpose()
}

pub fn encode_city_class(class: Option<CityClass>) -> Option<&'static str> {
  class.map(CityClass::as_str)
}

pub fn decode_city_class(s: Option<String>) -> Result<Option<CityClass>> {
  match s.as_deref() {
    None => Ok(None),
    Some(raw) => CityClass::parse(raw)
      .map(Some)
      .ok_or_else(|| Error::Corrupt(format!("unknown city class {raw:?}"))),
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

pub struct RegionRow {
  pub code:              String,
  pub name:              String,
  pub island_group_code: Option<String>,
  pub island_group_name: Option<String>,
}

pub struct ProvinceRow {
  pub code:              String,
  pub name:              String,
  pub island_group_code: Option<String>,
  pub region_code:       String,
}

pub struct CityRow {
  pub code:          String,
  pub name:          String,
  pub city_class:    Option<String>,
  pub income_class:  Option<String>,
  pub is_capital:    bool,
  pub province_code: String,
  pub region_code:   String,
}

pub struct MunicipalityRow {
  pub code:          String,
  pub name:          String,
  pub income_class:  Option<String>,
  pub is_capital:    bool,
  pub province_code: String,
  pub region_code:   String,
}

pub struct BarangayRow {
  pub code:              String,
  pub name:              String,
  pub urban_rural:       Option<String>,
  pub city_code:         Option<String>,
  pub municipality_code: Option<String>,
  pub province_code:     String,
  pub region_code:       String,
}

impl RegionRow {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity::Region(Region {
      code:              decode_code(&self.code)?,
      name:              self.name,
      island_group_code: self.island_group_code,
      island_group_name: self.island_group_name,
    }))
  }
}

impl ProvinceRow {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity::Province(Province {
      code:              decode_code(&self.code)?,
      name:              self.name,
      island_group_code: self.island_group_code,
      region_code:       decode_code(&self.region_code)?,
    }))
  }
}

impl CityRow {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity::City(City {
      code:          decode_code(&self.code)?,
      name:          self.name,
      city_class:    decode_city_class(self.city_class)?,
      income_class:  self.income_class,
      is_capital:    self.is_capital,
      province_code: decode_code(&self.province_code)?,
      region_code:   decode_code(&self.region_code)?,
    }))
  }
}

impl MunicipalityRow {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity::Municipality(Municipality {
      code:          decode_code(&self.code)?,
      name:          self.name,
      income_class:  self.income_class,
      is_capital:    self.is_capital,
      province_code: decode_code(&self.province_code)?,
      region_code:   decode_code(&self.region_code)?,
    }))
  }
}

impl BarangayRow {
  pub fn into_entity(self) -> Result<Entity> {
    Ok(Entity::Barangay(Barangay {
      code:              decode_code(&self.code)?,
      name:              self.name,
      urban_rural:       self.urban_rural,
      city_code:         decode_code_opt(self.city_code)?,
      municipality_code: decode_code_opt(self.municipality_code)?,
      province_code:     decode_code(&self.province_code)?,
      region_code:       decode_code(&self.region_code)?,
    }))
  }
}
