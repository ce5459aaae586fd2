//! [`SqliteStore`] — the SQLite implementation of [`GeoStore`].

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::OptionalExtension as _;
use tracing::debug;

use psgc_core::{
  code::{self, CodeShape, GeographicCode},
  entity::{Entity, Level},
  reconcile::ExistingCodes,
  store::{AncestorFilter, GeoStore, SearchQuery},
};

use crate::{
  Error, Result,
  encode::{
    BarangayRow, CityRow, MunicipalityRow, ProvinceRow, RegionRow,
    encode_city_class,
  },
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A gazetteer store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Per-table selects ─────────────────────────────────────────────────

  async fn select_regions(
    &self,
    clause: String,
    params: Vec<String>,
  ) -> Result<Vec<Entity>> {
    let rows: Vec<RegionRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT code, name, island_group_code, island_group_name
           FROM regions {clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(RegionRow {
              code:              row.get(0)?,
              name:              row.get(1)?,
              island_group_code: row.get(2)?,
              island_group_name: row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(RegionRow::into_entity).collect()
  }

  async fn select_provinces(
    &self,
    clause: String,
    params: Vec<String>,
  ) -> Result<Vec<Entity>> {
    let rows: Vec<ProvinceRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT code, name, island_group_code, region_code
           FROM provinces {clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(ProvinceRow {
              code:              row.get(0)?,
              name:              row.get(1)?,
              island_group_code: row.get(2)?,
              region_code:       row.get(3)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(ProvinceRow::into_entity).collect()
  }

  async fn select_cities(
    &self,
    clause: String,
    params: Vec<String>,
  ) -> Result<Vec<Entity>> {
    let rows: Vec<CityRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT code, name, city_class, income_class, is_capital,
                  province_code, region_code
           FROM cities {clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(CityRow {
              code:          row.get(0)?,
              name:          row.get(1)?,
              city_class:    row.get(2)?,
              income_class:  row.get(3)?,
              is_capital:    row.get(4)?,
              province_code: row.get(5)?,
              region_code:   row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(CityRow::into_entity).collect()
  }

  async fn select_municipalities(
    &self,
    clause: String,
    params: Vec<String>,
  ) -> Result<Vec<Entity>> {
    let rows: Vec<MunicipalityRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT code, name, income_class, is_capital,
                  province_code, region_code
           FROM municipalities {clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(MunicipalityRow {
              code:          row.get(0)?,
              name:          row.get(1)?,
              income_class:  row.get(2)?,
              is_capital:    row.get(3)?,
              province_code: row.get(4)?,
              region_code:   row.get(5)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows
      .into_iter()
      .map(MunicipalityRow::into_entity)
      .collect()
  }

  async fn select_barangays(
    &self,
    clause: String,
    params: Vec<String>,
  ) -> Result<Vec<Entity>> {
    let rows: Vec<BarangayRow> = self
      .conn
      .call(move |conn| {
        let sql = format!(
          "SELECT code, name, urban_rural, city_code, municipality_code,
                  province_code, region_code
           FROM barangays {clause}"
        );
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params.iter()), |row| {
            Ok(BarangayRow {
              code:              row.get(0)?,
              name:              row.get(1)?,
              urban_rural:       row.get(2)?,
              city_code:         row.get(3)?,
              municipality_code: row.get(4)?,
              province_code:     row.get(5)?,
              region_code:       row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    rows.into_iter().map(BarangayRow::into_entity).collect()
  }

  async fn select_level(
    &self,
    level: Level,
    clause: String,
    params: Vec<String>,
  ) -> Result<Vec<Entity>> {
    match level {
      Level::Region => self.select_regions(clause, params).await,
      Level::Province => self.select_provinces(clause, params).await,
      Level::City => self.select_cities(clause, params).await,
      Level::Municipality => self.select_municipalities(clause, params).await,
      Level::Barangay => self.select_barangays(clause, params).await,
    }
  }
}

// ─── SQL helpers ─────────────────────────────────────────────────────────────

fn table(level: Level) -> &'static str {
  match level {
    Level::Region => "regions",
    Level::Province => "provinces",
    Level::City => "cities",
    Level::Municipality => "municipalities",
    Level::Barangay => "barangays",
  }
}

/// The parent column an ancestor level filters on, if the combination is
/// meaningful.
fn ancestor_column(level: Level, ancestor: Level) -> Option<&'static str> {
  match (level, ancestor) {
    (Level::Province, Level::Region) => Some("region_code"),
    (Level::City | Level::Municipality, Level::Region) => Some("region_code"),
    (Level::City | Level::Municipality, Level::Province) => {
      Some("province_code")
    }
    (Level::Barangay, Level::Region) => Some("region_code"),
    (Level::Barangay, Level::Province) => Some("province_code"),
    (Level::Barangay, Level::City) => Some("city_code"),
    (Level::Barangay, Level::Municipality) => Some("municipality_code"),
    _ => None,
  }
}

/// Insert-or-replace one entity by code. Used by single upserts and by
/// the batched transaction path.
fn execute_upsert(
  conn: &rusqlite::Connection,
  entity: &Entity,
) -> rusqlite::Result<()> {
  match entity {
    Entity::Region(e) => {
      conn.execute(
        "INSERT INTO regions (code, name, island_group_code, island_group_name)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(code) DO UPDATE SET
           name              = excluded.name,
           island_group_code = excluded.island_group_code,
           island_group_name = excluded.island_group_name",
        rusqlite::params![
          e.code.as_str(),
          e.name,
          e.island_group_code,
          e.island_group_name,
        ],
      )?;
    }
    Entity::Province(e) => {
      conn.execute(
        "INSERT INTO provinces (code, name, island_group_code, region_code)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(code) DO UPDATE SET
           name              = excluded.name,
           island_group_code = excluded.island_group_code,
           region_code       = excluded.region_code",
        rusqlite::params![
          e.code.as_str(),
          e.name,
          e.island_group_code,
          e.region_code.as_str(),
        ],
      )?;
    }
    Entity::City(e) => {
      conn.execute(
        "INSERT INTO cities (code, name, city_class, income_class,
                             is_capital, province_code, region_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(code) DO UPDATE SET
           name          = excluded.name,
           city_class    = excluded.city_class,
           income_class  = excluded.income_class,
           is_capital    = excluded.is_capital,
           province_code = excluded.province_code,
           region_code   = excluded.region_code",
        rusqlite::params![
          e.code.as_str(),
          e.name,
          encode_city_class(e.city_class),
          e.income_class,
          e.is_capital,
          e.province_code.as_str(),
          e.region_code.as_str(),
        ],
      )?;
    }
    Entity::Municipality(e) => {
      conn.execute(
        "INSERT INTO municipalities (code, name, income_class, is_capital,
                                     province_code, region_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)
         ON CONFLICT(code) DO UPDATE SET
           name          = excluded.name,
           income_class  = excluded.income_class,
           is_capital    = excluded.is_capital,
           province_code = excluded.province_code,
           region_code   = excluded.region_code",
        rusqlite::params![
          e.code.as_str(),
          e.name,
          e.income_class,
          e.is_capital,
          e.province_code.as_str(),
          e.region_code.as_str(),
        ],
      )?;
    }
    Entity::Barangay(e) => {
      conn.execute(
        "INSERT INTO barangays (code, name, urban_rural, city_code,
                                municipality_code, province_code, region_code)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
         ON CONFLICT(code) DO UPDATE SET
           name              = excluded.name,
           urban_rural       = excluded.urban_rural,
           city_code         = excluded.city_code,
           municipality_code = excluded.municipality_code,
           province_code     = excluded.province_code,
           region_code       = excluded.region_code",
        rusqlite::params![
          e.code.as_str(),
          e.name,
          e.urban_rural,
          e.city_code.as_ref().map(GeographicCode::as_str),
          e.municipality_code.as_ref().map(GeographicCode::as_str),
          e.province_code.as_str(),
          e.region_code.as_str(),
        ],
      )?;
    }
  }
  Ok(())
}

// ─── GeoStore impl ───────────────────────────────────────────────────────────

impl GeoStore for SqliteStore {
  type Error = Error;

  // ── Writes ────────────────────────────────────────────────────────────

  async fn upsert(&self, entity: Entity) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        execute_upsert(conn, &entity)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_batch(&self, entities: Vec<Entity>) -> Result<()> {
    debug!(count = entities.len(), "writing batch");
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for entity in &entities {
          execute_upsert(&tx, entity)?;
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  // ── Reads ─────────────────────────────────────────────────────────────

  async fn exists(&self, level: Level, code: GeographicCode) -> Result<bool> {
    let sql = format!("SELECT 1 FROM {} WHERE code = ?1", table(level));
    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![code.as_str()], |_| Ok(true))
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;
    Ok(found)
  }

  async fn get(
    &self,
    level: Level,
    code: GeographicCode,
  ) -> Result<Option<Entity>> {
    let entities = self
      .select_level(
        level,
        "WHERE code = ?1".to_string(),
        vec![code.as_str().to_string()],
      )
      .await?;
    Ok(entities.into_iter().next())
  }

  async fn find(&self, code: GeographicCode) -> Result<Option<Entity>> {
    let shape = code::classify(&code)
      .map_err(|e| Error::Corrupt(format!("code {code}: {e}")))?;
    match shape {
      CodeShape::Region => self.get(Level::Region, code).await,
      CodeShape::Province => self.get(Level::Province, code).await,
      CodeShape::CityOrMunicipality => {
        if let Some(city) = self.get(Level::City, code.clone()).await? {
          return Ok(Some(city));
        }
        self.get(Level::Municipality, code).await
      }
      CodeShape::Barangay => self.get(Level::Barangay, code).await,
    }
  }

  async fn list(
    &self,
    level: Level,
    ancestor: Option<AncestorFilter>,
  ) -> Result<Vec<Entity>> {
    let (clause, params) = match &ancestor {
      None => ("ORDER BY code".to_string(), Vec::new()),
      Some(filter) => {
        let column = ancestor_column(level, filter.level).ok_or(
          Error::InvalidAncestor { level, ancestor: filter.level },
        )?;
        (
          format!("WHERE {column} = ?1 ORDER BY code"),
          vec![filter.code.as_str().to_string()],
        )
      }
    };
    self.select_level(level, clause, params).await
  }

  async fn search(&self, query: SearchQuery) -> Result<Vec<Entity>> {
    let limit = query.limit.unwrap_or(100);
    let pattern = format!("%{}%", query.text);
    let levels: Vec<Level> = match query.level {
      Some(level) => vec![level],
      None => Level::IN_DEPENDENCY_ORDER.to_vec(),
    };

    let mut out = Vec::new();
    for level in levels {
      if out.len() >= limit {
        break;
      }
      let remaining = limit - out.len();
      let clause = format!("WHERE name LIKE ?1 ORDER BY code LIMIT {remaining}");
      let mut batch = self
        .select_level(level, clause, vec![pattern.clone()])
        .await?;
      out.append(&mut batch);
    }
    Ok(out)
  }

  async fn counts(&self) -> Result<BTreeMap<Level, u64>> {
    let totals: Vec<(Level, u64)> = self
      .conn
      .call(|conn| {
        let mut totals = Vec::with_capacity(5);
        for level in Level::IN_DEPENDENCY_ORDER {
          let count: u64 = conn.query_row(
            &format!("SELECT COUNT(*) FROM {}", table(level)),
            [],
            |row| row.get(0),
          )?;
          totals.push((level, count));
        }
        Ok(totals)
      })
      .await?;
    Ok(totals.into_iter().collect())
  }

  async fn existing_codes(&self) -> Result<ExistingCodes> {
    let raw: Vec<(Level, Vec<String>)> = self
      .conn
      .call(|conn| {
        let mut raw = Vec::with_capacity(4);
        for level in [
          Level::Region,
          Level::Province,
          Level::City,
          Level::Municipality,
        ] {
          let mut stmt =
            conn.prepare(&format!("SELECT code FROM {}", table(level)))?;
          let codes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<rusqlite::Result<Vec<_>>>()?;
          raw.push((level, codes));
        }
        Ok(raw)
      })
      .await?;

    let mut existing = ExistingCodes::default();
    for (level, codes) in raw {
      let set = match level {
        Level::Region => &mut existing.regions,
        Level::Province => &mut existing.provinces,
        Level::City => &mut existing.cities,
        Level::Municipality => &mut existing.municipalities,
        Level::Barangay => continue,
      };
      for code in codes {
        set.insert(crate::encode::decode_code(&code)?);
      }
    }
    Ok(existing)
  }
}
