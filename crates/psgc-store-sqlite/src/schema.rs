//! SQL schema for the PSGC SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated
//! on `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS regions (
    code               TEXT PRIMARY KEY,   -- canonical 9-digit code
    name               TEXT NOT NULL,
    island_group_code  TEXT,
    island_group_name  TEXT
);

CREATE TABLE IF NOT EXISTS provinces (
    code               TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    island_group_code  TEXT,
    region_code        TEXT NOT NULL REFERENCES regions(code)
);

CREATE TABLE IF NOT EXISTS cities (
    code           TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    city_class     TEXT,                   -- 'HUC' | 'ICC' | 'CC'
    income_class   TEXT,
    is_capital     INTEGER NOT NULL DEFAULT 0,
    province_code  TEXT NOT NULL REFERENCES provinces(code),
    region_code    TEXT NOT NULL REFERENCES regions(code)
);

CREATE TABLE IF NOT EXISTS municipalities (
    code           TEXT PRIMARY KEY,
    name           TEXT NOT NULL,
    income_class   TEXT,
    is_capital     INTEGER NOT NULL DEFAULT 0,
    province_code  TEXT NOT NULL REFERENCES provinces(code),
    region_code    TEXT NOT NULL REFERENCES regions(code)
);

-- Exactly one of city_code / municipality_code is set; reconciliation
-- guarantees it and the CHECK keeps raw SQL honest.
CREATE TABLE IF NOT EXISTS barangays (
    code               TEXT PRIMARY KEY,
    name               TEXT NOT NULL,
    urban_rural        TEXT,
    city_code          TEXT REFERENCES cities(code),
    municipality_code  TEXT REFERENCES municipalities(code),
    province_code      TEXT NOT NULL REFERENCES provinces(code),
    region_code        TEXT NOT NULL REFERENCES regions(code),
    CHECK ((city_code IS NULL) <> (municipality_code IS NULL))
);

CREATE INDEX IF NOT EXISTS provinces_region_idx      ON provinces(region_code);
CREATE INDEX IF NOT EXISTS cities_province_idx       ON cities(province_code);
CREATE INDEX IF NOT EXISTS cities_region_idx         ON cities(region_code);
CREATE INDEX IF NOT EXISTS municipalities_province_idx ON municipalities(province_code);
CREATE INDEX IF NOT EXISTS municipalities_region_idx ON municipalities(region_code);
CREATE INDEX IF NOT EXISTS barangays_city_idx        ON barangays(city_code);
CREATE INDEX IF NOT EXISTS barangays_municipality_idx ON barangays(municipality_code);
CREATE INDEX IF NOT EXISTS barangays_province_idx    ON barangays(province_code);
CREATE INDEX IF NOT EXISTS barangays_region_idx      ON barangays(region_code);

PRAGMA user_version = 1;
";
