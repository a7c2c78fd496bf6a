//! SQL schema for the Flora SQLite store.
//!
//! The unique constraints on each dimension table's natural key are
//! load-bearing: the loader's read-then-diff dedup does not guarantee
//! snapshot isolation against a concurrent loader, so the storage layer is
//! the final arbiter against duplicate natural keys.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS origin_country (
    country_id  INTEGER PRIMARY KEY,
    name        TEXT NOT NULL UNIQUE
);

CREATE TABLE IF NOT EXISTS origin_city (
    city_id     INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    country_id  INTEGER NOT NULL REFERENCES origin_country(country_id),
    UNIQUE (name, country_id)
);

CREATE TABLE IF NOT EXISTS botanist (
    botanist_id INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    email       TEXT NOT NULL,
    phone       TEXT NOT NULL,
    UNIQUE (name, email, phone)
);

-- plant_id is assigned by the upstream sensor API, not by this store.
CREATE TABLE IF NOT EXISTS plant (
    plant_id    INTEGER PRIMARY KEY,
    name        TEXT NOT NULL,
    city_id     INTEGER NOT NULL REFERENCES origin_city(city_id)
);

CREATE TABLE IF NOT EXISTS botanist_plant (
    plant_id    INTEGER NOT NULL REFERENCES plant(plant_id),
    botanist_id INTEGER NOT NULL REFERENCES botanist(botanist_id),
    UNIQUE (plant_id, botanist_id)
);

-- Readings are strictly append-only and carry no uniqueness: duplicate
-- values are distinct events. Rows are purged wholesale after archival.
CREATE TABLE IF NOT EXISTS record (
    record_id       INTEGER PRIMARY KEY,
    temperature     REAL NOT NULL,
    last_watered    TEXT NOT NULL,   -- RFC 3339 UTC
    soil_moisture   REAL NOT NULL,
    recording_taken TEXT NOT NULL,   -- RFC 3339 UTC
    plant_id        INTEGER NOT NULL REFERENCES plant(plant_id)
);

CREATE INDEX IF NOT EXISTS record_plant_idx ON record(plant_id);
CREATE INDEX IF NOT EXISTS record_taken_idx ON record(recording_taken);

PRAGMA user_version = 1;
";
