//! Dimension entities and their natural keys.
//!
//! Dimensions are append-only reference data: created once by the
//! incremental load, never mutated afterward. Each is identified by a
//! surrogate integer id assigned by the store, except `plant`, whose id is
//! externally assigned and stable.

use serde::{Deserialize, Serialize};

pub type CountryId = i64;
pub type CityId = i64;
pub type BotanistId = i64;
/// Externally assigned by the upstream sensor API; never reassigned.
pub type PlantId = i64;

// ─── Natural keys ────────────────────────────────────────────────────────────

/// Natural key of `origin_city`: city name scoped to its country.
/// Also the full insert row — a city carries nothing beyond its key.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CityKey {
  pub name:       String,
  pub country_id: CountryId,
}

/// Natural key of `botanist`. All three columns participate: two botanists
/// sharing a name (or an email typo'd across sources) are distinct entities.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct BotanistKey {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

// ─── Insert rows ─────────────────────────────────────────────────────────────

/// Insert row for `plant`. The id comes from the upstream API, not the store.
#[derive(Debug, Clone)]
pub struct NewPlant {
  pub plant_id: PlantId,
  pub name:     String,
  pub city_id:  CityId,
}

/// Junction row linking a plant to an assigned botanist. The pair is both
/// the insert row and the composite natural key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BotanistPlant {
  pub plant_id:    PlantId,
  pub botanist_id: BotanistId,
}
