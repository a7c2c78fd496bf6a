//! The `PlantStore` trait — the injected SQL execution capability.
//!
//! Implemented by storage backends (e.g. `flora-store-sqlite`). The loader
//! and the analytics consumers depend on this abstraction, not on any
//! concrete backend. The loader is the sole writer; everything else is a
//! read-only consumer.

use std::{collections::HashMap, future::Future};

use crate::{
  entity::{BotanistId, BotanistKey, BotanistPlant, CityId, CityKey, CountryId, NewPlant, PlantId},
  reading::{ArchiveReading, LatestReading, NewRecord},
};

/// Abstraction over the normalized relational store.
///
/// The key-fetch methods return the natural keys already persisted, so the
/// loader can compute set differences without round-tripping per row. The
/// insert methods are batched: one call, one transaction, one commit.
///
/// All methods return `Send` futures so the trait can be used from
/// multi-threaded async runtimes.
pub trait PlantStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Persisted natural keys ────────────────────────────────────────────

  fn country_names(
    &self,
  ) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send + '_;

  fn city_keys(
    &self,
  ) -> impl Future<Output = Result<Vec<CityKey>, Self::Error>> + Send + '_;

  fn botanist_keys(
    &self,
  ) -> impl Future<Output = Result<Vec<BotanistKey>, Self::Error>> + Send + '_;

  fn plant_ids(
    &self,
  ) -> impl Future<Output = Result<Vec<PlantId>, Self::Error>> + Send + '_;

  fn botanist_plant_keys(
    &self,
  ) -> impl Future<Output = Result<Vec<BotanistPlant>, Self::Error>> + Send + '_;

  // ── Surrogate-id lookups by natural key ───────────────────────────────

  fn country_ids_by_name(
    &self,
  ) -> impl Future<Output = Result<HashMap<String, CountryId>, Self::Error>> + Send + '_;

  /// City ids keyed by `(city name, country name)`, resolved through the
  /// `origin_city` → `origin_country` join.
  fn city_ids_by_name_and_country(
    &self,
  ) -> impl Future<Output = Result<HashMap<(String, String), CityId>, Self::Error>> + Send + '_;

  fn botanist_ids_by_email(
    &self,
  ) -> impl Future<Output = Result<HashMap<String, BotanistId>, Self::Error>> + Send + '_;

  // ── Batched inserts ───────────────────────────────────────────────────
  // Each returns the number of rows inserted.

  fn insert_countries(
    &self,
    names: Vec<String>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_cities(
    &self,
    rows: Vec<CityKey>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_botanists(
    &self,
    rows: Vec<BotanistKey>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_plants(
    &self,
    rows: Vec<NewPlant>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_botanist_plants(
    &self,
    rows: Vec<BotanistPlant>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn insert_records(
    &self,
    rows: Vec<NewRecord>,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Read models ───────────────────────────────────────────────────────

  /// One row per plant: its most recent reading by `recording_taken`, plus
  /// an assigned botanist for notification routing.
  fn latest_readings(
    &self,
  ) -> impl Future<Output = Result<Vec<LatestReading>, Self::Error>> + Send + '_;

  /// Every stored reading joined through plant, city, country, and
  /// botanist. Feeds the per-day rollup before archival.
  fn reading_history(
    &self,
  ) -> impl Future<Output = Result<Vec<ArchiveReading>, Self::Error>> + Send + '_;

  /// Delete all rows from `record`. Called only after the rollup output has
  /// been archived successfully. Returns the number of rows purged.
  fn purge_records(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}
