//! [`SchemaLoader`] — the incremental dimensional load.

use std::{collections::BTreeSet, future::Future};

use flora_core::{
  entity::{BotanistKey, BotanistPlant, CityKey, NewPlant, PlantId},
  reading::{IncomingReading, NewRecord},
  store::PlantStore,
};
use tracing::{info, warn};

use crate::{
  error::{LoadError, Stage},
  report::{LoadReport, StageCounts},
};

/// What to do with a batch row whose parent natural key cannot be resolved
/// even after the parent stage ran.
///
/// The upstream system silently dropped such rows; whether that was a
/// latent bug or a best-effort policy is unknowable, so the choice is the
/// caller's.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnresolvedPolicy {
  /// Exclude the row from its table's insert set, log it, and keep going.
  /// The exclusion cascades to children of the dropped row.
  #[default]
  DropAndLog,
  /// Abort the batch at the first stage with unresolved rows. Nothing from
  /// that stage commits; earlier stages stay committed.
  Fail,
}

/// Converts denormalized batches into normalized inserts over any
/// [`PlantStore`]. The loader is the sole writer of dimension and fact
/// rows; it holds no state between batches.
pub struct SchemaLoader<S> {
  store:  S,
  policy: UnresolvedPolicy,
}

impl<S: PlantStore> SchemaLoader<S> {
  pub fn new(store: S) -> Self {
    Self {
      store,
      policy: UnresolvedPolicy::default(),
    }
  }

  pub fn with_policy(store: S, policy: UnresolvedPolicy) -> Self {
    Self { store, policy }
  }

  pub fn store(&self) -> &S {
    &self.store
  }

  /// Load one batch, table by table in dependency order. Each stage
  /// commits before the next begins. An empty batch yields an all-zero
  /// report — a "no data" result, not an error.
  pub async fn load_batch(
    &self,
    batch: &[IncomingReading],
  ) -> Result<LoadReport, LoadError<S::Error>> {
    let mut report = LoadReport::default();
    if batch.is_empty() {
      info!("empty batch; nothing to load");
      return Ok(report);
    }

    let result = self.load_stages(batch, &mut report).await;
    if let Err(err) = &result {
      warn!(
        inserted_so_far = report.total_inserted(),
        dropped_so_far = report.total_dropped(),
        %err,
        "batch load aborted"
      );
    }
    result.map(|()| report)
  }

  async fn load_stages(
    &self,
    batch: &[IncomingReading],
    report: &mut LoadReport,
  ) -> Result<(), LoadError<S::Error>> {
    report.countries = self.load_countries(batch).await?;
    report.cities = self.load_cities(batch).await?;
    report.botanists = self.load_botanists(batch).await?;
    report.plants = self.load_plants(batch).await?;
    report.botanist_plants = self.load_botanist_plants(batch).await?;
    report.records = self.load_records(batch).await?;
    Ok(())
  }

  // ── Stages ────────────────────────────────────────────────────────────────
  // Each stage is independently callable for partial loads, mirroring the
  // per-table entry points of the upstream pipeline.

  /// Insert the batch's distinct country names not yet persisted.
  pub async fn load_countries(
    &self,
    batch: &[IncomingReading],
  ) -> Result<StageCounts, LoadError<S::Error>> {
    let stage = Stage::Country;
    let existing: BTreeSet<String> = self
      .fetch(stage, self.store.country_names())
      .await?
      .into_iter()
      .collect();

    let to_insert: Vec<String> = batch
      .iter()
      .map(|row| row.origin_country.clone())
      .collect::<BTreeSet<_>>()
      .into_iter()
      .filter(|name| !existing.contains(name))
      .collect();

    self.insert(stage, 0, self.store.insert_countries(to_insert)).await
  }

  /// Insert distinct (city, country) pairs, resolving each country's
  /// surrogate id by name.
  pub async fn load_cities(
    &self,
    batch: &[IncomingReading],
  ) -> Result<StageCounts, LoadError<S::Error>> {
    let stage = Stage::City;
    let countries = self.fetch(stage, self.store.country_ids_by_name()).await?;
    let existing: BTreeSet<CityKey> = self
      .fetch(stage, self.store.city_keys())
      .await?
      .into_iter()
      .collect();

    let wanted: BTreeSet<(String, String)> = batch
      .iter()
      .map(|row| (row.origin_city.clone(), row.origin_country.clone()))
      .collect();

    let mut dropped = 0;
    let mut to_insert = Vec::new();
    for (city, country) in wanted {
      match countries.get(&country) {
        Some(&country_id) => {
          let key = CityKey { name: city, country_id };
          if !existing.contains(&key) {
            to_insert.push(key);
          }
        }
        None => {
          warn!(%city, %country, "unresolved country for city; dropping row");
          dropped += 1;
        }
      }
    }

    self.insert(stage, dropped, self.store.insert_cities(to_insert)).await
  }

  /// Insert distinct (name, email, phone) botanist tuples not yet
  /// persisted.
  pub async fn load_botanists(
    &self,
    batch: &[IncomingReading],
  ) -> Result<StageCounts, LoadError<S::Error>> {
    let stage = Stage::Botanist;
    let existing: BTreeSet<BotanistKey> = self
      .fetch(stage, self.store.botanist_keys())
      .await?
      .into_iter()
      .collect();

    let to_insert: Vec<BotanistKey> = batch
      .iter()
      .map(|row| BotanistKey {
        name:  row.botanist_name.clone(),
        email: row.botanist_email.clone(),
        phone: row.botanist_phone.clone(),
      })
      .collect::<BTreeSet<_>>()
      .into_iter()
      .filter(|key| !existing.contains(key))
      .collect();

    self.insert(stage, 0, self.store.insert_botanists(to_insert)).await
  }

  /// Insert plants not yet persisted, resolving each city id through the
  /// (city name, country name) join. Plant ids are external: an id already
  /// persisted is skipped regardless of attribute changes.
  pub async fn load_plants(
    &self,
    batch: &[IncomingReading],
  ) -> Result<StageCounts, LoadError<S::Error>> {
    let stage = Stage::Plant;
    let cities = self
      .fetch(stage, self.store.city_ids_by_name_and_country())
      .await?;
    let existing: BTreeSet<PlantId> = self
      .fetch(stage, self.store.plant_ids())
      .await?
      .into_iter()
      .collect();

    let mut seen = BTreeSet::new();
    let mut dropped = 0;
    let mut to_insert = Vec::new();
    for row in batch {
      // First occurrence of a plant id wins within the batch.
      if !seen.insert(row.plant_id) || existing.contains(&row.plant_id) {
        continue;
      }
      match cities.get(&(row.origin_city.clone(), row.origin_country.clone())) {
        Some(&city_id) => to_insert.push(NewPlant {
          plant_id: row.plant_id,
          name: row.name.clone(),
          city_id,
        }),
        None => {
          warn!(
            plant_id = row.plant_id,
            city = %row.origin_city,
            country = %row.origin_country,
            "unresolved city for plant; dropping row"
          );
          dropped += 1;
        }
      }
    }

    self.insert(stage, dropped, self.store.insert_plants(to_insert)).await
  }

  /// Insert plant-botanist assignments, resolving botanists by email.
  /// Pairs whose plant was dropped at the previous stage are excluded here
  /// too — the drop cascades.
  pub async fn load_botanist_plants(
    &self,
    batch: &[IncomingReading],
  ) -> Result<StageCounts, LoadError<S::Error>> {
    let stage = Stage::BotanistPlant;
    let botanists = self.fetch(stage, self.store.botanist_ids_by_email()).await?;
    let plants: BTreeSet<PlantId> = self
      .fetch(stage, self.store.plant_ids())
      .await?
      .into_iter()
      .collect();
    let existing: BTreeSet<BotanistPlant> = self
      .fetch(stage, self.store.botanist_plant_keys())
      .await?
      .into_iter()
      .collect();

    let mut seen = BTreeSet::new();
    let mut dropped = 0;
    let mut to_insert = Vec::new();
    for row in batch {
      if !seen.insert((row.plant_id, row.botanist_email.clone())) {
        continue;
      }
      let Some(&botanist_id) = botanists.get(&row.botanist_email) else {
        warn!(
          plant_id = row.plant_id,
          email = %row.botanist_email,
          "unresolved botanist for assignment; dropping row"
        );
        dropped += 1;
        continue;
      };
      if !plants.contains(&row.plant_id) {
        warn!(
          plant_id = row.plant_id,
          "plant not persisted; dropping assignment"
        );
        dropped += 1;
        continue;
      }
      let pair = BotanistPlant {
        plant_id: row.plant_id,
        botanist_id,
      };
      if !existing.contains(&pair) {
        to_insert.push(pair);
      }
    }

    self
      .insert(stage, dropped, self.store.insert_botanist_plants(to_insert))
      .await
  }

  /// Append every batch row as a new record. No deduplication: duplicate
  /// values are distinct reading events. Rows for plants that were never
  /// persisted are excluded (cascade of an earlier drop).
  pub async fn load_records(
    &self,
    batch: &[IncomingReading],
  ) -> Result<StageCounts, LoadError<S::Error>> {
    let stage = Stage::Record;
    let plants: BTreeSet<PlantId> = self
      .fetch(stage, self.store.plant_ids())
      .await?
      .into_iter()
      .collect();

    let mut dropped = 0;
    let mut to_insert = Vec::new();
    for row in batch {
      if plants.contains(&row.plant_id) {
        to_insert.push(NewRecord {
          plant_id:        row.plant_id,
          temperature:     row.temperature,
          last_watered:    row.last_watered,
          soil_moisture:   row.soil_moisture,
          recording_taken: row.recording_taken,
        });
      } else {
        warn!(plant_id = row.plant_id, "plant not persisted; dropping record");
        dropped += 1;
      }
    }

    self.insert(stage, dropped, self.store.insert_records(to_insert)).await
  }

  // ── Helpers ───────────────────────────────────────────────────────────────

  async fn fetch<T>(
    &self,
    stage: Stage,
    query: impl Future<Output = Result<T, S::Error>>,
  ) -> Result<T, LoadError<S::Error>> {
    query.await.map_err(|source| LoadError::Store { stage, source })
  }

  /// Apply the unresolved-row policy, then run the stage's batched insert
  /// and log the counts. Under [`UnresolvedPolicy::Fail`] the check comes
  /// first, so nothing from the failing stage commits.
  async fn insert(
    &self,
    stage: Stage,
    dropped: usize,
    insert: impl Future<Output = Result<usize, S::Error>>,
  ) -> Result<StageCounts, LoadError<S::Error>> {
    if dropped > 0 && self.policy == UnresolvedPolicy::Fail {
      return Err(LoadError::Unresolved { stage, dropped });
    }

    let inserted = insert
      .await
      .map_err(|source| LoadError::Store { stage, source })?;
    info!(table = stage.table(), inserted, dropped, "stage committed");
    Ok(StageCounts { inserted, dropped })
  }
}
