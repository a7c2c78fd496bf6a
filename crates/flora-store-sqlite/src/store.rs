//! [`SqliteStore`] — the SQLite implementation of [`PlantStore`].

use std::{collections::HashMap, path::Path};

use flora_core::{
  entity::{BotanistId, BotanistKey, BotanistPlant, CityId, CityKey, CountryId, NewPlant, PlantId},
  reading::{ArchiveReading, LatestReading, NewRecord},
  store::PlantStore,
};

use crate::{
  encode::{RawArchiveReading, RawLatestReading, encode_dt},
  schema::SCHEMA,
  Error, Result,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Flora plant store backed by a single SQLite file.
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
}

// ─── PlantStore impl ─────────────────────────────────────────────────────────

impl PlantStore for SqliteStore {
  type Error = Error;

  // ── Persisted natural keys ────────────────────────────────────────────────

  async fn country_names(&self) -> Result<Vec<String>> {
    let names = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name FROM origin_country")?;
        let rows = stmt
          .query_map([], |row| row.get::<_, String>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(names)
  }

  async fn city_keys(&self) -> Result<Vec<CityKey>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name, country_id FROM origin_city")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(CityKey {
              name:       row.get(0)?,
              country_id: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }

  async fn botanist_keys(&self) -> Result<Vec<BotanistKey>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name, email, phone FROM botanist")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(BotanistKey {
              name:  row.get(0)?,
              email: row.get(1)?,
              phone: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }

  async fn plant_ids(&self) -> Result<Vec<PlantId>> {
    let ids = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT plant_id FROM plant")?;
        let rows = stmt
          .query_map([], |row| row.get::<_, i64>(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(ids)
  }

  async fn botanist_plant_keys(&self) -> Result<Vec<BotanistPlant>> {
    let keys = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT plant_id, botanist_id FROM botanist_plant")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(BotanistPlant {
              plant_id:    row.get(0)?,
              botanist_id: row.get(1)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(keys)
  }

  // ── Surrogate-id lookups by natural key ───────────────────────────────────

  async fn country_ids_by_name(&self) -> Result<HashMap<String, CountryId>> {
    let map = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT name, country_id FROM origin_country")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(map)
  }

  async fn city_ids_by_name_and_country(&self) -> Result<HashMap<(String, String), CityId>> {
    let map = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT ci.name, co.name, ci.city_id
           FROM origin_city ci
           JOIN origin_country co ON co.country_id = ci.country_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok((
              (row.get::<_, String>(0)?, row.get::<_, String>(1)?),
              row.get::<_, i64>(2)?,
            ))
          })?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(map)
  }

  async fn botanist_ids_by_email(&self) -> Result<HashMap<String, BotanistId>> {
    let map = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT email, botanist_id FROM botanist")?;
        let rows = stmt
          .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
          .collect::<rusqlite::Result<HashMap<_, _>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(map)
  }

  // ── Batched inserts ───────────────────────────────────────────────────────
  // One transaction per call: the whole batch commits or none of it does.

  async fn insert_countries(&self, names: Vec<String>) -> Result<usize> {
    let count = names.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare("INSERT INTO origin_country (name) VALUES (?1)")?;
          for name in &names {
            stmt.execute(rusqlite::params![name])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(count)
  }

  async fn insert_cities(&self, rows: Vec<CityKey>) -> Result<usize> {
    let count = rows.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO origin_city (name, country_id) VALUES (?1, ?2)")?;
          for row in &rows {
            stmt.execute(rusqlite::params![row.name, row.country_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(count)
  }

  async fn insert_botanists(&self, rows: Vec<BotanistKey>) -> Result<usize> {
    let count = rows.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO botanist (name, email, phone) VALUES (?1, ?2, ?3)")?;
          for row in &rows {
            stmt.execute(rusqlite::params![row.name, row.email, row.phone])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(count)
  }

  async fn insert_plants(&self, rows: Vec<NewPlant>) -> Result<usize> {
    let count = rows.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO plant (plant_id, name, city_id) VALUES (?1, ?2, ?3)")?;
          for row in &rows {
            stmt.execute(rusqlite::params![row.plant_id, row.name, row.city_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(count)
  }

  async fn insert_botanist_plants(&self, rows: Vec<BotanistPlant>) -> Result<usize> {
    let count = rows.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt =
            tx.prepare("INSERT INTO botanist_plant (plant_id, botanist_id) VALUES (?1, ?2)")?;
          for row in &rows {
            stmt.execute(rusqlite::params![row.plant_id, row.botanist_id])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(count)
  }

  async fn insert_records(&self, rows: Vec<NewRecord>) -> Result<usize> {
    let count = rows.len();
    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO record (temperature, last_watered, soil_moisture, recording_taken, plant_id)
             VALUES (?1, ?2, ?3, ?4, ?5)",
          )?;
          for row in &rows {
            stmt.execute(rusqlite::params![
              row.temperature,
              encode_dt(row.last_watered),
              row.soil_moisture,
              encode_dt(row.recording_taken),
              row.plant_id,
            ])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;
    Ok(count)
  }

  // ── Read models ───────────────────────────────────────────────────────────

  async fn latest_readings(&self) -> Result<Vec<LatestReading>> {
    let raws: Vec<RawLatestReading> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "WITH latest AS (
             SELECT r.plant_id, r.temperature, r.soil_moisture, r.recording_taken,
                    ROW_NUMBER() OVER (
                      PARTITION BY r.plant_id ORDER BY r.recording_taken DESC
                    ) AS rn
             FROM record r
           )
           SELECT l.plant_id, p.name, l.temperature, l.soil_moisture, l.recording_taken,
                  b.name, b.email, b.phone
           FROM latest l
           JOIN plant p ON p.plant_id = l.plant_id
           LEFT JOIN botanist b ON b.botanist_id = (
             SELECT bp.botanist_id FROM botanist_plant bp
             WHERE bp.plant_id = l.plant_id
             ORDER BY bp.botanist_id
             LIMIT 1
           )
           WHERE l.rn = 1
           ORDER BY l.plant_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawLatestReading {
              plant_id:        row.get(0)?,
              plant_name:      row.get(1)?,
              temperature:     row.get(2)?,
              soil_moisture:   row.get(3)?,
              recording_taken: row.get(4)?,
              botanist_name:   row.get(5)?,
              botanist_email:  row.get(6)?,
              botanist_phone:  row.get(7)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLatestReading::into_latest).collect()
  }

  async fn reading_history(&self) -> Result<Vec<ArchiveReading>> {
    let raws: Vec<RawArchiveReading> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT p.plant_id, p.name, r.temperature, r.last_watered, r.soil_moisture,
                  r.recording_taken, ci.name, co.name, b.name
           FROM plant p
           JOIN record r          ON r.plant_id = p.plant_id
           JOIN botanist_plant bp ON bp.plant_id = p.plant_id
           JOIN botanist b        ON b.botanist_id = bp.botanist_id
           JOIN origin_city ci    ON ci.city_id = p.city_id
           JOIN origin_country co ON co.country_id = ci.country_id
           ORDER BY r.record_id",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawArchiveReading {
              plant_id:        row.get(0)?,
              plant_name:      row.get(1)?,
              temperature:     row.get(2)?,
              last_watered:    row.get(3)?,
              soil_moisture:   row.get(4)?,
              recording_taken: row.get(5)?,
              city:            row.get(6)?,
              country:         row.get(7)?,
              botanist:        row.get(8)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawArchiveReading::into_archive).collect()
  }

  async fn purge_records(&self) -> Result<usize> {
    let purged = self
      .conn
      .call(|conn| {
        let n = conn.execute("DELETE FROM record", [])?;
        Ok(n)
      })
      .await?;
    Ok(purged)
  }
}
