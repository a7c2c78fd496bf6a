//! Encoding and decoding helpers between Rust domain types and the
//! plain-text representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 UTC strings, which also makes the
//! `ORDER BY recording_taken` in the latest-reading query sort
//! chronologically.

use chrono::{DateTime, Utc};
use flora_core::reading::{ArchiveReading, BotanistContact, LatestReading};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns of one latest-reading row, before timestamp decoding.
pub struct RawLatestReading {
  pub plant_id:        i64,
  pub plant_name:      String,
  pub temperature:     f64,
  pub soil_moisture:   f64,
  pub recording_taken: String,
  pub botanist_name:   Option<String>,
  pub botanist_email:  Option<String>,
  pub botanist_phone:  Option<String>,
}

impl RawLatestReading {
  pub fn into_latest(self) -> Result<LatestReading> {
    let botanist = match (self.botanist_name, self.botanist_email, self.botanist_phone) {
      (Some(name), Some(email), Some(phone)) => Some(BotanistContact { name, email, phone }),
      _ => None,
    };

    Ok(LatestReading {
      plant_id:        self.plant_id,
      plant_name:      self.plant_name,
      temperature:     self.temperature,
      soil_moisture:   self.soil_moisture,
      recording_taken: decode_dt(&self.recording_taken)?,
      botanist,
    })
  }
}

/// Raw columns of one history row (the full six-way join).
pub struct RawArchiveReading {
  pub plant_id:        i64,
  pub plant_name:      String,
  pub temperature:     f64,
  pub last_watered:    String,
  pub soil_moisture:   f64,
  pub recording_taken: String,
  pub city:            String,
  pub country:         String,
  pub botanist:        String,
}

impl RawArchiveReading {
  pub fn into_archive(self) -> Result<ArchiveReading> {
    Ok(ArchiveReading {
      plant_id:        self.plant_id,
      plant_name:      self.plant_name,
      temperature:     self.temperature,
      last_watered:    decode_dt(&self.last_watered)?,
      soil_moisture:   self.soil_moisture,
      recording_taken: decode_dt(&self.recording_taken)?,
      city:            self.city,
      country:         self.country,
      botanist:        self.botanist,
    })
  }
}
