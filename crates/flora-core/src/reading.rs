//! Reading types — the fact side of the model and its read-model views.
//!
//! An [`IncomingReading`] is one denormalized row from the upstream
//! extraction step, carrying plant, location, botanist, and sensor
//! attributes together. The loader splits it across the dimension tables
//! and appends a [`NewRecord`]. The two view types ([`LatestReading`],
//! [`ArchiveReading`]) are what the analytics consumers read back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entity::PlantId;

/// One denormalized row produced by the external extraction/flattening step.
/// Timestamps arrive already parsed; string cleanup (phone formats, etc.) is
/// the extractor's job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomingReading {
  pub plant_id:        PlantId,
  pub name:            String,
  pub origin_city:     String,
  pub origin_country:  String,
  pub temperature:     f64,
  pub last_watered:    DateTime<Utc>,
  pub soil_moisture:   f64,
  pub recording_taken: DateTime<Utc>,
  pub botanist_name:   String,
  pub botanist_email:  String,
  pub botanist_phone:  String,
}

/// Insert row for the append-only `record` table. No deduplication is ever
/// applied: every ingested reading is a distinct event, even if identical
/// in values.
#[derive(Debug, Clone)]
pub struct NewRecord {
  pub plant_id:        PlantId,
  pub temperature:     f64,
  pub last_watered:    DateTime<Utc>,
  pub soil_moisture:   f64,
  pub recording_taken: DateTime<Utc>,
}

/// Contact details of an assigned botanist, passed through read models
/// unchanged so the reporting layer can route notifications.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BotanistContact {
  pub name:  String,
  pub email: String,
  pub phone: String,
}

/// The most recent reading for one plant, as returned by
/// [`crate::store::PlantStore::latest_readings`]. Input to the anomaly
/// detector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatestReading {
  pub plant_id:        PlantId,
  pub plant_name:      String,
  pub temperature:     f64,
  pub soil_moisture:   f64,
  pub recording_taken: DateTime<Utc>,
  /// One assigned botanist, if any. Plants with several keepers surface an
  /// arbitrary but stable one.
  pub botanist:        Option<BotanistContact>,
}

/// One raw reading joined back through every dimension, as returned by
/// [`crate::store::PlantStore::reading_history`]. Input to the aggregator.
/// A plant tended by several botanists yields one row per botanist, and is
/// rolled up per botanist downstream.
#[derive(Debug, Clone)]
pub struct ArchiveReading {
  pub plant_id:        PlantId,
  pub plant_name:      String,
  pub temperature:     f64,
  pub last_watered:    DateTime<Utc>,
  pub soil_moisture:   f64,
  pub recording_taken: DateTime<Utc>,
  pub city:            String,
  pub country:         String,
  pub botanist:        String,
}
