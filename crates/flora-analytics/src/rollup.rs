//! Per-plant-per-day rollup of raw reading history.
//!
//! Compresses the unbounded `record` history into bounded summary rows for
//! archival, keeping enough spread (min/median/max per metric) for later
//! trend reconstruction. Median is not a streaming reduction, so each
//! group buffers its values until materialisation.

use std::collections::BTreeMap;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use flora_core::{PlantId, reading::ArchiveReading};

use crate::stats;

/// One summary row: a (plant, botanist, calendar day) group's statistics.
///
/// Partition keys are integers, not text, so a partitioned layout sorts
/// them numerically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
  pub plant_id:            PlantId,
  pub plant_name:          String,
  pub botanist:            String,
  pub year:                i32,
  pub month:               u32,
  pub day:                 u32,
  pub temperature_min:     f64,
  pub temperature_median:  f64,
  pub temperature_max:     f64,
  pub soil_moisture_min:   f64,
  pub soil_moisture_median: f64,
  pub soil_moisture_max:   f64,
  pub count:               usize,
}

#[derive(Default)]
struct Group {
  temperatures: Vec<f64>,
  moistures:    Vec<f64>,
}

/// Fold raw readings into one summary row per
/// (plant_id, plant_name, botanist, year, month, day) group.
///
/// Calendar parts come straight off each `recording_taken` — no timezone
/// conversion. Every input row lands in exactly one group, so the summed
/// counts always equal the input length. Output is ordered by the group
/// key.
pub fn summarise(readings: &[ArchiveReading]) -> Vec<Summary> {
  let mut groups: BTreeMap<(PlantId, String, String, i32, u32, u32), Group> = BTreeMap::new();

  for reading in readings {
    let taken = reading.recording_taken;
    let key = (
      reading.plant_id,
      reading.plant_name.clone(),
      reading.botanist.clone(),
      taken.year(),
      taken.month(),
      taken.day(),
    );
    let group = groups.entry(key).or_default();
    group.temperatures.push(reading.temperature);
    group.moistures.push(reading.soil_moisture);
  }

  groups
    .into_iter()
    .filter_map(|((plant_id, plant_name, botanist, year, month, day), group)| {
      // Groups are non-empty by construction; the filter only guards the
      // type-level Option from `spread`.
      let count = group.temperatures.len();
      let (temperature_min, temperature_median, temperature_max) =
        spread(&group.temperatures)?;
      let (soil_moisture_min, soil_moisture_median, soil_moisture_max) =
        spread(&group.moistures)?;

      Some(Summary {
        plant_id,
        plant_name,
        botanist,
        year,
        month,
        day,
        temperature_min,
        temperature_median,
        temperature_max,
        soil_moisture_min,
        soil_moisture_median,
        soil_moisture_max,
        count,
      })
    })
    .collect()
}

/// Object-storage layout for one summary row, matching the external
/// archival loader's partition convention.
pub fn partition_path(summary: &Summary) -> String {
  format!(
    "plant/year={}/month={}/day={}",
    summary.year, summary.month, summary.day
  )
}

fn spread(values: &[f64]) -> Option<(f64, f64, f64)> {
  let median = stats::median(values)?;
  let min = values.iter().copied().fold(f64::INFINITY, f64::min);
  let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
  Some((min, median, max))
}

#[cfg(test)]
mod tests {
  use chrono::{DateTime, TimeZone, Utc};
  use flora_core::reading::ArchiveReading;

  use super::*;

  fn taken(y: i32, mo: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, mo, d, h, 0, 0).unwrap()
  }

  fn reading(
    plant_id: i64,
    plant_name: &str,
    botanist: &str,
    temperature: f64,
    soil_moisture: f64,
    recording_taken: DateTime<Utc>,
  ) -> ArchiveReading {
    ArchiveReading {
      plant_id,
      plant_name: plant_name.into(),
      temperature,
      last_watered: recording_taken - chrono::Duration::hours(6),
      soil_moisture,
      recording_taken,
      city: "Seattle".into(),
      country: "USA".into(),
      botanist: botanist.into(),
    }
  }

  /// Seven readings across four plants on one day.
  fn sample_history() -> Vec<ArchiveReading> {
    let day = taken(2025, 1, 1, 10);
    vec![
      reading(1, "Fern", "Alice", 22.5, 35.0, day),
      reading(2, "Bonsai", "Bob", 18.0, 20.0, day),
      reading(1, "Fern", "Alice", 23.0, 33.0, day),
      reading(3, "Cactus", "Charlie", 30.0, 15.0, day),
      reading(2, "Bonsai", "Bob", 19.0, 22.0, day),
      reading(1, "Fern", "Alice", 21.5, 37.0, day),
      reading(4, "Palm", "Diana", 25.0, 30.0, day),
    ]
  }

  #[test]
  fn one_row_per_group_with_conserved_counts() {
    let summaries = summarise(&sample_history());

    assert_eq!(summaries.len(), 4);
    assert_eq!(summaries.iter().map(|s| s.count).sum::<usize>(), 7);
    // BTreeMap keying orders output by plant id.
    let ids: Vec<_> = summaries.iter().map(|s| s.plant_id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
  }

  #[test]
  fn fern_spread_matches_its_three_readings() {
    let summaries = summarise(&sample_history());
    let fern = summaries.iter().find(|s| s.plant_name == "Fern").unwrap();

    assert_eq!(fern.count, 3);
    assert_eq!(fern.botanist, "Alice");
    assert_eq!(fern.temperature_min, 21.5);
    assert_eq!(fern.temperature_median, 22.5);
    assert_eq!(fern.temperature_max, 23.0);
    assert_eq!(fern.soil_moisture_min, 33.0);
    assert_eq!(fern.soil_moisture_median, 35.0);
    assert_eq!(fern.soil_moisture_max, 37.0);
  }

  #[test]
  fn even_count_median_averages_middle_pair() {
    let summaries = summarise(&sample_history());
    let bonsai = summaries.iter().find(|s| s.plant_name == "Bonsai").unwrap();

    assert_eq!(bonsai.temperature_median, 18.5);
    assert_eq!(bonsai.soil_moisture_median, 21.0);
  }

  #[test]
  fn spread_is_ordered_for_every_group() {
    let summaries = summarise(&sample_history());
    for s in &summaries {
      assert!(s.temperature_min <= s.temperature_median);
      assert!(s.temperature_median <= s.temperature_max);
      assert!(s.soil_moisture_min <= s.soil_moisture_median);
      assert!(s.soil_moisture_median <= s.soil_moisture_max);
    }
  }

  #[test]
  fn same_plant_on_different_days_splits_groups() {
    let history = vec![
      reading(1, "Fern", "Alice", 22.0, 35.0, taken(2025, 1, 1, 9)),
      reading(1, "Fern", "Alice", 23.0, 34.0, taken(2025, 1, 1, 18)),
      reading(1, "Fern", "Alice", 24.0, 33.0, taken(2025, 1, 2, 9)),
    ];

    let summaries = summarise(&history);
    assert_eq!(summaries.len(), 2);
    assert_eq!(summaries[0].day, 1);
    assert_eq!(summaries[0].count, 2);
    assert_eq!(summaries[1].day, 2);
    assert_eq!(summaries[1].count, 1);
  }

  #[test]
  fn counts_are_conserved_for_arbitrary_batches() {
    // 60 readings spread over plants, botanists, and days.
    let mut history = Vec::new();
    for i in 0..60u32 {
      history.push(reading(
        (i % 5) as i64 + 1,
        &format!("Plant {}", i % 5 + 1),
        if i % 2 == 0 { "Alice" } else { "Bob" },
        15.0 + f64::from(i % 7),
        40.0 + f64::from(i % 11),
        taken(2025, 1, (i % 3) + 1, 8 + (i % 12)),
      ));
    }

    let summaries = summarise(&history);
    assert_eq!(summaries.iter().map(|s| s.count).sum::<usize>(), 60);
  }

  #[test]
  fn empty_history_yields_no_summaries() {
    assert!(summarise(&[]).is_empty());
  }

  #[test]
  fn partition_path_uses_unpadded_integer_parts() {
    let summaries = summarise(&[reading(
      1,
      "Fern",
      "Alice",
      22.0,
      35.0,
      taken(2025, 6, 4, 12),
    )]);
    assert_eq!(partition_path(&summaries[0]), "plant/year=2025/month=6/day=4");
  }
}
