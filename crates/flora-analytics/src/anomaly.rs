//! Anomaly detection over a latest-reading snapshot.
//!
//! A plant is critical when its latest temperature or soil moisture is a
//! statistical outlier across the snapshot, or when its latest reading has
//! gone stale. The outlier test is cross-sectional — it compares each plant
//! against the rest of the snapshot, not against the plant's own history.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use flora_core::{
  PlantId,
  reading::{BotanistContact, LatestReading},
};

use crate::stats;

/// Modified z-score above which a metric counts as an outlier.
pub const OUTLIER_THRESHOLD: f64 = 3.0;

/// A reading older than this is stale. Strict: exactly two hours is fine.
pub const STALE_AFTER_HOURS: i64 = 2;

/// One plant in need of attention, with a human-readable account of why.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriticalPlant {
  pub plant_id:     PlantId,
  pub plant_name:   String,
  /// Issue fragments in fixed order (temperature, moisture, staleness),
  /// joined with `"; "`.
  pub issues:       String,
  pub last_reading: DateTime<Utc>,
  /// Assigned botanist from the snapshot, passed through unchanged for
  /// notification routing.
  pub botanist:     Option<BotanistContact>,
}

/// Identify plants with extreme readings or stale data.
///
/// Pure and total: any snapshot (including the empty one) yields a result,
/// never an error. `now` is passed in so callers stay deterministic.
pub fn identify_critical_plants(
  snapshot: &[LatestReading],
  now: DateTime<Utc>,
) -> Vec<CriticalPlant> {
  let temperatures: Vec<f64> = snapshot.iter().map(|r| r.temperature).collect();
  let moistures: Vec<f64> = snapshot.iter().map(|r| r.soil_moisture).collect();

  let temperature_scores = modified_z_scores(&temperatures);
  let moisture_scores = modified_z_scores(&moistures);
  let stale_after = Duration::hours(STALE_AFTER_HOURS);

  snapshot
    .iter()
    .enumerate()
    .filter_map(|(i, plant)| {
      let mut issues = Vec::new();

      if temperature_scores[i] > OUTLIER_THRESHOLD {
        issues.push(format!("Extreme temperature: {:.1}°C", plant.temperature));
      }
      if moisture_scores[i] > OUTLIER_THRESHOLD {
        issues.push(format!("Extreme moisture: {:.1}%", plant.soil_moisture));
      }

      let age = now - plant.recording_taken;
      if age > stale_after {
        let hours_old = age.num_seconds() as f64 / 3600.0;
        issues.push(format!("Stale reading: {hours_old:.1} hours old"));
      }

      if issues.is_empty() {
        return None;
      }
      Some(CriticalPlant {
        plant_id:     plant.plant_id,
        plant_name:   plant.plant_name.clone(),
        issues:       issues.join("; "),
        last_reading: plant.recording_taken,
        botanist:     plant.botanist.clone(),
      })
    })
    .collect()
}

/// Modified z-score of each value: absolute deviation from the population
/// median, scaled by the population dispersion.
///
/// Uses the MAD-based formulation, falling back to the mean absolute
/// deviation when the MAD collapses to zero (more than half the values
/// identical). When both are zero the statistic is degenerate and every
/// score is zero — identical values are never outliers, and no NaN can
/// escape.
fn modified_z_scores(values: &[f64]) -> Vec<f64> {
  const MAD_SCALE: f64 = 0.6745;
  const MEAN_AD_SCALE: f64 = 1.253314;

  let Some(median) = stats::median(values) else {
    return Vec::new();
  };
  let deviations: Vec<f64> = values.iter().map(|v| (v - median).abs()).collect();

  if let Some(mad) = stats::median(&deviations)
    && mad > 0.0
  {
    return deviations.iter().map(|d| MAD_SCALE * d / mad).collect();
  }

  let mean_ad = deviations.iter().sum::<f64>() / deviations.len() as f64;
  if mean_ad > 0.0 {
    return deviations.iter().map(|d| d / (MEAN_AD_SCALE * mean_ad)).collect();
  }

  vec![0.0; values.len()]
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone, Utc};
  use flora_core::reading::{BotanistContact, LatestReading};

  use super::*;

  fn now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 4, 16, 0, 0).unwrap()
  }

  fn plant(id: i64, temperature: f64, soil_moisture: f64) -> LatestReading {
    LatestReading {
      plant_id: id,
      plant_name: format!("Plant {id}"),
      temperature,
      soil_moisture,
      recording_taken: now(),
      botanist: None,
    }
  }

  #[test]
  fn extreme_temperature_is_flagged() {
    let snapshot: Vec<_> = [10.0, 10.0, 10.0, 10.0, 100.0]
      .iter()
      .enumerate()
      .map(|(i, &t)| plant(i as i64 + 1, t, 50.0))
      .collect();

    let critical = identify_critical_plants(&snapshot, now());
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].plant_id, 5);
    assert_eq!(critical[0].issues, "Extreme temperature: 100.0°C");
  }

  #[test]
  fn zero_variance_flags_nothing() {
    let snapshot: Vec<_> = (1..=5).map(|i| plant(i, 10.0, 50.0)).collect();
    assert!(identify_critical_plants(&snapshot, now()).is_empty());
  }

  #[test]
  fn extreme_moisture_is_flagged() {
    let snapshot: Vec<_> = [50.0, 50.0, 50.0, 50.0, 99.0]
      .iter()
      .enumerate()
      .map(|(i, &m)| plant(i as i64 + 1, 20.0, m))
      .collect();

    let critical = identify_critical_plants(&snapshot, now());
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].issues, "Extreme moisture: 99.0%");
  }

  #[test]
  fn issue_fragments_keep_fixed_order() {
    let mut snapshot: Vec<_> = (1..=4).map(|i| plant(i, 10.0, 50.0)).collect();
    let mut outlier = plant(5, 100.0, 99.0);
    outlier.recording_taken = now() - Duration::hours(3);
    snapshot.push(outlier);

    let critical = identify_critical_plants(&snapshot, now());
    assert_eq!(critical.len(), 1);
    assert_eq!(
      critical[0].issues,
      "Extreme temperature: 100.0°C; Extreme moisture: 99.0%; Stale reading: 3.0 hours old"
    );
  }

  #[test]
  fn reading_exactly_two_hours_old_is_not_stale() {
    let mut p = plant(1, 20.0, 50.0);
    p.recording_taken = now() - Duration::hours(2);
    assert!(identify_critical_plants(&[p], now()).is_empty());
  }

  #[test]
  fn reading_one_second_past_two_hours_is_stale() {
    let mut p = plant(1, 20.0, 50.0);
    p.recording_taken = now() - Duration::hours(2) - Duration::seconds(1);

    let critical = identify_critical_plants(&[p.clone()], now());
    assert_eq!(critical.len(), 1);
    assert_eq!(critical[0].issues, "Stale reading: 2.0 hours old");
    assert_eq!(critical[0].last_reading, p.recording_taken);
  }

  #[test]
  fn botanist_identity_passes_through_unchanged() {
    let mut p = plant(1, 20.0, 50.0);
    p.recording_taken = now() - Duration::hours(5);
    p.botanist = Some(BotanistContact {
      name:  "Kenneth Buckridge".into(),
      email: "kenneth.buckridge@lnhm.co.uk".into(),
      phone: "+447639148635".into(),
    });

    let critical = identify_critical_plants(&[p.clone()], now());
    assert_eq!(critical[0].botanist, p.botanist);
  }

  #[test]
  fn empty_snapshot_yields_empty_output() {
    assert!(identify_critical_plants(&[], now()).is_empty());
  }

  #[test]
  fn detection_is_deterministic() {
    let snapshot: Vec<_> = [10.0, 12.0, 11.0, 10.5, 100.0]
      .iter()
      .enumerate()
      .map(|(i, &t)| plant(i as i64 + 1, t, 50.0))
      .collect();

    let first = identify_critical_plants(&snapshot, now());
    let second = identify_critical_plants(&snapshot, now());
    assert_eq!(first, second);
  }
}
