//! Per-batch load accounting.

/// Outcome of one table's stage: rows inserted, rows dropped for an
/// unresolved parent key. Rows skipped because their natural key is already
/// persisted are neither — that is the expected steady state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StageCounts {
  pub inserted: usize,
  pub dropped:  usize,
}

/// Counts for every stage of one batch load, in dependency order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
  pub countries:       StageCounts,
  pub cities:          StageCounts,
  pub botanists:       StageCounts,
  pub plants:          StageCounts,
  pub botanist_plants: StageCounts,
  pub records:         StageCounts,
}

impl LoadReport {
  fn stages(&self) -> [StageCounts; 6] {
    [
      self.countries,
      self.cities,
      self.botanists,
      self.plants,
      self.botanist_plants,
      self.records,
    ]
  }

  pub fn total_inserted(&self) -> usize {
    self.stages().iter().map(|s| s.inserted).sum()
  }

  pub fn total_dropped(&self) -> usize {
    self.stages().iter().map(|s| s.dropped).sum()
  }
}
