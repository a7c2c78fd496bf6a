//! Error types for `flora-load`.

use std::fmt;

use thiserror::Error;

/// One table's position in the dependency-ordered load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
  Country,
  City,
  Botanist,
  Plant,
  BotanistPlant,
  Record,
}

impl Stage {
  /// The table this stage writes to.
  pub fn table(self) -> &'static str {
    match self {
      Self::Country => "origin_country",
      Self::City => "origin_city",
      Self::Botanist => "botanist",
      Self::Plant => "plant",
      Self::BotanistPlant => "botanist_plant",
      Self::Record => "record",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.table())
  }
}

/// Failure modes of a batch load, parameterised over the store's error type.
#[derive(Debug, Error)]
pub enum LoadError<E: std::error::Error + Send + Sync + 'static> {
  /// The data store failed mid-load. Fatal: the pipeline stops at this
  /// table; earlier stages stay committed.
  #[error("load aborted at {stage} stage: {source}")]
  Store {
    stage:  Stage,
    #[source]
    source: E,
  },

  /// Rows had parent natural keys that could not be resolved, and the
  /// loader runs under [`crate::UnresolvedPolicy::Fail`]. Under the default
  /// drop-and-log policy this is never raised.
  #[error("{dropped} row(s) with unresolved parent keys at {stage} stage")]
  Unresolved { stage: Stage, dropped: usize },
}
