//! An explicit, injectable TTL cache.
//!
//! The analytics functions themselves are cache-agnostic and re-runnable;
//! callers that poll (a dashboard refreshing a snapshot) wrap their fetch
//! in a [`TtlCache`] with a freshness window chosen per call site. The
//! one-shot report path simply skips it.

use std::{
  sync::Mutex,
  time::{Duration, Instant},
};

/// A single-slot cache holding one value and its fetch time.
///
/// Thread-safe; `get` hands out clones. The TTL is a parameter of each
/// read, not of the cache, so different call sites can demand different
/// freshness from the same slot.
#[derive(Debug, Default)]
pub struct TtlCache<T> {
  slot: Mutex<Option<(Instant, T)>>,
}

impl<T: Clone> TtlCache<T> {
  pub fn new() -> Self {
    Self { slot: Mutex::new(None) }
  }

  /// The cached value, if one was stored less than `ttl` ago.
  pub fn get(&self, ttl: Duration) -> Option<T> {
    let slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
    match slot.as_ref() {
      Some((stored_at, value)) if stored_at.elapsed() < ttl => Some(value.clone()),
      _ => None,
    }
  }

  /// Store `value`, restarting the freshness clock.
  pub fn put(&self, value: T) {
    let mut slot = self.slot.lock().unwrap_or_else(|e| e.into_inner());
    *slot = Some((Instant::now(), value));
  }
}

#[cfg(test)]
mod tests {
  use std::time::Duration;

  use super::TtlCache;

  #[test]
  fn empty_cache_misses() {
    let cache: TtlCache<u32> = TtlCache::new();
    assert_eq!(cache.get(Duration::from_secs(60)), None);
  }

  #[test]
  fn fresh_value_hits() {
    let cache = TtlCache::new();
    cache.put(vec![1, 2, 3]);
    assert_eq!(cache.get(Duration::from_secs(60)), Some(vec![1, 2, 3]));
  }

  #[test]
  fn zero_ttl_always_misses() {
    let cache = TtlCache::new();
    cache.put(7u32);
    assert_eq!(cache.get(Duration::ZERO), None);
  }

  #[test]
  fn put_replaces_the_previous_value() {
    let cache = TtlCache::new();
    cache.put(1u32);
    cache.put(2u32);
    assert_eq!(cache.get(Duration::from_secs(60)), Some(2));
  }
}
