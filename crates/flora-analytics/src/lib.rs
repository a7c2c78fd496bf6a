//! Read-only analytics over the Flora reading snapshots.
//!
//! Both products are pure functions over data already fetched through a
//! [`flora_core::PlantStore`]: the anomaly detector turns a latest-reading
//! snapshot into a critical-plant list, and the rollup compresses raw
//! reading history into per-plant-per-day summaries for archival. Neither
//! holds state or issues queries; identical input always yields identical
//! output.

pub mod anomaly;
pub mod cache;
pub mod rollup;

mod stats;

pub use anomaly::{CriticalPlant, identify_critical_plants};
pub use cache::TtlCache;
pub use rollup::{Summary, partition_path, summarise};
