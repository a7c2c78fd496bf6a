//! Core types and trait definitions for the Flora plant-monitoring store.
//!
//! This crate is deliberately free of database dependencies. All other
//! crates depend on it; it depends on nothing proprietary.

pub mod entity;
pub mod reading;
pub mod store;

pub use entity::{BotanistId, CityId, CountryId, PlantId};
pub use store::PlantStore;
