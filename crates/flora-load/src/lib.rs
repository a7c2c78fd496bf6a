//! Incremental dimensional load for the Flora plant store.
//!
//! [`SchemaLoader`] converts batches of denormalized incoming rows into
//! normalized inserts, without ever duplicating a dimension entity. Tables
//! are processed strictly in foreign-key dependency order, each stage
//! committed before the next, so later stages can resolve the surrogate ids
//! assigned by earlier ones.

mod error;
mod loader;
mod report;

pub use error::{LoadError, Stage};
pub use loader::{SchemaLoader, UnresolvedPolicy};
pub use report::{LoadReport, StageCounts};
