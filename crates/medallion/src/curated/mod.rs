//! Curated store: the cleansed, typed (silver) output.

mod record;
mod store;

pub use record::{CuratedRecord, CuratedSnapshot, CuratedTable};
pub use store::{CsvCuratedStore, CuratedStore, MemoryCuratedStore};
