//! Transformation engine: raw snapshot + rule set → curated table.

mod engine;
mod operations;

pub use engine::TransformEngine;
pub use operations::{TransformOutcome, TransformStats};
