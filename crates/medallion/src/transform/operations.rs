//! Results of running a rule set over a raw snapshot.

use serde::{Deserialize, Serialize};

use crate::curated::CuratedTable;

/// Row accounting for one transformation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransformStats {
    /// Rows in the raw snapshot.
    pub raw_rows: usize,
    /// Rows dropped because their natural key was null.
    pub null_key_rows: usize,
    /// Rows dropped because a later row had the same natural key.
    pub duplicate_rows: usize,
    /// Rows published.
    pub output_rows: usize,
}

impl TransformStats {
    /// Rows removed by the row policy.
    pub fn dropped(&self) -> usize {
        self.null_key_rows + self.duplicate_rows
    }
}

/// Curated table plus its row accounting.
#[derive(Debug, Clone)]
pub struct TransformOutcome {
    pub table: CuratedTable,
    pub stats: TransformStats,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dropped() {
        let stats = TransformStats {
            raw_rows: 10,
            null_key_rows: 1,
            duplicate_rows: 3,
            output_rows: 6,
        };
        assert_eq!(stats.dropped(), 4);
        assert_eq!(stats.output_rows + stats.dropped(), stats.raw_rows);
    }
}
