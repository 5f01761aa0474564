//! Batch orchestration of the full curated load.

mod batch;
mod events;

pub use batch::{
    BatchOrchestrator, BatchResult, BatchState, BatchStatus, LoadResult, LoadStatus, TableCheck,
};
pub use events::{EventSink, FanoutSink, LoadEvent, RecordingSink, TracingSink};
