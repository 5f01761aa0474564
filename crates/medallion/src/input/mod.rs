//! Raw store: bronze-layer extracts and the records they hold.

mod parser;
mod source;
mod store;

pub use parser::{Parser, ParserConfig};
pub use source::{RawTable, SourceMetadata, SourceRecord};
pub use store::{CsvRawStore, MemoryRawStore, RawStore};
