//! Hash cache for reading stats.
//!
//! Counting needs a pandoc run per document, so stats are kept in YAML
//! records next to the sources and only recomputed when the document bytes
//! or the settings that shape the numbers change.

pub mod hash;
pub mod precompute;
pub mod record;

pub use hash::{aggregate_hash, document_hash};
pub use precompute::{
    precompute, AggregateEntry, AggregateOutcome, DocumentEntry, DocumentOutcome,
    PrecomputeOptions, PrecomputeReport,
};
pub use record::{
    aggregate_path, load_record, needs_rebuild, stats_path, word_log_path, write_record,
    AggregateRecord, Record, RecordKind, StatsRecord, AGGREGATE_FILE, STATS_SUFFIX,
};
