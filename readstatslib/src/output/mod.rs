//! Output formatting: present reading stats as tables.
//!
//! This module handles the last stage of a run, turning precompute and count
//! results into display-ready data:
//!
//! - **StatsTable**: headers, ordered rows, a footer total and aggregate rows
//! - **TableRow**: a label with formatted values
//! - **Ordering**: which field rows are sorted by, and in which direction
//!
//! StatsTable is a pure presentation layer: it only formats data into
//! strings. Counting and caching happen before it is built.
//!
//! ## Example
//!
//! ```rust,ignore
//! use readstatslib::output::{Ordering, StatsTable};
//!
//! let table = StatsTable::from_precompute(&report, Ordering::by_words(), &lang);
//! // table.headers: ["Document", "Words", "Syllables", "Reading time", "Status"]
//! // table.footer: TableRow { label: "Total (5 documents)", ... }
//! ```

pub mod table;

pub use table::{OrderBy, OrderDirection, Ordering, StatsTable, TableRow};
