//! Table-ready data structures for reading-stats output.
//!
//! This module provides `StatsTable`, a presentation-ready data structure
//! that can be printed directly or serialized to JSON.
//!
//! The data flow is:
//! 1. Raw data (`PrecomputeReport`, `DocumentReport`)
//! 2. Ordered items (sorted by the requested field)
//! 3. StatsTable (formatted strings for display)

use std::cmp::Ordering as CmpOrdering;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cache::precompute::{AggregateOutcome, DocumentOutcome, PrecomputeReport};
use crate::data::counter::DocumentReport;
use crate::data::stats::{format_reading_time, Counts, Language};

/// Field to order rows by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderBy {
    /// Order by document path (lexicographical)
    #[default]
    Label,
    Words,
    Syllables,
    /// Order by reading time
    Seconds,
}

impl FromStr for OrderBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "label" | "name" | "path" => Ok(OrderBy::Label),
            "words" | "word" => Ok(OrderBy::Words),
            "syllables" | "syllable" => Ok(OrderBy::Syllables),
            "seconds" | "time" | "reading" => Ok(OrderBy::Seconds),
            _ => Err(format!("Unknown order field: {}", s)),
        }
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderDirection {
    /// Ascending (A-Z, smallest first)
    #[default]
    Ascending,
    /// Descending (Z-A, largest first)
    Descending,
}

/// Ordering configuration for rows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ordering {
    pub by: OrderBy,
    pub direction: OrderDirection,
}

impl Ordering {
    /// Order by label ascending (default)
    pub fn by_label() -> Self {
        Self::default()
    }

    /// Order by words, largest first
    pub fn by_words() -> Self {
        Self {
            by: OrderBy::Words,
            direction: OrderDirection::Descending,
        }
    }

    /// Order by reading time, longest first
    pub fn by_seconds() -> Self {
        Self {
            by: OrderBy::Seconds,
            direction: OrderDirection::Descending,
        }
    }

    pub fn ascending(mut self) -> Self {
        self.direction = OrderDirection::Ascending;
        self
    }

    pub fn descending(mut self) -> Self {
        self.direction = OrderDirection::Descending;
        self
    }
}

/// A single row in the table (data row or footer).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableRow {
    /// Row label (document path, aggregate prefix, "Total (N documents)")
    pub label: String,
    /// Values for each column after the label, ready for display
    pub values: Vec<String>,
}

/// Table-ready reading stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsTable {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Column headers: [label, Words, Syllables, Reading time, Status]
    pub headers: Vec<String>,
    pub rows: Vec<TableRow>,
    pub footer: TableRow,
    /// Aggregate directories, listed after the documents
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aggregates: Vec<TableRow>,
}

/// An unformatted row, kept until sorting is done.
struct Item {
    label: String,
    counts: Counts,
    seconds: f64,
    text: String,
    status: String,
}

fn sort_items(items: &mut [Item], ordering: Ordering) {
    items.sort_by(|a, b| {
        let cmp = match ordering.by {
            OrderBy::Label => a.label.cmp(&b.label),
            OrderBy::Words => a.counts.words.cmp(&b.counts.words),
            OrderBy::Syllables => a.counts.syllables.cmp(&b.counts.syllables),
            OrderBy::Seconds => a
                .seconds
                .partial_cmp(&b.seconds)
                .unwrap_or(CmpOrdering::Equal),
        };
        match ordering.direction {
            OrderDirection::Ascending => cmp,
            OrderDirection::Descending => cmp.reverse(),
        }
    });
}

fn to_row(item: Item) -> TableRow {
    TableRow {
        label: item.label,
        values: vec![
            item.counts.words.to_string(),
            item.counts.syllables.to_string(),
            item.text,
            item.status,
        ],
    }
}

fn headers(label: &str) -> Vec<String> {
    [label, "Words", "Syllables", "Reading time", "Status"]
        .iter()
        .map(|h| h.to_string())
        .collect()
}

fn footer(items: &[Item], seconds: f64, lang: &Language) -> TableRow {
    let total = items.iter().fold(Counts::default(), |acc, i| acc + i.counts);
    TableRow {
        label: format!("Total ({} documents)", items.len()),
        values: vec![
            total.words.to_string(),
            total.syllables.to_string(),
            format_reading_time(seconds, lang),
            String::new(),
        ],
    }
}

fn document_status(outcome: DocumentOutcome) -> &'static str {
    match outcome {
        DocumentOutcome::Rebuilt => "rebuilt",
        DocumentOutcome::Cached => "cached",
        DocumentOutcome::Skipped => "skipped",
    }
}

fn aggregate_status(outcome: AggregateOutcome) -> &'static str {
    match outcome {
        AggregateOutcome::Written => "written",
        AggregateOutcome::Unchanged => "unchanged",
        AggregateOutcome::Empty => "empty",
    }
}

impl StatsTable {
    /// Create a table from a precompute run.
    pub fn from_precompute(report: &PrecomputeReport, ordering: Ordering, lang: &Language) -> Self {
        let mut items: Vec<Item> = report
            .documents
            .iter()
            .map(|doc| {
                let (counts, seconds, text) = match &doc.reading {
                    Some(r) => (r.counts(), r.seconds, r.text.clone()),
                    None => (Counts::default(), 0.0, "-".to_string()),
                };
                Item {
                    label: doc.relative.clone(),
                    counts,
                    seconds,
                    text,
                    status: document_status(doc.outcome).to_string(),
                }
            })
            .collect();
        sort_items(&mut items, ordering);

        let seconds = items.iter().map(|i| i.seconds).sum();
        let footer = footer(&items, seconds, lang);

        let aggregates = report
            .aggregates
            .iter()
            .map(|agg| {
                let (counts, text) = match &agg.reading {
                    Some(r) => (r.counts(), r.text.clone()),
                    None => (Counts::default(), "-".to_string()),
                };
                TableRow {
                    label: format!("{}/", agg.prefix),
                    values: vec![
                        counts.words.to_string(),
                        counts.syllables.to_string(),
                        text,
                        aggregate_status(agg.outcome).to_string(),
                    ],
                }
            })
            .collect();

        StatsTable {
            title: None,
            headers: headers("Document"),
            rows: items.into_iter().map(to_row).collect(),
            footer,
            aggregates,
        }
    }

    /// Create a table from directly counted documents.
    pub fn from_documents(reports: &[DocumentReport], ordering: Ordering, lang: &Language) -> Self {
        let mut items: Vec<Item> = reports
            .iter()
            .map(|r| Item {
                label: r.path.display().to_string(),
                counts: r.counts,
                seconds: r.reading.seconds,
                text: r.reading.text.clone(),
                status: "counted".to_string(),
            })
            .collect();
        sort_items(&mut items, ordering);

        let seconds = items.iter().map(|i| i.seconds).sum();
        let footer = footer(&items, seconds, lang);

        StatsTable {
            title: None,
            headers: headers("Document"),
            rows: items.into_iter().map(to_row).collect(),
            footer,
            aggregates: Vec::new(),
        }
    }

    /// Builder: set a title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::precompute::{AggregateEntry, DocumentEntry};
    use crate::data::stats::ReadingStats;
    use std::path::PathBuf;

    fn reading(syllables: u64, words: u64) -> ReadingStats {
        ReadingStats::for_document(Counts::new(syllables, words), 0.2, &Language::default())
    }

    fn doc(rel: &str, syllables: u64, words: u64, outcome: DocumentOutcome) -> DocumentEntry {
        DocumentEntry {
            path: PathBuf::from(rel),
            relative: rel.to_string(),
            outcome,
            reading: Some(reading(syllables, words)),
        }
    }

    fn sample_report() -> PrecomputeReport {
        PrecomputeReport {
            documents: vec![
                doc("posts/b.qmd", 600, 250, DocumentOutcome::Cached),
                doc("posts/a.qmd", 3000, 1200, DocumentOutcome::Rebuilt),
                doc("about.qmd", 100, 40, DocumentOutcome::Cached),
            ],
            aggregates: vec![AggregateEntry {
                prefix: "posts".into(),
                outcome: AggregateOutcome::Written,
                documents: 2,
                reading: Some(ReadingStats::for_aggregate(
                    Counts::new(3600, 1450),
                    720.0,
                    0.2,
                    &Language::default(),
                )),
            }],
        }
    }

    fn labels(table: &StatsTable) -> Vec<&str> {
        table.rows.iter().map(|r| r.label.as_str()).collect()
    }

    #[test]
    fn test_order_by_from_str() {
        assert_eq!(OrderBy::from_str("words").unwrap(), OrderBy::Words);
        assert_eq!(OrderBy::from_str("Time").unwrap(), OrderBy::Seconds);
        assert_eq!(OrderBy::from_str("path").unwrap(), OrderBy::Label);
        assert_eq!(OrderBy::from_str("syllables").unwrap(), OrderBy::Syllables);
        assert!(OrderBy::from_str("invalid").is_err());
    }

    #[test]
    fn test_ordering_builders() {
        assert_eq!(Ordering::default().by, OrderBy::Label);
        assert_eq!(Ordering::by_words().direction, OrderDirection::Descending);
        assert_eq!(
            Ordering::by_seconds().ascending().direction,
            OrderDirection::Ascending
        );
    }

    #[test]
    fn test_table_from_precompute_default_order() {
        let table =
            StatsTable::from_precompute(&sample_report(), Ordering::default(), &Language::default());

        assert_eq!(
            table.headers,
            vec!["Document", "Words", "Syllables", "Reading time", "Status"]
        );
        assert_eq!(labels(&table), vec!["about.qmd", "posts/a.qmd", "posts/b.qmd"]);
        assert_eq!(table.rows[1].values, vec!["1200", "3000", "~ 10 dk", "rebuilt"]);
        assert_eq!(table.footer.label, "Total (3 documents)");
        assert_eq!(table.footer.values[0], "1490");
        assert_eq!(table.footer.values[1], "3700");
        // 600 + 120 + 20 seconds
        assert_eq!(table.footer.values[2], "~ 12 dk");
    }

    #[test]
    fn test_table_by_words_descending() {
        let table =
            StatsTable::from_precompute(&sample_report(), Ordering::by_words(), &Language::default());
        assert_eq!(labels(&table), vec!["posts/a.qmd", "posts/b.qmd", "about.qmd"]);
    }

    #[test]
    fn test_table_aggregates() {
        let table =
            StatsTable::from_precompute(&sample_report(), Ordering::default(), &Language::default());

        assert_eq!(table.aggregates.len(), 1);
        assert_eq!(table.aggregates[0].label, "posts/");
        assert_eq!(table.aggregates[0].values, vec!["1450", "3600", "~ 12 dk", "written"]);
    }

    #[test]
    fn test_table_serializes_without_empty_parts() {
        let table = StatsTable::from_documents(&[], Ordering::default(), &Language::new("en"));
        let json = serde_json::to_value(&table).unwrap();

        assert!(json.get("title").is_none());
        assert!(json.get("aggregates").is_none());
        assert_eq!(json["footer"]["label"], "Total (0 documents)");
        assert_eq!(json["footer"]["values"][2], "~ 0 min");
    }
}
