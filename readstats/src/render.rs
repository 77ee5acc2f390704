//! Template rendering for CLI output using outstanding

use console::Style;
use outstanding::{render_with_output, Theme};
use readstatslib::{PrecomputeReport, StatsTable, TableRow};
use serde::Serialize;

/// Re-export OutputMode for callers
pub use outstanding::OutputMode;

/// Include templates at compile time
pub const STATS_TABLE_TEMPLATE: &str = include_str!("../templates/stats_table.jinja");
pub const REPORT_TEMPLATE: &str = include_str!("../templates/report_lines.jinja");

/// Name column bounds, in characters
const MIN_NAME_WIDTH: usize = 20;
const MAX_NAME_WIDTH: usize = 60;

/// Rebuilt/cached counts shown under a stats run
#[derive(Debug, Serialize)]
pub struct RunSummary {
    pub rebuilt: usize,
    pub cached: usize,
    pub skipped: usize,
}

impl RunSummary {
    pub fn from_report(report: &PrecomputeReport) -> Self {
        Self {
            rebuilt: report.rebuilt(),
            cached: report.cached(),
            skipped: report.skipped(),
        }
    }
}

/// Data context for the stats table template, every line pre-padded
#[derive(Debug, Serialize)]
pub struct StatsTableContext {
    title: Option<String>,
    header: String,
    separator: String,
    rows: Vec<String>,
    total: String,
    aggregate_header: String,
    aggregates: Vec<String>,
    summary: Option<RunSummary>,
}

/// One `label text` line of a command report
#[derive(Debug, Serialize)]
pub struct ReportLine {
    pub label: String,
    pub text: String,
}

impl ReportLine {
    pub fn new(label: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            text: text.into(),
        }
    }
}

/// Truncate a name to fit within max_len, adding ".." prefix if needed
fn truncate_name(name: &str, max_len: usize) -> String {
    let len = name.chars().count();
    if len > max_len {
        let tail: String = name.chars().skip(len - max_len + 2).collect();
        format!("..{}", tail)
    } else {
        name.to_string()
    }
}

struct Layout {
    name_width: usize,
    cell_widths: Vec<usize>,
}

impl Layout {
    fn measure(table: &StatsTable) -> Self {
        let all_rows = || {
            table
                .rows
                .iter()
                .chain(table.aggregates.iter())
                .chain(std::iter::once(&table.footer))
        };

        let name_width = all_rows()
            .map(|r| r.label.chars().count())
            .chain(table.headers.first().map(|h| h.chars().count()))
            .max()
            .unwrap_or(0)
            .clamp(MIN_NAME_WIDTH, MAX_NAME_WIDTH);

        let cell_widths = table
            .headers
            .iter()
            .skip(1)
            .enumerate()
            .map(|(i, header)| {
                all_rows()
                    .filter_map(|r| r.values.get(i))
                    .map(|v| v.chars().count())
                    .chain(std::iter::once(header.chars().count()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        Self {
            name_width,
            cell_widths,
        }
    }

    fn line(&self, label: &str, values: &[String]) -> String {
        let mut line = format!(
            "{:<width$}",
            truncate_name(label, self.name_width),
            width = self.name_width
        );
        for (value, width) in values.iter().zip(&self.cell_widths) {
            line.push_str(&format!("  {:>width$}", value, width = width));
        }
        line.trim_end().to_string()
    }

    fn row(&self, row: &TableRow) -> String {
        self.line(&row.label, &row.values)
    }

    fn separator(&self) -> String {
        let cells: usize = self.cell_widths.iter().map(|w| w + 2).sum();
        "-".repeat(self.name_width + cells)
    }
}

/// Build the template context: padded name column, right-aligned cells,
/// and aggregate rows in their own section.
pub fn build_table_context(table: &StatsTable, summary: Option<RunSummary>) -> StatsTableContext {
    let layout = Layout::measure(table);
    let (label, values) = table
        .headers
        .split_first()
        .map(|(label, values)| (label.as_str(), values))
        .unwrap_or_default();

    StatsTableContext {
        title: table.title.clone(),
        header: layout.line(label, values),
        separator: layout.separator(),
        rows: table.rows.iter().map(|r| layout.row(r)).collect(),
        total: layout.row(&table.footer),
        aggregate_header: layout.line("Aggregate", values),
        aggregates: table.aggregates.iter().map(|r| layout.row(r)).collect(),
        summary,
    }
}

/// Create the theme with styles
pub fn create_theme() -> Theme {
    Theme::new()
        .add("category", Style::new().bold())
        .add("label", Style::new().cyan())
        .add("count", Style::new().green())
}

/// Render data through a template using outstanding
pub fn render_template<T: Serialize>(
    template: &str,
    data: &T,
    output_mode: OutputMode,
) -> Result<String, Box<dyn std::error::Error>> {
    let rendered = render_with_output(template, data, &create_theme(), output_mode)?;
    Ok(rendered)
}
