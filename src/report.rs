use std::collections::BTreeMap;
use std::fmt::Write;

use comfy_table::{Cell, CellAlignment, Table, TableComponent};

use crate::dashboard::PresentationSink;
use crate::data::filter::FilterSet;
use crate::stats::summary::STAT_LABELS;
use crate::stats::{pearson_correlation, ColumnSummary, Histogram};

/// Width of the longest histogram bar, in characters.
const BAR_WIDTH: usize = 40;

/// Plain-text rendering of the dashboard, for `--report` runs.
pub struct TextReport {
    title: String,
    filters: Option<String>,
    out: String,
}

impl TextReport {
    pub fn new(title: &str) -> Self {
        TextReport {
            title: title.to_string(),
            filters: None,
            out: String::new(),
        }
    }

    /// Print the active filters under the title.
    pub fn with_filters(mut self, filters: &FilterSet) -> Self {
        self.filters = Some(describe_filters(filters));
        self
    }

    pub fn into_string(self) -> String {
        self.out
    }

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
    }

    fn table(&mut self, table: &Table) {
        let _ = writeln!(self.out, "{table}");
    }
}

fn plain_table() -> Table {
    let mut table = Table::new();
    table.remove_style(TableComponent::HorizontalLines);
    table.remove_style(TableComponent::MiddleIntersections);
    table.remove_style(TableComponent::LeftBorderIntersections);
    table.remove_style(TableComponent::RightBorderIntersections);
    table
}

fn right(text: String) -> Cell {
    Cell::new(text).set_alignment(CellAlignment::Right)
}

pub fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

fn describe_filters(filters: &FilterSet) -> String {
    let types = if filters.restricts_types() {
        let names: Vec<String> = filters
            .transaction_types()
            .iter()
            .map(|c| c.to_string())
            .collect();
        names.join(", ")
    } else {
        "All".to_string()
    };
    let range = filters.amount_range();
    format!(
        "Country: {} | Types: {} | Amount: {} to {}",
        filters.country(),
        types,
        format_amount(range.lo),
        format_amount(range.hi)
    )
}

impl PresentationSink for TextReport {
    fn begin_section(&mut self, title: &str) {
        self.line("");
        self.line(title);
        self.line(&"-".repeat(title.chars().count()));
    }

    fn render_count(&mut self, n: usize) {
        let title = self.title.clone();
        self.line(&title);
        self.line(&"=".repeat(title.chars().count()));
        if let Some(filters) = self.filters.clone() {
            self.line(&filters);
        }
        self.line(&format!("Total Transactions: {n}"));
    }

    fn render_category_sums(&mut self, sums: &BTreeMap<String, f64>) {
        let mut table = plain_table();
        table.set_header(vec!["Industry", "Amount (USD)"]);
        for (category, sum) in sums {
            table.add_row(vec![Cell::new(category), right(format_amount(*sum))]);
        }
        self.table(&table);
    }

    fn render_histogram(&mut self, histogram: &Histogram) {
        let peak = histogram.counts.iter().copied().max().unwrap_or(0).max(1);
        let mut table = plain_table();
        table.set_header(vec!["From", "To", "Count", ""]);
        for (i, count) in histogram.counts.iter().enumerate() {
            let bar = "#".repeat(count * BAR_WIDTH / peak);
            table.add_row(vec![
                right(format_amount(histogram.edges[i])),
                right(format_amount(histogram.edges[i + 1])),
                right(count.to_string()),
                Cell::new(bar),
            ]);
        }
        self.table(&table);
        self.line(&format!(
            "{} transactions in {} bins",
            histogram.total(),
            histogram.bin_count()
        ));
    }

    fn render_counts(&mut self, counts: &BTreeMap<i64, usize>) {
        let mut table = plain_table();
        table.set_header(vec!["Risk Score", "Count"]);
        for (score, count) in counts {
            table.add_row(vec![right(score.to_string()), right(count.to_string())]);
        }
        self.table(&table);
    }

    fn render_pie(&mut self, shares: &BTreeMap<String, f64>) {
        let mut table = plain_table();
        table.set_header(vec!["Transaction Type", "Share"]);
        for (category, share) in shares {
            table.add_row(vec![Cell::new(category), right(format!("{:.1}%", share * 100.0))]);
        }
        self.table(&table);
    }

    fn render_scatter(&mut self, pairs: &[(f64, f64)]) {
        self.line(&format!("{} (risk score, amount) pairs", pairs.len()));
        match pearson_correlation(pairs) {
            Some(r) => self.line(&format!("Pearson correlation: {r:.4}")),
            None => self.line("Pearson correlation: n/a"),
        }
    }

    fn render_stats_table(&mut self, stats: &[ColumnSummary]) {
        let mut table = plain_table();
        let mut header = vec![String::new()];
        header.extend(stats.iter().map(|s| s.column.clone()));
        table.set_header(header);

        let formatted: Vec<_> = stats.iter().map(ColumnSummary::formatted).collect();
        for (i, label) in STAT_LABELS.iter().enumerate() {
            let mut row = vec![Cell::new(label)];
            row.extend(formatted.iter().map(|f| right(f[i].1.clone())));
            table.add_row(row);
        }
        self.table(&table);
    }

    fn render_empty_notice(&mut self) {
        self.line("No data available for the selected filters.");
    }
}
