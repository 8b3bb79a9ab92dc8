use std::collections::BTreeMap;

use log::debug;

use crate::data::filter::{apply, FilterOptions, FilterSet, FilteredView};
use crate::data::model::{CategoryColumn, NumericColumn, TransactionTable};
use crate::stats::{self, ColumnSummary, Histogram};

// ---------------------------------------------------------------------------
// Presentation interface
// ---------------------------------------------------------------------------

/// Where filter selections come from (sidebar widgets, command-line flags).
pub trait FilterSource {
    fn get_filter_selection(&mut self, options: &FilterOptions) -> FilterSet;
}

/// Receives already-computed aggregates. Calls are one-way.
pub trait PresentationSink {
    /// Announces the section the following calls belong to.
    fn begin_section(&mut self, _title: &str) {}

    fn render_count(&mut self, n: usize);
    fn render_category_sums(&mut self, sums: &BTreeMap<String, f64>);
    fn render_histogram(&mut self, histogram: &Histogram);
    fn render_counts(&mut self, counts: &BTreeMap<i64, usize>);
    fn render_pie(&mut self, shares: &BTreeMap<String, f64>);
    fn render_scatter(&mut self, pairs: &[(f64, f64)]);
    fn render_stats_table(&mut self, stats: &[ColumnSummary]);
    fn render_empty_notice(&mut self);
}

/// A fixed selection, e.g. parsed from command-line flags.
#[derive(Debug, Clone, Default)]
pub struct FixedSelection {
    pub filters: Option<FilterSet>,
}

impl FilterSource for FixedSelection {
    fn get_filter_selection(&mut self, options: &FilterOptions) -> FilterSet {
        self.filters
            .clone()
            .unwrap_or_else(|| FilterSet::unrestricted(options))
    }
}

// ---------------------------------------------------------------------------
// Aggregates
// ---------------------------------------------------------------------------

/// Tuning for the derivers that take parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeriveSettings {
    pub histogram_bins: usize,
    pub density: bool,
}

impl Default for DeriveSettings {
    fn default() -> Self {
        DeriveSettings {
            histogram_bins: 50,
            density: true,
        }
    }
}

pub const SECTION_INDUSTRY: &str = "Total Amount by Industry";
pub const SECTION_AMOUNTS: &str = "Transaction Amount Distribution";
pub const SECTION_RISK: &str = "Money Laundering Risk Score Analysis";
pub const SECTION_TYPES: &str = "Transaction Types Distribution";
pub const SECTION_SCATTER: &str = "Scatter Plot: Amount vs. Risk Score";
pub const SECTION_SUMMARY: &str = "Summary Statistics";

/// Every aggregate the dashboard shows, each derived independently from the
/// same filtered view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Aggregates {
    pub total: usize,
    pub amount_by_industry: BTreeMap<String, f64>,
    pub amount_histogram: Option<Histogram>,
    pub risk_counts: BTreeMap<i64, usize>,
    pub type_distribution: Option<BTreeMap<String, f64>>,
    /// `(risk score, amount)` per row.
    pub risk_vs_amount: Vec<(f64, f64)>,
    pub summary: Option<Vec<ColumnSummary>>,
}

impl Aggregates {
    pub fn derive(view: &FilteredView<'_>, settings: &DeriveSettings) -> Self {
        Aggregates {
            total: stats::total_count(view),
            amount_by_industry: stats::amount_by_category(view, CategoryColumn::Industry),
            amount_histogram: stats::amount_histogram(
                view,
                settings.histogram_bins,
                settings.density,
            ),
            risk_counts: stats::risk_score_counts(view),
            type_distribution: stats::category_distribution(view, CategoryColumn::TransactionType),
            risk_vs_amount: stats::paired_samples(
                view,
                NumericColumn::RiskScore,
                NumericColumn::Amount,
            ),
            summary: stats::summary_statistics(view),
        }
    }

    /// Replay the aggregates into a sink, section by section. Sections with no
    /// data get an empty notice instead of a chart.
    pub fn present(&self, sink: &mut dyn PresentationSink) {
        sink.render_count(self.total);

        sink.begin_section(SECTION_INDUSTRY);
        if self.amount_by_industry.is_empty() {
            sink.render_empty_notice();
        } else {
            sink.render_category_sums(&self.amount_by_industry);
        }

        sink.begin_section(SECTION_AMOUNTS);
        match &self.amount_histogram {
            Some(h) => sink.render_histogram(h),
            None => sink.render_empty_notice(),
        }

        sink.begin_section(SECTION_RISK);
        if self.risk_counts.is_empty() {
            sink.render_empty_notice();
        } else {
            sink.render_counts(&self.risk_counts);
        }

        sink.begin_section(SECTION_TYPES);
        match &self.type_distribution {
            Some(shares) => sink.render_pie(shares),
            None => sink.render_empty_notice(),
        }

        sink.begin_section(SECTION_SCATTER);
        if self.risk_vs_amount.is_empty() {
            sink.render_empty_notice();
        } else {
            sink.render_scatter(&self.risk_vs_amount);
        }

        sink.begin_section(SECTION_SUMMARY);
        match &self.summary {
            Some(stats) => sink.render_stats_table(stats),
            None => sink.render_empty_notice(),
        }
    }
}

/// One full "select → filter → derive → render" cycle.
pub fn run_cycle(
    table: &TransactionTable,
    source: &mut dyn FilterSource,
    sink: &mut dyn PresentationSink,
    settings: &DeriveSettings,
) -> Aggregates {
    let options = FilterOptions::from_table(table);
    let filters = source.get_filter_selection(&options);
    let view = apply(table, &filters);
    debug!("{:?} kept {} of {} rows", filters, view.len(), table.len());

    let aggregates = Aggregates::derive(&view, settings);
    aggregates.present(sink);
    aggregates
}
