//! Aggregate derivers: pure functions from a [`FilteredView`] to one
//! aggregate each. None of them mutates its input and none depends on the
//! output of another.
//!
//! [`FilteredView`]: crate::data::filter::FilteredView

pub mod aggregate;
pub mod histogram;
pub mod summary;

pub use aggregate::{
    amount_by_category, category_counts, category_distribution, paired_samples,
    pearson_correlation, risk_score_counts, total_count,
};
pub use histogram::{amount_histogram, Histogram};
pub use summary::{summary_statistics, ColumnSummary};
