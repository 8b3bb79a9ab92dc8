use std::collections::BTreeMap;

use crate::data::filter::FilteredView;
use crate::data::model::{CategoryColumn, NumericColumn};

/// Number of rows in the view.
pub fn total_count(view: &FilteredView<'_>) -> usize {
    view.len()
}

/// Sum of amounts per category value.
pub fn amount_by_category(
    view: &FilteredView<'_>,
    column: CategoryColumn,
) -> BTreeMap<String, f64> {
    let mut sums: BTreeMap<String, f64> = BTreeMap::new();
    for tx in view.iter() {
        *sums.entry(column.value(tx).to_string()).or_default() += tx.amount;
    }
    sums
}

/// Number of rows per distinct risk score.
pub fn risk_score_counts(view: &FilteredView<'_>) -> BTreeMap<i64, usize> {
    let mut counts = BTreeMap::new();
    for tx in view.iter() {
        *counts.entry(tx.risk_score).or_default() += 1;
    }
    counts
}

/// Number of rows per category value.
pub fn category_counts(view: &FilteredView<'_>, column: CategoryColumn) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for tx in view.iter() {
        *counts.entry(column.value(tx).to_string()).or_default() += 1;
    }
    counts
}

/// Share of rows per category value; the shares sum to 1.
/// `None` when the view is empty.
pub fn category_distribution(
    view: &FilteredView<'_>,
    column: CategoryColumn,
) -> Option<BTreeMap<String, f64>> {
    if view.is_empty() {
        return None;
    }
    let total = view.len() as f64;
    Some(
        category_counts(view, column)
            .into_iter()
            .map(|(k, n)| (k, n as f64 / total))
            .collect(),
    )
}

/// One `(a, b)` pair per row, in view order.
pub fn paired_samples(
    view: &FilteredView<'_>,
    a: NumericColumn,
    b: NumericColumn,
) -> Vec<(f64, f64)> {
    view.iter().map(|tx| (a.value(tx), b.value(tx))).collect()
}

/// Pearson correlation coefficient of paired samples.
/// `None` with fewer than two pairs or when either side is constant.
pub fn pearson_correlation(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }
    let n = pairs.len() as f64;
    let mean_a = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_b = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut cov, mut var_a, mut var_b) = (0.0, 0.0, 0.0);
    for &(a, b) in pairs {
        let da = a - mean_a;
        let db = b - mean_b;
        cov += da * db;
        var_a += da * da;
        var_b += db * db;
    }
    if var_a == 0.0 || var_b == 0.0 {
        return None;
    }
    Some(cov / (var_a.sqrt() * var_b.sqrt()))
}
