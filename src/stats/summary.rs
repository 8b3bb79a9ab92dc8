use crate::data::filter::FilteredView;
use crate::data::model::NumericColumn;

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` for a single value.
    pub std: Option<f64>,
    pub min: f64,
    pub q25: f64,
    pub median: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnSummary {
    /// Summarise `values`, or `None` when there are none.
    pub fn from_values(column: &str, mut values: Vec<f64>) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        values.sort_by(f64::total_cmp);

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let std = (values.len() > 1).then(|| {
            let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1.0)).sqrt()
        });

        Some(ColumnSummary {
            column: column.to_string(),
            count: values.len(),
            mean,
            std,
            min: values[0],
            q25: quantile(&values, 0.25),
            median: quantile(&values, 0.5),
            q75: quantile(&values, 0.75),
            max: values[values.len() - 1],
        })
    }

    /// `(label, value)` rows in the usual describe layout.
    pub fn formatted(&self) -> [(&'static str, String); 8] {
        let f = |v: f64| format!("{v:.4}");
        [
            ("count", self.count.to_string()),
            ("mean", f(self.mean)),
            ("std", self.std.map_or_else(|| "NaN".to_string(), f)),
            ("min", f(self.min)),
            ("25%", f(self.q25)),
            ("50%", f(self.median)),
            ("75%", f(self.q75)),
            ("max", f(self.max)),
        ]
    }
}

/// Row labels of [`ColumnSummary::formatted`].
pub const STAT_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// Quantile of sorted, non-empty data with linear interpolation between the
/// two nearest order statistics.
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q.clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let below = pos.floor() as usize;
    let above = pos.ceil() as usize;
    let frac = pos - below as f64;
    sorted[below] + (sorted[above] - sorted[below]) * frac
}

/// Statistics for every numeric column of the view: amount, risk score,
/// then each extra column whose non-empty values all parse as numbers.
/// `None` when the view is empty.
pub fn summary_statistics(view: &FilteredView<'_>) -> Option<Vec<ColumnSummary>> {
    if view.is_empty() {
        return None;
    }

    let mut summaries: Vec<ColumnSummary> = [NumericColumn::Amount, NumericColumn::RiskScore]
        .iter()
        .filter_map(|col| {
            let values = view.iter().map(|tx| col.value(tx)).collect();
            ColumnSummary::from_values(col.header(), values)
        })
        .collect();

    for column in extra_columns(view) {
        if let Some(values) = numeric_extra(view, &column) {
            summaries.extend(ColumnSummary::from_values(&column, values));
        }
    }

    Some(summaries)
}

/// Extra column names present in the view, in first-seen order.
fn extra_columns(view: &FilteredView<'_>) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for tx in view.iter() {
        for key in tx.extra.keys() {
            if !names.contains(key) {
                names.push(key.clone());
            }
        }
    }
    names
}

fn numeric_extra(view: &FilteredView<'_>, column: &str) -> Option<Vec<f64>> {
    let mut values = Vec::new();
    for tx in view.iter() {
        if let Some(raw) = tx.extra.get(column) {
            let v = raw.parse::<f64>().ok().filter(|v| v.is_finite())?;
            values.push(v);
        }
    }
    Some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, AmountRange, Choice, FilterSet, FilteredView};
    use crate::data::model::tests::{tx, two_row_table};
    use crate::data::model::TransactionTable;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn quartiles_interpolate_linearly() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert!(close(quantile(&sorted, 0.25), 1.75));
        assert!(close(quantile(&sorted, 0.5), 2.5));
        assert!(close(quantile(&sorted, 0.75), 3.25));
        assert!(close(quantile(&sorted, 0.0), 1.0));
        assert!(close(quantile(&sorted, 1.0), 4.0));
        assert!(close(quantile(&[7.0], 0.25), 7.0));
    }

    #[test]
    fn describes_amount_and_risk() {
        let table = TransactionTable::new(
            vec![
                tx("1", "US", "Wire", 4.0, 1),
                tx("2", "US", "Wire", 1.0, 3),
                tx("3", "US", "Wire", 3.0, 5),
                tx("4", "US", "Wire", 2.0, 7),
            ],
            Vec::new(),
            0,
        );
        let stats = summary_statistics(&FilteredView::all(&table)).unwrap();
        assert_eq!(stats.len(), 2);

        let amount = &stats[0];
        assert_eq!(amount.column, "Amount (USD)");
        assert_eq!(amount.count, 4);
        assert!(close(amount.mean, 2.5));
        assert!(close(amount.std.unwrap(), (5.0f64 / 3.0).sqrt()));
        assert_eq!((amount.min, amount.max), (1.0, 4.0));
        assert!(close(amount.q25, 1.75));
        assert!(close(amount.median, 2.5));
        assert!(close(amount.q75, 3.25));

        let risk = &stats[1];
        assert_eq!(risk.column, "Money Laundering Risk Score");
        assert!(close(risk.mean, 4.0));
        assert!(close(risk.median, 4.0));
    }

    #[test]
    fn single_row_has_no_std() {
        let table = two_row_table();
        let us = FilterSet::new(Choice::Only("US".into()), [], AmountRange::unbounded());
        let stats = summary_statistics(&apply(&table, &us)).unwrap();
        assert_eq!(stats[0].count, 1);
        assert!(stats[0].std.is_none());
        assert_eq!(stats[0].median, 100.0);
    }

    #[test]
    fn numeric_extras_are_described() {
        let mut a = tx("1", "US", "Wire", 1.0, 1);
        let mut b = tx("2", "US", "Wire", 2.0, 1);
        a.extra.insert("Shell Companies Involved".into(), "2".into());
        b.extra.insert("Shell Companies Involved".into(), "4".into());
        a.extra.insert("Reported by Authority".into(), "True".into());
        b.extra.insert("Reported by Authority".into(), "False".into());
        let table = TransactionTable::new(vec![a, b], Vec::new(), 0);

        let stats = summary_statistics(&FilteredView::all(&table)).unwrap();
        let columns: Vec<&str> = stats.iter().map(|s| s.column.as_str()).collect();
        assert_eq!(
            columns,
            vec!["Amount (USD)", "Money Laundering Risk Score", "Shell Companies Involved"]
        );
        assert!(close(stats[2].mean, 3.0));
    }

    #[test]
    fn formatted_rows_match_labels() {
        let summary = ColumnSummary::from_values("x", vec![2.0]).unwrap();
        let rows = summary.formatted();
        let labels: Vec<&str> = rows.iter().map(|(l, _)| *l).collect();
        assert_eq!(labels, STAT_LABELS.to_vec());
        assert_eq!(rows[0].1, "1");
        assert_eq!(rows[2].1, "NaN");
        assert_eq!(rows[7].1, "2.0000");
    }

    #[test]
    fn empty_view_reports_no_data() {
        let table = two_row_table();
        let none = FilterSet::new(Choice::All, [], AmountRange::new(1e9, 2e9));
        assert!(summary_statistics(&apply(&table, &none)).is_none());
    }
}
