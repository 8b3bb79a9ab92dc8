use crate::data::filter::FilteredView;

/// Points on the density curve.
const DENSITY_SAMPLES: usize = 200;

/// Equal-width histogram of transaction amounts.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` ascending bin edges.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
    /// Gaussian kernel density estimate as `[x, y]` points, scaled to
    /// counts so it overlays the bars.
    pub density: Option<Vec<[f64; 2]>>,
}

impl Histogram {
    /// Bin equal-width over `[min, max]` of `values`. `None` for no values or
    /// no bins.
    ///
    /// Bin `i` covers `[edges[i], edges[i + 1])`, except the last which also
    /// includes its right edge. When every value is equal the range is
    /// widened by 0.5 on each side so the bins keep a non-zero width.
    pub fn from_values(values: &[f64], bin_count: usize) -> Option<Self> {
        if values.is_empty() || bin_count == 0 {
            return None;
        }
        let (mut lo, mut hi) = min_max(values);
        if lo == hi {
            lo -= 0.5;
            hi += 0.5;
        }

        let width = (hi - lo) / bin_count as f64;
        let edges: Vec<f64> = (0..=bin_count).map(|i| lo + i as f64 * width).collect();

        let mut counts = vec![0; bin_count];
        for &v in values {
            counts[bin_index(&edges, v)] += 1;
        }

        Some(Histogram {
            edges,
            counts,
            density: None,
        })
    }

    pub fn bin_count(&self) -> usize {
        self.counts.len()
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.last()) {
            (Some(lo), Some(hi)) if !self.counts.is_empty() => (hi - lo) / self.counts.len() as f64,
            _ => 0.0,
        }
    }

    /// Centre of every bin, for bar placement.
    pub fn centers(&self) -> impl Iterator<Item = f64> + '_ {
        self.edges.windows(2).map(|w| (w[0] + w[1]) / 2.0)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }
}

/// Histogram of the view's amounts, optionally with a density curve.
pub fn amount_histogram(
    view: &FilteredView<'_>,
    bin_count: usize,
    with_density: bool,
) -> Option<Histogram> {
    let amounts: Vec<f64> = view.amounts().collect();
    let mut histogram = Histogram::from_values(&amounts, bin_count)?;
    if with_density {
        let scale = amounts.len() as f64 * histogram.bin_width();
        histogram.density = density_curve(&amounts, scale);
    }
    Some(histogram)
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)))
}

/// Index of the bin holding `v`. Values at the top edge go to the last bin.
fn bin_index(edges: &[f64], v: f64) -> usize {
    let n = edges.len() - 1;
    let (lo, hi) = (edges[0], edges[n]);
    let mut idx = (((v - lo) / (hi - lo)) * n as f64).floor().max(0.0) as usize;
    idx = idx.min(n - 1);
    // Rounding in the division can land one bin off; settle against the edges.
    if idx > 0 && v < edges[idx] {
        idx -= 1;
    } else if idx + 1 < n && v >= edges[idx + 1] {
        idx += 1;
    }
    idx
}

/// Gaussian KDE with Scott's rule bandwidth, evaluated on an even grid over
/// `[min, max]` and multiplied by `scale`. `None` with fewer than two samples
/// or zero spread.
fn density_curve(values: &[f64], scale: f64) -> Option<Vec<[f64; 2]>> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    let std = var.sqrt();
    if std == 0.0 || !std.is_finite() {
        return None;
    }

    let bandwidth = std * n.powf(-0.2);
    let norm = 1.0 / (n * bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let (lo, hi) = min_max(values);
    let step = (hi - lo) / (DENSITY_SAMPLES - 1) as f64;

    let curve = (0..DENSITY_SAMPLES)
        .map(|i| {
            let x = lo + i as f64 * step;
            let sum: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            [x, sum * norm * scale]
        })
        .collect();
    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::{apply, AmountRange, Choice, FilterSet, FilteredView};
    use crate::data::model::tests::{tx, two_row_table};
    use crate::data::model::TransactionTable;

    #[test]
    fn edges_span_min_to_max() {
        let h = Histogram::from_values(&[0.0, 10.0, 4.0], 5).unwrap();
        assert_eq!(h.edges, vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        assert_eq!(h.counts, vec![1, 0, 1, 0, 1]);
        assert_eq!(h.bin_width(), 2.0);
        assert_eq!(h.centers().collect::<Vec<_>>(), vec![1.0, 3.0, 5.0, 7.0, 9.0]);
    }

    #[test]
    fn max_value_lands_in_last_bin() {
        let h = Histogram::from_values(&[1.0, 2.0, 3.0], 2).unwrap();
        assert_eq!(h.bin_count(), 2);
        assert_eq!(h.counts, vec![1, 2]);
    }

    #[test]
    fn counts_sum_to_row_count() {
        let values: Vec<f64> = (0..1000)
            .map(|i| (i as f64 * 0.731).sin() * 1e6 + 3.3)
            .collect();
        for bins in [1, 7, 50, 333] {
            let h = Histogram::from_values(&values, bins).unwrap();
            assert_eq!(h.total(), values.len());
            assert_eq!(h.edges.len(), bins + 1);
        }
    }

    #[test]
    fn constant_values_fill_one_bin() {
        let h = Histogram::from_values(&[5.0, 5.0, 5.0], 4).unwrap();
        assert_eq!(h.total(), 3);
        assert_eq!(h.edges.first(), Some(&4.5));
        assert_eq!(h.edges.last(), Some(&5.5));
        assert_eq!(h.counts.iter().filter(|&&c| c > 0).count(), 1);
    }

    #[test]
    fn no_data_or_no_bins_is_none() {
        assert!(Histogram::from_values(&[], 10).is_none());
        assert!(Histogram::from_values(&[1.0], 0).is_none());

        let table = two_row_table();
        let filters = FilterSet::new(Choice::Only("Mars".into()), [], AmountRange::unbounded());
        assert!(amount_histogram(&apply(&table, &filters), 50, true).is_none());
    }

    #[test]
    fn density_overlays_counts() {
        let table = TransactionTable::new(
            (0..200)
                .map(|i| tx(&i.to_string(), "US", "Wire", ((i * 37) % 101) as f64, 1))
                .collect(),
            Vec::new(),
            0,
        );
        let h = amount_histogram(&FilteredView::all(&table), 10, true).unwrap();
        let curve = h.density.as_ref().unwrap();
        assert_eq!(curve.len(), DENSITY_SAMPLES);
        assert_eq!(curve[0][0], 0.0);
        assert!((curve[DENSITY_SAMPLES - 1][0] - 100.0).abs() < 1e-9);
        assert!(curve.iter().all(|p| p[1] > 0.0));

        // Area under the scaled curve is close to rows × bin width.
        let step = curve[1][0] - curve[0][0];
        let area: f64 = curve.windows(2).map(|w| (w[0][1] + w[1][1]) / 2.0 * step).sum();
        let expected = 200.0 * h.bin_width();
        assert!(area > 0.8 * expected && area < 1.0 * expected + 1e-9);
    }

    #[test]
    fn density_needs_spread() {
        let table = two_row_table();
        let us = FilterSet::new(Choice::Only("US".into()), [], AmountRange::unbounded());
        let h = amount_histogram(&apply(&table, &us), 50, true).unwrap();
        assert_eq!(h.total(), 1);
        assert!(h.density.is_none());
    }
}
