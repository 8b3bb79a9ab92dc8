use std::collections::BTreeMap;
use std::f32::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Align2, Color32, FontId, Pos2, RichText, Sense, Stroke, Ui};
use egui_extras::{Column, TableBuilder};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::dashboard::PresentationSink;
use crate::stats::summary::STAT_LABELS;
use crate::stats::{pearson_correlation, ColumnSummary, Histogram};

const PLOT_HEIGHT: f32 = 280.0;
const BAR_COLOR: Color32 = Color32::from_rgb(76, 114, 176);
const DENSITY_COLOR: Color32 = Color32::from_rgb(221, 132, 82);

// ---------------------------------------------------------------------------
// egui presentation sink (central panel)
// ---------------------------------------------------------------------------

/// Draws the dashboard sections into the central panel.
pub struct EguiSink<'a> {
    ui: &'a mut Ui,
}

impl<'a> EguiSink<'a> {
    pub fn new(ui: &'a mut Ui) -> Self {
        Self { ui }
    }
}

/// Plot with the settings shared by every chart. Scrolling is left to the
/// surrounding scroll area.
fn base_plot(id: &str) -> Plot<'_> {
    Plot::new(id)
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_zoom(true)
}

/// Bar chart with one bar per category, labelled on the x axis.
fn category_bars(ui: &mut Ui, id: &str, values: &BTreeMap<String, f64>, y_label: &str) {
    let colors = ColorMap::new(values.keys());
    let names: Vec<String> = values.keys().cloned().collect();

    let bars: Vec<Bar> = values
        .iter()
        .enumerate()
        .map(|(i, (name, v))| {
            Bar::new(i as f64, *v)
                .width(0.7)
                .name(name)
                .fill(colors.color_for(name))
        })
        .collect();

    base_plot(id)
        .y_axis_label(y_label)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > 1e-6 || idx < 0.0 {
                return String::new();
            }
            names.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars));
        });
}

/// Pie chart drawn as triangle fans, starting at twelve o'clock and running
/// counter-clockwise, with a legend to the right.
fn pie_chart(ui: &mut Ui, shares: &BTreeMap<String, f64>) {
    let colors = ColorMap::new(shares.keys());
    ui.horizontal(|ui: &mut Ui| {
        let side = PLOT_HEIGHT.min(ui.available_width() * 0.6);
        let (response, painter) = ui.allocate_painter(egui::vec2(side, side), Sense::hover());
        let center = response.rect.center();
        let radius = side * 0.45;
        let point =
            |angle: f32, r: f32| Pos2::new(center.x + r * angle.cos(), center.y - r * angle.sin());

        let mut start = FRAC_PI_2;
        for (name, share) in shares {
            let span = *share as f32 * TAU;
            let steps = ((span / 0.05).ceil() as usize).max(1);
            let color = colors.color_for(name);
            for s in 0..steps {
                let a0 = start + span * s as f32 / steps as f32;
                let a1 = start + span * (s + 1) as f32 / steps as f32;
                painter.add(egui::Shape::convex_polygon(
                    vec![center, point(a0, radius), point(a1, radius)],
                    color,
                    Stroke::NONE,
                ));
            }
            if *share >= 0.03 {
                painter.text(
                    point(start + span / 2.0, radius * 0.65),
                    Align2::CENTER_CENTER,
                    format!("{:.1}%", share * 100.0),
                    FontId::proportional(12.0),
                    Color32::WHITE,
                );
            }
            start += span;
        }

        ui.vertical(|ui: &mut Ui| {
            for name in shares.keys() {
                ui.label(RichText::new(format!("■ {name}")).color(colors.color_for(name)));
            }
        });
    });
}

impl PresentationSink for EguiSink<'_> {
    fn begin_section(&mut self, title: &str) {
        self.ui.add_space(16.0);
        self.ui.heading(title);
    }

    fn render_count(&mut self, n: usize) {
        self.ui.heading(format!("Total Transactions: {n}"));
    }

    fn render_category_sums(&mut self, sums: &BTreeMap<String, f64>) {
        category_bars(self.ui, "industry_sums", sums, "Amount (USD)");
    }

    fn render_histogram(&mut self, histogram: &Histogram) {
        let width = histogram.bin_width();
        let bars: Vec<Bar> = histogram
            .centers()
            .zip(&histogram.counts)
            .map(|(x, &count)| Bar::new(x, count as f64).width(width))
            .collect();

        base_plot("amount_histogram")
            .legend(Legend::default())
            .x_axis_label("Amount (USD)")
            .y_axis_label("Count")
            .show(self.ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR).name("Transactions"));
                if let Some(curve) = &histogram.density {
                    plot_ui.line(
                        Line::new(PlotPoints::from(curve.clone()))
                            .color(DENSITY_COLOR)
                            .width(2.0)
                            .name("Density"),
                    );
                }
            });
    }

    fn render_counts(&mut self, counts: &BTreeMap<i64, usize>) {
        let bars: Vec<Bar> = counts
            .iter()
            .map(|(score, &n)| Bar::new(*score as f64, n as f64).width(0.7))
            .collect();

        base_plot("risk_counts")
            .x_axis_label("Risk Score")
            .y_axis_label("Count")
            .show(self.ui, |plot_ui| {
                plot_ui.bar_chart(BarChart::new(bars).color(BAR_COLOR));
            });
    }

    fn render_pie(&mut self, shares: &BTreeMap<String, f64>) {
        pie_chart(self.ui, shares);
    }

    fn render_scatter(&mut self, pairs: &[(f64, f64)]) {
        if let Some(r) = pearson_correlation(pairs) {
            self.ui.label(format!("Pearson correlation: {r:.3}"));
        }
        let points: PlotPoints = pairs.iter().map(|&(x, y)| [x, y]).collect();

        base_plot("risk_vs_amount")
            .x_axis_label("Money Laundering Risk Score")
            .y_axis_label("Amount (USD)")
            .show(self.ui, |plot_ui| {
                plot_ui.points(Points::new(points).radius(2.0).color(BAR_COLOR));
            });
    }

    fn render_stats_table(&mut self, stats: &[ColumnSummary]) {
        let formatted: Vec<_> = stats.iter().map(ColumnSummary::formatted).collect();

        TableBuilder::new(self.ui)
            .striped(true)
            .vscroll(false)
            .column(Column::auto().at_least(60.0))
            .columns(Column::auto().at_least(110.0), stats.len())
            .header(22.0, |mut header| {
                header.col(|ui| {
                    ui.strong("");
                });
                for s in stats {
                    header.col(|ui| {
                        ui.strong(&s.column);
                    });
                }
            })
            .body(|mut body| {
                for (i, label) in STAT_LABELS.iter().enumerate() {
                    body.row(20.0, |mut row| {
                        row.col(|ui| {
                            ui.label(*label);
                        });
                        for f in &formatted {
                            row.col(|ui| {
                                ui.monospace(&f[i].1);
                            });
                        }
                    });
                }
            });
    }

    fn render_empty_notice(&mut self) {
        self.ui.label("No data available for the selected filters.");
    }
}
