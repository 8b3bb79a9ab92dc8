use std::path::Path;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::dashboard::FilterSource;
use crate::data::filter::{Choice, FilterOptions, FilterSet};
use crate::state::{AppState, SelectionDraft};

// ---------------------------------------------------------------------------
// Sidebar filters
// ---------------------------------------------------------------------------

/// Sidebar widgets acting as the dashboard's filter source for one frame.
pub struct SidebarFilters<'a> {
    ui: &'a mut Ui,
    draft: &'a mut SelectionDraft,
}

impl<'a> SidebarFilters<'a> {
    pub fn new(ui: &'a mut Ui, draft: &'a mut SelectionDraft) -> Self {
        Self { ui, draft }
    }
}

impl FilterSource for SidebarFilters<'_> {
    fn get_filter_selection(&mut self, options: &FilterOptions) -> FilterSet {
        let ui = &mut *self.ui;
        let draft = &mut *self.draft;

        // ---- Country ----
        ui.strong("Select Country");
        egui::ComboBox::from_id_salt("country")
            .selected_text(draft.country.to_string())
            .width(ui.available_width())
            .show_ui(ui, |ui: &mut Ui| {
                ui.selectable_value(&mut draft.country, Choice::All, "All");
                for country in &options.countries {
                    ui.selectable_value(&mut draft.country, Choice::Only(country.clone()), country);
                }
            });
        ui.add_space(8.0);

        // ---- Transaction types ----
        ui.strong("Select Transaction Types");
        let choices = std::iter::once(Choice::All)
            .chain(options.transaction_types.iter().cloned().map(Choice::Only));
        for choice in choices {
            let mut checked = draft.transaction_types.contains(&choice);
            if ui.checkbox(&mut checked, choice.to_string()).changed() {
                if checked {
                    draft.transaction_types.insert(choice);
                } else {
                    draft.transaction_types.remove(&choice);
                }
            }
        }
        if draft.transaction_types.is_empty() {
            ui.label(RichText::new("Nothing selected: showing all types").weak());
        }
        ui.add_space(8.0);

        // ---- Amount range ----
        ui.strong("Select Amount Range");
        if let Some(bounds) = options.amount_bounds {
            ui.add(egui::Slider::new(&mut draft.amount.lo, bounds.lo..=bounds.hi).text("min"));
            ui.add(egui::Slider::new(&mut draft.amount.hi, bounds.lo..=bounds.hi).text("max"));
            if draft.amount.lo > draft.amount.hi {
                draft.amount.hi = draft.amount.lo;
            }
        }
        ui.add_space(8.0);

        if ui.button("Reset filters").clicked() {
            *draft = SelectionDraft::unrestricted(options);
        }

        draft.to_filter_set()
    }
}

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState, logo: Option<&Path>) {
    // ---- Logo (centered) ----
    if let Some(path) = logo {
        let uri = format!("file://{}", path.display());
        ui.vertical_centered(|ui: &mut Ui| {
            ui.add(
                egui::Image::new(uri)
                    .max_width(ui.available_width() * 0.9)
                    .max_height(140.0),
            );
        });
        ui.add_space(4.0);
    }

    ui.heading("Filter Options");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    let filters = ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            SidebarFilters::new(ui, &mut state.draft).get_filter_selection(&state.options)
        })
        .inner;

    state.update_filters(filters);
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} transactions loaded, {} visible",
                ds.len(),
                state.visible_indices.len()
            ));
            if ds.dropped_rows > 0 {
                ui.separator();
                ui.label(format!("{} incomplete rows skipped", ds.dropped_rows));
            }
            if let Some((first, last)) = ds.date_span() {
                ui.separator();
                ui.label(format!("{first} – {last}"));
            }
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open transactions")
        .add_filter("Supported files", &["csv", "tsv", "json", "parquet", "pq"])
        .add_filter("CSV", &["csv", "tsv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}
