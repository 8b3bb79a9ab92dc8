use eframe::egui::{self, ScrollArea, Ui};

use crate::config::DashboardConfig;
use crate::state::AppState;
use crate::ui::{panels, plot::EguiSink};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
    pub config: DashboardConfig,
}

impl DashboardApp {
    /// Build the app and load the configured dataset, if any.
    pub fn new(config: DashboardConfig) -> Self {
        let mut state = AppState::new(&config);
        if let Some(path) = &config.data_path {
            state.load_path(path);
        }
        Self { state, config }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(260.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state, self.config.logo_path.as_deref());
            });

        // ---- Central panel: dashboard sections ----
        egui::CentralPanel::default().show(ctx, |ui| {
            if self.state.dataset.is_none() {
                ui.centered_and_justified(|ui: &mut Ui| {
                    ui.heading("Open a transactions file to begin  (File → Open…)");
                });
                return;
            }

            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| {
                    ui.heading(egui::RichText::new(&self.config.title).size(26.0).strong());
                    self.state.aggregates.present(&mut EguiSink::new(ui));
                });
        });
    }
}
