use eframe::egui::{self, ScrollArea, Ui};

use crate::state::AppState;
use crate::ui::{overview, panels, plot};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct DashboardApp {
    pub state: AppState,
}

impl DashboardApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for DashboardApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // A failed load replaces the whole dashboard with one message.
        if let Some(message) = self.state.load_error.clone() {
            egui::CentralPanel::default().show(ctx, |ui| {
                panels::load_error(ui, &message);
            });
            return;
        }

        // ---- Left side panel: filters ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: metrics, charts, tables ----
        egui::CentralPanel::default().show(ctx, |ui| {
            ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui: &mut Ui| central_panel(ui, &self.state));
        });
    }
}

fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(criteria) = &state.criteria else {
        ui.centered_and_justified(|ui: &mut Ui| {
            if state.loaded_without_rows() {
                ui.heading("The loaded file contains no usable rows  (File → Open… another)");
            } else {
                ui.heading("Open a data file to begin  (File → Open…)");
            }
        });
        return;
    };
    let dashboard = &state.dashboard;

    ui.heading("Digital Transformation Index Explorer");
    ui.separator();

    overview::metrics(ui, &dashboard.summary);
    if dashboard.is_empty() {
        overview::empty_state(ui, dashboard);
    }
    ui.separator();

    plot::histogram(ui, dashboard, criteria.year);
    ui.separator();

    let scope = match state.industry_label() {
        label if label == state.config.sentinels.all_industries => String::new(),
        label => format!(" · {label}"),
    };
    plot::radar(ui, dashboard, &format!("Average per dimension, {}{scope}", criteria.year));
    ui.separator();

    overview::ranking_table(ui, dashboard);
    ui.separator();

    plot::industry_bars(ui, dashboard, criteria.year);
    ui.separator();

    plot::trend(ui, dashboard, &criteria.search);
}
