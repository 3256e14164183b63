use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – filter widgets
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    let Some(criteria) = state.criteria.clone() else {
        if state.loaded_without_rows() {
            ui.label("No usable rows in the loaded file.");
        } else {
            ui.label("No dataset loaded.");
        }
        return;
    };

    // ---- Year ----
    ui.strong("Year");
    let mut year = criteria.year;
    egui::ComboBox::from_id_salt("year")
        .selected_text(year.to_string())
        .show_ui(ui, |ui: &mut Ui| {
            for y in &state.years {
                ui.selectable_value(&mut year, *y, y.to_string());
            }
        });
    state.set_year(year);
    ui.add_space(6.0);

    // ---- Industry ----
    ui.strong("Industry");
    let current = state.industry_label().to_string();
    let mut picked = current.clone();
    let all_label = state.config.sentinels.all_industries.clone();
    egui::ComboBox::from_id_salt("industry")
        .selected_text(current.as_str())
        .width(ui.available_width())
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut picked, all_label.clone(), all_label.as_str());
            for industry in &state.industries {
                ui.selectable_value(&mut picked, industry.clone(), industry.as_str());
            }
        });
    if picked != current {
        state.set_industry(&picked);
    }
    ui.add_space(6.0);

    // ---- Index range ----
    ui.strong("Index range");
    let (min, max) = state.score_bounds;
    let mut low = criteria.index_range.low;
    let mut high = criteria.index_range.high;
    ui.add(egui::Slider::new(&mut low, min..=max).step_by(1.0).text("from"));
    ui.add(egui::Slider::new(&mut high, min..=max).step_by(1.0).text("to"));
    if low > high {
        // keep the thumbs from crossing: the one being dragged pushes the other
        if low != criteria.index_range.low {
            high = low;
        } else {
            low = high;
        }
    }
    state.set_range(low, high);
    ui.add_space(6.0);

    // ---- Search ----
    ui.strong("Company or stock code");
    let mut search = criteria.search.clone();
    ui.add(egui::TextEdit::singleline(&mut search).hint_text("e.g. 600519"));
    state.set_search(&search);
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
            let can_export = !state.dashboard.ranking.is_empty();
            if ui
                .add_enabled(can_export, egui::Button::new("Export ranking…"))
                .clicked()
            {
                export_file_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(table) = &state.table {
            ui.label(format!(
                "{} records loaded, {} matching",
                table.len(),
                state.dashboard.summary.count
            ));
        }
        if let Some(source) = &state.source {
            ui.separator();
            ui.label(RichText::new(source.display().to_string()).weak());
        }

        if let Some(msg) = &state.status_message {
            ui.separator();
            ui.label(msg.as_str());
        }
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open index table")
        .add_filter("Supported files", &["xlsx", "xlsm", "xls", "xlsb", "ods", "csv", "json", "parquet", "pq"])
        .add_filter("Spreadsheet", &["xlsx", "xlsm", "xls", "xlsb", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export ranking")
        .set_file_name("ranking.csv")
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        if let Err(e) = state.export_ranking(&path) {
            log::error!("Failed to export ranking: {e:#}");
            state.status_message = Some(format!("Export failed: {e:#}"));
        }
    }
}

/// Full-window message shown instead of the dashboard after a load failure.
pub fn load_error(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.label(
            RichText::new(format!("{message}\nMake sure the data file exists and is well-formed."))
                .color(Color32::RED)
                .heading(),
        );
    });
}
