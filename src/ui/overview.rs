use eframe::egui::{self, Layout, RichText, Ui};
use egui_extras::{Column, TableBuilder};

use dt_index_dashboard::data::aggregate::Summary;
use dt_index_dashboard::data::dashboard::Dashboard;

// ---------------------------------------------------------------------------
// Metric cards
// ---------------------------------------------------------------------------

/// "N/A" for aggregates that are undefined on an empty selection.
pub fn format_metric(value: Option<f64>, decimals: usize) -> String {
    value.map_or_else(|| "N/A".to_string(), |v| format!("{v:.decimals$}"))
}

fn metric(ui: &mut Ui, label: &str, value: &str) {
    ui.group(|ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).weak());
        ui.heading(value);
    });
}

/// Count plus mean / max / min. The score cards are hidden when nothing
/// matches; the count is always shown.
pub fn metrics(ui: &mut Ui, summary: &Summary) {
    ui.columns(4, |cols: &mut [Ui]| {
        metric(&mut cols[0], "Companies", &summary.count.to_string());
        if summary.count > 0 {
            metric(&mut cols[1], "Average index", &format_metric(summary.mean, 1));
            metric(&mut cols[2], "Highest index", &format_metric(summary.max, 1));
            metric(&mut cols[3], "Lowest index", &format_metric(summary.min, 1));
        }
    });
}

// ---------------------------------------------------------------------------
// Empty selection guidance
// ---------------------------------------------------------------------------

pub fn empty_state(ui: &mut Ui, dashboard: &Dashboard) {
    ui.separator();
    ui.heading("🔍 No matching data");
    ui.add_space(8.0);
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].strong("Try one of the following:");
        cols[0].label("• pick another year");
        cols[0].label("• choose a different industry");
        cols[0].label("• widen the index range");

        cols[1].strong("Popular industries:");
        for industry in &dashboard.suggested_industries {
            cols[1].label(format!("• {industry}"));
        }
    });
    ui.add_space(8.0);
    ui.label(RichText::new("Adjust the filters on the left to see data.").italics());
}

// ---------------------------------------------------------------------------
// Ranking table
// ---------------------------------------------------------------------------

pub fn ranking_table(ui: &mut Ui, dashboard: &Dashboard) {
    ui.heading("Company ranking");
    if dashboard.ranking.is_empty() {
        ui.label("No companies to rank.");
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .vscroll(false)
        .cell_layout(Layout::left_to_right(egui::Align::Center))
        .column(Column::auto().at_least(40.0))
        .column(Column::auto().at_least(70.0))
        .column(Column::initial(200.0).resizable(true))
        .column(Column::initial(180.0).resizable(true))
        .column(Column::auto().at_least(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for title in ["Rank", "Code", "Company", "Industry", "Index", "Word frequency"] {
                header.col(|ui: &mut Ui| {
                    ui.strong(title);
                });
            }
        })
        .body(|mut body| {
            for row in &dashboard.ranking {
                body.row(18.0, |mut cells| {
                    cells.col(|ui: &mut Ui| {
                        ui.label(row.rank.to_string());
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.monospace(row.stock_code.as_str());
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(row.company_name.as_str());
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(row.industry_name.as_str());
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(format!("{:.2}", row.index_score));
                    });
                    cells.col(|ui: &mut Ui| {
                        ui.label(format_metric(row.total_word_frequency, 0));
                    });
                });
            }
        });
}
