use std::f64::consts::{FRAC_PI_2, TAU};

use eframe::egui::{self, Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoint, PlotPoints, Points, Text};

use crate::color::{ScoreGradient, accent, blues};
use dt_index_dashboard::data::dashboard::Dashboard;

const CHART_HEIGHT: f32 = 280.0;

// ---------------------------------------------------------------------------
// Distribution histogram
// ---------------------------------------------------------------------------

pub fn histogram(ui: &mut Ui, dashboard: &Dashboard, year: i32) {
    ui.heading("Index distribution");
    if dashboard.histogram.is_empty() {
        ui.label("No data to draw a histogram.");
        return;
    }

    let bars: Vec<Bar> = dashboard
        .histogram
        .iter()
        .map(|bin| {
            Bar::new(bin.center(), bin.count as f64)
                .width(bin.width())
                .name(format!("{:.1} – {:.1}", bin.start, bin.end))
        })
        .collect();
    let chart = BarChart::new(bars).color(blues(0.5)).name(format!("{year}"));

    Plot::new("histogram")
        .height(CHART_HEIGHT)
        .legend(Legend::default())
        .x_axis_label("Digital transformation index")
        .y_axis_label("Companies")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(chart);
            if !dashboard.density.is_empty() {
                plot_ui.line(
                    Line::new(PlotPoints::from(dashboard.density.clone()))
                        .color(blues(0.9))
                        .width(2.0)
                        .name("density"),
                );
            }
        });
}

// ---------------------------------------------------------------------------
// Technology radar
// ---------------------------------------------------------------------------

/// Closed polygon of the dimension averages on a polar grid, first axis up.
pub fn radar(ui: &mut Ui, dashboard: &Dashboard, title: &str) {
    ui.heading("Technology dimensions");
    let values: Vec<(String, f64)> = dashboard
        .technology_profile
        .iter()
        .filter_map(|d| d.average.map(|avg| (d.dimension.label().to_string(), avg)))
        .collect();
    if values.is_empty() {
        return;
    }
    ui.label(title);

    let n = values.len() as f64;
    let radius = values
        .iter()
        .map(|(_, v)| *v)
        .fold(0.0_f64, f64::max)
        .max(f64::EPSILON);
    let angle = |i: usize| FRAC_PI_2 - TAU * i as f64 / n;
    let at = |i: usize, r: f64| [r * angle(i).cos(), r * angle(i).sin()];

    Plot::new("radar")
        .height(CHART_HEIGHT + 60.0)
        .data_aspect(1.0)
        .show_axes(false)
        .show_grid(false)
        .allow_drag(false)
        .allow_zoom(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            // rings at quarter steps of the largest average
            for step in 1..=4 {
                let r = radius * step as f64 / 4.0;
                let ring: PlotPoints = (0..=values.len()).map(|i| at(i % values.len(), r)).collect();
                plot_ui.line(Line::new(ring).color(Color32::from_gray(90)).width(0.5));
            }
            for (i, (label, _)) in values.iter().enumerate() {
                let spoke: PlotPoints = vec![[0.0, 0.0], at(i, radius)].into();
                plot_ui.line(Line::new(spoke).color(Color32::from_gray(90)).width(0.5));
                let [x, y] = at(i, radius * 1.18);
                plot_ui.text(Text::new(PlotPoint::new(x, y), label.as_str()));
            }

            let outline: PlotPoints = (0..=values.len())
                .map(|i| {
                    let i = i % values.len();
                    at(i, values[i].1)
                })
                .collect();
            plot_ui.line(Line::new(outline).color(accent()).width(2.0).name("average frequency"));

            let markers: PlotPoints = values.iter().enumerate().map(|(i, (_, v))| at(i, *v)).collect();
            plot_ui.points(Points::new(markers).color(accent()).radius(3.0));
        });
}

// ---------------------------------------------------------------------------
// Industry comparison
// ---------------------------------------------------------------------------

pub fn industry_bars(ui: &mut Ui, dashboard: &Dashboard, year: i32) {
    ui.heading(format!("Top industries by average index, {year}"));
    if dashboard.industry_ranking.is_empty() {
        ui.label("No industries recorded for this year.");
        return;
    }

    let gradient = ScoreGradient::from_values(dashboard.industry_ranking.iter().map(|i| i.average));
    let bars: Vec<Bar> = dashboard
        .industry_ranking
        .iter()
        .enumerate()
        .map(|(i, industry)| {
            Bar::new((i + 1) as f64, industry.average)
                .width(0.7)
                .fill(gradient.color_for(industry.average))
                .name(format!("{}. {}", i + 1, industry.industry))
        })
        .collect();

    Plot::new("industry_bars")
        .height(CHART_HEIGHT)
        .x_axis_label("Rank")
        .y_axis_label("Average index")
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(BarChart::new(bars)));

    egui::Grid::new("industry_legend")
        .num_columns(3)
        .striped(true)
        .show(ui, |ui: &mut Ui| {
            for (i, industry) in dashboard.industry_ranking.iter().enumerate() {
                ui.label(format!("{}", i + 1));
                ui.label(industry.industry.as_str());
                ui.label(format!("{:.2}  ({} firms)", industry.average, industry.count));
                ui.end_row();
            }
        });
}

// ---------------------------------------------------------------------------
// Company trend
// ---------------------------------------------------------------------------

/// Drawn only while the search box is in use.
pub fn trend(ui: &mut Ui, dashboard: &Dashboard, search: &str) {
    ui.heading("Index trend");
    if search.is_empty() {
        ui.label("Search for a company to see its trend over the years.");
        return;
    }
    let Some(trend) = &dashboard.trend else {
        ui.label("No matching company found.");
        return;
    };

    ui.label(format!("{} ({})", trend.company_name, trend.stock_code));
    let series: Vec<[f64; 2]> = trend
        .points
        .iter()
        .map(|p| [p.year as f64, p.index_score])
        .collect();

    Plot::new("trend")
        .height(CHART_HEIGHT)
        .x_axis_label("Year")
        .y_axis_label("Digital transformation index")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(PlotPoints::from(series.clone()))
                    .color(accent())
                    .width(2.0)
                    .name(trend.company_name.as_str()),
            );
            plot_ui.points(Points::new(PlotPoints::from(series)).color(accent()).radius(4.0));
        });
}
