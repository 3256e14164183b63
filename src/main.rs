mod app;
mod color;
mod state;
mod ui;

use app::DashboardApp;
use dt_index_dashboard::config::DashboardConfig;
use eframe::egui;
use state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let config = match DashboardConfig::load() {
        Ok(config) => config,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            std::process::exit(2);
        }
    };

    let mut state = AppState::new(config.clone());
    state.open(&config.data_path);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 900.0])
            .with_min_inner_size([720.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Digital Transformation Index Explorer",
        options,
        Box::new(move |cc| {
            if let Some(font) = &config.cjk_font {
                ui::install_cjk_font(&cc.egui_ctx, font);
            }
            Ok(Box::new(DashboardApp::new(state)))
        }),
    )
}
