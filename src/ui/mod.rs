use std::path::Path;
use std::sync::Arc;

use eframe::egui;

pub mod overview;
pub mod panels;
pub mod plot;

const CJK_FONT: &str = "cjk";

/// Append a CJK-capable font as fallback for both font families so
/// company and industry names render. A missing file is logged and ignored.
pub fn install_cjk_font(ctx: &egui::Context, path: &Path) {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::warn!("Cannot read CJK font {}: {e}", path.display());
            return;
        }
    };

    let mut fonts = egui::FontDefinitions::default();
    fonts
        .font_data
        .insert(CJK_FONT.to_owned(), Arc::new(egui::FontData::from_owned(bytes)));
    for family in [egui::FontFamily::Proportional, egui::FontFamily::Monospace] {
        fonts
            .families
            .entry(family)
            .or_default()
            .push(CJK_FONT.to_owned());
    }
    ctx.set_fonts(fonts);
    log::info!("Installed CJK font from {}", path.display());
}
