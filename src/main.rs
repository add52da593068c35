mod app;
mod color;
mod data;
mod state;
mod ui;

use app::StoreviewApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let initial_file = std::env::args().nth(1).map(std::path::PathBuf::from);

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_min_inner_size([700.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Storeview – Order Analytics",
        options,
        Box::new(|_cc| Ok(Box::new(StoreviewApp::new(initial_file)))),
    )
}
