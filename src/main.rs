mod app;
mod data;
mod state;
mod ui;

use std::path::PathBuf;

use app::PriceDeskApp;
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 860.0])
            .with_min_inner_size([640.0, 480.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Price Desk – Material Price Dashboard",
        options,
        Box::new(|_cc| {
            let mut app = PriceDeskApp::default();
            // Open a price list passed on the command line, if any.
            if let Some(path) = std::env::args().nth(1) {
                app.state.open_file(PathBuf::from(path));
            }
            Ok(Box::new(app))
        }),
    )
}
