use eframe::egui;

use neurogram_explorer::app::NeurogramApp;
use neurogram_explorer::config::AppConfig;
use neurogram_explorer::state::AppState;

fn main() -> eframe::Result {
    env_logger::init();

    let mut state = AppState::new(AppConfig::discover());
    state.load_configured_dataset();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Neurogram Explorer",
        options,
        Box::new(|_cc| Ok(Box::new(NeurogramApp::new(state)))),
    )
}
