use eframe::egui::{self, Color32, RichText, Ui};

use crate::state::{AppState, Page, StatusMessage};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, page selector and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open CSV…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload").clicked() {
                state.load_configured_dataset();
                ui.close_menu();
            }
        });

        ui.separator();

        egui::ComboBox::from_id_salt("page")
            .selected_text(state.page.title())
            .show_ui(ui, |ui: &mut Ui| {
                for page in Page::ALL {
                    ui.selectable_value(&mut state.page, page, page.title());
                }
            });

        ui.separator();

        if let Some(ds) = &state.dataset {
            ui.label(format!(
                "{} recordings, {} columns",
                ds.len(),
                ds.schema().len()
            ));
        }
    });

    match &state.status_message {
        Some(StatusMessage::Error(msg)) => {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
        Some(StatusMessage::Info(msg)) => {
            ui.label(RichText::new(msg).color(Color32::from_rgb(40, 150, 60)));
        }
        None => {}
    }
}

/// Shown by the dataset pages until a CSV is loaded.
pub fn no_dataset(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open the recordings CSV to begin  (File → Open CSV…)");
    });
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open recordings")
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        state.open_dataset(&path);
    }
}

pub fn export_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export edited CSV")
        .add_filter("CSV", &["csv"])
        .set_file_name("edited_neurogram_data.csv")
        .save_file();

    if let Some(path) = file {
        state.export_dataset(&path);
    }
}
