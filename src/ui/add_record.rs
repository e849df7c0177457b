use chrono::Local;
use eframe::egui::{self, Ui};
use egui_extras::DatePickerButton;

use crate::data::model::FieldType;
use crate::state::AppState;
use crate::ui::panels::no_dataset;

// ---------------------------------------------------------------------------
// Add-recording page: one input per visible column, typed by the schema
// ---------------------------------------------------------------------------

pub fn add_record_page(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        no_dataset(ui);
        return;
    };
    let today = Local::now().date_naive();

    ui.heading("Add New Recording");

    let form = &mut state.add_form;
    egui::Grid::new("add_record_form")
        .num_columns(2)
        .spacing([12.0, 6.0])
        .show(ui, |ui: &mut Ui| {
            for field in dataset.schema().fields() {
                if state.config.is_hidden(&field.name) {
                    continue;
                }
                ui.label(field.name.trim());
                match field.ty {
                    FieldType::Date => {
                        let date = form.dates.entry(field.name.clone()).or_insert(today);
                        ui.add(DatePickerButton::new(date).id_salt(&field.name));
                    }
                    FieldType::Number => {
                        let text = form.text.entry(field.name.clone()).or_default();
                        ui.add(egui::TextEdit::singleline(text).hint_text("0.00000"));
                    }
                    FieldType::Text => {
                        let text = form.text.entry(field.name.clone()).or_default();
                        ui.text_edit_singleline(text);
                    }
                }
                ui.end_row();
            }
        });

    ui.add_space(8.0);
    if ui.button("Add Recording").clicked() {
        state.add_record(today);
    }
}
