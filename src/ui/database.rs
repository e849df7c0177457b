use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::state::{AppState, DatabaseDraft};
use crate::ui::panels::{export_file_dialog, no_dataset};

// ---------------------------------------------------------------------------
// Central database page: editable grid over the visible columns
// ---------------------------------------------------------------------------

pub fn database_page(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        no_dataset(ui);
        return;
    };
    let draft = state
        .draft
        .get_or_insert_with(|| DatabaseDraft::from_dataset(dataset, &state.config));

    ui.heading("Central Database");

    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Add row").clicked() {
            draft.add_row();
        }
        ui.label(format!("{} rows", draft.rows.len()));
    });

    let mut delete = None;
    egui::ScrollArea::horizontal()
        .max_height(ui.available_height() - 40.0)
        .show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .column(Column::auto())
                .columns(Column::initial(140.0).at_least(60.0).clip(true), draft.columns.len())
                .header(22.0, |mut header| {
                    header.col(|ui: &mut Ui| {
                        ui.strong("");
                    });
                    for name in &draft.columns {
                        header.col(|ui: &mut Ui| {
                            ui.strong(name.trim());
                        });
                    }
                })
                .body(|body| {
                    body.rows(24.0, draft.rows.len(), |mut row| {
                        let index = row.index();
                        row.col(|ui: &mut Ui| {
                            if ui.small_button("🗑").on_hover_text("Delete row").clicked() {
                                delete = Some(index);
                            }
                        });
                        for cell in &mut draft.rows[index].cells {
                            row.col(|ui: &mut Ui| {
                                ui.add(egui::TextEdit::singleline(cell).desired_width(f32::INFINITY));
                            });
                        }
                    });
                });
        });

    if let Some(index) = delete {
        draft.remove_row(index);
    }

    ui.separator();
    ui.horizontal(|ui: &mut Ui| {
        if ui.button("Save Changes to File").clicked() {
            state.commit_draft();
        }
        if ui.button("Download Edited CSV…").clicked() {
            export_file_dialog(state);
        }
        if ui.button("Discard Changes").clicked() {
            state.draft = None;
        }
    });
}
