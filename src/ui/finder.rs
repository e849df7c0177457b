use chrono::NaiveDate;
use eframe::egui::{self, Ui};
use egui_extras::DatePickerButton;

use crate::data::filter::Choice;
use crate::data::model::FieldValue;
use crate::state::{AppState, DateSelection, FinderSelection, FinderView};
use crate::ui::panels::no_dataset;
use crate::ui::records::record_cards;

// ---------------------------------------------------------------------------
// Neurogram finder page
// ---------------------------------------------------------------------------

pub fn finder_page(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        no_dataset(ui);
        return;
    };
    let config = &state.config;
    let columns = &config.columns;

    ui.heading("Search Criteria");

    let mut view = match state.finder.evaluate(dataset, columns) {
        Ok(view) => view,
        Err(e) => {
            ui.colored_label(egui::Color32::RED, format!("Cannot search this dataset: {e}"));
            return;
        }
    };

    if questions(ui, &mut state.finder, &view) {
        match state.finder.evaluate(dataset, columns) {
            Ok(updated) => view = updated,
            Err(e) => {
                ui.colored_label(egui::Color32::RED, format!("Cannot search this dataset: {e}"));
                return;
            }
        }
    }

    let link_field = dataset.folder_link_field(&columns.folder_link_marker).ok();
    record_cards(
        ui,
        dataset,
        &view.rows,
        config,
        link_field,
        "No recordings found. Try adjusting the filters.",
    );
}

/// Draw the five questions; returns whether any answer changed.
fn questions(ui: &mut Ui, sel: &mut FinderSelection, view: &FinderView) -> bool {
    let before = sel.clone();

    ui.label("1. Select Mediator");
    let current = sel.mediator.as_ref().map(ToString::to_string).unwrap_or_default();
    egui::ComboBox::from_id_salt("finder_mediator")
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            for m in &view.mediators {
                ui.selectable_value(&mut sel.mediator, Some(m.clone()), m.to_string());
            }
        });

    ui.label("2. Responder Status");
    choice_radio(ui, &mut sel.responder);

    ui.label("3. Administration Method");
    option_combo(ui, "finder_method", &mut sel.method, &view.methods);

    ui.label("4. GCS Folder Link");
    choice_radio(ui, &mut sel.link);

    if let Some(bounds) = view.date_bounds {
        ui.label("5. Date Range");
        date_range(ui, "finder", &mut sel.dates, bounds);
    }

    *sel != before
}

pub(crate) fn choice_radio(ui: &mut Ui, choice: &mut Choice) {
    ui.horizontal(|ui: &mut Ui| {
        for c in Choice::ALL {
            ui.radio_value(&mut *choice, c, c.label());
        }
    });
}

/// Dropdown with a leading "All" entry.
pub(crate) fn option_combo(
    ui: &mut Ui,
    id: &str,
    selected: &mut Option<FieldValue>,
    options: &[FieldValue],
) {
    let current = selected
        .as_ref()
        .map(ToString::to_string)
        .unwrap_or_else(|| "All".to_owned());
    egui::ComboBox::from_id_salt(id)
        .selected_text(current)
        .show_ui(ui, |ui: &mut Ui| {
            ui.selectable_value(&mut *selected, None, "All");
            for value in options {
                ui.selectable_value(&mut *selected, Some(value.clone()), value.to_string());
            }
        });
}

/// Start/end pickers, initialised to `bounds`.
pub(crate) fn date_range(
    ui: &mut Ui,
    id: &str,
    selection: &mut Option<DateSelection>,
    bounds: (NaiveDate, NaiveDate),
) {
    let sel = selection.get_or_insert(DateSelection {
        bounds,
        range: bounds,
    });
    ui.horizontal(|ui: &mut Ui| {
        ui.add(DatePickerButton::new(&mut sel.range.0).id_salt(&format!("{id}_start")));
        ui.label("to");
        ui.add(DatePickerButton::new(&mut sel.range.1).id_salt(&format!("{id}_end")));
    });
}
