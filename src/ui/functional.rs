use eframe::egui::{self, Ui};

use crate::state::AppState;
use crate::ui::finder::{choice_radio, date_range, option_combo};
use crate::ui::panels::no_dataset;
use crate::ui::records::record_cards;

// ---------------------------------------------------------------------------
// Functional data search page
// ---------------------------------------------------------------------------

pub fn functional_page(ui: &mut Ui, state: &mut AppState) {
    let Some(dataset) = &state.dataset else {
        no_dataset(ui);
        return;
    };
    let config = &state.config;
    let columns = &config.columns;

    ui.heading("Functional Data Search");

    let view = match state.functional.evaluate(dataset, columns) {
        Ok(view) => view,
        Err(e) => {
            ui.colored_label(egui::Color32::RED, format!("Cannot search this dataset: {e}"));
            return;
        }
    };

    let sel = &mut state.functional;
    let before = sel.clone();

    if view.has_question {
        ui.label("Select Question");
        option_combo(ui, "functional_question", &mut sel.question, &view.questions);
    }

    ui.label("Select Mediator");
    option_combo(ui, "functional_mediator", &mut sel.mediator, &view.mediators);

    if view.has_success {
        ui.label("Success");
        choice_radio(ui, &mut sel.success);
    }

    if let Some(bounds) = view.date_bounds {
        ui.label("Date Range");
        date_range(ui, "functional", &mut sel.dates, bounds);
    }

    if view.has_researcher {
        ui.label("Researcher");
        option_combo(ui, "functional_researcher", &mut sel.researcher, &view.researchers);
    }

    let rows = if *sel == before {
        view.rows
    } else {
        match sel.evaluate(dataset, columns) {
            Ok(updated) => updated.rows,
            Err(e) => {
                ui.colored_label(egui::Color32::RED, format!("Cannot search this dataset: {e}"));
                return;
            }
        }
    };

    record_cards(
        ui,
        dataset,
        &rows,
        config,
        None,
        "No functional data found. Try adjusting the filters.",
    );
}
