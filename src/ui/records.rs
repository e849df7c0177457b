use eframe::egui::{self, RichText, Ui};

use crate::config::AppConfig;
use crate::data::model::{Dataset, FieldValue};

// ---------------------------------------------------------------------------
// Result cards
// ---------------------------------------------------------------------------

/// Render the matching rows, one collapsible card each.
///
/// Hidden columns and missing values are skipped. The folder-link column (when
/// given) becomes a hyperlink, dates are written out in long form.
pub fn record_cards(
    ui: &mut Ui,
    dataset: &Dataset,
    rows: &[usize],
    config: &AppConfig,
    link_field: Option<&str>,
    empty_message: &str,
) {
    ui.separator();
    ui.heading("Matching Results");

    if rows.is_empty() {
        ui.label(RichText::new(empty_message).color(egui::Color32::from_rgb(200, 140, 0)));
        return;
    }
    ui.label(RichText::new(format!("Total Results: {}", rows.len())).strong());

    for &row in rows {
        let Some(record) = dataset.record(row) else {
            continue;
        };
        let title = match record.get(&config.columns.title) {
            FieldValue::Missing => format!("Recording {}", row + 1),
            value => value.to_string(),
        };

        egui::CollapsingHeader::new(RichText::new(title).strong())
            .id_salt(("record", row))
            .default_open(false)
            .show(ui, |ui: &mut Ui| {
                for field in dataset.schema().fields() {
                    if config.is_hidden(&field.name) {
                        continue;
                    }
                    let value = record.get(&field.name);
                    let label = field.name.trim();
                    match value {
                        FieldValue::Missing => {}
                        FieldValue::Text(url) if Some(field.name.as_str()) == link_field => {
                            ui.hyperlink_to("📂 Open Folder", url);
                        }
                        FieldValue::Date(d) => {
                            ui.label(format!("{label}: {}", d.format("%B %d, %Y")));
                        }
                        other => {
                            ui.label(format!("{label}: {other}"));
                        }
                    }
                }
            });
    }
}
