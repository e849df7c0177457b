use eframe::egui::{Color32, Ui};
use egui_plot::{Line, Plot, PlotPoints};

use crate::audio::Waveform;

/// Above this many samples the preview plots every n-th sample.
const MAX_PLOT_POINTS: usize = 8_000;

// ---------------------------------------------------------------------------
// Waveform preview
// ---------------------------------------------------------------------------

/// Plot the uploaded and processed waveforms against time in seconds.
pub fn waveform_plot(ui: &mut Ui, id: &str, input: Option<&Waveform>, output: Option<&Waveform>) {
    if input.is_none() && output.is_none() {
        return;
    }

    Plot::new(id)
        .height(220.0)
        .legend(egui_plot::Legend::default())
        .x_axis_label("Time (s)")
        .y_axis_label("Amplitude")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            if let Some(w) = input {
                plot_ui.line(
                    Line::new(points(w))
                        .name("uploaded")
                        .color(Color32::GRAY)
                        .width(1.0),
                );
            }
            if let Some(w) = output {
                plot_ui.line(
                    Line::new(points(w))
                        .name("processed")
                        .color(Color32::LIGHT_BLUE)
                        .width(1.0),
                );
            }
        });
}

fn points(waveform: &Waveform) -> PlotPoints {
    let step = waveform.len().div_ceil(MAX_PLOT_POINTS).max(1);
    let rate = f64::from(waveform.sample_rate());
    waveform
        .samples()
        .iter()
        .enumerate()
        .step_by(step)
        .map(|(i, &s)| [i as f64 / rate, f64::from(s)])
        .collect()
}
