use eframe::egui::{self, Ui};

use crate::audio::transform::{MAX_CARRIER_HZ, MAX_SEGMENT_SECONDS, MIN_CARRIER_HZ};
use crate::state::{AppState, AudioEffect};
use crate::ui::plot::waveform_plot;

// ---------------------------------------------------------------------------
// Scramble / carrier pages
// ---------------------------------------------------------------------------

pub fn audio_page(ui: &mut Ui, state: &mut AppState, effect: AudioEffect) {
    let (heading, upload_label, run_label) = match effect {
        AudioEffect::Scramble => (
            "Scramble Uploaded Audio",
            "Upload a .wav file to scramble",
            "Scramble Audio",
        ),
        AudioEffect::Carrier => (
            "Carrier Frequency Modulation",
            "Upload a .wav file to modulate",
            "Modulate Audio",
        ),
    };
    ui.heading(heading);

    ui.horizontal(|ui: &mut Ui| {
        if ui.button(upload_label).clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .set_title(upload_label)
                .add_filter("WAV", &["wav"])
                .pick_file()
            {
                state.load_audio(effect, &path);
            }
        }
        let job = state.audio_job(effect);
        if let (Some(path), Some(input)) = (&job.source, &job.input) {
            ui.label(format!(
                "{}  ({:.2} s @ {} Hz)",
                path.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
                input.duration_secs(),
                input.sample_rate()
            ));
        }
    });

    let job = state.audio_job_mut(effect);
    ui.horizontal(|ui: &mut Ui| match effect {
        AudioEffect::Scramble => {
            ui.label("Scramble Segment Duration (in seconds)");
            ui.add(
                egui::DragValue::new(&mut job.parameter)
                    .range(0.001..=MAX_SEGMENT_SECONDS)
                    .speed(0.001)
                    .fixed_decimals(3),
            );
        }
        AudioEffect::Carrier => {
            ui.label("Carrier Frequency (Hz)");
            ui.add(
                egui::DragValue::new(&mut job.parameter)
                    .range(MIN_CARRIER_HZ..=MAX_CARRIER_HZ)
                    .speed(100.0)
                    .fixed_decimals(1),
            );
        }
    });

    let has_input = job.input.is_some();
    if ui.add_enabled(has_input, egui::Button::new(run_label)).clicked() {
        state.run_effect(effect);
    }

    let job = state.audio_job(effect);
    waveform_plot(ui, &format!("{effect:?}_plot"), job.input.as_ref(), job.output.as_ref());

    if job.output.is_some() {
        let file_name = effect.output_file_name(job.parameter);
        if ui.button("Download Processed Audio…").clicked() {
            if let Some(path) = rfd::FileDialog::new()
                .set_title("Save processed audio")
                .add_filter("WAV", &["wav"])
                .set_file_name(&file_name)
                .save_file()
            {
                state.save_effect_output(effect, &path);
            }
        }
    }
}
