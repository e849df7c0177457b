use eframe::egui;

use crate::state::{AppState, AudioEffect, Page};
use crate::ui::{add_record, audio, database, finder, functional, panels};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct NeurogramApp {
    pub state: AppState,
}

impl NeurogramApp {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

impl eframe::App for NeurogramApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar and page selector ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Central panel: the selected page ----
        egui::CentralPanel::default().show(ctx, |ui| {
            egui::ScrollArea::vertical()
                .auto_shrink([false, false])
                .show(ui, |ui| match self.state.page {
                    Page::Finder => finder::finder_page(ui, &mut self.state),
                    Page::Database => database::database_page(ui, &mut self.state),
                    Page::AddRecording => add_record::add_record_page(ui, &mut self.state),
                    Page::FunctionalData => functional::functional_page(ui, &mut self.state),
                    Page::ScrambleAudio => {
                        audio::audio_page(ui, &mut self.state, AudioEffect::Scramble)
                    }
                    Page::CarrierFrequency => {
                        audio::audio_page(ui, &mut self.state, AudioEffect::Carrier)
                    }
                });
        });
    }
}
