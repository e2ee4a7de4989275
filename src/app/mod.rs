//! Application shell - the Start/Stop form and its egui frame loop.
//!
//! - `form` - raw field text and validation
//! - `controller` - start/stop/poll logic, independent of egui

pub mod controller;
pub mod form;

use std::time::Instant;

use eframe::egui;
use log::error;

use crate::dialogs::RfdNotifier;
use controller::{Controller, POLL_INTERVAL, PollOutcome, PollTimer};

/// Main application state.
pub struct CutstepApp {
    controller: Controller<RfdNotifier>,
    poll_timer: PollTimer,
    host_name: &'static str,
}

impl CutstepApp {
    pub fn new(controller: Controller<RfdNotifier>, host_name: &'static str) -> Self {
        Self {
            controller,
            poll_timer: PollTimer::new(POLL_INTERVAL),
            host_name,
        }
    }

    fn render_form(&mut self, ui: &mut egui::Ui) {
        ui.vertical_centered(|ui| {
            ui.add_space(8.0);
            ui.label("Frame rate (e.g. 25):");
            ui.add(egui::TextEdit::singleline(&mut self.controller.form.frame_rate).desired_width(160.0));
            ui.add_space(6.0);

            ui.label("Seconds to hold each cut (e.g. 0.5):");
            ui.add(egui::TextEdit::singleline(&mut self.controller.form.interval).desired_width(160.0));
            ui.add_space(10.0);

            if ui.button("Start").clicked() {
                self.controller.start();
            }
            ui.add_space(4.0);
            if ui.button("Stop").clicked() {
                self.controller.stop();
            }
        });
    }

    fn render_status(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let state = if self.controller.is_running() { "Running…" } else { "Idle" };
                ui.monospace(state);
                ui.separator();
                ui.weak(format!("host: {}", self.host_name));
            });
        });
    }
}

impl eframe::App for CutstepApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if self.poll_timer.due(Instant::now()) {
            if let PollOutcome::Exit(code) = self.controller.poll() {
                error!("Host unavailable, exiting with code {}", code);
                std::process::exit(code);
            }
        }

        self.render_status(ctx);
        egui::CentralPanel::default().show(ctx, |ui| self.render_form(ui));

        // Keep polling while idle: egui only repaints on input otherwise
        ctx.request_repaint_after(self.poll_timer.period());
    }
}
