/*
 * UI Module
 *
 * This module draws the optional statistics overlay with nannou_egui. The
 * overlay is read-only: the particle field has no runtime configuration
 * surface, so there are no sliders, only labels.
 */

use nannou_egui::{egui, Egui};

use crate::debug::FrameStats;
use crate::driver::DriverState;
use crate::params::Preset;

pub fn update_overlay(egui: &mut Egui, preset: Preset, state: DriverState, stats: &FrameStats) {
    let ctx = egui.begin_frame();

    egui::Window::new("Flow Field")
        .default_pos([10.0, 10.0])
        .resizable(false)
        .show(&ctx, |ui| {
            ui.label(format!("Preset: {}", preset));
            ui.label(format!("State: {:?}", state));
            ui.separator();

            ui.label(format!("FPS: {:.1}", stats.fps));
            ui.label(format!("Frame time: {:.2} ms", stats.frame_time.as_secs_f64() * 1000.0));
            ui.label(format!("Particles: {}", stats.particles));
            ui.label(format!("Connections: {}", stats.connections));

            ui.collapsing("Grid", |ui| {
                ui.label(format!("Dropped from full cells: {}", stats.grid_overflow));
                ui.label(format!("Outside the grid: {}", stats.grid_outside));
                ui.label(format!("Respawned: {}", stats.respawned));
            });

            ui.separator();
            ui.label(format!("Boost: {:.2}", stats.boost));
            ui.label(if stats.idle { "Idle" } else { "Active" });
            ui.label(format!("Paused frames: {}", stats.paused_frames));
        });
}
