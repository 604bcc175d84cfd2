/*
 * Debug Information Module
 *
 * This module defines the FrameStats struct with per-frame counters, shown
 * by the optional overlay and logged periodically at debug level.
 */

use std::time::Duration;

use crate::renderer::RenderReport;
use crate::simulation::StepReport;

// Frames between two debug log lines
const LOG_EVERY: u64 = 600;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FrameStats {
    pub fps: f32,
    pub frame_time: Duration,
    pub ticks: u64,
    pub rendered_frames: u64,
    pub paused_frames: u64,
    pub particles: usize,
    pub grid_overflow: usize,
    pub grid_outside: usize,
    pub respawned: usize,
    pub connections: usize,
    pub boost: f32,
    pub idle: bool,
}

impl FrameStats {
    pub fn record_paused(&mut self) {
        self.ticks += 1;
        self.paused_frames += 1;
    }

    pub fn record_frame(&mut self, dt: f32, step: StepReport, render: RenderReport, boost: f32, idle: bool) {
        self.ticks += 1;
        self.rendered_frames += 1;
        self.frame_time = Duration::from_secs_f32(dt.max(0.0));
        if dt > 0.0 {
            // Smoothed so the overlay does not flicker
            let instant = 1.0 / dt;
            self.fps = if self.fps == 0.0 { instant } else { self.fps * 0.9 + instant * 0.1 };
        }
        self.particles = render.bodies;
        self.grid_overflow = step.grid_overflow;
        self.grid_outside = step.grid_outside;
        self.respawned = step.respawned;
        self.connections = render.connections;
        self.boost = boost;
        self.idle = idle;

        if self.rendered_frames % LOG_EVERY == 0 {
            log::debug!(
                "frame {}: {:.0} fps, {} particles, {} connections, {} dropped from full cells, boost {:.2}",
                self.rendered_frames,
                self.fps,
                self.particles,
                self.connections,
                self.grid_overflow,
                self.boost
            );
        }
    }
}
