/*
 * Renderer Module
 *
 * This module draws one frame of the particle field onto a Surface.
 * The draw order is fixed:
 * 1. Background fill (opaque, or translucent to leave a trail)
 * 2. Ambient glow regions at fixed relative viewport coordinates
 * 3. Connection edges between grid neighbors, each pair once
 * 4. Particle bodies: soft outer glow, then the sharp core
 * 5. Motion streaks from the previous screen position (optional)
 *
 * The renderer only reads the simulation. The one thing it keeps across
 * frames is every particle's previous screen position for the streaks.
 * With parallax on, nearer particles are drawn shifted toward the pointer.
 */

use nannou::color::Rgba;
use nannou::prelude::*;

use crate::palette;
use crate::params::{ColorMode, ConnectionParams, RenderParams};
use crate::simulation::Simulation;
use crate::viewport::Viewport;

// Drawing surface provided by the host, in screen space (top-left origin, y down)
pub trait Surface {
    // New logical size; a host with its own backing store scales it by the capped dpr
    fn resize(&mut self, viewport: Viewport);
    // Called once before anything of a new frame is drawn
    fn begin_frame(&mut self) {}
    // Cover the whole surface
    fn fill(&mut self, color: Rgba);
    // Radial gradient from color at the center to transparent at radius
    fn glow(&mut self, center: Vec2, radius: f32, color: Rgba);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba);
    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba);
}

// Counters describing the last rendered frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RenderReport {
    pub connections: usize,
    pub bodies: usize,
    pub streaks: usize,
}

#[derive(Default)]
pub struct Renderer {
    // Previous screen position per particle, for motion streaks
    previous: Vec<Vec2>,
}

impl Renderer {
    pub fn new() -> Self {
        Self::default()
    }

    // Forget the streak history, e.g. after a resize
    pub fn reset_trails(&mut self) {
        self.previous.clear();
    }

    pub fn render<S: Surface + ?Sized>(&mut self, sim: &Simulation, surface: &mut S) -> RenderReport {
        let params = &sim.params().render;
        let mut report = RenderReport::default();

        surface.begin_frame();
        self.draw_background(sim, params, surface);

        if let Some(connections) = &params.connections {
            report.connections = draw_connections(sim, params, connections, surface);
        }

        report.bodies = draw_bodies(sim, params, surface);

        if params.streaks {
            report.streaks = self.draw_streaks(sim, params, surface);
        }

        report
    }

    fn draw_background<S: Surface + ?Sized>(&self, sim: &Simulation, params: &RenderParams, surface: &mut S) {
        surface.fill(palette::with_alpha(params.background, params.background_alpha));

        let bounds = sim.bounds();
        for glow in &params.glows {
            let center = vec2(glow.x * bounds.width, glow.y * bounds.height);
            surface.glow(center, glow.radius, glow.color);
        }
    }

    fn draw_streaks<S: Surface + ?Sized>(&mut self, sim: &Simulation, params: &RenderParams, surface: &mut S) -> usize {
        let store = sim.store();
        let bounds = sim.bounds();
        // A longer jump than this is a wrap or respawn, not motion
        let max_jump = bounds.width.min(bounds.height) * 0.25;
        let first_frame = self.previous.len() != store.len();
        if first_frame {
            self.previous.clear();
            self.previous.extend((0..store.len()).map(|i| screen_position(sim, params, i)));
        }

        let idle_dim = if sim.is_idle() { params.idle_dim } else { 1.0 };
        let mut drawn = 0;
        for i in 0..store.len() {
            let current = screen_position(sim, params, i);
            let previous = self.previous[i];
            self.previous[i] = current;

            let weight = depth_weight(sim, params, i);
            let color = body_color(sim, params, i, weight * idle_dim);
            let width = params.streak_width * weight;

            if first_frame || previous.distance(current) > max_jump {
                // No history yet: a dot instead of a streak
                surface.line(current, current + vec2(1.0, 1.0), width, color);
            } else {
                surface.line(previous, current, width, color);
            }
            drawn += 1;
        }
        drawn
    }
}

// Lines between neighbors closer than the threshold, each pair drawn once (j > i)
fn draw_connections<S: Surface + ?Sized>(
    sim: &Simulation,
    params: &RenderParams,
    connections: &ConnectionParams,
    surface: &mut S,
) -> usize {
    let store = sim.store();
    let grid = sim.grid();
    let idle_dim = if sim.is_idle() { params.idle_dim } else { 1.0 };
    let mut neighbors = Vec::new();
    let mut drawn = 0;

    for i in 0..store.len() {
        grid.query_neighbors(i, &store.x, &store.y, connections.max_distance, &mut neighbors);
        let from = screen_position(sim, params, i);
        for &j in neighbors.iter().filter(|&&j| j > i) {
            // Fade by simulated distance, whatever the parallax shift
            let dist = vec2(store.x[i] - store.x[j], store.y[i] - store.y[j]).length();
            let opacity = (1.0 - dist / connections.max_distance) * connections.max_opacity * idle_dim;
            let mix = (store.color_mix[i] + store.color_mix[j]) * 0.5;
            let color = palette::with_alpha(palette::lerp(params.palette.0, params.palette.1, mix), opacity);
            surface.line(from, screen_position(sim, params, j), connections.line_width, color);
            drawn += 1;
        }
    }
    drawn
}

fn draw_bodies<S: Surface + ?Sized>(sim: &Simulation, params: &RenderParams, surface: &mut S) -> usize {
    let store = sim.store();
    let elapsed = sim.elapsed();
    let idle_dim = if sim.is_idle() { params.idle_dim } else { 1.0 };

    for i in 0..store.len() {
        let center = screen_position(sim, params, i);
        let breathe = params.breathe_base
            + params.breathe_amount * (elapsed * store.drift_freq[i] * params.breathe_rate + store.phase[i]).sin();
        let weight = depth_weight(sim, params, i);
        let alpha = store.depth[i] * breathe * weight * idle_dim;
        let size = store.radius[i] * (0.8 + breathe * 0.2) * weight.max(0.2);

        if params.glow_scale > 0.0 {
            surface.disc(center, size * params.glow_scale, body_color(sim, params, i, alpha * params.glow_alpha));
        }
        surface.disc(center, size, body_color(sim, params, i, alpha));
    }
    store.len()
}

// Extra size and opacity weight; for radial depth, grows toward the edges
#[inline]
fn depth_weight(sim: &Simulation, params: &RenderParams, i: usize) -> f32 {
    if !params.radial_depth {
        return 1.0;
    }
    let bounds = sim.bounds();
    let store = sim.store();
    let offset = vec2(store.x[i], store.y[i]) - bounds.center();
    (offset.length() / bounds.half_diagonal().max(1.0)).clamp(0.0, 1.0)
}

// Where particle i is drawn: its position, plus the parallax shift toward the pointer
#[inline]
fn screen_position(sim: &Simulation, params: &RenderParams, i: usize) -> Vec2 {
    let store = sim.store();
    let position = vec2(store.x[i], store.y[i]);
    let pointer = sim.pointer();
    match params.parallax {
        Some(gain) if pointer.active => {
            position + (pointer.position - sim.bounds().center()) * depth_weight(sim, params, i) * gain
        }
        _ => position,
    }
}

fn body_color(sim: &Simulation, params: &RenderParams, i: usize, alpha: f32) -> Rgba {
    let store = sim.store();
    match params.color_mode {
        ColorMode::Mix => palette::with_alpha(palette::lerp(params.palette.0, params.palette.1, store.color_mix[i]), alpha),
        ColorMode::Hue => {
            let saturation = 0.75 + (sim.elapsed() + i as f32 * 0.05).sin() * 0.15;
            let lightness = 0.5 + store.radius[i] * 0.1;
            palette::hsla(store.hue[i], saturation, lightness, alpha)
        }
    }
}
