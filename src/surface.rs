/*
 * Surface Module
 *
 * This module defines the DisplayList, the Surface the host hands to the
 * renderer. The frame is recorded during the update step and replayed onto
 * a nannou Draw when the window asks for a view, converting from screen
 * space to nannou's centered, y-up draw space on the way.
 */

use nannou::color::Rgba;
use nannou::prelude::*;

use crate::palette;
use crate::renderer::Surface;
use crate::viewport::{screen_to_draw, Viewport};

// Rings used to approximate a radial gradient
const GLOW_RINGS: usize = 12;

#[derive(Clone, Copy, Debug)]
pub enum DrawCommand {
    Fill { color: Rgba },
    Glow { center: Vec2, radius: f32, color: Rgba },
    Line { from: Vec2, to: Vec2, width: f32, color: Rgba },
    Disc { center: Vec2, radius: f32, color: Rgba },
}

#[derive(Default)]
pub struct DisplayList {
    viewport: Option<Viewport>,
    commands: Vec<DrawCommand>,
}

impl DisplayList {
    pub fn new() -> Self {
        Self::default()
    }

    // Start a new frame, keeping the allocation
    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    // Replay the recorded frame onto a nannou Draw
    pub fn replay(&self, draw: &Draw, window_rect: Rect) {
        for command in &self.commands {
            match *command {
                DrawCommand::Fill { color } => {
                    draw.rect().xy(window_rect.xy()).wh(window_rect.wh()).color(color);
                }
                DrawCommand::Glow { center, radius, color } => {
                    // Stacked translucent discs; the center sees every ring
                    let center = screen_to_draw(center, window_rect);
                    let ring_alpha = color.alpha / GLOW_RINGS as f32;
                    for ring in 0..GLOW_RINGS {
                        let r = radius * (1.0 - ring as f32 / GLOW_RINGS as f32);
                        draw.ellipse().xy(center).radius(r).color(palette::with_alpha(color, ring_alpha));
                    }
                }
                DrawCommand::Line { from, to, width, color } => {
                    draw.line()
                        .start(screen_to_draw(from, window_rect))
                        .end(screen_to_draw(to, window_rect))
                        .weight(width)
                        .caps_round()
                        .color(color);
                }
                DrawCommand::Disc { center, radius, color } => {
                    draw.ellipse().xy(screen_to_draw(center, window_rect)).radius(radius).color(color);
                }
            }
        }
    }
}

impl Surface for DisplayList {
    fn resize(&mut self, viewport: Viewport) {
        self.viewport = Some(viewport);
    }

    fn begin_frame(&mut self) {
        self.clear();
    }

    fn fill(&mut self, color: Rgba) {
        self.commands.push(DrawCommand::Fill { color });
    }

    fn glow(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Glow { center, radius, color });
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: Rgba) {
        self.commands.push(DrawCommand::Line { from, to, width, color });
    }

    fn disc(&mut self, center: Vec2, radius: f32, color: Rgba) {
        self.commands.push(DrawCommand::Disc { center, radius, color });
    }
}
