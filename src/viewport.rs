/*
 * Viewport Module
 *
 * This module defines the viewport and bounds types, and the coordinate
 * transformations between the simulation's screen space (origin at the
 * top-left corner, y pointing down) and nannou's draw space (origin at the
 * window center, y pointing up).
 */

use nannou::prelude::*;

use crate::error::FieldError;
use crate::params::MAX_DEVICE_PIXEL_RATIO;

// Size of the simulated area in logical pixels
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.width * 0.5, self.height * 0.5)
    }

    // Half the diagonal, the farthest any on-screen point is from the center
    pub fn half_diagonal(&self) -> f32 {
        self.center().length()
    }
}

// The host drawing surface: logical size plus device pixel ratio
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
    pub dpr: f32,
}

impl Viewport {
    // Validates the logical size and caps the device pixel ratio
    pub fn new(width: f32, height: f32, dpr: f32) -> Result<Self, FieldError> {
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(FieldError::InvalidViewport { width, height });
        }
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr.min(MAX_DEVICE_PIXEL_RATIO) } else { 1.0 };
        Ok(Self { width, height, dpr })
    }

    pub fn bounds(&self) -> Bounds {
        Bounds::new(self.width, self.height)
    }
}

// Convert a point from screen space to nannou draw space
#[inline]
pub fn screen_to_draw(point: Vec2, window_rect: Rect) -> Vec2 {
    vec2(window_rect.left() + point.x, window_rect.top() - point.y)
}

// Convert a point from nannou draw space to screen space
#[inline]
pub fn draw_to_screen(point: Vec2, window_rect: Rect) -> Vec2 {
    vec2(point.x - window_rect.left(), window_rect.top() - point.y)
}
