/*
 * Input Module
 *
 * This module holds the small pieces of state that host input writes to:
 * the pointer position with its active flag, and the scroll-derived boost
 * scalar. Event handlers only ever touch these scalars, never the particle
 * arrays, so a handler can never tear a tick in progress.
 */

use nannou::prelude::*;

use crate::params::BoostParams;
use crate::viewport::Viewport;

// Signals the host forwards to the frame driver
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum HostEvent {
    // Pointer position in screen space
    PointerMoved { x: f32, y: f32 },
    PointerLeft,
    // Absolute vertical scroll offset of the page
    Scrolled { offset: f32 },
    Resized(Viewport),
    VisibilityChanged { visible: bool },
}

impl HostEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            HostEvent::PointerMoved { .. } => EventKind::PointerMove,
            HostEvent::PointerLeft => EventKind::PointerLeave,
            HostEvent::Scrolled { .. } => EventKind::Scroll,
            HostEvent::Resized(_) => EventKind::Resize,
            HostEvent::VisibilityChanged { .. } => EventKind::Visibility,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    PointerMove,
    PointerLeave,
    Scroll,
    Resize,
    Visibility,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::PointerMove,
        EventKind::PointerLeave,
        EventKind::Scroll,
        EventKind::Resize,
        EventKind::Visibility,
    ];
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerState {
    pub position: Vec2,
    pub active: bool,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: vec2(-9999.0, -9999.0),
            active: false,
        }
    }
}

impl PointerState {
    pub fn moved(&mut self, x: f32, y: f32) {
        self.position = vec2(x, y);
        self.active = true;
    }

    // Forget the position too, so a stale pointer never repels anything
    pub fn left(&mut self) {
        *self = Self::default();
    }
}

// Transient speed multiplier driven by scroll velocity
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollBoost {
    value: f32,
    last_offset: Option<f32>,
    params: BoostParams,
}

impl ScrollBoost {
    pub fn new(params: BoostParams) -> Self {
        Self {
            value: 0.0,
            last_offset: None,
            params,
        }
    }

    #[inline]
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn cap(&self) -> f32 {
        self.params.cap
    }

    // The boost tracks the size of the latest scroll step, capped
    pub fn scrolled(&mut self, offset: f32) {
        if let Some(last) = self.last_offset {
            let delta = (offset - last).abs();
            self.value = (delta * self.params.scroll_gain).min(self.params.cap);
        }
        self.last_offset = Some(offset);
    }

    // Pointer motion kicks the boost straight to its cap when enabled
    pub fn pointer_moved(&mut self) {
        if self.params.pointer_kick {
            self.value = self.params.cap;
        }
    }

    pub fn set(&mut self, value: f32) {
        self.value = value.clamp(0.0, self.params.cap);
    }

    // Exponential decay toward zero, once per tick
    pub fn decay(&mut self) {
        self.value *= self.params.decay;
        if self.value < 1e-4 {
            self.value = 0.0;
        }
    }
}
