/*
 * Field Parameters Module
 *
 * This module defines the FieldParams struct that holds every tunable of the
 * particle field. Tunables are fixed at initialization: each preset builds
 * its own set of constants, and the particle count is picked from the device
 * tier of the initial viewport width.
 */

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use nannou::color::{rgba, Rgba};

// Viewport width thresholds for the device tiers
pub const MOBILE_MAX_WIDTH: f32 = 768.0;
pub const TABLET_MAX_WIDTH: f32 = 1024.0;

// Device pixel ratio is capped to keep fill rate reasonable on dense screens
pub const MAX_DEVICE_PIXEL_RATIO: f32 = 2.0;

// Data-parallel force pass kicks in above this many particles
pub const PARALLEL_THRESHOLD: usize = 1024;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Preset {
    Swarm,
    Nebula,
    Warp,
}

impl Preset {
    pub const ALL: [Preset; 3] = [Preset::Swarm, Preset::Nebula, Preset::Warp];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Swarm => "swarm",
            Preset::Nebula => "nebula",
            Preset::Warp => "warp",
        }
    }
}

impl fmt::Display for Preset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Preset {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Preset::ALL
            .into_iter()
            .find(|preset| preset.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown preset '{}' (expected swarm, nebula or warp)", s))
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceTier {
    Mobile,
    Tablet,
    Desktop,
}

impl DeviceTier {
    pub fn from_width(width: f32) -> Self {
        if width < MOBILE_MAX_WIDTH {
            DeviceTier::Mobile
        } else if width < TABLET_MAX_WIDTH {
            DeviceTier::Tablet
        } else {
            DeviceTier::Desktop
        }
    }
}

// What happens to a particle that leaves the viewport
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum BoundaryPolicy {
    // Re-enter on the opposite edge of the margin-expanded box
    Wrap { margin: f32 },
    // Stop at the margin-expanded box and lose the outward velocity
    Clamp { margin: f32 },
    // Restart near the viewport center once outside the margin-expanded box
    Respawn { margin: f32, spawn_radius: f32 },
}

impl BoundaryPolicy {
    pub fn margin(&self) -> f32 {
        match *self {
            BoundaryPolicy::Wrap { margin }
            | BoundaryPolicy::Clamp { margin }
            | BoundaryPolicy::Respawn { margin, .. } => margin,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ColorMode {
    // Blend between the two palette endpoints by the particle's color-mix
    Mix,
    // HSL with the particle's evolving hue
    Hue,
}

// A soft radial glow at a fixed relative viewport coordinate
#[derive(Clone, Copy, Debug)]
pub struct GlowSpec {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    pub color: Rgba,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FlockingParams {
    pub neighbor_radius: f32,
    pub separation_dist: f32,
    pub cohesion_weight: f32,
    pub alignment_weight: f32,
    pub separation_weight: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TurbulenceParams {
    pub strength: f32,
    pub frequency: f32,
    pub time_scale: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RecoveryParams {
    // Spring constant pulling a particle back to its home anchor
    pub spring: f32,
    // Velocity multiplier applied every frame
    pub friction: f32,
    // Base speed of the drifting home anchor
    pub drift_speed: f32,
    // Home anchors wrap inside this margin around the viewport
    pub home_margin: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoostParams {
    // Boost gained per pixel of scroll movement in one event
    pub scroll_gain: f32,
    pub cap: f32,
    pub decay: f32,
    // Pointer movement sets the boost to its cap (warp)
    pub pointer_kick: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HueCycle {
    // Hue degrees per second
    pub speed: f32,
    pub wrap_above: f32,
    pub reset_to: f32,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ConnectionParams {
    pub max_distance: f32,
    pub max_opacity: f32,
    pub line_width: f32,
}

#[derive(Clone, Debug)]
pub struct RenderParams {
    pub background: Rgba,
    // Alpha of the background fill; below 1.0 the previous frame shows through as a trail
    pub background_alpha: f32,
    pub glows: Vec<GlowSpec>,
    pub color_mode: ColorMode,
    pub palette: (Rgba, Rgba),
    pub connections: Option<ConnectionParams>,
    // Outer glow disc radius relative to the core; zero disables the glow pass
    pub glow_scale: f32,
    pub glow_alpha: f32,
    pub breathe_base: f32,
    pub breathe_amount: f32,
    pub breathe_rate: f32,
    pub streaks: bool,
    pub streak_width: f32,
    // Scale size and opacity by the distance from the viewport center (warp)
    pub radial_depth: bool,
    // Nearer particles shift toward the pointer by (pointer - center) * depth * gain
    pub parallax: Option<f32>,
    pub idle_dim: f32,
}

// Parameters for the whole particle field
#[derive(Clone, Debug)]
pub struct FieldParams {
    pub preset: Preset,
    pub desktop_count: usize,
    pub tablet_count: usize,
    pub mobile_count: usize,

    // Spatial grid
    pub cell_size: f32,
    pub max_per_cell: usize,

    // Motion
    pub max_speed: f32,
    pub initial_speed: (f32, f32),
    pub flocking: Option<FlockingParams>,
    pub turbulence: Option<TurbulenceParams>,
    pub pointer_radius: f32,
    pub pointer_force: f32,
    pub recovery: Option<RecoveryParams>,
    pub radial_flow: f32,
    pub boundary: BoundaryPolicy,
    pub boost: BoostParams,

    // Per-particle intrinsic ranges
    pub radius_range: (f32, f32),
    pub depth_range: (f32, f32),
    pub base_hues: Vec<f32>,
    pub hue_cycle: Option<HueCycle>,

    pub render: RenderParams,

    // Frame driver timings
    pub max_frame_dt: f32,
    pub resize_debounce: Duration,
    pub idle_timeout: Duration,
    pub idle_energy: f32,
}

impl Default for FieldParams {
    fn default() -> Self {
        Self::swarm()
    }
}

impl FieldParams {
    pub fn for_preset(preset: Preset) -> Self {
        match preset {
            Preset::Swarm => Self::swarm(),
            Preset::Nebula => Self::nebula(),
            Preset::Warp => Self::warp(),
        }
    }

    // Flocking swarm: 2000 particles, wave turbulence and scroll boost
    pub fn swarm() -> Self {
        Self {
            preset: Preset::Swarm,
            desktop_count: 2000,
            tablet_count: 800,
            mobile_count: 300,
            cell_size: 60.0,
            max_per_cell: 32,
            max_speed: 1.2,
            initial_speed: (0.2, 0.7),
            flocking: Some(FlockingParams {
                neighbor_radius: 55.0,
                separation_dist: 18.0,
                cohesion_weight: 0.003,
                alignment_weight: 0.04,
                separation_weight: 0.08,
            }),
            turbulence: Some(TurbulenceParams {
                strength: 0.15,
                frequency: 0.0008,
                time_scale: 0.3,
            }),
            pointer_radius: 140.0,
            pointer_force: 3.5,
            recovery: None,
            radial_flow: 0.0,
            boundary: BoundaryPolicy::Wrap { margin: 10.0 },
            boost: BoostParams {
                scroll_gain: 0.02,
                cap: 2.5,
                decay: 0.95,
                pointer_kick: false,
            },
            radius_range: (0.5, 2.0),
            depth_range: (0.3, 0.8),
            base_hues: vec![220.0, 270.0, 185.0],
            hue_cycle: Some(HueCycle {
                speed: 0.08,
                wrap_above: 290.0,
                reset_to: 175.0,
            }),
            render: RenderParams {
                background: rgba(2.0 / 255.0, 2.0 / 255.0, 4.0 / 255.0, 1.0),
                background_alpha: 1.0,
                glows: vec![
                    GlowSpec { x: 0.2, y: 0.3, radius: 350.0, color: rgba(20.0 / 255.0, 10.0 / 255.0, 60.0 / 255.0, 0.25) },
                    GlowSpec { x: 0.75, y: 0.6, radius: 300.0, color: rgba(0.0, 15.0 / 255.0, 50.0 / 255.0, 0.2) },
                    GlowSpec { x: 0.5, y: 0.8, radius: 280.0, color: rgba(10.0 / 255.0, 5.0 / 255.0, 40.0 / 255.0, 0.15) },
                ],
                color_mode: ColorMode::Hue,
                palette: (cyan(), violet()),
                connections: None,
                glow_scale: 0.0,
                glow_alpha: 0.0,
                breathe_base: 0.6,
                breathe_amount: 0.4,
                breathe_rate: 0.5,
                streaks: false,
                streak_width: 0.0,
                radial_depth: false,
                parallax: None,
                idle_dim: 0.6,
            },
            max_frame_dt: 0.05,
            resize_debounce: Duration::from_millis(200),
            idle_timeout: Duration::from_secs(5),
            idle_energy: 0.5,
        }
    }

    // Nebula: drifting home anchors, smoke-like recovery and neural connections
    pub fn nebula() -> Self {
        Self {
            preset: Preset::Nebula,
            desktop_count: 550,
            tablet_count: 550,
            mobile_count: 550,
            cell_size: 90.0,
            max_per_cell: 18,
            max_speed: 6.0,
            initial_speed: (0.0, 0.0),
            flocking: None,
            turbulence: None,
            pointer_radius: 120.0,
            pointer_force: 3.2,
            recovery: Some(RecoveryParams {
                spring: 0.012,
                friction: 0.955,
                drift_speed: 0.45,
                home_margin: 50.0,
            }),
            radial_flow: 0.0,
            boundary: BoundaryPolicy::Clamp { margin: 60.0 },
            boost: BoostParams {
                scroll_gain: 0.02,
                cap: 1.0,
                decay: 0.95,
                pointer_kick: false,
            },
            radius_range: (0.6, 2.8),
            depth_range: (0.2, 1.0),
            base_hues: vec![187.0, 258.0],
            hue_cycle: None,
            render: RenderParams {
                background: rgba(9.0 / 255.0, 9.0 / 255.0, 11.0 / 255.0, 1.0),
                background_alpha: 1.0,
                glows: Vec::new(),
                color_mode: ColorMode::Mix,
                palette: (cyan(), violet()),
                connections: Some(ConnectionParams {
                    max_distance: 85.0,
                    max_opacity: 0.05,
                    line_width: 0.5,
                }),
                glow_scale: 2.5,
                glow_alpha: 0.15,
                breathe_base: 0.7,
                breathe_amount: 0.3,
                breathe_rate: 1.4,
                streaks: false,
                streak_width: 0.0,
                radial_depth: false,
                parallax: None,
                idle_dim: 0.5,
            },
            max_frame_dt: 0.05,
            resize_debounce: Duration::from_millis(150),
            idle_timeout: Duration::from_secs(5),
            idle_energy: 0.5,
        }
    }

    // Warp: stars stream out of the center leaving motion streaks
    pub fn warp() -> Self {
        Self {
            preset: Preset::Warp,
            desktop_count: 1000,
            tablet_count: 1000,
            mobile_count: 300,
            cell_size: 80.0,
            max_per_cell: 32,
            max_speed: 3.0,
            initial_speed: (0.1, 0.6),
            flocking: None,
            turbulence: Some(TurbulenceParams {
                strength: 0.05,
                frequency: 0.002,
                time_scale: 0.2,
            }),
            pointer_radius: 100.0,
            pointer_force: 1.5,
            recovery: None,
            radial_flow: 0.004,
            boundary: BoundaryPolicy::Respawn { margin: 20.0, spawn_radius: 40.0 },
            boost: BoostParams {
                scroll_gain: 0.02,
                cap: 1.7,
                decay: 0.9,
                pointer_kick: true,
            },
            radius_range: (0.5, 1.5),
            depth_range: (0.4, 1.0),
            base_hues: vec![187.0, 258.0],
            hue_cycle: None,
            render: RenderParams {
                background: rgba(2.0 / 255.0, 2.0 / 255.0, 5.0 / 255.0, 1.0),
                background_alpha: 0.3,
                glows: Vec::new(),
                color_mode: ColorMode::Mix,
                palette: (cyan(), violet()),
                connections: None,
                glow_scale: 0.0,
                glow_alpha: 0.0,
                breathe_base: 1.0,
                breathe_amount: 0.0,
                breathe_rate: 0.0,
                streaks: true,
                streak_width: 1.5,
                radial_depth: true,
                parallax: Some(0.05),
                idle_dim: 0.7,
            },
            max_frame_dt: 0.05,
            resize_debounce: Duration::from_millis(200),
            idle_timeout: Duration::from_secs(5),
            idle_energy: 0.5,
        }
    }

    pub fn particle_count(&self, tier: DeviceTier) -> usize {
        match tier {
            DeviceTier::Mobile => self.mobile_count,
            DeviceTier::Tablet => self.tablet_count,
            DeviceTier::Desktop => self.desktop_count,
        }
    }

    // Tier-dependent adjustments, applied once at mount
    pub fn apply_tier(&mut self, tier: DeviceTier) {
        if tier == DeviceTier::Mobile {
            // No hover on touch screens
            self.render.parallax = None;
        }
    }

    // Largest distance at which any force or connection looks at a neighbor
    pub fn interaction_radius(&self) -> f32 {
        let flock = self.flocking.map_or(0.0, |f| f.neighbor_radius.max(f.separation_dist));
        let connect = self.render.connections.map_or(0.0, |c| c.max_distance);
        flock.max(connect)
    }
}

// #06b6d4
pub fn cyan() -> Rgba {
    rgba(6.0 / 255.0, 182.0 / 255.0, 212.0 / 255.0, 1.0)
}

// #8b5cf6
pub fn violet() -> Rgba {
    rgba(139.0 / 255.0, 92.0 / 255.0, 246.0 / 255.0, 1.0)
}
