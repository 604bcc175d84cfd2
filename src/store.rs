/*
 * Particle Store Module
 *
 * This module defines the ParticleStore, which keeps every particle attribute
 * in its own contiguous array (struct-of-arrays) indexed by particle id.
 * The particle count is fixed for the lifetime of a mount: there is no add or
 * remove, only initialization and re-seeding of the home anchors on resize.
 */

use std::f32::consts::TAU;

use rand::Rng;

use crate::params::FieldParams;
use crate::viewport::Bounds;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParticleStore {
    // Dynamic state
    pub x: Vec<f32>,
    pub y: Vec<f32>,
    pub vx: Vec<f32>,
    pub vy: Vec<f32>,
    pub home_x: Vec<f32>,
    pub home_y: Vec<f32>,
    pub hue: Vec<f32>,

    // Intrinsic properties
    pub drift_angle: Vec<f32>,
    pub drift_freq: Vec<f32>,
    pub drift_amp: Vec<f32>,
    pub phase: Vec<f32>,
    pub radius: Vec<f32>,
    pub depth: Vec<f32>, // 0-1 opacity and scale weight
    pub color_mix: Vec<f32>, // 0 = first palette endpoint, 1 = second
}

// Uniform sample that tolerates empty ranges
#[inline]
fn sample<R: Rng + ?Sized>(rng: &mut R, (lo, hi): (f32, f32)) -> f32 {
    if hi > lo {
        rng.gen_range(lo..hi)
    } else {
        lo
    }
}

impl ParticleStore {
    // Allocate all arrays and randomize positions, velocities and intrinsics
    pub fn initialize<R: Rng + ?Sized>(count: usize, bounds: Bounds, params: &FieldParams, rng: &mut R) -> Self {
        let mut store = Self::with_capacity(count);

        for _ in 0..count {
            let x = sample(rng, (0.0, bounds.width));
            let y = sample(rng, (0.0, bounds.height));
            let heading = rng.gen_range(0.0..TAU);
            let speed = sample(rng, params.initial_speed);
            let base_hue = if params.base_hues.is_empty() {
                0.0
            } else {
                params.base_hues[rng.gen_range(0..params.base_hues.len())]
            };

            store.x.push(x);
            store.y.push(y);
            store.home_x.push(x);
            store.home_y.push(y);
            store.vx.push(heading.cos() * speed);
            store.vy.push(heading.sin() * speed);
            store.hue.push(base_hue + rng.gen_range(-10.0..10.0));
            store.drift_angle.push(rng.gen_range(0.0..TAU));
            store.drift_freq.push(rng.gen_range(0.4..1.2));
            store.drift_amp.push(rng.gen_range(0.5..2.0));
            store.phase.push(rng.gen_range(0.0..TAU));
            store.radius.push(sample(rng, params.radius_range));
            store.depth.push(sample(rng, params.depth_range));
            store.color_mix.push(rng.gen::<f32>());
        }

        store
    }

    // Place particles at fixed points, at rest, with neutral intrinsics
    pub fn from_points(points: &[(f32, f32)]) -> Self {
        let mut store = Self::with_capacity(points.len());

        for (i, &(x, y)) in points.iter().enumerate() {
            store.x.push(x);
            store.y.push(y);
            store.home_x.push(x);
            store.home_y.push(y);
            store.vx.push(0.0);
            store.vy.push(0.0);
            store.hue.push(200.0);
            store.drift_angle.push(0.0);
            store.drift_freq.push(1.0);
            store.drift_amp.push(1.0);
            store.phase.push(i as f32 * 0.5);
            store.radius.push(1.0);
            store.depth.push(1.0);
            store.color_mix.push(0.5);
        }

        store
    }

    fn with_capacity(count: usize) -> Self {
        Self {
            x: Vec::with_capacity(count),
            y: Vec::with_capacity(count),
            vx: Vec::with_capacity(count),
            vy: Vec::with_capacity(count),
            home_x: Vec::with_capacity(count),
            home_y: Vec::with_capacity(count),
            hue: Vec::with_capacity(count),
            drift_angle: Vec::with_capacity(count),
            drift_freq: Vec::with_capacity(count),
            drift_amp: Vec::with_capacity(count),
            phase: Vec::with_capacity(count),
            radius: Vec::with_capacity(count),
            depth: Vec::with_capacity(count),
            color_mix: Vec::with_capacity(count),
        }
    }

    // Spread the home anchors over new bounds; positions follow on their own
    pub fn reseed_homes<R: Rng + ?Sized>(&mut self, bounds: Bounds, rng: &mut R) {
        for i in 0..self.len() {
            self.home_x[i] = sample(rng, (0.0, bounds.width));
            self.home_y[i] = sample(rng, (0.0, bounds.height));
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.x.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
    }

    #[inline]
    pub fn speed(&self, i: usize) -> f32 {
        (self.vx[i] * self.vx[i] + self.vy[i] * self.vy[i]).sqrt()
    }
}
