/*
 * Integrator Module
 *
 * This module applies the forces of one frame to the particle store:
 * velocity update, speed limit, friction, position step, boundary policy,
 * and the deterministic evolution of home anchors and hue.
 *
 * Velocities are per-frame displacements, the same unit the forces use.
 */

use std::f32::consts::TAU;

use nannou::prelude::*;
use rand::Rng;

use crate::params::{BoundaryPolicy, FieldParams, HueCycle, RecoveryParams};
use crate::store::ParticleStore;
use crate::viewport::Bounds;

pub struct StepContext {
    pub bounds: Bounds,
    pub elapsed: f32,
    pub dt: f32,
    // max_speed * (1 + boost) for this frame
    pub speed_limit: f32,
    pub energy: f32,
}

// Advance every particle one frame; returns how many particles respawned
pub fn integrate<R: Rng + ?Sized>(
    store: &mut ParticleStore,
    forces: &[Vec2],
    params: &FieldParams,
    ctx: &StepContext,
    rng: &mut R,
) -> usize {
    let mut respawned = 0;

    for (i, force) in forces.iter().enumerate().take(store.len()) {
        if let Some(recovery) = &params.recovery {
            drift_home(store, i, recovery, ctx);
        }

        // Update velocity
        let mut vx = store.vx[i] + force.x;
        let mut vy = store.vy[i] + force.y;

        // Limit speed
        let speed_sq = vx * vx + vy * vy;
        if speed_sq > ctx.speed_limit * ctx.speed_limit {
            let scale = ctx.speed_limit / speed_sq.sqrt();
            vx *= scale;
            vy *= scale;
        }

        if let Some(recovery) = &params.recovery {
            vx *= recovery.friction;
            vy *= recovery.friction;
        }

        store.vx[i] = vx;
        store.vy[i] = vy;

        // Update position
        store.x[i] += vx;
        store.y[i] += vy;

        if apply_boundary(store, i, params, ctx.bounds, rng) {
            respawned += 1;
        }

        if let Some(cycle) = &params.hue_cycle {
            evolve_hue(store, i, cycle, ctx);
        }
    }

    respawned
}

// Move the home anchor along its own slow drift, wrapping within the home margin
fn drift_home(store: &mut ParticleStore, i: usize, recovery: &RecoveryParams, ctx: &StepContext) {
    let angle = store.drift_angle[i];
    let phase = store.phase[i];
    let sin_wave = (ctx.elapsed * store.drift_freq[i] + phase).sin();
    let cos_wave = (ctx.elapsed * 0.3 + phase * 0.5).cos();

    let drift_x = angle.cos() * recovery.drift_speed + cos_wave * 0.1;
    let drift_y = angle.sin() * recovery.drift_speed + sin_wave * store.drift_amp[i] * 0.15;

    let step = ctx.dt * 30.0 * ctx.energy;
    store.home_x[i] = wrap(store.home_x[i] + drift_x * step, ctx.bounds.width, recovery.home_margin);
    store.home_y[i] = wrap(store.home_y[i] + drift_y * step, ctx.bounds.height, recovery.home_margin);
}

// Periodic wrap into [-margin, extent + margin]
#[inline]
pub fn wrap(value: f32, extent: f32, margin: f32) -> f32 {
    if value >= -margin && value <= extent + margin {
        return value;
    }
    let span = extent + 2.0 * margin;
    (value + margin).rem_euclid(span) - margin
}

// Returns true when the particle was respawned
fn apply_boundary<R: Rng + ?Sized>(
    store: &mut ParticleStore,
    i: usize,
    params: &FieldParams,
    bounds: Bounds,
    rng: &mut R,
) -> bool {
    match params.boundary {
        BoundaryPolicy::Wrap { margin } => {
            store.x[i] = wrap(store.x[i], bounds.width, margin);
            store.y[i] = wrap(store.y[i], bounds.height, margin);
            false
        }
        BoundaryPolicy::Clamp { margin } => {
            let (x, vx) = clamp_axis(store.x[i], store.vx[i], bounds.width, margin);
            let (y, vy) = clamp_axis(store.y[i], store.vy[i], bounds.height, margin);
            store.x[i] = x;
            store.y[i] = y;
            store.vx[i] = vx;
            store.vy[i] = vy;
            false
        }
        BoundaryPolicy::Respawn { margin, spawn_radius } => {
            let (x, y) = (store.x[i], store.y[i]);
            let inside = x >= -margin
                && x <= bounds.width + margin
                && y >= -margin
                && y <= bounds.height + margin;
            if inside {
                return false;
            }
            respawn(store, i, params, bounds, spawn_radius, rng);
            true
        }
    }
}

#[inline]
fn clamp_axis(value: f32, velocity: f32, extent: f32, margin: f32) -> (f32, f32) {
    if value < -margin {
        (-margin, velocity.max(0.0))
    } else if value > extent + margin {
        (extent + margin, velocity.min(0.0))
    } else {
        (value, velocity)
    }
}

// Restart a particle close to the viewport center with a fresh outward heading
fn respawn<R: Rng + ?Sized>(
    store: &mut ParticleStore,
    i: usize,
    params: &FieldParams,
    bounds: Bounds,
    spawn_radius: f32,
    rng: &mut R,
) {
    let center = bounds.center();
    let angle = rng.gen_range(0.0..TAU);
    let distance = rng.gen::<f32>() * spawn_radius.min(center.x).min(center.y).max(0.0);
    let (lo, hi) = params.initial_speed;
    let speed = if hi > lo { rng.gen_range(lo..hi) } else { lo };

    let x = center.x + angle.cos() * distance;
    let y = center.y + angle.sin() * distance;
    store.x[i] = x;
    store.y[i] = y;
    store.home_x[i] = x;
    store.home_y[i] = y;
    store.vx[i] = angle.cos() * speed;
    store.vy[i] = angle.sin() * speed;
}

// Cycle hue slowly; past the wrap threshold it jumps back to the reset hue
fn evolve_hue(store: &mut ParticleStore, i: usize, cycle: &HueCycle, ctx: &StepContext) {
    let rate = 0.5 + (i as f32 * 0.01 + ctx.elapsed).sin() * 0.5;
    store.hue[i] += cycle.speed * ctx.dt * rate;
    if store.hue[i] > cycle.wrap_above {
        store.hue[i] = cycle.reset_to;
    }
}
