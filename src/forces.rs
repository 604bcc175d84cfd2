/*
 * Force Model Module
 *
 * This module computes the force acting on every particle for one frame.
 * Forces are read from the start-of-frame snapshot only: the grid was built
 * from the positions before integration, the store is borrowed immutably and
 * every result goes into a separate buffer. No term ever sees an update made
 * earlier in the same frame, so the outcome does not depend on particle order.
 *
 * Terms, all summed:
 * - Flocking: cohesion, alignment and separation over grid neighbors
 * - Turbulence: a deterministic sine/cosine wave field over position and time
 * - Pointer repulsion inside the interaction radius
 * - Home spring toward the drifting anchor (recovery presets)
 * - Radial outflow from the viewport center (warp)
 */

use std::f32::consts::PI;

use nannou::prelude::*;
use rayon::prelude::*;

use crate::input::PointerState;
use crate::params::{FieldParams, FlockingParams, TurbulenceParams, PARALLEL_THRESHOLD};
use crate::spatial_grid::SpatialGrid;
use crate::store::ParticleStore;
use crate::viewport::Bounds;

// Coincident neighbors have no usable direction and are ignored by flocking
const MIN_NEIGHBOR_DIST: f32 = 0.1;
// Below this pointer distance the push direction falls back to the particle's own heading
const MIN_POINTER_DIST: f32 = 1e-3;

// Everything besides the store and the grid that the force terms read
pub struct ForceContext<'a> {
    pub params: &'a FieldParams,
    pub bounds: Bounds,
    pub pointer: PointerState,
    pub elapsed: f32,
    pub dt: f32,
    // 1.0 normally, lower while idle
    pub energy: f32,
}

// Fill out with one force per particle
pub fn accumulate(store: &ParticleStore, grid: &SpatialGrid, ctx: &ForceContext, out: &mut Vec<Vec2>) {
    out.clear();
    out.resize(store.len(), Vec2::ZERO);

    // Each particle's force is computed sequentially on its own, so the
    // parallel pass produces exactly the same numbers as the serial one
    if store.len() >= PARALLEL_THRESHOLD {
        out.par_iter_mut().enumerate().for_each(|(i, force)| {
            *force = particle_force(i, store, grid, ctx);
        });
    } else {
        for (i, force) in out.iter_mut().enumerate() {
            *force = particle_force(i, store, grid, ctx);
        }
    }
}

// Sum of every enabled term for particle i
pub fn particle_force(i: usize, store: &ParticleStore, grid: &SpatialGrid, ctx: &ForceContext) -> Vec2 {
    let params = ctx.params;
    let position = vec2(store.x[i], store.y[i]);
    let mut force = Vec2::ZERO;

    if let Some(flocking) = &params.flocking {
        force += flocking_force(i, store, grid, flocking);
    }

    if let Some(turbulence) = &params.turbulence {
        force += turbulence_force(position, ctx.elapsed, turbulence) * (ctx.dt * ctx.energy);
    }

    if ctx.pointer.active {
        force += pointer_repulsion(i, store, ctx.pointer.position, params.pointer_radius, params.pointer_force);
    }

    if let Some(recovery) = &params.recovery {
        let home = vec2(store.home_x[i], store.home_y[i]);
        force += (home - position) * recovery.spring;
    }

    if params.radial_flow > 0.0 {
        force += (position - ctx.bounds.center()) * params.radial_flow;
    }

    force
}

// Cohesion, alignment and separation over the 3x3 grid block
pub fn flocking_force(i: usize, store: &ParticleStore, grid: &SpatialGrid, flocking: &FlockingParams) -> Vec2 {
    let (x, y) = (store.x[i], store.y[i]);

    let mut cohesion = Vec2::ZERO;
    let mut alignment = Vec2::ZERO;
    let mut separation = Vec2::ZERO;
    let mut count = 0;
    let mut cohesion_count = 0;

    grid.for_each_candidate(x, y, |j| {
        if j == i {
            return;
        }
        let dx = store.x[j] - x;
        let dy = store.y[j] - y;
        let dist = (dx * dx + dy * dy).sqrt();

        if dist < flocking.neighbor_radius && dist > MIN_NEIGHBOR_DIST {
            alignment += vec2(store.vx[j], store.vy[j]);
            count += 1;

            // Crowding neighbors only push
            if dist < flocking.separation_dist {
                let push = (flocking.separation_dist - dist) / flocking.separation_dist;
                separation -= vec2(dx / dist, dy / dist) * push;
            } else {
                cohesion += vec2(store.x[j], store.y[j]);
                cohesion_count += 1;
            }
        }
    });

    let mut force = separation * flocking.separation_weight;
    if count > 0 {
        let heading = alignment / count as f32;
        force += (heading - vec2(store.vx[i], store.vy[i])) * flocking.alignment_weight;
    }
    if cohesion_count > 0 {
        let centroid = cohesion / cohesion_count as f32;
        force += (centroid - vec2(x, y)) * flocking.cohesion_weight;
    }
    force
}

// Wave field direction scaled by strength; a pure function of position and time
#[inline]
pub fn turbulence_force(position: Vec2, elapsed: f32, turbulence: &TurbulenceParams) -> Vec2 {
    let t = elapsed * turbulence.time_scale;
    let angle = (position.x * turbulence.frequency + t).sin() * PI
        + (position.y * turbulence.frequency * 0.7 + t * 1.3).cos() * PI * 0.5;
    vec2(angle.cos(), angle.sin()) * turbulence.strength
}

// Push away from the pointer, fading linearly to zero at the radius
pub fn pointer_repulsion(i: usize, store: &ParticleStore, pointer: Vec2, radius: f32, strength: f32) -> Vec2 {
    if radius <= 0.0 {
        return Vec2::ZERO;
    }
    let offset = vec2(store.x[i], store.y[i]) - pointer;
    let dist = offset.length();
    if dist >= radius {
        return Vec2::ZERO;
    }

    let direction = if dist > MIN_POINTER_DIST {
        offset / dist
    } else {
        let velocity = vec2(store.vx[i], store.vy[i]);
        if velocity.length_squared() > 1e-12 {
            velocity.normalize()
        } else {
            vec2(store.phase[i].cos(), store.phase[i].sin())
        }
    };
    direction * ((1.0 - dist / radius) * strength)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(params: &FieldParams, bounds: Bounds) -> ForceContext<'_> {
        ForceContext {
            params,
            bounds,
            pointer: PointerState::default(),
            elapsed: 1.0,
            dt: 1.0 / 60.0,
            energy: 1.0,
        }
    }

    fn grid_for(store: &ParticleStore, params: &FieldParams, bounds: Bounds) -> SpatialGrid {
        let mut grid = SpatialGrid::new(params.cell_size, params.max_per_cell, bounds);
        grid.build(&store.x, &store.y);
        grid
    }

    #[test]
    fn separation_pushes_close_pair_apart() {
        let params = FieldParams::swarm();
        let bounds = Bounds::new(400.0, 400.0);
        let store = ParticleStore::from_points(&[(200.0, 200.0), (208.0, 200.0)]);
        let grid = grid_for(&store, &params, bounds);
        let flocking = params.flocking.unwrap();

        let left = flocking_force(0, &store, &grid, &flocking);
        let right = flocking_force(1, &store, &grid, &flocking);

        assert!(left.x < 0.0, "left particle should move left: {:?}", left);
        assert!(right.x > 0.0, "right particle should move right: {:?}", right);
        assert!((left + right).length() < 1e-6);
    }

    #[test]
    fn crowding_pair_is_pushed_apart_at_every_distance() {
        let params = FieldParams::swarm();
        let flocking = params.flocking.unwrap();
        let bounds = Bounds::new(400.0, 400.0);

        for d in [0.5, 4.0, 9.0, 12.0, 15.0, 17.0, 17.9] {
            let store = ParticleStore::from_points(&[(200.0, 200.0), (200.0 + d, 200.0)]);
            let grid = grid_for(&store, &params, bounds);

            let left = flocking_force(0, &store, &grid, &flocking);
            let right = flocking_force(1, &store, &grid, &flocking);
            assert!(left.x < 0.0 && right.x > 0.0, "d = {}: {:?} {:?}", d, left, right);
        }
    }

    #[test]
    fn cohesion_pulls_distant_neighbors_together() {
        let params = FieldParams::swarm();
        let bounds = Bounds::new(400.0, 400.0);
        // Farther apart than the separation distance, closer than the neighbor radius
        let store = ParticleStore::from_points(&[(200.0, 200.0), (240.0, 200.0)]);
        let grid = grid_for(&store, &params, bounds);
        let flocking = params.flocking.unwrap();

        let force = flocking_force(0, &store, &grid, &flocking);
        assert!(force.x > 0.0);
    }

    #[test]
    fn alignment_matches_neighbor_heading() {
        let params = FieldParams::swarm();
        let bounds = Bounds::new(400.0, 400.0);
        let mut store = ParticleStore::from_points(&[(200.0, 200.0), (230.0, 200.0)]);
        store.vy[1] = 1.0;
        let grid = grid_for(&store, &params, bounds);

        let force = flocking_force(0, &store, &grid, &params.flocking.unwrap());
        assert!(force.y > 0.0);
    }

    #[test]
    fn turbulence_is_deterministic_and_bounded() {
        let turbulence = FieldParams::swarm().turbulence.unwrap();
        let p = vec2(321.0, 654.0);
        let a = turbulence_force(p, 3.5, &turbulence);
        let b = turbulence_force(p, 3.5, &turbulence);
        assert_eq!(a, b);
        assert!((a.length() - turbulence.strength).abs() < 1e-5);
        assert_ne!(a, turbulence_force(p, 9.0, &turbulence));
    }

    #[test]
    fn pointer_repulsion_fades_with_distance() {
        let store = ParticleStore::from_points(&[(110.0, 100.0), (170.0, 100.0), (400.0, 100.0)]);
        let pointer = vec2(100.0, 100.0);

        let near = pointer_repulsion(0, &store, pointer, 140.0, 3.5);
        let far = pointer_repulsion(1, &store, pointer, 140.0, 3.5);
        let outside = pointer_repulsion(2, &store, pointer, 140.0, 3.5);

        assert!(near.x > far.x && far.x > 0.0);
        assert!((near.x - (1.0 - 10.0 / 140.0) * 3.5).abs() < 1e-5);
        assert_eq!(outside, Vec2::ZERO);
    }

    #[test]
    fn pointer_on_top_of_particle_still_pushes() {
        let store = ParticleStore::from_points(&[(50.0, 50.0)]);
        let force = pointer_repulsion(0, &store, vec2(50.0, 50.0), 120.0, 3.2);
        assert!((force.length() - 3.2).abs() < 1e-5);
    }

    #[test]
    fn home_spring_pulls_back() {
        let params = FieldParams::nebula();
        let bounds = Bounds::new(400.0, 400.0);
        let mut store = ParticleStore::from_points(&[(100.0, 100.0)]);
        store.home_x[0] = 150.0;
        let grid = grid_for(&store, &params, bounds);

        let force = particle_force(0, &store, &grid, &context(&params, bounds));
        assert!((force.x - 50.0 * params.recovery.unwrap().spring).abs() < 1e-6);
        assert_eq!(force.y, 0.0);
    }

    #[test]
    fn parallel_pass_matches_serial() {
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let params = FieldParams::swarm();
        let bounds = Bounds::new(1280.0, 720.0);
        let mut rng = StdRng::seed_from_u64(11);
        let store = ParticleStore::initialize(PARALLEL_THRESHOLD + 200, bounds, &params, &mut rng);
        let grid = grid_for(&store, &params, bounds);
        let ctx = context(&params, bounds);

        let mut forces = Vec::new();
        accumulate(&store, &grid, &ctx, &mut forces);

        for (i, force) in forces.iter().enumerate() {
            assert_eq!(*force, particle_force(i, &store, &grid, &ctx));
        }
    }
}
