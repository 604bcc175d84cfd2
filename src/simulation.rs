/*
 * Simulation Module
 *
 * This module defines the Simulation struct, the single owned state of one
 * mounted particle field: particle store, spatial grid, force buffer,
 * viewport bounds, pointer and boost state, visibility and idle flags, and
 * elapsed time. Nothing is shared between instances.
 *
 * One step runs the phases in a fixed order:
 * boost decay -> grid rebuild -> force model -> integrator
 * Presets that draw connections rebuild the grid once more afterwards, so
 * the renderer queries neighbors at the positions it draws.
 * Given the same seed, the same frame deltas and the same input trace, two
 * simulations produce bit-identical trajectories.
 */

use nannou::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::forces::{self, ForceContext};
use crate::input::{PointerState, ScrollBoost};
use crate::integrator::{self, StepContext};
use crate::params::FieldParams;
use crate::spatial_grid::SpatialGrid;
use crate::store::ParticleStore;
use crate::viewport::Bounds;

// Counters describing the last step
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct StepReport {
    pub grid_overflow: usize,
    pub grid_outside: usize,
    pub respawned: usize,
}

pub struct Simulation {
    params: FieldParams,
    store: ParticleStore,
    grid: SpatialGrid,
    forces: Vec<Vec2>,
    bounds: Bounds,
    pointer: PointerState,
    boost: ScrollBoost,
    visible: bool,
    idle: bool,
    elapsed: f32,
    rng: StdRng,
}

impl Simulation {
    // Randomized field for the given bounds and particle count
    pub fn new(params: FieldParams, bounds: Bounds, count: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let store = ParticleStore::initialize(count, bounds, &params, &mut rng);
        Self::assemble(params, bounds, store, rng)
    }

    // Field over a prepared store
    pub fn with_store(params: FieldParams, bounds: Bounds, store: ParticleStore, seed: u64) -> Self {
        Self::assemble(params, bounds, store, StdRng::seed_from_u64(seed))
    }

    fn assemble(params: FieldParams, bounds: Bounds, store: ParticleStore, rng: StdRng) -> Self {
        let grid = SpatialGrid::new(params.cell_size, params.max_per_cell, bounds);
        let boost = ScrollBoost::new(params.boost);
        let forces = Vec::with_capacity(store.len());
        Self {
            params,
            store,
            grid,
            forces,
            bounds,
            pointer: PointerState::default(),
            boost,
            visible: true,
            idle: false,
            elapsed: 0.0,
            rng,
        }
    }

    // Advance the field by dt seconds
    pub fn step(&mut self, dt: f32) -> StepReport {
        self.elapsed += dt;
        self.boost.decay();

        let energy = if self.idle { self.params.idle_energy } else { 1.0 };

        // Grid from the start-of-frame positions
        self.grid.build(&self.store.x, &self.store.y);

        let force_ctx = ForceContext {
            params: &self.params,
            bounds: self.bounds,
            pointer: self.pointer,
            elapsed: self.elapsed,
            dt,
            energy,
        };
        forces::accumulate(&self.store, &self.grid, &force_ctx, &mut self.forces);

        let step_ctx = StepContext {
            bounds: self.bounds,
            elapsed: self.elapsed,
            dt,
            speed_limit: self.speed_limit(),
            energy,
        };
        let respawned = integrator::integrate(&mut self.store, &self.forces, &self.params, &step_ctx, &mut self.rng);

        let report = StepReport {
            grid_overflow: self.grid.overflow(),
            grid_outside: self.grid.outside(),
            respawned,
        };

        // The connection pass reads the integrated positions
        if self.params.render.connections.is_some() {
            self.grid.build(&self.store.x, &self.store.y);
        }
        report
    }

    // New viewport: reallocate the grid and spread the home anchors over it
    pub fn resize(&mut self, bounds: Bounds) {
        self.bounds = bounds;
        self.grid.resize(bounds);
        self.store.reseed_homes(bounds, &mut self.rng);
    }

    pub fn pointer_moved(&mut self, x: f32, y: f32) {
        self.pointer.moved(x, y);
        self.boost.pointer_moved();
    }

    pub fn pointer_left(&mut self) {
        self.pointer.left();
    }

    pub fn scrolled(&mut self, offset: f32) {
        self.boost.scrolled(offset);
    }

    pub fn set_boost(&mut self, value: f32) {
        self.boost.set(value);
    }

    pub fn set_visible(&mut self, visible: bool) {
        self.visible = visible;
    }

    pub fn set_idle(&mut self, idle: bool) {
        self.idle = idle;
    }

    // Highest speed a particle may have after the last step
    pub fn speed_limit(&self) -> f32 {
        self.params.max_speed * (1.0 + self.boost.value())
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn store(&self) -> &ParticleStore {
        &self.store
    }

    // Indexes the start-of-step positions, or the integrated ones when connections are drawn
    pub fn grid(&self) -> &SpatialGrid {
        &self.grid
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn pointer(&self) -> PointerState {
        self.pointer
    }

    pub fn boost(&self) -> f32 {
        self.boost.value()
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_idle(&self) -> bool {
        self.idle
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_advances_time_and_moves_particles() {
        let mut sim = Simulation::new(FieldParams::swarm(), Bounds::new(800.0, 600.0), 300, 9);
        let before = sim.store().clone();

        sim.step(1.0 / 60.0);

        assert!((sim.elapsed() - 1.0 / 60.0).abs() < 1e-7);
        assert_ne!(sim.store().x, before.x);
        assert_eq!(sim.len(), 300);
    }

    #[test]
    fn boost_raises_speed_limit() {
        let mut sim = Simulation::new(FieldParams::swarm(), Bounds::new(800.0, 600.0), 10, 1);
        let base = sim.speed_limit();
        sim.set_boost(2.0);
        assert!((sim.speed_limit() - base * 3.0).abs() < 1e-5);
    }

    #[test]
    fn resize_updates_grid_and_homes() {
        let mut sim = Simulation::new(FieldParams::nebula(), Bounds::new(400.0, 300.0), 100, 2);
        sim.resize(Bounds::new(1000.0, 900.0));

        assert_eq!(sim.bounds(), Bounds::new(1000.0, 900.0));
        assert_eq!((sim.grid().cols, sim.grid().rows), (13, 11));
        assert!(sim.store().home_x.iter().any(|&x| x > 400.0));
    }

    #[test]
    fn connection_presets_index_integrated_positions() {
        let bounds = Bounds::new(800.0, 600.0);
        let mut sim = Simulation::new(FieldParams::nebula(), bounds, 200, 6);
        sim.step(1.0 / 60.0);

        let mut fresh = SpatialGrid::new(sim.params().cell_size, sim.params().max_per_cell, bounds);
        fresh.build(&sim.store().x, &sim.store().y);
        assert!(sim.grid().occupancy().eq(fresh.occupancy()));
    }

    #[test]
    fn idle_slows_turbulence() {
        let bounds = Bounds::new(800.0, 600.0);
        let store = ParticleStore::from_points(&[(400.0, 300.0)]);

        let mut awake = Simulation::with_store(FieldParams::swarm(), bounds, store.clone(), 0);
        let mut idle = Simulation::with_store(FieldParams::swarm(), bounds, store, 0);
        idle.set_idle(true);

        awake.step(0.05);
        idle.step(0.05);

        assert!(idle.store().speed(0) < awake.store().speed(0));
    }
}
