use std::time::{Duration, Instant};

use flowfield::{
    Bounds, DisplayList, DriverState, FieldParams, FrameDriver, HostEvent, ParticleStore, Preset, Simulation,
    SpatialGrid, TickOutcome, Viewport,
};

const DT: f32 = 1.0 / 60.0;

/// Drive a simulation with a scripted pointer and scroll trace
fn run_with_input(sim: &mut Simulation, ticks: usize, mut check: impl FnMut(&Simulation)) {
    let bounds = sim.bounds();
    for t in 0..ticks {
        match t % 120 {
            0 => sim.pointer_moved(bounds.width * 0.5, bounds.height * 0.5),
            30 => sim.pointer_moved(bounds.width * 0.25, bounds.height * 0.75),
            60 => sim.scrolled(t as f32 * 3.0),
            61 => sim.scrolled(t as f32 * 3.0 + 400.0),
            90 => sim.pointer_left(),
            _ => {}
        }
        sim.step(DT);
        check(sim);
    }
}

// ==================================================================================
// Invariants
// ==================================================================================

#[test]
fn positions_stay_within_margin_for_all_presets() {
    for preset in Preset::ALL {
        let params = FieldParams::for_preset(preset);
        let margin = params.boundary.margin();
        let bounds = Bounds::new(640.0, 480.0);
        let mut sim = Simulation::new(params, bounds, 400, 11);

        run_with_input(&mut sim, 600, |sim| {
            let store = sim.store();
            for i in 0..store.len() {
                assert!(
                    store.x[i] >= -margin && store.x[i] <= bounds.width + margin,
                    "{}: x[{}] = {} escaped",
                    preset,
                    i,
                    store.x[i]
                );
                assert!(
                    store.y[i] >= -margin && store.y[i] <= bounds.height + margin,
                    "{}: y[{}] = {} escaped",
                    preset,
                    i,
                    store.y[i]
                );
            }
        });
    }
}

#[test]
fn speed_never_exceeds_boosted_limit() {
    for preset in Preset::ALL {
        let params = FieldParams::for_preset(preset);
        let mut sim = Simulation::new(params, Bounds::new(800.0, 600.0), 400, 5);

        run_with_input(&mut sim, 600, |sim| {
            let limit = sim.speed_limit() + 1e-4;
            let store = sim.store();
            for i in 0..store.len() {
                assert!(store.speed(i) <= limit, "{}: speed {} > {}", preset, store.speed(i), limit);
            }
        });
    }
}

#[test]
fn grid_cells_never_exceed_capacity() {
    let params = FieldParams::swarm();
    let bounds = Bounds::new(300.0, 300.0);
    // Everything piled into a single cell
    let points: Vec<(f32, f32)> = (0..200).map(|i| (10.0 + (i % 5) as f32, 10.0 + (i / 50) as f32)).collect();
    let store = ParticleStore::from_points(&points);

    let mut grid = SpatialGrid::new(params.cell_size, params.max_per_cell, bounds);
    grid.build(&store.x, &store.y);

    assert!(grid.occupancy().all(|count| count <= params.max_per_cell));
    assert_eq!(grid.cell(0, 0).len(), params.max_per_cell);
    assert_eq!(grid.overflow(), 200 - params.max_per_cell);
    // First encountered wins
    assert_eq!(grid.cell(0, 0), (0..params.max_per_cell).collect::<Vec<_>>().as_slice());
}

#[test]
fn identical_inputs_give_identical_trajectories() {
    for preset in Preset::ALL {
        let bounds = Bounds::new(1280.0, 720.0);
        // Above the parallel threshold for the dense presets
        let mut a = Simulation::new(FieldParams::for_preset(preset), bounds, 1500, 99);
        let mut b = Simulation::new(FieldParams::for_preset(preset), bounds, 1500, 99);

        run_with_input(&mut a, 120, |_| {});
        run_with_input(&mut b, 120, |_| {});

        assert_eq!(a.store(), b.store(), "{} diverged", preset);
    }
}

#[test]
fn different_seeds_give_different_fields() {
    let bounds = Bounds::new(800.0, 600.0);
    let a = Simulation::new(FieldParams::swarm(), bounds, 100, 1);
    let b = Simulation::new(FieldParams::swarm(), bounds, 100, 2);
    assert_ne!(a.store().x, b.store().x);
}

#[test]
fn grid_dimensions_follow_resize() {
    let mut sim = Simulation::new(FieldParams::swarm(), Bounds::new(800.0, 600.0), 200, 3);
    let cell = sim.params().cell_size;

    for (w, h) in [(1024.0, 768.0), (375.0, 812.0), (1920.0, 1080.0), (61.0, 59.0)] {
        sim.resize(Bounds::new(w, h));
        let cols = (w / cell).ceil() as usize + 1;
        let rows = (h / cell).ceil() as usize + 1;
        assert_eq!((sim.grid().cols, sim.grid().rows), (cols, rows), "{}x{}", w, h);

        // The field keeps running on the new grid
        sim.step(DT);
        assert_eq!(sim.len(), 200);
    }
}

// ==================================================================================
// Scenarios
// ==================================================================================

#[test]
fn lone_particle_survives_ten_thousand_ticks() {
    for preset in Preset::ALL {
        let params = FieldParams::for_preset(preset);
        let margin = params.boundary.margin();
        let bounds = Bounds::new(500.0, 400.0);
        let store = ParticleStore::from_points(&[(250.0, 200.0)]);
        let mut sim = Simulation::with_store(params, bounds, store, 8);

        for _ in 0..10_000 {
            sim.step(DT);
        }

        let (x, y) = (sim.store().x[0], sim.store().y[0]);
        assert!(x.is_finite() && y.is_finite());
        assert!(x >= -margin && x <= bounds.width + margin, "{}: x = {}", preset, x);
        assert!(y >= -margin && y <= bounds.height + margin, "{}: y = {}", preset, y);
        assert!(sim.store().speed(0) <= sim.speed_limit() + 1e-4);
    }
}

#[test]
fn close_pair_separates_after_one_tick() {
    let params = FieldParams::swarm();
    let separation = params.flocking.map(|f| f.separation_dist).unwrap_or_default();
    assert!(separation > 0.0);

    // Across the whole crowding range, up to just below the separation distance
    for fraction in [0.05, 0.25, 0.5, 0.6, 0.75, 0.9, 0.95, 0.995] {
        let d = separation * fraction;
        let store = ParticleStore::from_points(&[(300.0, 300.0), (300.0 + d, 300.0)]);
        let mut sim = Simulation::with_store(params.clone(), Bounds::new(600.0, 600.0), store, 0);
        sim.step(DT);

        let s = sim.store();
        let after = ((s.x[1] - s.x[0]).powi(2) + (s.y[1] - s.y[0]).powi(2)).sqrt();
        assert!(after > d, "distance {} did not grow past {}", after, d);
    }
}

#[test]
fn pointer_on_top_of_particle_pushes_it_away() {
    for preset in Preset::ALL {
        let store = ParticleStore::from_points(&[(200.0, 200.0)]);
        let mut sim = Simulation::with_store(FieldParams::for_preset(preset), Bounds::new(400.0, 400.0), store, 0);

        sim.pointer_moved(200.0, 200.0);
        sim.step(DT);

        let s = sim.store();
        let (vx, vy) = (s.vx[0], s.vy[0]);
        let (ox, oy) = (s.x[0] - 200.0, s.y[0] - 200.0);
        assert!(vx * vx + vy * vy > 0.0, "{}: particle did not move", preset);
        assert!(vx * ox + vy * oy > 0.0, "{}: velocity points back at the pointer", preset);
    }
}

#[test]
fn nearby_pointer_pushes_directly_away() {
    let store = ParticleStore::from_points(&[(200.0, 200.0)]);
    let mut sim = Simulation::with_store(FieldParams::nebula(), Bounds::new(400.0, 400.0), store, 0);

    sim.pointer_moved(170.0, 200.0);
    sim.step(DT);

    let s = sim.store();
    assert!(s.vx[0] > 0.0);
    assert!(s.vy[0].abs() < 1e-4);
}

#[test]
fn boost_decays_monotonically_without_input() {
    for preset in Preset::ALL {
        let params = FieldParams::for_preset(preset);
        let decay = params.boost.decay;
        let cap = params.boost.cap;
        let mut sim = Simulation::new(params, Bounds::new(400.0, 300.0), 50, 4);

        sim.set_boost(cap);
        let mut previous = sim.boost();
        assert_eq!(previous, cap);

        for _ in 0..400 {
            sim.step(DT);
            let current = sim.boost();
            assert!(current <= previous, "{}: boost rose from {} to {}", preset, previous, current);
            if current > 0.0 {
                assert!((current - previous * decay).abs() < 1e-5);
            }
            previous = current;
        }
        assert_eq!(previous, 0.0, "{} boost never settled", preset);
    }
}

// ==================================================================================
// Frame driver
// ==================================================================================

#[test]
fn driver_lifecycle_on_display_list() {
    let mut driver = FrameDriver::new(FieldParams::warp(), 21);
    let mut list = DisplayList::new();
    let start = Instant::now();
    let frame = |n: u64| start + Duration::from_millis(16 * n);

    let viewport = Viewport::new(1280.0, 720.0, 2.0).unwrap();
    driver.mount(Some(&mut list), viewport, start).unwrap();

    for n in 1..=120 {
        if n == 40 {
            driver.handle_event(HostEvent::PointerMoved { x: 640.0, y: 360.0 }, frame(n));
        }
        if n == 60 {
            driver.handle_event(HostEvent::VisibilityChanged { visible: false }, frame(n));
        }
        if n == 80 {
            driver.handle_event(HostEvent::VisibilityChanged { visible: true }, frame(n));
        }

        let due = driver.scheduler_mut().take_due();
        assert_eq!(due.len(), 1);
        let outcome = driver.tick(due[0], frame(n), &mut list);
        let expected = if (60..80).contains(&n) { TickOutcome::Skipped } else { TickOutcome::Rendered };
        assert_eq!(outcome, expected, "frame {}", n);
    }

    assert_eq!(driver.stats().paused_frames, 20);
    assert_eq!(driver.stats().rendered_frames, 100);
    assert_eq!(driver.simulation().map(|s| s.len()), Some(1000));

    driver.destroy();
    assert_eq!(driver.state(), DriverState::Destroyed);
    assert!(driver.scheduler_mut().take_due().is_empty());
}
