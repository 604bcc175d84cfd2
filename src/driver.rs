/*
 * Frame Driver Module
 *
 * This module owns the per-frame loop of one mounted particle field:
 * - mounting onto a host surface and building the simulation
 * - the listener registry for host events
 * - debounced resize handling
 * - pause and resume on visibility changes
 * - idle detection
 * - teardown
 *
 * Ticks are requested through a FrameScheduler, which hands out opaque
 * handles. Only the most recently scheduled handle is live; any other
 * handle reaching tick() is ignored, so a callback firing after cancel or
 * destroy does nothing.
 */

use std::time::{Duration, Instant};

use crate::debug::FrameStats;
use crate::error::FieldError;
use crate::input::{EventKind, HostEvent};
use crate::params::{DeviceTier, FieldParams};
use crate::renderer::{Renderer, Surface};
use crate::simulation::Simulation;
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DriverState {
    Idle,
    Running,
    Paused,
    Destroyed,
    // No surface could be acquired; nothing is ever drawn
    Disabled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FrameHandle(u64);

// Host abstraction over "call me back on the next frame"
pub trait FrameScheduler {
    fn schedule(&mut self) -> FrameHandle;
    fn cancel(&mut self, handle: FrameHandle);
}

// Scheduler for hosts that pull due frames themselves, like nannou's update
#[derive(Debug, Default)]
pub struct FrameQueue {
    next_id: u64,
    queued: Vec<FrameHandle>,
}

impl FrameQueue {
    pub fn new() -> Self {
        Self::default()
    }

    // Handles to run now; anything scheduled while running them waits for the next frame
    pub fn take_due(&mut self) -> Vec<FrameHandle> {
        std::mem::take(&mut self.queued)
    }

    pub fn pending(&self) -> usize {
        self.queued.len()
    }
}

impl FrameScheduler for FrameQueue {
    fn schedule(&mut self) -> FrameHandle {
        self.next_id += 1;
        let handle = FrameHandle(self.next_id);
        self.queued.push(handle);
        handle
    }

    fn cancel(&mut self, handle: FrameHandle) {
        self.queued.retain(|&queued| queued != handle);
    }
}

// Which host events the driver currently reacts to
#[derive(Debug, Default)]
pub struct ListenerRegistry {
    listeners: Vec<EventKind>,
}

impl ListenerRegistry {
    pub fn add(&mut self, kind: EventKind) {
        if !self.listens_to(kind) {
            self.listeners.push(kind);
        }
    }

    pub fn remove_all(&mut self) {
        self.listeners.clear();
    }

    pub fn listens_to(&self, kind: EventKind) -> bool {
        self.listeners.contains(&kind)
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }
}

// Coalesces a burst of resizes into one, applied after a quiet period
#[derive(Clone, Copy, Debug)]
pub struct ResizeDebounce {
    delay: Duration,
    pending: Option<(Viewport, Instant)>,
}

impl ResizeDebounce {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    // Every new request restarts the quiet period
    pub fn request(&mut self, viewport: Viewport, now: Instant) {
        self.pending = Some((viewport, now + self.delay));
    }

    pub fn take_due(&mut self, now: Instant) -> Option<Viewport> {
        match self.pending {
            Some((viewport, due)) if now >= due => {
                self.pending = None;
                Some(viewport)
            }
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    // Stale handle or the driver is not mounted
    Ignored,
    // Paused: no physics or drawing, next tick scheduled
    Skipped,
    Rendered,
}

pub struct FrameDriver<Q: FrameScheduler = FrameQueue> {
    state: DriverState,
    scheduler: Q,
    pending: Option<FrameHandle>,
    listeners: ListenerRegistry,
    resize: ResizeDebounce,
    params: FieldParams,
    seed: u64,
    simulation: Option<Simulation>,
    renderer: Renderer,
    last_frame: Option<Instant>,
    last_input: Option<Instant>,
    stats: FrameStats,
}

impl FrameDriver<FrameQueue> {
    pub fn new(params: FieldParams, seed: u64) -> Self {
        Self::with_scheduler(params, seed, FrameQueue::new())
    }
}

impl<Q: FrameScheduler> FrameDriver<Q> {
    pub fn with_scheduler(params: FieldParams, seed: u64, scheduler: Q) -> Self {
        let resize = ResizeDebounce::new(params.resize_debounce);
        Self {
            state: DriverState::Idle,
            scheduler,
            pending: None,
            listeners: ListenerRegistry::default(),
            resize,
            params,
            seed,
            simulation: None,
            renderer: Renderer::new(),
            last_frame: None,
            last_input: None,
            stats: FrameStats::default(),
        }
    }

    // Idle -> Running: size the surface, build the field, attach listeners, schedule the first tick
    pub fn mount<S: Surface + ?Sized>(
        &mut self,
        surface: Option<&mut S>,
        viewport: Viewport,
        now: Instant,
    ) -> Result<(), FieldError> {
        if self.state != DriverState::Idle {
            return Err(FieldError::NotIdle(self.state));
        }

        let surface = match surface {
            Some(surface) => surface,
            None => {
                // The caller reports the error
                self.state = DriverState::Disabled;
                return Err(FieldError::SurfaceUnavailable);
            }
        };
        surface.resize(viewport);

        let tier = DeviceTier::from_width(viewport.width);
        self.params.apply_tier(tier);
        let count = self.params.particle_count(tier);
        self.simulation = Some(Simulation::new(self.params.clone(), viewport.bounds(), count, self.seed));

        for kind in EventKind::ALL {
            self.listeners.add(kind);
        }

        self.pending = Some(self.scheduler.schedule());
        self.last_frame = Some(now);
        self.last_input = Some(now);
        self.state = DriverState::Running;

        log::info!(
            "Mounted {} field: {} particles on {}x{} ({:?})",
            self.params.preset,
            count,
            viewport.width,
            viewport.height,
            tier
        );
        Ok(())
    }

    pub fn handle_event(&mut self, event: HostEvent, now: Instant) {
        if !self.listeners.listens_to(event.kind()) {
            return;
        }
        let simulation = match self.simulation.as_mut() {
            Some(simulation) => simulation,
            None => return,
        };

        match event {
            HostEvent::PointerMoved { x, y } => {
                simulation.pointer_moved(x, y);
                self.last_input = Some(now);
            }
            HostEvent::PointerLeft => simulation.pointer_left(),
            HostEvent::Scrolled { offset } => {
                simulation.scrolled(offset);
                self.last_input = Some(now);
            }
            HostEvent::Resized(viewport) => self.resize.request(viewport, now),
            HostEvent::VisibilityChanged { visible } => {
                simulation.set_visible(visible);
                match (self.state, visible) {
                    (DriverState::Running, false) => {
                        log::debug!("Field hidden, pausing");
                        self.state = DriverState::Paused;
                    }
                    (DriverState::Paused, true) => {
                        log::debug!("Field visible, resuming");
                        self.state = DriverState::Running;
                        // The time spent hidden is not simulated
                        self.last_frame = Some(now);
                    }
                    _ => {}
                }
            }
        }
    }

    pub fn tick<S: Surface + ?Sized>(&mut self, handle: FrameHandle, now: Instant, surface: &mut S) -> TickOutcome {
        if self.pending != Some(handle) {
            return TickOutcome::Ignored;
        }
        self.pending = None;

        let simulation = match self.simulation.as_mut() {
            Some(simulation) => simulation,
            None => return TickOutcome::Ignored,
        };

        if let Some(viewport) = self.resize.take_due(now) {
            log::debug!("Applying resize to {}x{}", viewport.width, viewport.height);
            surface.resize(viewport);
            simulation.resize(viewport.bounds());
            self.renderer.reset_trails();
        }

        // Hidden: keep the clock fresh and the tick chain alive, nothing else
        if !simulation.is_visible() {
            self.last_frame = Some(now);
            self.stats.record_paused();
            self.pending = Some(self.scheduler.schedule());
            return TickOutcome::Skipped;
        }

        let dt = match self.last_frame {
            Some(last) => now.saturating_duration_since(last).as_secs_f32(),
            None => 0.0,
        }
        .min(self.params.max_frame_dt);
        self.last_frame = Some(now);

        let idle = match self.last_input {
            Some(last) => now.saturating_duration_since(last) >= self.params.idle_timeout,
            None => false,
        };
        if idle != simulation.is_idle() {
            log::debug!("Idle mode {}", if idle { "on" } else { "off" });
            simulation.set_idle(idle);
        }

        let step = simulation.step(dt);
        let render = self.renderer.render(simulation, surface);
        self.stats.record_frame(dt, step, render, simulation.boost(), idle);

        self.pending = Some(self.scheduler.schedule());
        TickOutcome::Rendered
    }

    // Cancel the pending tick and detach every listener in one step
    pub fn destroy(&mut self) {
        if let Some(handle) = self.pending.take() {
            self.scheduler.cancel(handle);
        }
        self.listeners.remove_all();
        self.resize.cancel();
        self.simulation = None;
        if self.state != DriverState::Destroyed {
            log::info!("Particle field destroyed after {} ticks", self.stats.ticks);
        }
        self.state = DriverState::Destroyed;
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn scheduler(&self) -> &Q {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut Q {
        &mut self.scheduler
    }

    pub fn pending_handle(&self) -> Option<FrameHandle> {
        self.pending
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.listeners
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.simulation.as_ref()
    }

    pub fn params(&self) -> &FieldParams {
        &self.params
    }

    pub fn stats(&self) -> &FrameStats {
        &self.stats
    }

    pub fn resize_pending(&self) -> bool {
        self.resize.is_pending()
    }
}
