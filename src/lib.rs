/*
 * Flow Field - Module Definitions
 *
 * This file defines the module structure for the particle field. The
 * simulation core (store, grid, forces, integrator) has no dependency on
 * the window; the renderer draws onto the Surface trait, and only the app,
 * surface and ui modules touch nannou's drawing and windowing.
 */

// Re-export key components for easier access
pub use driver::{DriverState, FrameDriver, FrameHandle, FrameQueue, FrameScheduler, TickOutcome};
pub use error::FieldError;
pub use input::{EventKind, HostEvent};
pub use params::{BoundaryPolicy, DeviceTier, FieldParams, Preset};
pub use renderer::{RenderReport, Renderer, Surface};
pub use simulation::{Simulation, StepReport};
pub use spatial_grid::SpatialGrid;
pub use store::ParticleStore;
pub use surface::{DisplayList, DrawCommand};
pub use viewport::{Bounds, Viewport};

// Define modules
pub mod app;
pub mod debug;
pub mod driver;
pub mod error;
pub mod forces;
pub mod input;
pub mod integrator;
pub mod palette;
pub mod params;
pub mod renderer;
pub mod simulation;
pub mod spatial_grid;
pub mod store;
pub mod surface;
pub mod ui;
pub mod viewport;
