/*
 * Flow Field
 *
 * A decorative particle field: a few hundred to a few thousand particles
 * drift through a turbulence field, flock with their grid neighbors, shy
 * away from the cursor and speed up while the user scrolls. Three presets
 * share one engine:
 * 1. swarm: flocking dots with cycling hues
 * 2. nebula: smoky particles that spring back home, joined by faint lines
 * 3. warp: radial star streaks flying out from the center
 *
 * Logging is controlled with RUST_LOG (default: info).
 */

use anyhow::Result;
use flowfield::app::{model, update};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init()?;

    nannou::app(model).update(update).run();

    Ok(())
}
