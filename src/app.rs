/*
 * Application Module
 *
 * This module wires the particle field into a nannou window. The window is
 * the host: its events become HostEvents for the frame driver, nannou's
 * update callback runs the due frame ticks, and the view callback replays
 * the recorded display list.
 *
 * Host mapping:
 * - cursor moved / left the window -> pointer move / leave
 * - mouse wheel -> a virtual scroll offset, accumulated here
 * - resize -> debounced resize; a zero-area window counts as hidden
 */

use std::time::Instant;

use clap::Parser;
use nannou::prelude::*;
use nannou::winit::event::{MouseScrollDelta, TouchPhase, WindowEvent};
use nannou_egui::Egui;

use crate::driver::{DriverState, FrameDriver};
use crate::input::HostEvent;
use crate::params::{FieldParams, Preset};
use crate::surface::DisplayList;
use crate::ui;
use crate::viewport::{draw_to_screen, Viewport};

// Pixels scrolled per wheel line
const LINE_HEIGHT: f32 = 40.0;

#[derive(Parser, Debug)]
#[command(about = "Decorative particle flow field")]
pub struct Args {
    /// Visual preset: swarm, nebula or warp
    #[arg(short, long, default_value = "swarm")]
    pub preset: Preset,
    /// Seed for the initial particle layout
    #[arg(short, long, default_value_t = 7)]
    pub seed: u64,
    /// Show the statistics overlay
    #[arg(long)]
    pub stats: bool,
    /// Initial window width in logical pixels
    #[arg(long, default_value_t = 1280)]
    pub width: u32,
    /// Initial window height in logical pixels
    #[arg(long, default_value_t = 800)]
    pub height: u32,
}

// Main model for the application
pub struct Model {
    pub driver: FrameDriver,
    pub display: DisplayList,
    pub egui: Option<Egui>,
    pub preset: Preset,
    pub hidden: bool,
    pub scroll_offset: f32,
}

pub fn model(app: &App) -> Model {
    let args = Args::parse();
    log::info!("Starting {} preset with seed {}", args.preset, args.seed);

    let mut driver = FrameDriver::new(FieldParams::for_preset(args.preset), args.seed);
    let mut display = DisplayList::new();
    let mut egui = None;

    let window_id = app
        .new_window()
        .title("Flow Field")
        .size(args.width, args.height)
        .view(view)
        .mouse_moved(mouse_moved)
        .mouse_exited(mouse_exited)
        .mouse_wheel(mouse_wheel)
        .resized(resized)
        .raw_event(raw_window_event)
        .build();

    let window = match window_id {
        Ok(id) => app.window(id),
        Err(err) => {
            log::error!("Failed to open a window: {:?}", err);
            None
        }
    };

    let now = Instant::now();
    match window {
        Some(window) => {
            let (w, h) = window.inner_size_points();
            let mounted = Viewport::new(w, h, window.scale_factor())
                .and_then(|viewport| driver.mount(Some(&mut display), viewport, now));
            if let Err(err) = mounted {
                log::warn!("{}", err);
            }
            if args.stats {
                egui = Some(Egui::from_window(&window));
            }
        }
        None => {
            let mounted = Viewport::new(args.width as f32, args.height as f32, 1.0)
                .and_then(|viewport| driver.mount::<DisplayList>(None, viewport, now));
            if let Err(err) = mounted {
                log::warn!("{}", err);
            }
        }
    }

    Model {
        driver,
        display,
        egui,
        preset: args.preset,
        hidden: false,
        scroll_offset: 0.0,
    }
}

// Run every frame tick that came due since the last update
pub fn update(_app: &App, model: &mut Model, _update: Update) {
    let now = Instant::now();
    let due = model.driver.scheduler_mut().take_due();
    for handle in due {
        model.driver.tick(handle, now, &mut model.display);
    }

    if let Some(egui) = model.egui.as_mut() {
        ui::update_overlay(egui, model.preset, model.driver.state(), model.driver.stats());
    }
}

pub fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();

    // The display list starts with its own background fill, which may be
    // translucent; nannou keeps the previous frame underneath it
    if model.driver.state() == DriverState::Disabled || model.display.is_empty() {
        if frame.nth() == 0 {
            draw.background().color(BLACK);
        }
    } else {
        model.display.replay(&draw, app.window_rect());
    }

    if let Err(err) = draw.to_frame(app, &frame) {
        log::error!("Failed to draw frame: {:?}", err);
    }

    if let Some(egui) = &model.egui {
        if let Err(err) = egui.draw_to_frame(&frame) {
            log::error!("Failed to draw overlay: {:?}", err);
        }
    }
}

pub fn mouse_moved(app: &App, model: &mut Model, pos: Point2) {
    let screen = draw_to_screen(pos, app.window_rect());
    model
        .driver
        .handle_event(HostEvent::PointerMoved { x: screen.x, y: screen.y }, Instant::now());
}

pub fn mouse_exited(_app: &App, model: &mut Model) {
    model.driver.handle_event(HostEvent::PointerLeft, Instant::now());
}

pub fn mouse_wheel(_app: &App, model: &mut Model, delta: MouseScrollDelta, _phase: TouchPhase) {
    match delta {
        MouseScrollDelta::LineDelta(_, y) => model.scroll_offset -= y * LINE_HEIGHT,
        MouseScrollDelta::PixelDelta(pos) => model.scroll_offset -= pos.y as f32,
    }
    model
        .driver
        .handle_event(HostEvent::Scrolled { offset: model.scroll_offset }, Instant::now());
}

pub fn resized(app: &App, model: &mut Model, size: Vec2) {
    let now = Instant::now();
    let dpr = app.main_window().scale_factor();

    match Viewport::new(size.x, size.y, dpr) {
        Ok(viewport) => {
            if model.hidden {
                model.hidden = false;
                model.driver.handle_event(HostEvent::VisibilityChanged { visible: true }, now);
            }
            model.driver.handle_event(HostEvent::Resized(viewport), now);
        }
        // Minimized
        Err(_) => {
            if !model.hidden {
                model.hidden = true;
                model.driver.handle_event(HostEvent::VisibilityChanged { visible: false }, now);
            }
        }
    }
}

// Handle raw window events for egui
pub fn raw_window_event(_app: &App, model: &mut Model, event: &WindowEvent) {
    if let Some(egui) = model.egui.as_mut() {
        egui.handle_raw_event(event);
    }
}
