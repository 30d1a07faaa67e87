//! TUBE-EDITOR: keyboard-driven editor for segmented tube levels
//!
//! A level is a run of ring-shaped segments stacked into a tube. Each ring is
//! split into floors, each floor into planes, and each segment into sectors
//! along the depth axis. Every floor plane of every sector is a slot that is
//! either present or empty.
//!
//! Keys: M cycles granularity, V cycles the overlay, arrows move, Space
//! toggles a slot, Insert/PageUp and Delete/PageDown add and remove sectors
//! or segments, P saves, L loads, W/S scroll, B switches to the preview.

/// Version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

mod app;
mod config;
mod editor;
mod game;
mod geometry;
mod input;
mod mesh;
mod render;
mod world;

use std::path::PathBuf;
use clap::Parser;
use macroquad::prelude::*;
use app::{App, Flow};
use config::AppConfig;
use render::GpuMeshCache;
use world::{load_level, Level, SegmentTemplate};

#[derive(Parser, Debug)]
#[command(name = "tube-editor")]
#[command(about = "Editor and viewer for segmented tube levels", version)]
struct Cli {
    /// Level file to load at startup and to save to (overrides the config)
    level: Option<PathBuf>,

    /// Config file (default: <config dir>/tube-editor/config.ron)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Start from the built-in sample level
    #[arg(long)]
    sample: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: format!("TUBE-EDITOR v{}", VERSION),
        window_width: 800,
        window_height: 800,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

/// Pick the level to start with
fn startup_level(cli: &Cli, config: &AppConfig) -> Level {
    if cli.sample {
        log::info!("Starting from the sample level");
        return Level::sample();
    }

    let path = &config.level_path;
    if path.exists() {
        match load_level(path, &config.palette) {
            Ok(loaded) => {
                log::info!("Loaded level '{}' ({} segments)", path.display(), loaded.level.len());
                return loaded.level;
            }
            Err(e) => log::error!("Failed to load level '{}': {}", path.display(), e),
        }
    }

    match Level::blank(&config.blank_level) {
        Ok(level) => level,
        Err(e) => {
            log::warn!("Invalid blank level template ({}), using the default", e);
            match Level::blank(&SegmentTemplate::default()) {
                Ok(level) => level,
                Err(e) => unreachable!("default template is valid: {}", e),
            }
        }
    }
}

fn camera(config: &AppConfig) -> Camera3D {
    Camera3D {
        position: vec3(0.0, 0.0, config.camera.distance),
        target: vec3(0.0, 0.0, 0.0),
        up: vec3(0.0, 1.0, 0.0),
        fovy: config.camera.fovy.to_radians(),
        ..Default::default()
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    // Initialize crash logging FIRST (before any other code)
    #[cfg(not(target_arch = "wasm32"))]
    crashlog::setup!(crashlog::cargo_metadata!().capitalized(), false);

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = match AppConfig::resolve(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Failed to load config: {}", e);
            return;
        }
    };
    if let Some(level) = &cli.level {
        config.level_path = level.clone();
    }

    // Window close arrives as an input event so the mode loop decides
    prevent_quit();

    let level = startup_level(&cli, &config);
    let camera = camera(&config);
    let mut app = App::new(level, config);
    let mut cache = GpuMeshCache::new();
    let mut events = Vec::new();

    log::info!("=== TUBE-EDITOR v{} ===", VERSION);

    loop {
        events.clear();
        input::poll_events(&mut events);

        let mut quit = false;
        for event in &events {
            if app.handle_event(event) == Flow::Quit {
                quit = true;
                break;
            }
        }
        if quit {
            log::info!("Quit requested");
            break;
        }

        cache.release(&app.drain_released());

        {
            let frame = app.render();
            clear_background(render::clear_color(&frame));
            set_camera(&camera);
            cache.draw(&frame);
        }

        set_default_camera();
        draw_text(&app.status_line(), 10.0, 20.0, 20.0, WHITE);

        next_frame().await;
    }
}
