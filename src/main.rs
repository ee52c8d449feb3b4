mod catalog;
mod config;
mod executor;
mod matcher;
mod model;
mod state;
mod ui;

use std::env;
use std::path::PathBuf;
use anyhow::{Context, Result};
use calloop::EventLoop;
use calloop_wayland_source::WaylandSource;
use clap::Parser;
use log::info;
use smithay_client_toolkit::{
    shell::wlr_layer::{Anchor, KeyboardInteractivity, Layer},
    shell::WaylandSurface,
};
use wayland_client::{Connection, globals::registry_queue_init};
use crate::catalog::load_catalog;
use crate::config::{Settings, init_config_dir, load_settings, load_style, CONFIG_DIR_ENV};
use crate::state::AppState;
use crate::ui::render::Renderer;
use crate::ui::wayland::WaylandApp;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the entries catalog file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to the style file
    #[arg(long)]
    style: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    // 1. Config directory, settings and catalog
    let config_dir = init_config_dir(env::var_os(CONFIG_DIR_ENV).map(PathBuf::from))?;
    let settings = load_settings(&config_dir)?;

    let entries_path = args
        .config
        .unwrap_or_else(|| Settings::resolve(&config_dir, &settings.path.entries));
    let style_path = args
        .style
        .unwrap_or_else(|| Settings::resolve(&config_dir, &settings.path.style));
    info!(
        "Using settings {:?}, entries {:?}, style {:?}",
        Settings::resolve(&config_dir, &settings.path.config),
        entries_path,
        style_path
    );

    let catalog = load_catalog(&entries_path)?;
    let theme = load_style(&style_path);
    let input_field = catalog.input_field.clone();
    info!("Input field '{}' ({:?})", input_field.name, input_field.mode);

    // 2. Setup Wayland Connection & Event Loop
    let mut event_loop: EventLoop<WaylandApp> = EventLoop::try_new()?;
    let conn = Connection::connect_to_env().context("failed to connect to the Wayland compositor")?;
    let (globals, event_queue) = registry_queue_init::<WaylandApp>(&conn)?;
    let qh = event_queue.handle();

    // 3. Init State & UI
    let window = settings.window.clone();
    let app_state = AppState::new(
        catalog.into_entries(),
        settings.list_params(),
        settings.entries.start_index,
        settings.entries.window_start,
    );
    let renderer = Renderer::new(theme, window.clone(), input_field.display_text);
    let mut app = WaylandApp::new(&globals, &qh, app_state, renderer, window.width, window.height)?;

    // 4. Create Layer Surface, top-centre of the active output
    let surface = app.compositor_state.create_surface(&qh);
    let layer_surface = app.layer_shell_state.create_layer_surface(
        &qh,
        surface,
        Layer::Overlay,
        Some("launchbox"),
        None,
    );

    layer_surface.set_anchor(Anchor::TOP);
    layer_surface.set_margin(window.top_offset, 0, 0, 0);
    layer_surface.set_size(window.width, window.height);
    layer_surface.set_keyboard_interactivity(KeyboardInteractivity::Exclusive);
    layer_surface.commit();
    app.layer_surface = Some(layer_surface);

    event_loop
        .handle()
        .insert_source(WaylandSource::new(conn.clone(), event_queue), |_, queue, app| {
            queue.dispatch_pending(app)
        })
        .map_err(|e| anyhow::anyhow!("failed to register Wayland source: {}", e.error))?;

    // 5. Run Loop
    while !app.should_exit {
        event_loop.dispatch(None, &mut app)?;
    }

    Ok(())
}
