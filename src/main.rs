// ============================================================================
// main.rs — Aviary
// Entry point. Initializes logging, loads configuration, and runs either
// the windowed viewer or a headless batch.
// ============================================================================

use aviary::app::App;
use aviary::config::AppConfig;
use aviary::headless::run_headless;
use winit::event_loop::{ControlFlow, EventLoop};

fn main() {
    env_logger::init();

    let config = AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config: {}. Using defaults.", e);
        AppConfig::default()
    });

    if config.headless.enabled {
        if let Err(e) = run_headless(&config) {
            log::error!("Headless run failed: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let event_loop = match EventLoop::new() {
        Ok(event_loop) => event_loop,
        Err(e) => {
            log::error!("Failed to create event loop: {}", e);
            std::process::exit(1);
        }
    };
    event_loop.set_control_flow(ControlFlow::Wait);

    let mut app = App::new(config);
    if let Err(e) = event_loop.run_app(&mut app) {
        log::error!("Event loop error: {}", e);
        std::process::exit(1);
    }
    if app.take_setup_error().is_some() {
        std::process::exit(1);
    }
}
