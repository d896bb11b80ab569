// ============================================================================
// lib.rs — Aviary
// Real-time viewer for a foraging-flock simulation: drives the simulation
// one tick per display frame and paints its world on a 2D surface.
// ============================================================================

pub mod app;
pub mod config;
pub mod error;
pub mod headless;
pub mod heading;
pub mod mapper;
pub mod metrics;
pub mod pipeline;
pub mod raster;
pub mod scheduler;
pub mod shapes;
pub mod simulation;
pub mod surface;
pub mod viewport;
pub mod world;

pub use error::{HarnessError, Result};
