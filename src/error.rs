// ============================================================================
// error.rs — Aviary
// Error taxonomy for harness setup, simulation failures and GPU presentation.
// ============================================================================

use thiserror::Error;

use crate::config::ConfigError;
use crate::simulation::SimulationError;

#[derive(Error, Debug)]
pub enum HarnessError {
    #[error("Drawing surface not found: {0}")]
    SurfaceNotFound(String),

    #[error("Drawing context unavailable for surface: {0}")]
    ContextUnavailable(String),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Window error: {0}")]
    Window(String),

    #[error("GPU error: {0}")]
    Gpu(String),
}

pub type Result<T> = std::result::Result<T, HarnessError>;
