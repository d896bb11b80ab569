// ============================================================================
// simulation.rs — Aviary
// The step/inspect interface the render loop drives, and the immutable
// per-frame world snapshot it reads.
// ============================================================================

use std::fmt::Debug;

use thiserror::Error;

use crate::heading::SimAngle;

/// Any failure raised while stepping or inspecting a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Simulation failure: {0}")]
pub struct SimulationError(pub String);

/// An opaque, synchronously driven simulation.
pub trait SimulationHandle {
    /// Value returned by `train`, only ever logged by callers.
    type Diagnostics: Debug;

    /// Advance the world by exactly one tick.
    fn step(&mut self) -> Result<(), SimulationError>;

    /// Read the current world state.
    fn snapshot(&self) -> Result<WorldSnapshot, SimulationError>;

    fn train(&mut self) -> Result<Self::Diagnostics, SimulationError>;
}

/// Stationary resource; coordinates are normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FoodEntity {
    pub x: f64,
    pub y: f64,
}

/// Oriented mobile entity; coordinates are normalized to `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AnimalEntity {
    pub x: f64,
    pub y: f64,
    pub rotation: SimAngle,
}

/// World state read once per frame and dropped once the frame is drawn.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct WorldSnapshot {
    pub foods: Vec<FoodEntity>,
    pub animals: Vec<AnimalEntity>,
}
