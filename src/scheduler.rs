// ============================================================================
// scheduler.rs — Aviary
// Cooperative frame loop: clear, step, snapshot, draw, re-arm.
// ============================================================================

use std::cell::Cell;
use std::rc::Rc;

use crate::error::Result;
use crate::shapes::ShapeRenderer;
use crate::simulation::SimulationHandle;
use crate::surface::{DrawingContext, FramePacer};
use crate::viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    Running,
}

/// What a call to [`FrameScheduler::frame`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    /// Frame drawn and the next one requested from the host.
    Rearmed,
    /// Frame drawn, stop flag observed, loop not re-armed.
    Stopped,
    /// Scheduler was idle; nothing drawn.
    Idle,
}

/// Shared stop flag, checked before every re-arm.
#[derive(Clone, Debug, Default)]
pub struct StopHandle(Rc<Cell<bool>>);

impl StopHandle {
    pub fn stop(&self) {
        self.0.set(true);
    }

    pub fn is_stopped(&self) -> bool {
        self.0.get()
    }

    fn reset(&self) {
        self.0.set(false);
    }
}

/// Owns the simulation and the viewport for the lifetime of the loop.
pub struct FrameScheduler<S, C> {
    simulation: S,
    viewport: Viewport<C>,
    renderer: ShapeRenderer,
    state: SchedulerState,
    stop: StopHandle,
    frames: u64,
}

impl<S: SimulationHandle, C: DrawingContext> FrameScheduler<S, C> {
    pub fn new(simulation: S, viewport: Viewport<C>, renderer: ShapeRenderer) -> Self {
        Self {
            simulation,
            viewport,
            renderer,
            state: SchedulerState::Idle,
            stop: StopHandle::default(),
            frames: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    /// Frames completed since the last `start`.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn stop_handle(&self) -> StopHandle {
        self.stop.clone()
    }

    pub fn stop(&self) {
        self.stop.stop();
    }

    pub fn viewport(&self) -> &Viewport<C> {
        &self.viewport
    }

    pub fn simulation(&self) -> &S {
        &self.simulation
    }

    /// Direct access for host actions between frames (e.g. training).
    pub fn simulation_mut(&mut self) -> &mut S {
        &mut self.simulation
    }

    /// Idle -> Running; arms the first frame.
    pub fn start<P: FramePacer>(&mut self, pacer: &mut P) {
        if self.state == SchedulerState::Running {
            log::warn!("Frame loop already running");
            return;
        }
        self.state = SchedulerState::Running;
        self.stop.reset();
        self.frames = 0;
        pacer.request_frame();
        log::debug!("Frame loop started");
    }

    /// Run one iteration. On error the loop is left un-armed and idle.
    pub fn frame<P: FramePacer>(&mut self, pacer: &mut P) -> Result<FrameOutcome> {
        if self.state == SchedulerState::Idle {
            return Ok(FrameOutcome::Idle);
        }

        if let Err(err) = self.render_frame() {
            self.state = SchedulerState::Idle;
            return Err(err);
        }
        self.frames += 1;

        if self.stop.is_stopped() {
            self.state = SchedulerState::Idle;
            log::info!("Frame loop stopped after {} frames", self.frames);
            return Ok(FrameOutcome::Stopped);
        }

        pacer.request_frame();
        Ok(FrameOutcome::Rearmed)
    }

    fn render_frame(&mut self) -> Result<()> {
        let size = self.viewport.logical_size();
        self.viewport
            .context_mut()
            .clear_rect(0.0, 0.0, size.width, size.height);

        self.simulation.step()?;
        let snapshot = self.simulation.snapshot()?;

        let ctx = self.viewport.context_mut();
        for command in self.renderer.plan(&snapshot, size) {
            self.renderer.draw(ctx, command);
        }
        Ok(())
    }
}
