// ============================================================================
// headless.rs — Aviary
// Windowless runner: drives the frame loop on a raster surface for a fixed
// number of frames.
// ============================================================================

use std::time::Instant;

use crate::config::AppConfig;
use crate::error::Result;
use crate::raster::{RasterHost, RasterSurface};
use crate::scheduler::{FrameOutcome, FrameScheduler};
use crate::shapes::{RenderStyle, ShapeRenderer};
use crate::surface::FramePacer;
use crate::viewport::Viewport;
use crate::world::FlockSimulation;

/// Stands in for the display refresh: at most one pending frame request.
#[derive(Debug, Default)]
pub struct PendingFrame {
    requested: bool,
}

impl PendingFrame {
    /// Consume the pending request, if any.
    pub fn take(&mut self) -> bool {
        std::mem::take(&mut self.requested)
    }
}

impl FramePacer for PendingFrame {
    fn request_frame(&mut self) {
        self.requested = true;
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HeadlessReport {
    pub frames: u64,
    pub backing_size: (u32, u32),
    /// Non-transparent pixels in the final frame.
    pub lit_pixels: usize,
    pub generation: usize,
}

pub fn run_headless(config: &AppConfig) -> Result<HeadlessReport> {
    let window = &config.window;
    let mut host = RasterHost::new(
        window.surface_id.clone(),
        RasterSurface::new(window.width, window.height),
    )
    .with_device_pixel_ratio(config.headless.device_pixel_ratio);

    let viewport = Viewport::initialize(&mut host, &window.surface_id)?;
    let simulation = FlockSimulation::new(&config.simulation);
    let renderer = ShapeRenderer::new(RenderStyle::from(&config.render));
    let mut scheduler = FrameScheduler::new(simulation, viewport, renderer);

    let total = config.headless.frames;
    let interval = config.headless.progress_interval;
    log::info!("Headless run started: {} frames", total);

    let started = Instant::now();
    let mut pacer = PendingFrame::default();
    if total > 0 {
        scheduler.start(&mut pacer);
    }

    while pacer.take() {
        if scheduler.frames() + 1 >= total as u64 {
            scheduler.stop();
        }
        let outcome = scheduler.frame(&mut pacer)?;

        let done = scheduler.frames();
        if interval > 0 && done > 0 && done % interval as u64 == 0 {
            let elapsed = started.elapsed().as_secs_f64().max(1e-6);
            log::info!(
                "Headless progress: {}/{} | fps={:.0} | generation {}",
                done,
                total,
                done as f64 / elapsed,
                scheduler.simulation().generation(),
            );
        }

        if outcome != FrameOutcome::Rearmed {
            break;
        }
    }

    let report = HeadlessReport {
        frames: scheduler.frames(),
        backing_size: scheduler.viewport().backing_size(),
        lit_pixels: scheduler.viewport().context().lit_pixels(),
        generation: scheduler.simulation().generation(),
    };
    log::info!(
        "Headless run finished: {} frames in {:.2}s, {} lit pixels",
        report.frames,
        started.elapsed().as_secs_f64(),
        report.lit_pixels
    );
    Ok(report)
}
