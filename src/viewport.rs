// ============================================================================
// viewport.rs — Aviary
// One-time drawing-surface setup: reconciles logical size, device pixel
// ratio and backing-store resolution, and binds a context that draws in
// logical pixels.
// ============================================================================

use crate::error::{HarnessError, Result};
use crate::mapper::LogicalSize;
use crate::surface::{DrawingContext, SurfaceElement, SurfaceHost};

/// Largest backing-store side a surface may be given. Matches the default
/// wgpu 2D texture limit so every frame can be presented.
pub const MAX_BACKING_DIMENSION: u32 = 8192;

/// A configured drawing surface. Never resized after setup.
pub struct Viewport<C> {
    logical_width: u32,
    logical_height: u32,
    scale: f64,
    backing_width: u32,
    backing_height: u32,
    context: C,
}

impl<C: DrawingContext> Viewport<C> {
    /// Configure the element `surface_id` for high-density drawing.
    pub fn initialize<H>(host: &mut H, surface_id: &str) -> Result<Self>
    where
        H: SurfaceHost,
        H::Element: SurfaceElement<Context = C>,
    {
        let scale = sanitize_ratio(host.device_pixel_ratio());

        let element = host
            .element_by_id(surface_id)
            .ok_or_else(|| HarnessError::SurfaceNotFound(surface_id.to_string()))?;

        // Logical size must be captured before the backing store is touched
        let logical_width = element.width();
        let logical_height = element.height();

        let (backing_width, backing_height) =
            match (scaled(logical_width, scale), scaled(logical_height, scale)) {
                (Some(w), Some(h)) => (w, h),
                _ => {
                    return Err(HarnessError::ContextUnavailable(format!(
                        "{} (backing store {}x{} at scale {} exceeds {} pixels per side)",
                        surface_id, logical_width, logical_height, scale, MAX_BACKING_DIMENSION
                    )));
                }
            };
        element.set_width(backing_width);
        element.set_height(backing_height);
        element.set_display_size(logical_width, logical_height);

        let mut context = element
            .context_2d()
            .ok_or_else(|| HarnessError::ContextUnavailable(surface_id.to_string()))?;
        context.scale(scale, scale);

        log::info!(
            "Surface '{}' initialized: logical {}x{}, scale {:.2}, backing {}x{}",
            surface_id,
            logical_width,
            logical_height,
            scale,
            backing_width,
            backing_height
        );

        Ok(Self {
            logical_width,
            logical_height,
            scale,
            backing_width,
            backing_height,
            context,
        })
    }
}

impl<C> Viewport<C> {
    pub fn logical_width(&self) -> u32 {
        self.logical_width
    }

    pub fn logical_height(&self) -> u32 {
        self.logical_height
    }

    pub fn logical_size(&self) -> LogicalSize {
        LogicalSize::new(self.logical_width as f64, self.logical_height as f64)
    }

    pub fn scale(&self) -> f64 {
        self.scale
    }

    pub fn backing_size(&self) -> (u32, u32) {
        (self.backing_width, self.backing_height)
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn context_mut(&mut self) -> &mut C {
        &mut self.context
    }
}

fn sanitize_ratio(ratio: Option<f64>) -> f64 {
    match ratio {
        Some(r) if r.is_finite() && r >= 1.0 => r,
        _ => 1.0,
    }
}

/// `round(logical * scale)`, or `None` when it exceeds the backing-store limit.
fn scaled(logical: u32, scale: f64) -> Option<u32> {
    let backing = (logical as f64 * scale).round();
    (backing <= MAX_BACKING_DIMENSION as f64).then_some(backing as u32)
}
