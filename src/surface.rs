// ============================================================================
// surface.rs — Aviary
// Host/surface contract: drawable elements, 2D contexts and frame pacing.
// ============================================================================

use serde::{Deserialize, Serialize};

/// Solid fill colour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    /// Normalized components, for GPU clear colours.
    pub fn to_f64(self) -> [f64; 3] {
        [
            self.0 as f64 / 255.0,
            self.1 as f64 / 255.0,
            self.2 as f64 / 255.0,
        ]
    }
}

/// The environment that owns drawable elements.
pub trait SurfaceHost {
    type Element: SurfaceElement;

    /// Physical pixels per logical pixel, if the host reports one.
    fn device_pixel_ratio(&self) -> Option<f64>;

    fn element_by_id(&mut self, id: &str) -> Option<&mut Self::Element>;
}

/// A drawable element with a mutable backing store.
///
/// `width`/`height` are the backing-store resolution. Before setup they
/// hold the logical size the element was authored with.
pub trait SurfaceElement {
    type Context: DrawingContext;

    fn width(&self) -> u32;
    fn height(&self) -> u32;
    fn set_width(&mut self, width: u32);
    fn set_height(&mut self, height: u32);

    /// On-screen size override, in logical pixels.
    fn set_display_size(&mut self, width: u32, height: u32);

    fn context_2d(&mut self) -> Option<Self::Context>;
}

/// Immediate-mode 2D drawing, canvas style.
///
/// Path coordinates pass through the current transform when they are
/// added, so a scale applied once at setup makes every later call work in
/// logical pixels.
pub trait DrawingContext {
    /// Multiply the current transform by a scale.
    fn scale(&mut self, x: f64, y: f64);

    /// Reset the rectangle to transparent.
    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64);

    fn begin_path(&mut self);
    fn move_to(&mut self, x: f64, y: f64);
    fn line_to(&mut self, x: f64, y: f64);
    fn close_path(&mut self);

    /// Clockwise circular arc from `start` to `end` (radians, +x axis is 0).
    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64);

    /// Fill the current path (non-zero winding) with a solid colour.
    fn fill(&mut self, color: Rgb);
}

/// The host's next-frame primitive: schedule one more frame callback
/// before the next repaint.
pub trait FramePacer {
    fn request_frame(&mut self);
}
