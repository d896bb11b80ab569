// ============================================================================
// raster.rs — Aviary
// Software drawing surface: an RGBA backing store with a canvas-style path
// API, scale transform and non-zero scanline fill sampled at pixel centres.
// ============================================================================

use std::f64::consts::TAU;

use image::{Rgba, RgbaImage};

use crate::surface::{DrawingContext, Rgb, SurfaceElement, SurfaceHost};
use crate::viewport::MAX_BACKING_DIMENSION;

const TRANSPARENT: Rgba<u8> = Rgba([0, 0, 0, 0]);

// ======================== Host ========================

/// A host exposing exactly one raster surface under a fixed id.
pub struct RasterHost {
    surface_id: String,
    device_pixel_ratio: Option<f64>,
    surface: RasterSurface,
}

impl RasterHost {
    pub fn new(surface_id: impl Into<String>, surface: RasterSurface) -> Self {
        Self {
            surface_id: surface_id.into(),
            device_pixel_ratio: None,
            surface,
        }
    }

    pub fn with_device_pixel_ratio(mut self, ratio: f64) -> Self {
        self.device_pixel_ratio = Some(ratio);
        self
    }

    pub fn surface(&self) -> &RasterSurface {
        &self.surface
    }
}

impl SurfaceHost for RasterHost {
    type Element = RasterSurface;

    fn device_pixel_ratio(&self) -> Option<f64> {
        self.device_pixel_ratio
    }

    fn element_by_id(&mut self, id: &str) -> Option<&mut RasterSurface> {
        (id == self.surface_id).then_some(&mut self.surface)
    }
}

// ======================== Surface ========================

/// Element state: backing-store attributes and the display-size override.
#[derive(Clone, Debug)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    display_size: Option<(u32, u32)>,
}

impl RasterSurface {
    /// A surface authored at `width`×`height` logical pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            display_size: None,
        }
    }

    pub fn display_size(&self) -> Option<(u32, u32)> {
        self.display_size
    }
}

impl SurfaceElement for RasterSurface {
    type Context = RasterContext;

    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn set_width(&mut self, width: u32) {
        self.width = width;
    }

    fn set_height(&mut self, height: u32) {
        self.height = height;
    }

    fn set_display_size(&mut self, width: u32, height: u32) {
        self.display_size = Some((width, height));
    }

    fn context_2d(&mut self) -> Option<RasterContext> {
        let fits = |side: u32| (1..=MAX_BACKING_DIMENSION).contains(&side);
        if !(fits(self.width) && fits(self.height)) {
            return None;
        }
        Some(RasterContext::new(self.width, self.height))
    }
}

// ======================== Context ========================

#[derive(Clone, Copy, Debug)]
struct Edge {
    x0: f64,
    y0: f64,
    x1: f64,
    y1: f64,
    winding: i32,
}

/// Canvas-style context drawing into an owned pixel buffer.
pub struct RasterContext {
    pixels: RgbaImage,
    scale: (f64, f64),
    // Device-space points, one vec per subpath
    subpaths: Vec<Vec<(f64, f64)>>,
}

impl RasterContext {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            pixels: RgbaImage::from_pixel(width, height, TRANSPARENT),
            scale: (1.0, 1.0),
            subpaths: Vec::new(),
        }
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    pub fn transform(&self) -> (f64, f64) {
        self.scale
    }

    /// Number of pixels with non-zero alpha.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.pixels().filter(|p| p.0[3] > 0).count()
    }

    fn to_device(&self, x: f64, y: f64) -> (f64, f64) {
        (x * self.scale.0, y * self.scale.1)
    }

    fn push_point(&mut self, point: (f64, f64)) {
        match self.subpaths.last_mut() {
            Some(subpath) => subpath.push(point),
            None => self.subpaths.push(vec![point]),
        }
    }

    fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::new();
        for subpath in &self.subpaths {
            if subpath.len() < 2 {
                continue;
            }
            // Fill closes every subpath implicitly
            let closing = std::iter::once(&subpath[0]);
            for (a, b) in subpath.iter().zip(subpath.iter().skip(1).chain(closing)) {
                let finite = a.0.is_finite() && a.1.is_finite() && b.0.is_finite() && b.1.is_finite();
                if !finite || a.1 == b.1 {
                    continue;
                }
                let (lo, hi, winding) = if a.1 < b.1 { (a, b, 1) } else { (b, a, -1) };
                edges.push(Edge {
                    x0: lo.0,
                    y0: lo.1,
                    x1: hi.0,
                    y1: hi.1,
                    winding,
                });
            }
        }
        edges
    }

    fn fill_span(&mut self, row: u32, x_start: f64, x_end: f64, color: Rgba<u8>) {
        let width = self.pixels.width() as f64;
        let first = (x_start - 0.5).ceil().max(0.0);
        let last = (x_end - 0.5).ceil().min(width);
        if first >= last {
            return;
        }
        for col in first as u32..last as u32 {
            self.pixels.put_pixel(col, row, color);
        }
    }
}

/// Rows whose centres fall in `[lo, hi)`, clipped to `0..limit`.
fn covered_rows(lo: f64, hi: f64, limit: u32) -> std::ops::Range<u32> {
    let first = (lo - 0.5).ceil().max(0.0);
    let last = (hi - 0.5).ceil().min(limit as f64);
    if first >= last {
        return 0..0;
    }
    first as u32..last as u32
}

impl DrawingContext for RasterContext {
    fn scale(&mut self, x: f64, y: f64) {
        self.scale.0 *= x;
        self.scale.1 *= y;
    }

    fn clear_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        let (ax, ay) = self.to_device(x, y);
        let (bx, by) = self.to_device(x + width, y + height);
        let rows = covered_rows(ay.min(by), ay.max(by), self.pixels.height());
        for row in rows {
            self.fill_span(row, ax.min(bx), ax.max(bx), TRANSPARENT);
        }
    }

    fn begin_path(&mut self) {
        self.subpaths.clear();
    }

    fn move_to(&mut self, x: f64, y: f64) {
        let point = self.to_device(x, y);
        self.subpaths.push(vec![point]);
    }

    fn line_to(&mut self, x: f64, y: f64) {
        let point = self.to_device(x, y);
        self.push_point(point);
    }

    fn close_path(&mut self) {
        let Some(first) = self.subpaths.last().and_then(|s| s.first().copied()) else {
            return;
        };
        self.push_point(first);
        self.subpaths.push(vec![first]);
    }

    fn arc(&mut self, x: f64, y: f64, radius: f64, start: f64, end: f64) {
        let radius = radius.max(0.0);
        let sweep = if end - start >= TAU {
            TAU
        } else {
            (end - start).rem_euclid(TAU)
        };

        let device_radius = radius * self.scale.0.abs().max(self.scale.1.abs());
        let segments = ((sweep * device_radius).ceil() as usize).clamp(8, 512);

        for i in 0..=segments {
            let angle = start + sweep * i as f64 / segments as f64;
            let point = self.to_device(x + radius * angle.cos(), y + radius * angle.sin());
            if i == 0 && self.subpaths.is_empty() {
                self.subpaths.push(vec![point]);
            } else {
                self.push_point(point);
            }
        }
    }

    fn fill(&mut self, color: Rgb) {
        let edges = self.edges();
        if edges.is_empty() {
            return;
        }

        let color = Rgba([color.0, color.1, color.2, 255]);
        let lo = edges.iter().map(|e| e.y0).fold(f64::INFINITY, f64::min);
        let hi = edges.iter().map(|e| e.y1).fold(f64::NEG_INFINITY, f64::max);

        let mut crossings: Vec<(f64, i32)> = Vec::new();
        for row in covered_rows(lo, hi, self.pixels.height()) {
            let yc = row as f64 + 0.5;
            crossings.clear();
            crossings.extend(edges.iter().filter(|e| e.y0 <= yc && yc < e.y1).map(|e| {
                let t = (yc - e.y0) / (e.y1 - e.y0);
                (e.x0 + t * (e.x1 - e.x0), e.winding)
            }));
            crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

            let mut winding = 0;
            let mut span_start = 0.0;
            for &(x, w) in &crossings {
                if winding == 0 {
                    span_start = x;
                }
                winding += w;
                if winding == 0 {
                    self.fill_span(row, span_start, x, color);
                }
            }
        }
    }
}
