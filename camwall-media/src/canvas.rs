//! Software overlay canvas
//!
//! A CPU-side RGBA buffer implementing [`OverlaySurface`]. Box outlines are
//! rasterized; text is kept as positioned labels since glyph rendering is
//! left to whatever composites the canvas.

use crate::overlay::{OverlaySurface, Rgba, StrokeStyle, SurfaceProvider, SurfaceSize};
use camwall_core::{BoundingBox, CctvId};
use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Text drawn on a canvas
#[derive(Debug, Clone, PartialEq)]
pub struct TextLabel {
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub color: Rgba,
}

/// CPU-side overlay canvas
#[derive(Debug, Clone)]
pub struct SoftwareCanvas {
    size: SurfaceSize,
    pixels: Vec<Rgba>,
    labels: Vec<TextLabel>,
    clear_count: u64,
}

impl SoftwareCanvas {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            pixels: vec![Rgba::TRANSPARENT; (size.width as usize) * (size.height as usize)],
            labels: Vec::new(),
            clear_count: 0,
        }
    }

    /// Pixel at (`x`, `y`), `None` outside the canvas
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        Some(self.pixels[(y * self.size.width + x) as usize])
    }

    pub fn labels(&self) -> &[TextLabel] {
        &self.labels
    }

    /// Number of pixels that are not transparent
    pub fn painted_pixels(&self) -> usize {
        self.pixels.iter().filter(|p| **p != Rgba::TRANSPARENT).count()
    }

    /// How many times the canvas has been cleared
    pub fn clear_count(&self) -> u64 {
        self.clear_count
    }

    fn put(&mut self, x: u32, y: u32, color: Rgba) {
        let idx = (y * self.size.width + x) as usize;
        self.pixels[idx] = color;
    }
}

impl OverlaySurface for SoftwareCanvas {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn clear(&mut self) {
        self.pixels.fill(Rgba::TRANSPARENT);
        self.labels.clear();
        self.clear_count += 1;
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle) {
        if style.line_width <= 0.0 || self.size.width == 0 || self.size.height == 0 {
            return;
        }
        let half = style.line_width / 2.0;
        let rect = rect.normalized();
        let (ox1, oy1, ox2, oy2) = (rect.x1 - half, rect.y1 - half, rect.x2 + half, rect.y2 + half);
        let (ix1, iy1, ix2, iy2) = (rect.x1 + half, rect.y1 + half, rect.x2 - half, rect.y2 - half);

        // Pixel spans covered by the outer rectangle, clipped to the canvas.
        let clip = |lo: f32, hi: f32, max: u32| -> Option<(u32, u32)> {
            let start = (lo - 0.5).ceil().max(0.0);
            let end = ((hi - 0.5).floor()).min(max as f32 - 1.0);
            if end < start {
                None
            } else {
                Some((start as u32, end as u32))
            }
        };
        let (Some((x_start, x_end)), Some((y_start, y_end))) = (
            clip(ox1, ox2, self.size.width),
            clip(oy1, oy2, self.size.height),
        ) else {
            return;
        };

        for y in y_start..=y_end {
            let cy = y as f32 + 0.5;
            for x in x_start..=x_end {
                let cx = x as f32 + 0.5;
                let inside_inner = cx > ix1 && cx < ix2 && cy > iy1 && cy < iy2;
                if !inside_inner {
                    self.put(x, y, style.color);
                }
            }
        }
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba) {
        self.labels.push(TextLabel {
            text: text.to_string(),
            x,
            y,
            color,
        });
    }
}

/// Canvas shared between the grid (drawing) and the host (compositing)
#[derive(Debug, Clone)]
pub struct SharedCanvas(Arc<Mutex<SoftwareCanvas>>);

impl SharedCanvas {
    pub fn new(size: SurfaceSize) -> Self {
        Self(Arc::new(Mutex::new(SoftwareCanvas::new(size))))
    }

    /// Copy of the current canvas contents
    pub fn snapshot(&self) -> SoftwareCanvas {
        self.0.lock().clone()
    }
}

impl OverlaySurface for SharedCanvas {
    fn size(&self) -> SurfaceSize {
        self.0.lock().size()
    }

    fn clear(&mut self) {
        self.0.lock().clear();
    }

    fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle) {
        self.0.lock().stroke_rect(rect, style);
    }

    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba) {
        self.0.lock().fill_text(text, x, y, color);
    }
}

/// Hands out one [`SharedCanvas`] per camera and keeps a handle to each
#[derive(Debug, Clone)]
pub struct SoftwareCanvasProvider {
    size: SurfaceSize,
    canvases: Arc<RwLock<HashMap<CctvId, SharedCanvas>>>,
}

impl SoftwareCanvasProvider {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            canvases: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Canvas most recently created for `cctv_id`
    pub fn canvas(&self, cctv_id: &CctvId) -> Option<SharedCanvas> {
        self.canvases.read().get(cctv_id).cloned()
    }

    pub fn canvas_count(&self) -> usize {
        self.canvases.read().len()
    }
}

impl Default for SoftwareCanvasProvider {
    fn default() -> Self {
        Self::new(SurfaceSize::VGA)
    }
}

impl SurfaceProvider for SoftwareCanvasProvider {
    fn create_surface(&self, cctv_id: &CctvId) -> Box<dyn OverlaySurface> {
        let canvas = SharedCanvas::new(self.size);
        self.canvases.write().insert(cctv_id.clone(), canvas.clone());
        debug!("Created {}x{} canvas for {}", self.size.width, self.size.height, cctv_id);
        Box::new(canvas)
    }

    fn release_surface(&self, cctv_id: &CctvId) {
        if self.canvases.write().remove(cctv_id).is_some() {
            debug!("Released canvas for {}", cctv_id);
        }
    }
}
