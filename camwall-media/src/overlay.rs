//! Detection overlay drawing
//!
//! Every camera slot owns one [`OverlaySurface`] laid over its video. A
//! detection cycle clears the surface and paints the boxes in input order, so
//! later boxes cover earlier ones where they overlap.

use camwall_core::{BoundingBox, CctvId, Detection};
use serde::{Deserialize, Serialize};

/// RGBA color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const TRANSPARENT: Self = Self([0, 0, 0, 0]);
    pub const BLACK: Self = Self([0, 0, 0, 255]);
    pub const RED: Self = Self([255, 0, 0, 255]);
}

/// Surface dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SurfaceSize {
    pub width: u32,
    pub height: u32,
}

impl SurfaceSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub const VGA: Self = Self::new(640, 480);
}

/// Outline style for boxes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokeStyle {
    pub color: Rgba,
    pub line_width: f32,
}

/// How detections are painted
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayStyle {
    pub stroke: StrokeStyle,
    pub label_color: Rgba,
    /// Distance of the label baseline above the box
    pub label_offset: f32,
}

impl Default for OverlayStyle {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle {
                color: Rgba::RED,
                line_width: 2.0,
            },
            label_color: Rgba::BLACK,
            label_offset: 5.0,
        }
    }
}

/// Render target laid over one camera's video
pub trait OverlaySurface: Send + Sync {
    fn size(&self) -> SurfaceSize;

    /// Erase everything drawn so far
    fn clear(&mut self);

    /// Outline `rect`, stroke centred on its edges
    fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle);

    /// Draw `text` with its baseline starting at (`x`, `y`)
    fn fill_text(&mut self, text: &str, x: f32, y: f32, color: Rgba);
}

/// Creates the overlay surface for each slot when a grid is built
pub trait SurfaceProvider: Send + Sync {
    fn create_surface(&self, cctv_id: &CctvId) -> Box<dyn OverlaySurface>;

    /// The grid that owned `cctv_id`'s surface is gone
    fn release_surface(&self, _cctv_id: &CctvId) {}
}

/// Clear `surface` and paint `detections` in order.
///
/// The label is anchored at the box's first corner as sent, even when the
/// corners arrive swapped.
pub fn paint_detections(surface: &mut dyn OverlaySurface, detections: &[Detection], style: &OverlayStyle) {
    surface.clear();
    for detection in detections {
        let raw = &detection.bounding_box;
        surface.stroke_rect(&raw.normalized(), &style.stroke);
        surface.fill_text(
            &detection.label(),
            raw.x1,
            raw.y1 - style.label_offset,
            style.label_color,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        ops: Vec<String>,
    }

    impl OverlaySurface for Recorder {
        fn size(&self) -> SurfaceSize {
            SurfaceSize::VGA
        }

        fn clear(&mut self) {
            self.ops.push("clear".to_string());
        }

        fn stroke_rect(&mut self, rect: &BoundingBox, style: &StrokeStyle) {
            self.ops.push(format!(
                "rect {} {} {} {} w{}",
                rect.x1, rect.y1, rect.width(), rect.height(), style.line_width
            ));
        }

        fn fill_text(&mut self, text: &str, x: f32, y: f32, _color: Rgba) {
            self.ops.push(format!("text {} @{},{}", text, x, y));
        }
    }

    #[test]
    fn test_paint_order() {
        let detections = vec![
            Detection {
                bounding_box: BoundingBox::new(10.0, 20.0, 30.0, 60.0),
                class_id: 0,
            },
            Detection {
                bounding_box: BoundingBox::new(15.0, 25.0, 40.0, 45.0),
                class_id: 3,
            },
        ];
        let mut surface = Recorder::default();
        paint_detections(&mut surface, &detections, &OverlayStyle::default());
        assert_eq!(
            surface.ops,
            vec![
                "clear",
                "rect 10 20 20 40 w2",
                "text ID: 0 @10,15",
                "rect 15 25 25 20 w2",
                "text ID: 3 @15,20",
            ]
        );
    }

    #[test]
    fn test_label_follows_first_corner_of_swapped_box() {
        let detections = vec![Detection {
            bounding_box: BoundingBox::new(30.0, 60.0, 10.0, 20.0),
            class_id: 4,
        }];
        let mut surface = Recorder::default();
        paint_detections(&mut surface, &detections, &OverlayStyle::default());
        assert_eq!(
            surface.ops,
            vec!["clear", "rect 10 20 20 40 w2", "text ID: 4 @30,55"]
        );
    }

    #[test]
    fn test_empty_result_only_clears() {
        let mut surface = Recorder::default();
        paint_detections(&mut surface, &[], &OverlayStyle::default());
        assert_eq!(surface.ops, vec!["clear"]);
    }
}
