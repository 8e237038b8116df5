//! Detection results delivered for overlay rendering

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Axis-aligned box in pixel coordinates of the camera frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x1: f32,
    /// Top edge
    pub y1: f32,
    /// Right edge
    pub x2: f32,
    /// Bottom edge
    pub y2: f32,
}

impl BoundingBox {
    /// Create a box from two corners
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Width (negative when the corners are swapped)
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    /// Height (negative when the corners are swapped)
    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Same box with `x1 <= x2` and `y1 <= y2`
    pub fn normalized(&self) -> Self {
        Self {
            x1: self.x1.min(self.x2),
            y1: self.y1.min(self.y2),
            x2: self.x1.max(self.x2),
            y2: self.y1.max(self.y2),
        }
    }
}

/// A single detected object
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    /// Box around the object
    #[serde(flatten)]
    pub bounding_box: BoundingBox,
    /// Model class of the object
    pub class_id: u32,
}

impl Detection {
    /// Text label drawn next to the box
    pub fn label(&self) -> String {
        format!("ID: {}", self.class_id)
    }
}

/// Detections for one camera in one detection cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionOverlayResult {
    /// Camera the detections belong to.
    ///
    /// Kept as a raw string: results for cameras outside the grid are expected and skipped.
    pub cctv_id: String,
    /// Detections in paint order
    #[serde(default)]
    pub detections: Vec<Detection>,
}

/// Parse a detection feed payload (a JSON array of results).
///
/// Only a payload that is not a JSON array is an error. An entry that does
/// not decode as a result is logged and dropped so the rest of the cycle
/// still renders.
pub fn parse_detection_feed(payload: &str) -> Result<Vec<DetectionOverlayResult>, serde_json::Error> {
    let entries: Vec<serde_json::Value> = serde_json::from_str(payload)?;
    let mut results = Vec::with_capacity(entries.len());
    for (position, entry) in entries.into_iter().enumerate() {
        match serde_json::from_value::<DetectionOverlayResult>(entry) {
            Ok(result) => results.push(result),
            Err(e) => warn!("Dropping detection feed entry {}: {}", position, e),
        }
    }
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_feed() {
        let payload = r#"[
            {"cctv_id": "CCTV1", "detections": [
                {"x1": 10, "y1": 20, "x2": 110, "y2": 220, "class_id": 0},
                {"x1": 5.5, "y1": 6.5, "x2": 7.5, "y2": 8.5, "class_id": 2}
            ]},
            {"cctv_id": "CCTV4"}
        ]"#;
        let results = parse_detection_feed(payload).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].detections.len(), 2);
        assert_eq!(results[0].detections[0].bounding_box.width(), 100.0);
        assert_eq!(results[0].detections[1].class_id, 2);
        assert!(results[1].detections.is_empty());
    }

    #[test]
    fn test_bad_entry_is_dropped() {
        let payload = r#"[
            {"cctv_id": "CCTV1", "detections": [{"x1": 1, "y1": 2, "x2": 3, "y2": 4, "class_id": 0}]},
            {"cctv_id": "CCTV2", "detections": [{"x1": 1, "y1": 2, "x2": 3, "y2": 4, "class_id": -1}]},
            {"detections": []},
            {"cctv_id": "CCTV3", "detections": []}
        ]"#;
        let results = parse_detection_feed(payload).unwrap();
        let ids: Vec<_> = results.iter().map(|r| r.cctv_id.as_str()).collect();
        assert_eq!(ids, vec!["CCTV1", "CCTV3"]);
    }

    #[test]
    fn test_non_array_is_error() {
        assert!(parse_detection_feed("{\"cctv_id\": \"CCTV1\"}").is_err());
        assert!(parse_detection_feed("[{").is_err());
    }

    #[test]
    fn test_label() {
        let det = Detection {
            bounding_box: BoundingBox::new(0.0, 0.0, 1.0, 1.0),
            class_id: 17,
        };
        assert_eq!(det.label(), "ID: 17");
    }

    #[test]
    fn test_normalized() {
        let b = BoundingBox::new(50.0, 40.0, 10.0, 20.0).normalized();
        assert_eq!(b, BoundingBox::new(10.0, 20.0, 50.0, 40.0));
    }
}
