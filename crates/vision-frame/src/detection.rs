//! Typed object detections

use serde::{Deserialize, Serialize};

/// Object class reported by the upstream detector
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectClass {
    Person,
    Bicycle,
    Motorcycle,
    Car,
    Truck,
    Bus,
    #[default]
    Unknown,
}

impl ObjectClass {
    /// Parse a detector label; unrecognized labels map to Unknown
    pub fn from_label(label: &str) -> Self {
        match label {
            "person" => Self::Person,
            "bicycle" => Self::Bicycle,
            "motorcycle" => Self::Motorcycle,
            "car" => Self::Car,
            "truck" => Self::Truck,
            "bus" => Self::Bus,
            _ => Self::Unknown,
        }
    }

    /// Canonical label string
    pub fn label(&self) -> &'static str {
        match self {
            Self::Person => "person",
            Self::Bicycle => "bicycle",
            Self::Motorcycle => "motorcycle",
            Self::Car => "car",
            Self::Truck => "truck",
            Self::Bus => "bus",
            Self::Unknown => "unknown",
        }
    }

    /// Vulnerable road users (pedestrians, cyclists)
    pub fn is_vulnerable(&self) -> bool {
        matches!(self, Self::Person | Self::Bicycle | Self::Motorcycle)
    }
}

/// Pixel-space bounding box (x1, y1) top-left, (x2, y2) bottom-right
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn new(x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Horizontal center in pixels
    pub fn center_x(&self) -> f32 {
        (self.x1 + self.x2) / 2.0
    }

    /// Vertical center in pixels
    pub fn center_y(&self) -> f32 {
        (self.y1 + self.y2) / 2.0
    }

    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }

    /// Inverted or zero-area boxes carry no usable geometry
    pub fn is_degenerate(&self) -> bool {
        self.x2 <= self.x1 || self.y2 <= self.y1
    }
}

/// One detected object, validated and defaulted at the ingestion boundary.
///
/// `track_id` must come from an upstream tracker; detections without one
/// are treated as an explicit untracked category rather than getting a
/// synthesized id, so track history never churns on unstable ids.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    /// Stable tracker-assigned id, if the upstream tracker provided one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub track_id: Option<u64>,

    /// Object class
    #[serde(default)]
    pub class: ObjectClass,

    /// Detection confidence in [0, 1]
    #[serde(default = "default_confidence")]
    pub confidence: f32,

    /// Pixel bounding box
    pub bbox: BoundingBox,

    /// Pre-computed metric distance, if the upstream stage supplied one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_m: Option<f32>,
}

fn default_confidence() -> f32 {
    1.0
}

impl Detection {
    /// Detection with defaulted confidence and no distance
    pub fn new(class: ObjectClass, bbox: BoundingBox) -> Self {
        Self {
            track_id: None,
            class,
            confidence: 1.0,
            bbox,
            distance_m: None,
        }
    }

    pub fn with_track_id(mut self, id: u64) -> Self {
        self.track_id = Some(id);
        self
    }

    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_distance(mut self, distance_m: f32) -> Self {
        self.distance_m = Some(distance_m);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_roundtrip() {
        for class in [
            ObjectClass::Person,
            ObjectClass::Bicycle,
            ObjectClass::Motorcycle,
            ObjectClass::Car,
            ObjectClass::Truck,
            ObjectClass::Bus,
            ObjectClass::Unknown,
        ] {
            assert_eq!(ObjectClass::from_label(class.label()), class);
        }
        assert_eq!(ObjectClass::from_label("traffic light"), ObjectClass::Unknown);
    }

    #[test]
    fn test_vulnerable_classes() {
        assert!(ObjectClass::Person.is_vulnerable());
        assert!(ObjectClass::Bicycle.is_vulnerable());
        assert!(ObjectClass::Motorcycle.is_vulnerable());
        assert!(!ObjectClass::Car.is_vulnerable());
        assert!(!ObjectClass::Unknown.is_vulnerable());
    }

    #[test]
    fn test_bbox_geometry() {
        let bbox = BoundingBox::new(100.0, 50.0, 200.0, 250.0);
        assert_eq!(bbox.center_x(), 150.0);
        assert_eq!(bbox.width(), 100.0);
        assert!(!bbox.is_degenerate());
        assert!(BoundingBox::new(10.0, 10.0, 10.0, 40.0).is_degenerate());
    }

    #[test]
    fn test_detection_defaults_on_deserialize() {
        let det: Detection =
            serde_json::from_str(r#"{"bbox": {"x1": 0.0, "y1": 0.0, "x2": 10.0, "y2": 10.0}}"#)
                .unwrap();
        assert_eq!(det.confidence, 1.0);
        assert_eq!(det.class, ObjectClass::Unknown);
        assert!(det.track_id.is_none());
        assert!(det.distance_m.is_none());
    }
}
