//! Perception types and collaborator contracts
//!
//! The control core treats vision as opaque: a camera yields frames, a
//! detector turns a frame into scored bounding boxes. Model inference and
//! pixel handling live behind these traits.

use crate::error::Result;
use std::collections::HashMap;
use std::sync::Arc;

/// Target name routed to the dedicated face detector instead of the
/// general object detector (and exempt from class-label filtering).
pub const FACE_TARGET: &str = "face";

/// A single captured camera frame
#[derive(Clone, Debug)]
pub struct Frame {
    /// Frame width in pixels
    pub width: u32,

    /// Frame height in pixels
    pub height: u32,

    /// Raw pixel data; may be empty for synthetic frames
    pub data: Vec<u8>,
}

impl Frame {
    /// Create a frame without pixel payload
    pub fn empty(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: Vec::new(),
        }
    }

    /// Frame center in pixel coordinates
    pub fn center(&self) -> (f32, f32) {
        (self.width as f32 / 2.0, self.height as f32 / 2.0)
    }

    /// Frame area in square pixels
    pub fn area(&self) -> f32 {
        self.width as f32 * self.height as f32
    }
}

/// Axis-aligned bounding box in pixel coordinates
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub x_min: f32,
    pub y_min: f32,
    pub x_max: f32,
    pub y_max: f32,
}

impl BoundingBox {
    pub fn new(x_min: f32, y_min: f32, x_max: f32, y_max: f32) -> Self {
        Self {
            x_min,
            y_min,
            x_max,
            y_max,
        }
    }

    pub fn width(&self) -> f32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f32 {
        self.y_max - self.y_min
    }

    /// Horizontal center of the box
    pub fn center_x(&self) -> f32 {
        (self.x_min + self.x_max) / 2.0
    }

    /// Vertical center of the box
    pub fn center_y(&self) -> f32 {
        (self.y_min + self.y_max) / 2.0
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }
}

/// One detector hit for a frame. Ephemeral: not persisted across frames,
/// no identity tracking between cycles.
#[derive(Clone, Debug)]
pub struct Detection {
    /// Model class index
    pub class_id: u32,

    /// Confidence score in [0, 1]
    pub score: f32,

    /// Location in the frame
    pub bbox: BoundingBox,
}

/// Object detection collaborator. Must be cheap enough to call every
/// cycle; its latency bounds the achievable control-loop rate.
pub trait Detector: Send + Sync {
    /// Run inference on a frame, returning hits with `score >= threshold`
    /// ordered by descending score.
    fn detect(&self, frame: &Frame, threshold: f32) -> Result<Vec<Detection>>;

    /// Class label for a model class index, if the model carries labels
    fn label(&self, class_id: u32) -> Option<&str>;
}

/// Camera collaborator
pub trait Camera: Send {
    /// Whether the capture device is open
    fn is_open(&self) -> bool;

    /// Read the next frame. `Ok(None)` means no frame was available;
    /// callers degrade to vision-less operation for the cycle.
    fn read_frame(&mut self) -> Result<Option<Frame>>;

    /// Release the capture device
    fn release(&mut self);
}

/// The detector pair the controllers pick from
#[derive(Clone)]
pub struct Perception {
    pub object_detector: Arc<dyn Detector>,
    pub face_detector: Arc<dyn Detector>,
}

impl Perception {
    /// Detector for a target: the face target gets the dedicated face
    /// model, everything else the general object model.
    pub fn detector_for(&self, target: &str) -> Arc<dyn Detector> {
        if target == FACE_TARGET {
            Arc::clone(&self.face_detector)
        } else {
            Arc::clone(&self.object_detector)
        }
    }
}

/// Pick the detection to act on: the highest-scoring hit whose label
/// matches the target. The face target skips label filtering entirely
/// (the face model is single-class and unlabeled).
pub fn select_target(
    detections: &[Detection],
    detector: &dyn Detector,
    target: &str,
) -> Option<Detection> {
    if target == FACE_TARGET {
        detections.first().cloned()
    } else {
        detections
            .iter()
            .find(|d| detector.label(d.class_id) == Some(target))
            .cloned()
    }
}

/// Build a label table from (id, name) pairs
pub fn label_map<I, S>(entries: I) -> HashMap<u32, String>
where
    I: IntoIterator<Item = (u32, S)>,
    S: Into<String>,
{
    entries.into_iter().map(|(id, s)| (id, s.into())).collect()
}
