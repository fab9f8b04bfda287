/// A bounding box in normalized coordinates, `[0,1] × [0,1]`.
///
/// Origin is **top-left**, matching [`Frame`](crate::shared::frame::Frame)'s
/// row-major layout: `y = 0.0` is the top row of the image. Detection
/// backends that report bottom-left-origin boxes must call
/// [`flip_vertical`](NormalizedRect::flip_vertical) before the box enters
/// the pipeline.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NormalizedRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl NormalizedRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Clamp all coordinates so the rect lies within the unit square.
    pub fn clamped(self) -> Self {
        let x = self.x.clamp(0.0, 1.0);
        let y = self.y.clamp(0.0, 1.0);
        Self {
            x,
            y,
            width: self.width.clamp(0.0, 1.0 - x),
            height: self.height.clamp(0.0, 1.0 - y),
        }
    }

    /// Convert a bottom-left-origin rect (the convention of some vision
    /// frameworks) to top-left origin. Involutive: flipping twice returns
    /// the original rect.
    pub fn flip_vertical(self) -> Self {
        Self {
            y: 1.0 - self.y - self.height,
            ..self
        }
    }

    /// Scale into absolute pixel coordinates for a `width × height` frame.
    ///
    /// Coordinates are rounded to the nearest pixel; the result is clamped
    /// so it always lies within `[0, width] × [0, height]`, even for inputs
    /// slightly outside the unit square.
    pub fn to_pixels(self, frame_width: u32, frame_height: u32) -> PixelRect {
        let fw = frame_width as f32;
        let fh = frame_height as f32;

        let x = (self.x * fw).round().clamp(0.0, fw) as u32;
        let y = (self.y * fh).round().clamp(0.0, fh) as u32;
        let w = ((self.width * fw).round().max(0.0) as u32).min(frame_width - x);
        let h = ((self.height * fh).round().max(0.0) as u32).min(frame_height - y);

        PixelRect {
            x,
            y,
            width: w,
            height: h,
        }
    }
}

/// A bounding box in absolute pixel coordinates, top-left origin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// One candidate label for a detected object, with its confidence in [0,1].
#[derive(Clone, Debug, PartialEq)]
pub struct ClassScore {
    pub label: String,
    pub confidence: f32,
}

impl ClassScore {
    pub fn new(label: impl Into<String>, confidence: f32) -> Self {
        debug_assert!(
            (0.0..=1.0).contains(&confidence),
            "confidence must be within [0, 1]"
        );
        Self {
            label: label.into(),
            confidence,
        }
    }
}

/// One object recognized in a frame, before label selection.
///
/// Detection backends produce one of these per object, carrying every
/// candidate label above their internal floor. Whole-image classification is
/// the degenerate case: a single object with `bounds: None`.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectedObject {
    pub labels: Vec<ClassScore>,
    pub bounds: Option<NormalizedRect>,
}

impl DetectedObject {
    /// The highest-confidence candidate label, or `None` for an object with
    /// no candidates (which recognizers must not produce).
    pub fn top_label(&self) -> Option<&ClassScore> {
        self.labels.iter().max_by(|a, b| {
            a.confidence
                .partial_cmp(&b.confidence)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }
}

/// One reported recognition result: the winning label of a detected object,
/// its confidence, and — for detector output — the bounds in pixel space.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub label: String,
    pub confidence: f32,
    pub bounds: Option<PixelRect>,
}
