use crate::shared::frame::Frame;
use crate::shared::observation::DetectedObject;

/// Domain interface for per-frame recognition.
///
/// One capability covers both pipelines: whole-image classification returns
/// a single object with no bounds, detection returns one object per hit.
/// Implementations may be stateful (e.g., a warmed-up session), hence
/// `&mut self`.
pub trait Recognizer: Send {
    fn recognize(&mut self, frame: &Frame) -> Result<Vec<DetectedObject>, Box<dyn std::error::Error>>;
}
