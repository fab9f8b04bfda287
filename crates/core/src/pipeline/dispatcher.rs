use crate::recognition::domain::recognizer::Recognizer;
use crate::shared::frame::Frame;
use crate::shared::observation::Observation;

/// Routes one frame at a time through the selected recognizer and turns its
/// raw objects into reportable observations.
///
/// For each recognized object, only the highest-confidence candidate label
/// survives; bounds are mapped from normalized to pixel coordinates using
/// the frame's own dimensions. The dispatcher holds no state across frames
/// beyond the recognizer itself.
pub struct FrameDispatcher {
    recognizer: Box<dyn Recognizer>,
}

impl FrameDispatcher {
    pub fn new(recognizer: Box<dyn Recognizer>) -> Self {
        Self { recognizer }
    }

    /// Run inference for one frame.
    ///
    /// An `Err` means the frame is dropped; it carries no effect on
    /// subsequent frames and the caller is expected to log and continue.
    pub fn dispatch(&mut self, frame: &Frame) -> Result<Vec<Observation>, Box<dyn std::error::Error>> {
        let objects = self.recognizer.recognize(frame)?;

        let mut observations = Vec::with_capacity(objects.len());
        for object in &objects {
            let Some(top) = object.top_label() else {
                log::warn!(
                    "Frame {}: skipping recognized object with no candidate labels",
                    frame.index()
                );
                continue;
            };

            observations.push(Observation {
                label: top.label.clone(),
                confidence: top.confidence,
                bounds: object
                    .bounds
                    .map(|b| b.to_pixels(frame.width(), frame.height())),
            });
        }

        Ok(observations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::observation::{ClassScore, DetectedObject, NormalizedRect, PixelRect};

    /// Scripted recognizer: returns each queued result once, in order.
    struct FakeRecognizer {
        results: Vec<Result<Vec<DetectedObject>, String>>,
        call_count: usize,
    }

    impl FakeRecognizer {
        fn new(results: Vec<Result<Vec<DetectedObject>, String>>) -> Self {
            Self {
                results,
                call_count: 0,
            }
        }
    }

    impl Recognizer for FakeRecognizer {
        fn recognize(
            &mut self,
            _frame: &Frame,
        ) -> Result<Vec<DetectedObject>, Box<dyn std::error::Error>> {
            let result = self.results[self.call_count % self.results.len()].clone();
            self.call_count += 1;
            result.map_err(|e| e.into())
        }
    }

    fn frame(index: usize) -> Frame {
        Frame::new(vec![0u8; 640 * 480 * 3], 640, 480, 3, index)
    }

    fn object(labels: &[(&str, f32)], bounds: Option<NormalizedRect>) -> DetectedObject {
        DetectedObject {
            labels: labels
                .iter()
                .map(|&(l, c)| ClassScore::new(l, c))
                .collect(),
            bounds,
        }
    }

    #[test]
    fn test_one_observation_per_detected_object() {
        let objects = vec![
            object(&[("cat", 0.9)], Some(NormalizedRect::new(0.1, 0.1, 0.2, 0.2))),
            object(&[("dog", 0.8)], Some(NormalizedRect::new(0.5, 0.5, 0.2, 0.2))),
            object(&[("bird", 0.7)], Some(NormalizedRect::new(0.7, 0.1, 0.1, 0.1))),
        ];
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![Ok(objects)])));

        let observations = dispatcher.dispatch(&frame(0)).unwrap();
        assert_eq!(observations.len(), 3);
    }

    #[test]
    fn test_only_highest_confidence_label_survives() {
        let objects = vec![object(&[("cat", 0.9), ("dog", 0.4)], None)];
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![Ok(objects)])));

        let observations = dispatcher.dispatch(&frame(0)).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].label, "cat");
        assert!((observations[0].confidence - 0.9).abs() < 1e-6);
    }

    #[test]
    fn test_bounds_mapped_to_pixel_space() {
        // Reference scenario: (0.25, 0.5, 0.1, 0.2) on 640x480 → (160, 240, 64, 96)
        let objects = vec![object(
            &[("cat", 0.9)],
            Some(NormalizedRect::new(0.25, 0.5, 0.1, 0.2)),
        )];
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![Ok(objects)])));

        let observations = dispatcher.dispatch(&frame(0)).unwrap();
        assert_eq!(
            observations[0].bounds,
            Some(PixelRect {
                x: 160,
                y: 240,
                width: 64,
                height: 96
            })
        );
    }

    #[test]
    fn test_classifier_shape_keeps_no_bounds() {
        let objects = vec![object(&[("tabby", 0.8), ("tiger cat", 0.1)], None)];
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![Ok(objects)])));

        let observations = dispatcher.dispatch(&frame(0)).unwrap();
        assert_eq!(observations.len(), 1);
        assert!(observations[0].bounds.is_none());
    }

    #[test]
    fn test_no_objects_no_observations() {
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![Ok(vec![])])));
        let observations = dispatcher.dispatch(&frame(0)).unwrap();
        assert!(observations.is_empty());
    }

    #[test]
    fn test_failure_does_not_poison_next_frame() {
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![
            Err("inference failed".to_string()),
            Ok(vec![object(&[("cat", 0.9)], None)]),
        ])));

        assert!(dispatcher.dispatch(&frame(0)).is_err());
        let observations = dispatcher.dispatch(&frame(1)).unwrap();
        assert_eq!(observations.len(), 1);
    }

    #[test]
    fn test_object_without_labels_is_skipped() {
        let objects = vec![
            object(&[], Some(NormalizedRect::new(0.1, 0.1, 0.2, 0.2))),
            object(&[("dog", 0.8)], None),
        ];
        let mut dispatcher = FrameDispatcher::new(Box::new(FakeRecognizer::new(vec![Ok(objects)])));

        let observations = dispatcher.dispatch(&frame(0)).unwrap();
        assert_eq!(observations.len(), 1);
        assert_eq!(observations[0].label, "dog");
    }
}
