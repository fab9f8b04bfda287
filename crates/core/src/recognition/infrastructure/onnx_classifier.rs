/// Whole-image classifier using ONNX Runtime via `ort`.
///
/// Runs an ImageNet-style classification network over the full frame and
/// returns a single object carrying the top-k class candidates, no bounds.
use std::path::Path;

use crate::recognition::domain::recognizer::Recognizer;
use crate::shared::frame::Frame;
use crate::shared::observation::{ClassScore, DetectedObject};

use super::execution_provider::preferred_execution_providers;
use super::labels::class_label;
use super::math::{softmax, top_k};

/// Fallback input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 224;

/// Number of candidate labels carried per frame. The dispatcher reports
/// only the best one; the rest are available to downstream consumers.
const TOP_K: usize = 5;

/// ImageNet channel statistics used by the common classification backbones.
const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Whole-image classifier backed by an ONNX Runtime session.
pub struct OnnxClassifier {
    session: ort::session::Session,
    labels: Vec<String>,
    input_size: u32,
}

impl OnnxClassifier {
    /// Load a classification ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting
    /// NCHW). Falls back to 224 if the shape is dynamic or unreadable.
    /// A failure here is terminal for the classifier variant.
    pub fn new(model_path: &Path, labels: Vec<String>) -> Result<Self, Box<dyn std::error::Error>> {
        let session = ort::session::Session::builder()?
            .with_execution_providers(preferred_execution_providers())?
            .commit_from_file(model_path)?;

        let input_size = session
            .inputs()
            .first()
            .and_then(|input| {
                if let ort::value::ValueType::Tensor { ref shape, .. } = input.dtype() {
                    // shape is [N, C, H, W] — use H (square input expected)
                    if shape.len() >= 4 && shape[2] > 0 {
                        Some(shape[2] as u32)
                    } else {
                        None
                    }
                } else {
                    None
                }
            })
            .unwrap_or(DEFAULT_INPUT_SIZE);

        Ok(Self {
            session,
            labels,
            input_size,
        })
    }
}

impl Recognizer for OnnxClassifier {
    fn recognize(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<DetectedObject>, Box<dyn std::error::Error>> {
        // 1. Preprocess: stretch-resize + ImageNet normalize → NCHW float32
        let input_tensor = preprocess(frame, self.input_size);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Classifier model produced no outputs".into());
        }

        let tensor = outputs[0].try_extract_array::<f32>()?;
        let logits = tensor.as_slice().ok_or("Cannot get logits slice")?;
        if logits.is_empty() {
            return Err("Classifier model produced no class scores".into());
        }

        // 3. Rank classes
        let probs = softmax(logits);
        let candidates: Vec<ClassScore> = top_k(&probs, TOP_K)
            .into_iter()
            .map(|(idx, confidence)| ClassScore {
                label: class_label(&self.labels, idx),
                confidence: confidence.clamp(0.0, 1.0),
            })
            .collect();

        Ok(vec![DetectedObject {
            labels: candidates,
            bounds: None,
        }])
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Stretch-resize a frame to `target_size` × `target_size` and apply
/// ImageNet mean/std normalization.
///
/// Classification consumes the whole image, so aspect ratio is not
/// preserved (no letterboxing — that is the detector's concern).
fn preprocess(frame: &Frame, target_size: u32) -> ndarray::Array4<f32> {
    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;
    let target = target_size as usize;

    let mut tensor = ndarray::Array4::<f32>::zeros((1, 3, target, target));

    // Nearest-neighbor resize
    for y in 0..target {
        let src_y = (y * src_h / target).min(src_h - 1);
        for x in 0..target {
            let src_x = (x * src_w / target).min(src_w - 1);
            for c in 0..3 {
                let v = src[[src_y, src_x, c]] as f32 / 255.0;
                tensor[[0, c, y, x]] = (v - IMAGENET_MEAN[c]) / IMAGENET_STD[c];
            }
        }
    }

    tensor
}
