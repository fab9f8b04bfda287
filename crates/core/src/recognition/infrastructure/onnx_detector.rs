/// Multi-class object detector using ONNX Runtime via `ort`.
///
/// Handles letterbox preprocessing, inference against a YOLOv8-style single
/// output head, NMS post-processing, and conversion of boxes back to
/// normalized frame coordinates.
use std::path::Path;

use crate::recognition::domain::recognizer::Recognizer;
use crate::shared::frame::Frame;
use crate::shared::observation::{ClassScore, DetectedObject, NormalizedRect};

use super::execution_provider::preferred_execution_providers;
use super::labels::class_label;
use super::math::nms_indices;

/// Fallback model input resolution when the model doesn't specify dimensions.
const DEFAULT_INPUT_SIZE: u32 = 640;

/// Default confidence threshold for detections.
pub const DEFAULT_CONFIDENCE: f32 = 0.25;

/// NMS IoU threshold.
const NMS_IOU_THRESH: f32 = 0.45;

/// Class scores below this never become candidate labels (the best class is
/// always kept regardless).
const CANDIDATE_SCORE_FLOOR: f32 = 0.10;

/// Object detector backed by an ONNX Runtime session.
pub struct OnnxDetector {
    session: ort::session::Session,
    labels: Vec<String>,
    confidence: f32,
    input_size: u32,
}

impl OnnxDetector {
    /// Load a detection ONNX model and prepare for inference.
    ///
    /// The input resolution is read from the model's input shape (expecting
    /// NCHW). Falls back to 640 if the shape is dynamic or unreadable.
    /// A failure here is terminal for the detector variant.
    pub fn new(
        model_path: &Path,
        labels: Vec<String>,
        confidence: f32,
    ) -> Result<Self, Box<dyn std::error::Error>> {
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
            confidence,
            input_size,
        })
    }
}

impl Recognizer for OnnxDetector {
    fn recognize(
        &mut self,
        frame: &Frame,
    ) -> Result<Vec<DetectedObject>, Box<dyn std::error::Error>> {
        let fw = frame.width() as f64;
        let fh = frame.height() as f64;

        // 1. Preprocess: letterbox + normalize → NCHW float32
        let (input_tensor, scale, pad_x, pad_y) = letterbox(frame, self.input_size);

        // 2. Inference
        let input_value = ort::value::Tensor::from_array(input_tensor)?;
        let outputs = self.session.run(ort::inputs![input_value])?;
        if outputs.len() == 0 {
            return Err("Detector model produced no outputs".into());
        }
        let tensor = outputs[0].try_extract_array::<f32>()?;
        let shape = tensor.shape();

        // Output shape is [1, 4+nc, num_detections] (transposed) or
        // [1, num_detections, 4+nc]. Handle both.
        let (num_dets, num_feats) = if shape.len() == 3 {
            if shape[1] < shape[2] {
                (shape[2], shape[1])
            } else {
                (shape[1], shape[2])
            }
        } else {
            return Err(format!("Unexpected detector output shape: {shape:?}").into());
        };
        if num_feats < 5 {
            return Err(format!("Detector output has no class scores: {shape:?}").into());
        }

        let data = tensor.as_slice().ok_or("Cannot get tensor slice")?;
        let transposed = shape[1] < shape[2];

        // 3. Parse candidate rows
        let mut raw_dets = Vec::new();
        for i in 0..num_dets {
            let row = row_at(data, i, num_dets, num_feats, transposed);

            let class_scores = &row[4..];
            let candidates = candidate_labels(class_scores, CANDIDATE_SCORE_FLOOR);
            let Some(&(_, best_score)) = candidates.first() else {
                continue;
            };
            if best_score < self.confidence {
                continue;
            }

            // Convert from letterbox coords back to original frame coords
            let bbox = unletterbox(row[0], row[1], row[2], row[3], scale, pad_x, pad_y);

            raw_dets.push(RawDetection {
                bbox,
                score: best_score,
                candidates,
            });
        }

        // 4. NMS
        let boxes: Vec<[f32; 4]> = raw_dets.iter().map(|d| d.bbox).collect();
        let scores: Vec<f32> = raw_dets.iter().map(|d| d.score).collect();
        let kept = nms_indices(&boxes, &scores, NMS_IOU_THRESH);

        // 5. Build objects with normalized bounds
        let mut objects = Vec::with_capacity(kept.len());
        for i in kept {
            let det = &raw_dets[i];
            let [x1, y1, x2, y2] = det.bbox;
            let bounds = NormalizedRect::new(
                (x1 as f64 / fw) as f32,
                (y1 as f64 / fh) as f32,
                ((x2 - x1) as f64 / fw) as f32,
                ((y2 - y1) as f64 / fh) as f32,
            )
            .clamped();

            let labels = det
                .candidates
                .iter()
                .map(|&(class_id, score)| ClassScore {
                    label: class_label(&self.labels, class_id),
                    confidence: score.clamp(0.0, 1.0),
                })
                .collect();

            objects.push(DetectedObject {
                labels,
                bounds: Some(bounds),
            });
        }

        Ok(objects)
    }
}

// ---------------------------------------------------------------------------
// Preprocessing
// ---------------------------------------------------------------------------

/// Letterbox-resize a frame to `target_size` × `target_size`.
///
/// Returns `(NCHW float32 tensor, scale, pad_x, pad_y)`.
fn letterbox(frame: &Frame, target_size: u32) -> (ndarray::Array4<f32>, f64, u32, u32) {
    let fw = frame.width() as f64;
    let fh = frame.height() as f64;
    let target = target_size as f64;

    let scale = (target / fw).min(target / fh);
    let new_w = (fw * scale).round() as u32;
    let new_h = (fh * scale).round() as u32;
    let pad_x = (target_size - new_w) / 2;
    let pad_y = (target_size - new_h) / 2;

    // Padded with 114/255 gray, YOLO convention
    let gray = 114.0f32 / 255.0;
    let mut tensor =
        ndarray::Array4::<f32>::from_elem((1, 3, target_size as usize, target_size as usize), gray);

    let src = frame.as_ndarray(); // [H, W, C] u8
    let src_h = frame.height() as usize;
    let src_w = frame.width() as usize;

    // Nearest-neighbor resize + copy into padded region
    for y in 0..new_h as usize {
        let src_y = ((y as f64 / scale) as usize).min(src_h - 1);
        for x in 0..new_w as usize {
            let src_x = ((x as f64 / scale) as usize).min(src_w - 1);
            let ty = pad_y as usize + y;
            let tx = pad_x as usize + x;
            for c in 0..3 {
                tensor[[0, c, ty, tx]] = src[[src_y, src_x, c]] as f32 / 255.0;
            }
        }
    }

    (tensor, scale, pad_x, pad_y)
}

// ---------------------------------------------------------------------------
// Output decoding
// ---------------------------------------------------------------------------

#[derive(Clone, Debug)]
struct RawDetection {
    /// `[x1, y1, x2, y2]` in frame pixel coordinates.
    bbox: [f32; 4],
    score: f32,
    /// `(class_id, score)` candidates, best first.
    candidates: Vec<(usize, f32)>,
}

/// Read detection row `i` from the flat output buffer, handling both the
/// `[1, feats, dets]` (transposed) and `[1, dets, feats]` layouts.
fn row_at(data: &[f32], i: usize, num_dets: usize, num_feats: usize, transposed: bool) -> Vec<f32> {
    if transposed {
        (0..num_feats).map(|f| data[f * num_dets + i]).collect()
    } else {
        data[i * num_feats..(i + 1) * num_feats].to_vec()
    }
}

/// Rank class scores and keep those at or above `floor`.
///
/// The best class is always included, so the result is non-empty for any
/// non-empty score slice.
fn candidate_labels(class_scores: &[f32], floor: f32) -> Vec<(usize, f32)> {
    let mut ranked: Vec<(usize, f32)> = class_scores.iter().copied().enumerate().collect();
    ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    let mut kept: Vec<(usize, f32)> = ranked.iter().copied().filter(|&(_, s)| s >= floor).collect();
    if kept.is_empty() {
        if let Some(&best) = ranked.first() {
            kept.push(best);
        }
    }
    kept
}

/// Map a center-format letterbox-space box back to frame pixel corners.
fn unletterbox(cx: f32, cy: f32, w: f32, h: f32, scale: f64, pad_x: u32, pad_y: u32) -> [f32; 4] {
    let x1 = ((cx as f64 - w as f64 / 2.0) - pad_x as f64) / scale;
    let y1 = ((cy as f64 - h as f64 / 2.0) - pad_y as f64) / scale;
    let x2 = ((cx as f64 + w as f64 / 2.0) - pad_x as f64) / scale;
    let y2 = ((cy as f64 + h as f64 / 2.0) - pad_y as f64) / scale;
    [x1 as f32, y1 as f32, x2 as f32, y2 as f32]
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
