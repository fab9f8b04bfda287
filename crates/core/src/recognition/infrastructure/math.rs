//! Shared math utilities for recognition backends.
//!
//! Provides bounding-box IoU, greedy NMS, and the softmax/top-k helpers the
//! classification path uses to turn logits into ranked class scores.

/// IoU between two bounding boxes represented as `[x1, y1, x2, y2]`.
pub fn bbox_iou(a: &[f32; 4], b: &[f32; 4]) -> f32 {
    let x1 = a[0].max(b[0]);
    let y1 = a[1].max(b[1]);
    let x2 = a[2].min(b[2]);
    let y2 = a[3].min(b[3]);

    let inter = (x2 - x1).max(0.0) * (y2 - y1).max(0.0);
    if inter == 0.0 {
        return 0.0;
    }

    let area_a = (a[2] - a[0]) * (a[3] - a[1]);
    let area_b = (b[2] - b[0]) * (b[3] - b[1]);
    inter / (area_a + area_b - inter)
}

/// Greedy NMS over parallel `boxes`/`scores` slices.
///
/// Returns the indices of the kept boxes, highest score first. A box is
/// suppressed when its IoU with any higher-scored kept box exceeds
/// `iou_thresh`.
pub fn nms_indices(boxes: &[[f32; 4]], scores: &[f32], iou_thresh: f32) -> Vec<usize> {
    debug_assert_eq!(boxes.len(), scores.len());

    let mut order: Vec<usize> = (0..boxes.len()).collect();
    order.sort_by(|&a, &b| {
        scores[b]
            .partial_cmp(&scores[a])
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    let mut keep = Vec::new();
    let mut suppressed = vec![false; boxes.len()];

    for (rank, &i) in order.iter().enumerate() {
        if suppressed[i] {
            continue;
        }
        keep.push(i);
        for &j in &order[rank + 1..] {
            if !suppressed[j] && bbox_iou(&boxes[i], &boxes[j]) > iou_thresh {
                suppressed[j] = true;
            }
        }
    }
    keep
}

/// Numerically stable softmax over raw logits.
pub fn softmax(logits: &[f32]) -> Vec<f32> {
    let max = logits.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|&l| (l - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// The `k` highest scores as `(index, score)` pairs, descending.
pub fn top_k(scores: &[f32], k: usize) -> Vec<(usize, f32)> {
    let mut indexed: Vec<(usize, f32)> = scores.iter().copied().enumerate().collect();
    indexed.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    indexed.truncate(k);
    indexed
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_bbox_iou_no_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [20.0, 20.0, 30.0, 30.0];
        assert_eq!(bbox_iou(&a, &b), 0.0);
    }

    #[test]
    fn test_bbox_iou_perfect_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        assert!((bbox_iou(&a, &a) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_bbox_iou_partial_overlap() {
        let a = [0.0, 0.0, 10.0, 10.0];
        let b = [5.0, 5.0, 15.0, 15.0];
        let expected = 25.0 / 175.0;
        assert!((bbox_iou(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_nms_suppresses_overlapping() {
        let boxes = [[0.0, 0.0, 100.0, 100.0], [5.0, 5.0, 105.0, 105.0]];
        let scores = [0.9, 0.8];
        let kept = nms_indices(&boxes, &scores, 0.3);
        assert_eq!(kept, vec![0]);
    }

    #[test]
    fn test_nms_keeps_non_overlapping() {
        let boxes = [[0.0, 0.0, 50.0, 50.0], [200.0, 200.0, 250.0, 250.0]];
        let scores = [0.9, 0.8];
        let kept = nms_indices(&boxes, &scores, 0.3);
        assert_eq!(kept.len(), 2);
    }

    #[test]
    fn test_nms_orders_by_score() {
        let boxes = [[0.0, 0.0, 100.0, 100.0], [2.0, 2.0, 102.0, 102.0]];
        let scores = [0.5, 0.9];
        let kept = nms_indices(&boxes, &scores, 0.3);
        // Higher-scored box (index 1) wins even though it comes second.
        assert_eq!(kept, vec![1]);
    }

    #[test]
    fn test_nms_empty_input() {
        let kept = nms_indices(&[], &[], 0.3);
        assert!(kept.is_empty());
    }

    #[test]
    fn test_softmax_sums_to_one() {
        let probs = softmax(&[1.0, 2.0, 3.0]);
        let sum: f32 = probs.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_preserves_ordering() {
        let probs = softmax(&[0.1, 5.0, -3.0]);
        assert!(probs[1] > probs[0]);
        assert!(probs[0] > probs[2]);
    }

    #[test]
    fn test_softmax_handles_large_logits() {
        // Without max subtraction these would overflow to NaN.
        let probs = softmax(&[1000.0, 1001.0]);
        assert!(probs.iter().all(|p| p.is_finite()));
        assert!(probs[1] > probs[0]);
    }

    #[test]
    fn test_top_k_returns_descending() {
        let ranked = top_k(&[0.1, 0.9, 0.5], 2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0, 1);
        assert_eq!(ranked[1].0, 2);
    }

    #[test]
    fn test_top_k_larger_than_input() {
        let ranked = top_k(&[0.3, 0.7], 10);
        assert_eq!(ranked.len(), 2);
    }
}
