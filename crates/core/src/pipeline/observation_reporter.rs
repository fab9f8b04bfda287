use crate::shared::observation::Observation;

/// Consumes recognition results.
///
/// Fire-and-forget: `report` returns nothing and must not block, since the
/// executor calls it from a dedicated reporting thread that keeps pace with
/// inference.
pub trait ObservationReporter: Send {
    fn report(&mut self, frame_index: usize, observation: &Observation);
}

/// Reporter that logs each observation through the `log` facade.
pub struct LogReporter;

impl ObservationReporter for LogReporter {
    fn report(&mut self, frame_index: usize, observation: &Observation) {
        match observation.bounds {
            Some(b) => log::info!(
                "Frame {}: Object: {}, Confidence: {:.2}, Bounds: ({}, {}) {}x{}",
                frame_index,
                observation.label,
                observation.confidence,
                b.x,
                b.y,
                b.width,
                b.height
            ),
            None => log::info!(
                "Frame {}: Object: {}, Confidence: {:.2}",
                frame_index,
                observation.label,
                observation.confidence
            ),
        }
    }
}

/// Reporter that discards all observations (tests, throughput measurement).
pub struct NullReporter;

impl ObservationReporter for NullReporter {
    fn report(&mut self, _frame_index: usize, _observation: &Observation) {}
}
