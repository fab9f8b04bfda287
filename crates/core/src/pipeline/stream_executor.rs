use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::pipeline::dispatcher::FrameDispatcher;
use crate::pipeline::observation_reporter::ObservationReporter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Configuration for a stream execution run.
pub struct StreamConfig {
    /// Stop after capturing this many frames. `None` runs until the source
    /// ends or the run is cancelled.
    pub max_frames: Option<usize>,
    pub cancelled: Arc<AtomicBool>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            max_frames: None,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }
}

/// Counters describing one completed stream run.
///
/// `frames_captured == frames_dropped + frames_dispatched + frames_failed`
/// always holds at the end of a run.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Frames the source produced.
    pub frames_captured: usize,
    /// Frames discarded because inference was still busy (drop-newest).
    pub frames_dropped: usize,
    /// Frames that completed inference.
    pub frames_dispatched: usize,
    /// Frames whose inference failed (logged and skipped).
    pub frames_failed: usize,
    /// Observations handed to the reporter.
    pub observations_reported: usize,
}

/// Abstracts how the capture → dispatch → report stream is executed.
///
/// This is a port (application-layer interface). Infrastructure provides
/// concrete implementations (e.g. threaded).
pub trait StreamExecutor: Send {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        dispatcher: FrameDispatcher,
        reporter: Box<dyn ObservationReporter>,
        logger: Box<dyn PipelineLogger>,
        info: &StreamInfo,
        config: StreamConfig,
    ) -> Result<StreamStats, Box<dyn std::error::Error>>;
}
