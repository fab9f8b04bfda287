use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::pipeline::dispatcher::FrameDispatcher;
use crate::pipeline::observation_reporter::ObservationReporter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

use super::stream_executor::{StreamConfig, StreamExecutor, StreamStats};

/// Orchestrates the full recognition stream.
///
/// Wires domain components together and delegates execution to a
/// `StreamExecutor`. This is a single-use struct: `execute` consumes the
/// owned components, so calling it twice will fail.
pub struct WatchStreamUseCase {
    source: Option<Box<dyn FrameSource>>,
    dispatcher: Option<FrameDispatcher>,
    reporter: Option<Box<dyn ObservationReporter>>,
    logger: Option<Box<dyn PipelineLogger>>,
    executor: Box<dyn StreamExecutor>,
    max_frames: Option<usize>,
    cancelled: Arc<AtomicBool>,
}

impl WatchStreamUseCase {
    pub fn new(
        source: Box<dyn FrameSource>,
        dispatcher: FrameDispatcher,
        reporter: Box<dyn ObservationReporter>,
        logger: Box<dyn PipelineLogger>,
        executor: Box<dyn StreamExecutor>,
        max_frames: Option<usize>,
        cancelled: Option<Arc<AtomicBool>>,
    ) -> Self {
        Self {
            source: Some(source),
            dispatcher: Some(dispatcher),
            reporter: Some(reporter),
            logger: Some(logger),
            executor,
            max_frames,
            cancelled: cancelled.unwrap_or_else(|| Arc::new(AtomicBool::new(false))),
        }
    }

    pub fn execute(&mut self, info: &StreamInfo) -> Result<StreamStats, Box<dyn std::error::Error>> {
        let config = StreamConfig {
            max_frames: self.max_frames,
            cancelled: self.cancelled.clone(),
        };

        self.executor.execute(
            self.source.take().ok_or("Stream already executed")?,
            self.dispatcher.take().ok_or("Stream already executed")?,
            self.reporter.take().ok_or("Stream already executed")?,
            self.logger.take().ok_or("Stream already executed")?,
            info,
            config,
        )
    }
}
