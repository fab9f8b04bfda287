use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::pipeline::dispatcher::FrameDispatcher;
use crate::pipeline::observation_reporter::ObservationReporter;
use crate::pipeline::pipeline_logger::PipelineLogger;
use crate::pipeline::stream_executor::{StreamConfig, StreamExecutor, StreamStats};
use crate::shared::frame::Frame;
use crate::shared::observation::Observation;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Executes the recognition stream with dedicated threads for capture and
/// reporting; inference runs on the calling thread.
///
/// Layout: `capture → [single-flight gate] → dispatch (main) → reporter`
///
/// The capture→dispatch hop combines an explicit busy flag with a
/// zero-capacity channel: a frame is committed only when no inference is in
/// flight, so at most one frame is ever being inferred. Frames produced
/// while the flag is set are dropped (drop-newest), counted, and
/// debug-logged. The dispatch→reporter hop is unbounded so reporting can
/// never stall inference.
pub struct ThreadedStreamExecutor;

impl ThreadedStreamExecutor {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ThreadedStreamExecutor {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamExecutor for ThreadedStreamExecutor {
    fn execute(
        &self,
        source: Box<dyn FrameSource>,
        mut dispatcher: FrameDispatcher,
        reporter: Box<dyn ObservationReporter>,
        mut logger: Box<dyn PipelineLogger>,
        info: &StreamInfo,
        config: StreamConfig,
    ) -> Result<StreamStats, Box<dyn std::error::Error>> {
        let total = info.total_frames;

        let (frame_tx, frame_rx) = crossbeam_channel::bounded::<Frame>(0);
        let (obs_tx, obs_rx) = crossbeam_channel::unbounded::<(usize, Observation)>();

        // Set by the capture thread when it commits a frame, cleared by the
        // dispatch loop when that frame's inference has completed.
        let busy = Arc::new(AtomicBool::new(false));

        let capture_handle = spawn_capture(
            source,
            frame_tx,
            busy.clone(),
            config.cancelled.clone(),
            config.max_frames,
        );
        let reporter_handle = spawn_reporter(reporter, obs_rx);

        let mut frames_dispatched: usize = 0;
        let mut frames_failed: usize = 0;

        for frame in frame_rx {
            if config.cancelled.load(Ordering::Relaxed) {
                break;
            }

            let start = Instant::now();
            match dispatcher.dispatch(&frame) {
                Ok(observations) => {
                    frames_dispatched += 1;
                    for observation in observations {
                        if obs_tx.send((frame.index(), observation)).is_err() {
                            break;
                        }
                    }
                }
                Err(e) => {
                    frames_failed += 1;
                    log::warn!("Frame {}: inference failed: {e}", frame.index());
                }
            }
            busy.store(false, Ordering::Release);

            logger.timing("infer", start.elapsed().as_secs_f64() * 1000.0);
            logger.progress(frames_dispatched + frames_failed, total);
        }

        drop(obs_tx);

        join_threads(
            capture_handle,
            reporter_handle,
            frames_dispatched,
            frames_failed,
            logger.as_mut(),
        )
    }
}

struct CaptureOutcome {
    captured: usize,
    dropped: usize,
    error: Option<String>,
}

fn spawn_capture(
    mut source: Box<dyn FrameSource>,
    frame_tx: crossbeam_channel::Sender<Frame>,
    busy: Arc<AtomicBool>,
    cancelled: Arc<AtomicBool>,
    max_frames: Option<usize>,
) -> std::thread::JoinHandle<CaptureOutcome> {
    std::thread::spawn(move || {
        let mut captured: usize = 0;
        let mut dropped: usize = 0;
        let mut error = None;

        loop {
            if cancelled.load(Ordering::Relaxed) {
                break;
            }
            if max_frames.is_some_and(|n| captured >= n) {
                break;
            }

            let frame = match source.next_frame() {
                Ok(Some(frame)) => frame,
                Ok(None) => break,
                Err(e) => {
                    error = Some(e.to_string());
                    break;
                }
            };
            captured += 1;

            // Single-flight gate: claim the in-flight slot or drop the frame.
            if busy.swap(true, Ordering::AcqRel) {
                dropped += 1;
                log::debug!("Frame {}: dropped, inference busy", frame.index());
                continue;
            }

            if frame_tx.send(frame).is_err() {
                // Dispatch loop is gone; nothing more to do.
                break;
            }
        }

        source.close();
        CaptureOutcome {
            captured,
            dropped,
            error,
        }
    })
}

fn spawn_reporter(
    mut reporter: Box<dyn ObservationReporter>,
    obs_rx: crossbeam_channel::Receiver<(usize, Observation)>,
) -> std::thread::JoinHandle<usize> {
    std::thread::spawn(move || {
        let mut reported: usize = 0;
        for (frame_index, observation) in obs_rx {
            reporter.report(frame_index, &observation);
            reported += 1;
        }
        reported
    })
}

/// Joins the capture and reporter threads and coalesces the first error
/// encountered into the final result.
fn join_threads(
    capture_handle: std::thread::JoinHandle<CaptureOutcome>,
    reporter_handle: std::thread::JoinHandle<usize>,
    frames_dispatched: usize,
    frames_failed: usize,
    logger: &mut dyn PipelineLogger,
) -> Result<StreamStats, Box<dyn std::error::Error>> {
    fn set_if_none(slot: &mut Option<Box<dyn std::error::Error>>, err: Box<dyn std::error::Error>) {
        if slot.is_none() {
            *slot = Some(err);
        }
    }

    let mut first_error: Option<Box<dyn std::error::Error>> = None;

    let (frames_captured, frames_dropped) = match capture_handle.join() {
        Ok(outcome) => {
            if let Some(e) = outcome.error {
                set_if_none(&mut first_error, e.into());
            }
            (outcome.captured, outcome.dropped)
        }
        Err(_) => {
            set_if_none(&mut first_error, "Capture thread panicked".into());
            (0, 0)
        }
    };

    let observations_reported = match reporter_handle.join() {
        Ok(reported) => reported,
        Err(_) => {
            set_if_none(&mut first_error, "Reporter thread panicked".into());
            0
        }
    };

    logger.metric("frames_dropped", frames_dropped as f64);
    logger.summary();

    match first_error {
        Some(e) => Err(e),
        None => Ok(StreamStats {
            frames_captured,
            frames_dropped,
            frames_dispatched,
            frames_failed,
            observations_reported,
        }),
    }
}
