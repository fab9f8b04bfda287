use std::collections::HashMap;
use std::time::Instant;

/// Cross-cutting logger for stream orchestration events.
///
/// Decouples the executor from specific output mechanisms so callers can
/// observe pipeline behavior without changing the orchestration code.
pub trait PipelineLogger: Send {
    /// Report frame-level progress. `total` is 0 for live streams.
    fn progress(&mut self, current: usize, total: usize);

    /// Record how long a named pipeline stage took for one frame.
    fn timing(&mut self, stage: &str, duration_ms: f64);

    /// Record a point-in-time metric (e.g. dropped frames, object count).
    fn metric(&mut self, name: &str, value: f64);

    /// Log a human-readable status message.
    fn info(&mut self, message: &str);

    /// Emit an end-of-stream summary. Default: no-op.
    fn summary(&self) {}
}

/// Silent logger that discards all events.
pub struct NullPipelineLogger;

impl PipelineLogger for NullPipelineLogger {
    fn progress(&mut self, _current: usize, _total: usize) {}
    fn timing(&mut self, _stage: &str, _duration_ms: f64) {}
    fn metric(&mut self, _name: &str, _value: f64) {}
    fn info(&mut self, _message: &str) {}
}

/// CLI-oriented logger that tracks per-stage timing and metrics, and
/// provides a summary report when the stream ends.
///
/// Progress output is throttled to every `throttle_frames` frames to avoid
/// excessive I/O on long streams.
pub struct StdoutPipelineLogger {
    throttle_frames: usize,
    timings: HashMap<String, Vec<f64>>,
    metrics: HashMap<String, Vec<f64>>,
    start_time: Instant,
    frames_seen: usize,
    messages: Vec<String>,
}

impl StdoutPipelineLogger {
    pub fn new(throttle_frames: usize) -> Self {
        Self {
            throttle_frames: throttle_frames.max(1),
            timings: HashMap::new(),
            metrics: HashMap::new(),
            start_time: Instant::now(),
            frames_seen: 0,
            messages: Vec::new(),
        }
    }

    /// Returns the formatted summary string, or `None` if no data recorded.
    pub fn summary_string(&self) -> Option<String> {
        if self.timings.is_empty() && self.metrics.is_empty() {
            return None;
        }

        let elapsed_ms = self.start_time.elapsed().as_secs_f64() * 1000.0;
        let frames = self.frames_seen;
        let mut lines = Vec::new();

        lines.push(format!(
            "Stream summary ({frames} frames, {:.1}s total):",
            elapsed_ms / 1000.0
        ));

        let mut stages: Vec<_> = self.timings.keys().collect();
        stages.sort();
        for stage in stages {
            let durations = &self.timings[stage];
            let total_ms: f64 = durations.iter().sum();
            let avg_ms = if durations.is_empty() {
                0.0
            } else {
                total_ms / durations.len() as f64
            };
            let pct = if elapsed_ms > 0.0 {
                total_ms / elapsed_ms * 100.0
            } else {
                0.0
            };
            lines.push(format!(
                "  {stage:12}: avg {avg_ms:6.1}ms  total {total_ms:7.0}ms  ({pct:4.1}%)"
            ));
        }

        let mut metric_names: Vec<_> = self.metrics.keys().collect();
        metric_names.sort();
        for name in metric_names {
            let values = &self.metrics[name];
            let last = values.last().copied().unwrap_or(0.0);
            lines.push(format!("  {name}: {last:.0}"));
        }

        if frames > 0 && elapsed_ms > 0.0 {
            let fps = frames as f64 / (elapsed_ms / 1000.0);
            lines.push(format!("  Throughput: {fps:.1} fps"));
        }

        Some(lines.join("\n"))
    }

    /// Returns the timing data for a given stage.
    pub fn timings_for(&self, stage: &str) -> Option<&[f64]> {
        self.timings.get(stage).map(|v| v.as_slice())
    }

    /// Returns the metric data for a given name.
    pub fn metrics_for(&self, name: &str) -> Option<&[f64]> {
        self.metrics.get(name).map(|v| v.as_slice())
    }
}

impl Default for StdoutPipelineLogger {
    fn default() -> Self {
        Self::new(10)
    }
}

impl PipelineLogger for StdoutPipelineLogger {
    fn progress(&mut self, current: usize, total: usize) {
        self.frames_seen = self.frames_seen.max(current);
        if current % self.throttle_frames != 0 && current != total {
            return;
        }
        if total > 0 {
            let pct = current as f64 / total as f64 * 100.0;
            log::info!("Processing: {current}/{total} frames ({pct:.1}%)");
        } else {
            // Live stream: no known end
            log::info!("Processing: {current} frames");
        }
    }

    fn timing(&mut self, stage: &str, duration_ms: f64) {
        self.timings
            .entry(stage.to_string())
            .or_default()
            .push(duration_ms);
    }

    fn metric(&mut self, name: &str, value: f64) {
        self.metrics
            .entry(name.to_string())
            .or_default()
            .push(value);
    }

    fn info(&mut self, message: &str) {
        self.messages.push(message.to_string());
        log::info!("{message}");
    }

    fn summary(&self) {
        if let Some(text) = self.summary_string() {
            log::info!("\n\n{text}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // --- NullPipelineLogger tests ---

    #[test]
    fn test_null_logger_all_methods_are_noop() {
        let mut logger = NullPipelineLogger;
        logger.progress(1, 10);
        logger.timing("infer", 5.0);
        logger.metric("frames_dropped", 3.0);
        logger.info("hello");
        logger.summary();
        // No panics = success
    }

    // --- StdoutPipelineLogger tests ---

    #[test]
    fn test_timing_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.timing("infer", 20.0);
        logger.timing("infer", 30.0);
        logger.timing("capture", 5.0);

        let infer = logger.timings_for("infer").unwrap();
        assert_eq!(infer.len(), 2);
        assert!((infer[0] - 20.0).abs() < f64::EPSILON);
        assert!((infer[1] - 30.0).abs() < f64::EPSILON);

        let capture = logger.timings_for("capture").unwrap();
        assert_eq!(capture.len(), 1);
    }

    #[test]
    fn test_metric_records_values() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.metric("frames_dropped", 3.0);
        logger.metric("frames_dropped", 7.0);

        let values = logger.metrics_for("frames_dropped").unwrap();
        assert_eq!(values.len(), 2);
        assert!((values[1] - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_summary_includes_timing_stages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frames_seen = 10;
        logger.timing("infer", 20.0);
        logger.timing("capture", 5.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("infer"));
        assert!(summary.contains("capture"));
        assert!(summary.contains("Stream summary"));
    }

    #[test]
    fn test_summary_reports_last_metric_value() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frames_seen = 5;
        logger.metric("frames_dropped", 3.0);
        logger.metric("frames_dropped", 9.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("frames_dropped: 9"));
    }

    #[test]
    fn test_summary_includes_fps() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.frames_seen = 100;
        logger.timing("infer", 10.0);

        let summary = logger.summary_string().unwrap();
        assert!(summary.contains("fps"));
    }

    #[test]
    fn test_empty_summary_returns_none() {
        let logger = StdoutPipelineLogger::new(10);
        assert!(logger.summary_string().is_none());
    }

    #[test]
    fn test_progress_tracks_frames_for_live_streams() {
        let mut logger = StdoutPipelineLogger::new(10);
        for i in 1..=20 {
            logger.progress(i, 0);
        }
        assert_eq!(logger.frames_seen, 20);
    }

    #[test]
    fn test_info_stores_messages() {
        let mut logger = StdoutPipelineLogger::new(10);
        logger.info("hello world");
        assert_eq!(logger.messages.len(), 1);
        assert_eq!(logger.messages[0], "hello world");
    }

    #[test]
    fn test_default_throttle() {
        let logger = StdoutPipelineLogger::default();
        assert_eq!(logger.throttle_frames, 10);
    }
}
