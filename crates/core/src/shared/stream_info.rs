use std::path::PathBuf;

/// Metadata for a frame stream.
///
/// Live sources (capture devices) report `total_frames = 0` and whatever
/// rate the device advertises; file-backed sources report their real length.
#[derive(Clone, Debug, PartialEq)]
pub struct StreamInfo {
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub total_frames: usize,
    pub source: Option<PathBuf>,
}

impl StreamInfo {
    /// Whether the stream has no known end (live capture).
    pub fn is_live(&self) -> bool {
        self.total_frames == 0
    }
}
