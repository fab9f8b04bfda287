use crate::shared::frame::Frame;
use crate::shared::stream_info::StreamInfo;

/// Produces the stream of frames the pipeline consumes.
///
/// Pull-based: the capture loop calls [`next_frame`](FrameSource::next_frame)
/// as fast as it can hand frames to inference; a source that cannot keep
/// frames around (live capture) discards whatever arrives between calls.
/// Implementations handle I/O details (device, codec, container format).
pub trait FrameSource: Send {
    /// Opens the source and returns its stream metadata.
    fn open(&mut self) -> Result<StreamInfo, Box<dyn std::error::Error>>;

    /// Returns the next frame, or `None` when the stream has ended.
    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>>;

    /// Releases any resources held by the source.
    fn close(&mut self);
}
