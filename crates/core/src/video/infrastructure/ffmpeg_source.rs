use std::path::{Path, PathBuf};

use crate::shared::frame::Frame;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Decodes frames from a video file or capture device via ffmpeg-next
/// (libavformat + libavcodec).
///
/// Converts each decoded frame to RGB24 and wraps it in a [`Frame`].
/// Capture devices (e.g. `/dev/video0`) are opened through the same demuxer
/// path; demuxer options such as `video_size` or `framerate` can be passed
/// with [`with_option`](FfmpegSource::with_option).
pub struct FfmpegSource {
    path: PathBuf,
    options: Vec<(String, String)>,
    input_ctx: Option<ffmpeg_next::format::context::Input>,
    decoder: Option<ffmpeg_next::decoder::Video>,
    scaler: Option<ffmpeg_next::software::scaling::Context>,
    video_stream_index: usize,
    width: u32,
    height: u32,
    frame_index: usize,
    flushing: bool,
    done: bool,
}

// Safety: FfmpegSource is only used from a single thread at a time.
// The raw pointers inside ffmpeg types are not shared across threads.
unsafe impl Send for FfmpegSource {}

impl FfmpegSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            options: Vec::new(),
            input_ctx: None,
            decoder: None,
            scaler: None,
            video_stream_index: 0,
            width: 0,
            height: 0,
            frame_index: 0,
            flushing: false,
            done: false,
        }
    }

    /// Add a demuxer option (passed through to avformat when opening).
    pub fn with_option(mut self, key: &str, value: &str) -> Self {
        self.options.push((key.to_string(), value.to_string()));
        self
    }

    fn try_receive(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let decoder = self.decoder.as_mut().ok_or("FfmpegSource: not opened")?;
        let scaler = self.scaler.as_mut().ok_or("FfmpegSource: not opened")?;

        let mut decoded = ffmpeg_next::util::frame::video::Video::empty();
        if decoder.receive_frame(&mut decoded).is_ok() {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&decoded, &mut rgb_frame)?;

            let pixels = extract_rgb_pixels(&rgb_frame, self.width, self.height);
            let frame = Frame::new(pixels, self.width, self.height, 3, self.frame_index);
            self.frame_index += 1;
            Ok(Some(frame))
        } else {
            Ok(None)
        }
    }
}

impl FrameSource for FfmpegSource {
    fn open(&mut self) -> Result<StreamInfo, Box<dyn std::error::Error>> {
        ffmpeg_next::init()?;

        let mut opts = ffmpeg_next::Dictionary::new();
        for (key, value) in &self.options {
            opts.set(key, value);
        }
        let ictx = ffmpeg_next::format::input_with_dictionary(&self.path, opts)?;

        let stream = ictx
            .streams()
            .best(ffmpeg_next::media::Type::Video)
            .ok_or("No video stream found")?;

        let video_stream_index = stream.index();
        let codec_ctx = ffmpeg_next::codec::context::Context::from_parameters(stream.parameters())?;
        let decoder = codec_ctx.decoder().video()?;

        let rate = stream.rate();
        let fps = if rate.denominator() != 0 {
            rate.numerator() as f64 / rate.denominator() as f64
        } else {
            0.0
        };

        let width = decoder.width();
        let height = decoder.height();

        let scaler = ffmpeg_next::software::scaling::Context::get(
            decoder.format(),
            width,
            height,
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )?;

        let info = StreamInfo {
            width,
            height,
            fps,
            // Live capture reports no length; clamp negatives from
            // containers without a frame count.
            total_frames: stream.frames().max(0) as usize,
            source: Some(self.path.clone()),
        };

        self.video_stream_index = video_stream_index;
        self.width = width;
        self.height = height;
        self.decoder = Some(decoder);
        self.scaler = Some(scaler);
        self.input_ctx = Some(ictx);
        self.frame_index = 0;
        self.flushing = false;
        self.done = false;

        Ok(info)
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.input_ctx.is_none() {
            return Err("FfmpegSource: not opened".into());
        }
        if self.done {
            return Ok(None);
        }

        loop {
            if let Some(frame) = self.try_receive()? {
                return Ok(Some(frame));
            }

            if self.flushing {
                self.done = true;
                return Ok(None);
            }

            // Feed the decoder one packet; loop back to drain it.
            let ictx = self.input_ctx.as_mut().unwrap();
            let Some((stream, packet)) = ictx.packets().next() else {
                let _ = self.decoder.as_mut().unwrap().send_eof();
                self.flushing = true;
                continue;
            };

            if stream.index() != self.video_stream_index {
                continue;
            }

            if self.decoder.as_mut().unwrap().send_packet(&packet).is_err() {
                continue;
            }
        }
    }

    fn close(&mut self) {
        self.input_ctx = None;
        self.decoder = None;
        self.scaler = None;
        self.done = true;
    }
}

/// Copies pixel data from an ffmpeg frame into a contiguous RGB buffer.
///
/// ffmpeg frames may have padding bytes at the end of each row
/// (stride > width*3); this strips the padding.
fn extract_rgb_pixels(
    rgb_frame: &ffmpeg_next::util::frame::video::Video,
    width: u32,
    height: u32,
) -> Vec<u8> {
    let stride = rgb_frame.stride(0);
    let data = rgb_frame.data(0);
    let w = width as usize;
    let h = height as usize;

    let mut pixels = Vec::with_capacity(w * h * 3);
    for row in 0..h {
        let row_start = row * stride;
        pixels.extend_from_slice(&data[row_start..row_start + w * 3]);
    }
    pixels
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn create_test_video(path: &Path, num_frames: usize, width: u32, height: u32, fps: f64) {
        ffmpeg_next::init().unwrap();

        let mut octx = ffmpeg_next::format::output(path).unwrap();

        let global_header = octx
            .format()
            .flags()
            .contains(ffmpeg_next::format::Flags::GLOBAL_HEADER);

        let codec = ffmpeg_next::encoder::find(ffmpeg_next::codec::Id::MPEG4).unwrap();
        let mut ost = octx.add_stream(Some(codec)).unwrap();

        let mut encoder_ctx = ffmpeg_next::codec::context::Context::new_with_codec(codec)
            .encoder()
            .video()
            .unwrap();

        encoder_ctx.set_width(width);
        encoder_ctx.set_height(height);
        encoder_ctx.set_format(ffmpeg_next::format::Pixel::YUV420P);
        encoder_ctx.set_time_base(ffmpeg_next::Rational(1, fps as i32));
        encoder_ctx.set_frame_rate(Some(ffmpeg_next::Rational(fps as i32, 1)));

        if global_header {
            encoder_ctx.set_flags(ffmpeg_next::codec::Flags::GLOBAL_HEADER);
        }

        let mut encoder = encoder_ctx
            .open_with(ffmpeg_next::Dictionary::new())
            .unwrap();
        ost.set_parameters(&encoder);

        octx.write_header().unwrap();

        let ost_time_base = octx.stream(0).unwrap().time_base();

        let mut scaler = ffmpeg_next::software::scaling::Context::get(
            ffmpeg_next::format::Pixel::RGB24,
            width,
            height,
            ffmpeg_next::format::Pixel::YUV420P,
            width,
            height,
            ffmpeg_next::software::scaling::Flags::BILINEAR,
        )
        .unwrap();

        for i in 0..num_frames {
            let mut rgb_frame = ffmpeg_next::util::frame::video::Video::new(
                ffmpeg_next::format::Pixel::RGB24,
                width,
                height,
            );
            let stride = rgb_frame.stride(0);
            let data = rgb_frame.data_mut(0);
            let value = ((i * 40) % 256) as u8;
            for row in 0..height as usize {
                for col in 0..width as usize {
                    let offset = row * stride + col * 3;
                    data[offset] = value;
                    data[offset + 1] = value;
                    data[offset + 2] = value;
                }
            }

            let mut yuv_frame = ffmpeg_next::util::frame::video::Video::empty();
            scaler.run(&rgb_frame, &mut yuv_frame).unwrap();
            yuv_frame.set_pts(Some(i as i64));

            encoder.send_frame(&yuv_frame).unwrap();

            let mut encoded = ffmpeg_next::Packet::empty();
            while encoder.receive_packet(&mut encoded).is_ok() {
                encoded.set_stream(0);
                encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
                encoded.write_interleaved(&mut octx).unwrap();
            }
        }

        encoder.send_eof().unwrap();
        let mut encoded = ffmpeg_next::Packet::empty();
        while encoder.receive_packet(&mut encoded).is_ok() {
            encoded.set_stream(0);
            encoded.rescale_ts(ffmpeg_next::Rational(1, fps as i32), ost_time_base);
            encoded.write_interleaved(&mut octx).unwrap();
        }

        octx.write_trailer().unwrap();
    }

    fn test_video_path(dir: &Path) -> PathBuf {
        dir.join("test.mp4")
    }

    #[test]
    fn test_open_returns_stream_info() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        let info = source.open().unwrap();
        assert_eq!(info.width, 160);
        assert_eq!(info.height, 120);
        assert!(info.fps > 0.0);
        assert_eq!(info.source, Some(path));
    }

    #[test]
    fn test_open_nonexistent_raises() {
        let mut source = FfmpegSource::new(Path::new("/nonexistent/test.mp4"));
        assert!(source.open().is_err());
    }

    #[test]
    fn test_next_frame_yields_correct_count() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        source.open().unwrap();

        let mut count = 0;
        while let Some(_frame) = source.next_frame().unwrap() {
            count += 1;
        }
        assert_eq!(count, 5);
    }

    #[test]
    fn test_frames_have_sequential_indices() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        source.open().unwrap();

        let mut expected = 0;
        while let Some(frame) = source.next_frame().unwrap() {
            assert_eq!(frame.index(), expected);
            expected += 1;
        }
    }

    #[test]
    fn test_frames_are_3_channel() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 5, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        source.open().unwrap();

        let frame = source.next_frame().unwrap().unwrap();
        assert_eq!(frame.channels(), 3);
        assert_eq!(frame.data().len(), (160 * 120 * 3) as usize);
    }

    #[test]
    fn test_next_frame_without_open_returns_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 1, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        assert!(source.next_frame().is_err());
    }

    #[test]
    fn test_exhausted_stream_keeps_returning_none() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 2, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        source.open().unwrap();
        while source.next_frame().unwrap().is_some() {}
        assert!(source.next_frame().unwrap().is_none());
    }

    #[test]
    fn test_close_idempotent() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_video_path(dir.path());
        create_test_video(&path, 1, 160, 120, 30.0);

        let mut source = FfmpegSource::new(&path);
        source.open().unwrap();
        source.close();
        source.close();
    }
}
