use std::path::{Path, PathBuf};

use crate::shared::constants::IMAGE_EXTENSIONS;
use crate::shared::frame::Frame;
use crate::shared::stream_info::StreamInfo;
use crate::video::domain::frame_source::FrameSource;

/// Serves still images as a frame stream.
///
/// Accepts a single image file or a directory (images sorted by file name).
/// The first image fixes the stream resolution; later images are resized to
/// match, keeping the fixed-resolution contract frame consumers rely on.
/// With `looping` enabled the sequence restarts at the end, which turns a
/// handful of stills into an unbounded soak stream.
pub struct ImageSequenceSource {
    path: PathBuf,
    looping: bool,
    files: Vec<PathBuf>,
    position: usize,
    frame_index: usize,
    width: u32,
    height: u32,
}

impl ImageSequenceSource {
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            looping: false,
            files: Vec::new(),
            position: 0,
            frame_index: 0,
            width: 0,
            height: 0,
        }
    }

    pub fn with_looping(mut self, looping: bool) -> Self {
        self.looping = looping;
        self
    }

    fn collect_files(path: &Path) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
        if path.is_file() {
            return Ok(vec![path.to_path_buf()]);
        }

        let mut files: Vec<PathBuf> = std::fs::read_dir(path)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| is_image(p))
            .collect();
        files.sort();

        if files.is_empty() {
            return Err(format!("No images found in {}", path.display()).into());
        }
        Ok(files)
    }
}

impl FrameSource for ImageSequenceSource {
    fn open(&mut self) -> Result<StreamInfo, Box<dyn std::error::Error>> {
        let files = Self::collect_files(&self.path)?;

        let first = image::open(&files[0])?.to_rgb8();
        self.width = first.width();
        self.height = first.height();
        self.files = files;
        self.position = 0;
        self.frame_index = 0;

        Ok(StreamInfo {
            width: self.width,
            height: self.height,
            fps: 0.0,
            total_frames: if self.looping { 0 } else { self.files.len() },
            source: Some(self.path.clone()),
        })
    }

    fn next_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        if self.files.is_empty() {
            return Err("ImageSequenceSource: not opened".into());
        }

        if self.position >= self.files.len() {
            if !self.looping {
                return Ok(None);
            }
            self.position = 0;
        }

        let path = &self.files[self.position];
        let mut rgb = image::open(path)?.to_rgb8();
        if rgb.width() != self.width || rgb.height() != self.height {
            rgb = image::imageops::resize(
                &rgb,
                self.width,
                self.height,
                image::imageops::FilterType::Triangle,
            );
        }

        let frame = Frame::new(
            rgb.into_raw(),
            self.width,
            self.height,
            3,
            self.frame_index,
        );
        self.position += 1;
        self.frame_index += 1;
        Ok(Some(frame))
    }

    fn close(&mut self) {
        self.files.clear();
        self.position = 0;
    }
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
