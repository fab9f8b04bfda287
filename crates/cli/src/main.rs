use std::path::{Path, PathBuf};
use std::process;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clap::Parser;

use scenewatch_core::pipeline::dispatcher::FrameDispatcher;
use scenewatch_core::pipeline::infrastructure::threaded_stream_executor::ThreadedStreamExecutor;
use scenewatch_core::pipeline::observation_reporter::LogReporter;
use scenewatch_core::pipeline::pipeline_logger::StdoutPipelineLogger;
use scenewatch_core::pipeline::watch_stream_use_case::WatchStreamUseCase;
use scenewatch_core::recognition::domain::recognizer::Recognizer;
use scenewatch_core::recognition::domain::variant::ModelVariant;
use scenewatch_core::recognition::infrastructure::labels::load_labels;
use scenewatch_core::recognition::infrastructure::model_resolver;
use scenewatch_core::recognition::infrastructure::onnx_classifier::OnnxClassifier;
use scenewatch_core::recognition::infrastructure::onnx_detector::OnnxDetector;
use scenewatch_core::shared::constants::{
    CLASSIFIER_MODEL_NAME, CLASSIFIER_MODEL_URL, DETECTOR_LABELS_NAME, DETECTOR_LABELS_URL,
    DETECTOR_MODEL_NAME, DETECTOR_MODEL_URL, IMAGE_EXTENSIONS, LABELS_NAME, LABELS_URL,
};
use scenewatch_core::video::domain::frame_source::FrameSource;
use scenewatch_core::video::infrastructure::ffmpeg_source::FfmpegSource;
use scenewatch_core::video::infrastructure::image_sequence_source::ImageSequenceSource;

/// Live object recognition over a video stream.
#[derive(Parser)]
#[command(name = "scenewatch")]
struct Cli {
    /// Input: video file, capture device (e.g. /dev/video0), image file,
    /// or directory of images.
    input: PathBuf,

    /// Inference pipeline: classifier or detector.
    #[arg(long, default_value = "detector")]
    variant: String,

    /// Detection confidence threshold (0.0-1.0).
    #[arg(long, default_value = "0.25")]
    confidence: f32,

    /// Stop after this many captured frames.
    #[arg(long)]
    max_frames: Option<usize>,

    /// Loop an image input forever instead of ending after one pass.
    #[arg(long)]
    loop_images: bool,

    /// Demuxer option as key=value (repeatable), e.g. video_size=640x480.
    #[arg(long = "input-option")]
    input_options: Vec<String>,

    /// Use a local ONNX model instead of the cached/downloaded one.
    #[arg(long)]
    model: Option<PathBuf>,

    /// Use a local class-label file (one label per line).
    #[arg(long)]
    labels: Option<PathBuf>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let variant: ModelVariant = cli.variant.parse()?;
    let recognizer = build_recognizer(variant, &cli)?;

    let mut source = open_source(&cli);
    let info = source.open()?;
    log::info!(
        "Stream: {}x{} @ {:.1} fps, variant: {variant}",
        info.width,
        info.height,
        info.fps
    );

    let cancelled = Arc::new(AtomicBool::new(false));
    let flag = cancelled.clone();
    ctrlc::set_handler(move || {
        log::info!("Interrupt received, stopping stream");
        flag.store(true, Ordering::Relaxed);
    })?;

    let mut use_case = WatchStreamUseCase::new(
        source,
        FrameDispatcher::new(recognizer),
        Box::new(LogReporter),
        Box::new(StdoutPipelineLogger::default()),
        Box::new(ThreadedStreamExecutor::new()),
        cli.max_frames,
        Some(cancelled),
    );
    let stats = use_case.execute(&info)?;

    log::info!(
        "Processed {} frames ({} dropped, {} failed), {} observations reported",
        stats.frames_captured,
        stats.frames_dropped,
        stats.frames_failed,
        stats.observations_reported
    );
    Ok(())
}

fn build_recognizer(
    variant: ModelVariant,
    cli: &Cli,
) -> Result<Box<dyn Recognizer>, Box<dyn std::error::Error>> {
    let (model_name, model_url, labels_name, labels_url) = match variant {
        ModelVariant::Classifier => (
            CLASSIFIER_MODEL_NAME,
            CLASSIFIER_MODEL_URL,
            LABELS_NAME,
            LABELS_URL,
        ),
        ModelVariant::Detector => (
            DETECTOR_MODEL_NAME,
            DETECTOR_MODEL_URL,
            DETECTOR_LABELS_NAME,
            DETECTOR_LABELS_URL,
        ),
    };

    let model_path = match &cli.model {
        Some(path) => path.clone(),
        None => {
            log::info!("Resolving model: {model_name}");
            let path = model_resolver::resolve(
                model_name,
                model_url,
                None,
                Some(Box::new(download_progress)),
            )?;
            eprintln!();
            path
        }
    };

    let labels_path = match &cli.labels {
        Some(path) => path.clone(),
        None => model_resolver::resolve(labels_name, labels_url, None, None)?,
    };
    let labels = load_labels(&labels_path)?;

    match variant {
        ModelVariant::Classifier => Ok(Box::new(OnnxClassifier::new(&model_path, labels)?)),
        ModelVariant::Detector => Ok(Box::new(OnnxDetector::new(
            &model_path,
            labels,
            cli.confidence,
        )?)),
    }
}

fn open_source(cli: &Cli) -> Box<dyn FrameSource> {
    if cli.input.is_dir() || is_image(&cli.input) {
        Box::new(ImageSequenceSource::new(&cli.input).with_looping(cli.loop_images))
    } else {
        let mut source = FfmpegSource::new(&cli.input);
        for option in &cli.input_options {
            // validate() guarantees the key=value shape
            let (key, value) = option.split_once('=').unwrap();
            source = source.with_option(key, value);
        }
        Box::new(source)
    }
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if !cli.input.exists() {
        return Err(format!("Input not found: {}", cli.input.display()).into());
    }
    cli.variant.parse::<ModelVariant>()?;
    if !(0.0..=1.0).contains(&cli.confidence) {
        return Err(format!(
            "Confidence must be between 0.0 and 1.0, got {}",
            cli.confidence
        )
        .into());
    }
    for option in &cli.input_options {
        if option.split_once('=').is_none() {
            return Err(format!("Input option must be key=value, got '{option}'").into());
        }
    }
    if let Some(model) = &cli.model {
        if !model.exists() {
            return Err(format!("Model file not found: {}", model.display()).into());
        }
    }
    if let Some(labels) = &cli.labels {
        if !labels.exists() {
            return Err(format!("Label file not found: {}", labels.display()).into());
        }
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn download_progress(downloaded: u64, total: u64) {
    if total > 0 {
        let pct = (downloaded as f64 / total as f64 * 100.0) as u32;
        eprint!("\rDownloading model... {pct}%");
    } else {
        eprint!("\rDownloading model... {downloaded} bytes");
    }
}
