pub const CLASSIFIER_MODEL_NAME: &str = "mobilenetv2-12.onnx";
pub const CLASSIFIER_MODEL_URL: &str =
    "https://github.com/onnx/models/raw/main/validated/vision/classification/mobilenet/model/mobilenetv2-12.onnx";

pub const DETECTOR_MODEL_NAME: &str = "yolov8n.onnx";
pub const DETECTOR_MODEL_URL: &str =
    "https://github.com/ultralytics/assets/releases/download/v8.3.0/yolov8n.onnx";

pub const LABELS_NAME: &str = "imagenet_classes.txt";
pub const LABELS_URL: &str =
    "https://raw.githubusercontent.com/pytorch/hub/master/imagenet_classes.txt";

pub const DETECTOR_LABELS_NAME: &str = "coco_classes.txt";
pub const DETECTOR_LABELS_URL: &str =
    "https://raw.githubusercontent.com/amikelive/coco-labels/master/coco-labels-2014_2017.txt";

/// Capture resolution the pipeline is tuned for. Sources report their true
/// dimensions; these only seed defaults and the reference scenario tests.
pub const DEFAULT_FRAME_WIDTH: u32 = 640;
pub const DEFAULT_FRAME_HEIGHT: u32 = 480;

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tiff", "tif", "webp"];
