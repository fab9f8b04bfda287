use std::fmt;
use std::str::FromStr;

/// The inference pipeline selected for a run.
///
/// Chosen once at startup and immutable thereafter; the dispatcher never
/// switches variants mid-stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ModelVariant {
    /// Whole-image classification: at most one observation per frame.
    Classifier,
    /// Object detection: one observation per detected object.
    Detector,
}

impl fmt::Display for ModelVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelVariant::Classifier => write!(f, "classifier"),
            ModelVariant::Detector => write!(f, "detector"),
        }
    }
}

impl FromStr for ModelVariant {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "classifier" => Ok(ModelVariant::Classifier),
            "detector" => Ok(ModelVariant::Detector),
            other => Err(format!(
                "Model variant must be 'classifier' or 'detector', got '{other}'"
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_variants() {
        assert_eq!(
            "classifier".parse::<ModelVariant>().unwrap(),
            ModelVariant::Classifier
        );
        assert_eq!(
            "detector".parse::<ModelVariant>().unwrap(),
            ModelVariant::Detector
        );
    }

    #[test]
    fn test_parse_unknown_variant_errors() {
        let err = "yolov3".parse::<ModelVariant>().unwrap_err();
        assert!(err.contains("yolov3"));
    }

    #[test]
    fn test_display_round_trips() {
        for variant in [ModelVariant::Classifier, ModelVariant::Detector] {
            assert_eq!(variant.to_string().parse::<ModelVariant>(), Ok(variant));
        }
    }
}
