use std::fs;
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LabelError {
    #[error("failed to read label file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("label file {0} contains no labels")]
    Empty(PathBuf),
}

/// Load class labels from a plain-text file, one label per line.
///
/// Blank lines are skipped; surrounding whitespace is trimmed. The line
/// number (after skipping) is the class index the model outputs.
pub fn load_labels(path: &Path) -> Result<Vec<String>, LabelError> {
    let contents = fs::read_to_string(path).map_err(|e| LabelError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;

    let labels: Vec<String> = contents
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(String::from)
        .collect();

    if labels.is_empty() {
        return Err(LabelError::Empty(path.to_path_buf()));
    }
    Ok(labels)
}

/// Look up a class label by index, falling back to `class_<idx>` when the
/// model has more outputs than the label file has lines.
pub fn class_label(labels: &[String], idx: usize) -> String {
    labels
        .get(idx)
        .cloned()
        .unwrap_or_else(|| format!("class_{idx}"))
}
