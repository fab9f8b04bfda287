pub mod recognizer;
pub mod variant;
