// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition engine seam.
//
// Engines report raw, engine-native output; `aggregate` reduces it to a single
// `(text, confidence)` pair on the 0–100 scale.

use image::{DynamicImage, ImageFormat};
use pagesift_core::error::{PagesiftError, Result};
use pagesift_core::types::{EngineKind, EngineStatus};

use tempfile::NamedTempFile;

use super::clean::clean_text;

/// Detections below this probability are dropped.
pub const MIN_DETECTION_PROBABILITY: f64 = 0.10;

/// One recognised word or line with its engine-native score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredToken {
    pub text: String,
    pub confidence: f64,
}

impl ScoredToken {
    pub fn new(text: impl Into<String>, confidence: f64) -> Self {
        Self {
            text: text.into(),
            confidence,
        }
    }
}

/// Raw engine output, tagged by how its scores are expressed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawRecognition {
    /// Word tokens with confidences on the 0–100 scale; non-positive values
    /// mark tokens the engine itself rejected. Blank tokens never count.
    Tokens(Vec<ScoredToken>),
    /// Detected text regions with probabilities in `[0, 1]`.
    Detections(Vec<ScoredToken>),
}

/// A recognition engine.
///
/// Implementations must be callable from several worker threads at once.
pub trait TextRecognizer: Send + Sync {
    fn kind(&self) -> EngineKind;

    /// Whether the engine can run at all (binary present, models loaded).
    fn is_available(&self) -> bool;

    fn status(&self) -> EngineStatus {
        let available = self.is_available();
        EngineStatus {
            engine: self.kind(),
            available,
            detail: if available { "available" } else { "unavailable" }.to_owned(),
        }
    }

    fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition>;
}

/// Write `image` to a temporary PNG for engines that read from disk. The file
/// is removed when the handle drops.
pub(crate) fn write_temp_png(image: &DynamicImage) -> Result<NamedTempFile> {
    let file = tempfile::Builder::new()
        .prefix("pagesift-")
        .suffix(".png")
        .tempfile()?;
    image
        .save_with_format(file.path(), ImageFormat::Png)
        .map_err(|err| PagesiftError::ImageError(format!("failed to write page image: {}", err)))?;
    Ok(file)
}

/// Reduce raw engine output to cleaned text and a mean confidence in
/// `[0, 100]`. Empty text always carries confidence 0.
pub fn aggregate(raw: &RawRecognition) -> (String, f64) {
    let kept: Vec<(&str, f64)> = match raw {
        RawRecognition::Tokens(tokens) => tokens
            .iter()
            .filter(|t| t.confidence > 0.0 && !t.text.trim().is_empty())
            .map(|t| (t.text.as_str(), t.confidence))
            .collect(),
        RawRecognition::Detections(detections) => detections
            .iter()
            .filter(|d| d.confidence >= MIN_DETECTION_PROBABILITY && !d.text.trim().is_empty())
            .map(|d| (d.text.as_str(), d.confidence * 100.0))
            .collect(),
    };

    if kept.is_empty() {
        return (String::new(), 0.0);
    }

    let joined = kept.iter().map(|(text, _)| *text).collect::<Vec<_>>().join(" ");
    let text = clean_text(&joined);
    if text.is_empty() {
        return (text, 0.0);
    }

    let mean = kept.iter().map(|(_, conf)| conf).sum::<f64>() / kept.len() as f64;
    (text, mean.clamp(0.0, 100.0))
}
