// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction configuration.
//
// A single immutable value built once per run and handed to every component at
// construction. Nothing here is read from process-wide state.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{PagesiftError, Result};
use crate::types::{ContentType, EngineKind, PreprocessStep};

/// Settings for the Tesseract command-line engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TesseractSettings {
    /// Binary name or absolute path.
    pub binary: String,
    /// Language pack list, `+`-separated.
    pub language: String,
    /// OCR engine mode (`--oem`).
    pub oem: u8,
    /// Page segmentation mode (`--psm`).
    pub psm: u8,
}

impl Default for TesseractSettings {
    fn default() -> Self {
        Self {
            binary: "tesseract".to_owned(),
            language: "rus+eng".to_owned(),
            oem: 3,
            psm: 6,
        }
    }
}

/// Settings for the PaddleOCR engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaddleSettings {
    /// Directory holding the detection, classification, and recognition
    /// ONNX models.
    pub model_dir: Option<PathBuf>,
    /// ONNX Runtime intra-op threads.
    pub threads: usize,
}

impl Default for PaddleSettings {
    fn default() -> Self {
        Self {
            model_dir: None,
            threads: 4,
        }
    }
}

/// Settings for a whole extraction run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum trimmed length for text to count as meaningful, and the
    /// native-text length below which a page needs recognition.
    pub min_text_length: usize,
    /// Pages reported below this confidence are listed as problem pages.
    pub confidence_threshold: f64,
    /// Size of each worker pool (classification and extraction).
    pub max_workers: usize,
    /// Rasterisation resolution.
    pub dpi: u32,
    /// Engines to run, in no particular order.
    pub enabled_engines: Vec<EngineKind>,
    /// Engine order used to break scoring ties. Engines missing from this
    /// list rank after the listed ones.
    pub engine_priority: Vec<EngineKind>,
    /// Preprocessing steps per content type. Unmapped types use `mixed`.
    pub preprocessing: BTreeMap<ContentType, Vec<PreprocessStep>>,
    /// Memoise comprehensive results.
    pub use_cache: bool,
    /// Directory for the on-disk cache. `None` keeps the cache in memory.
    pub cache_dir: Option<PathBuf>,
    /// Replace `|` with `I` and `0` with `O` in recognised text.
    pub substitution_cleanup: bool,
    pub tesseract: TesseractSettings,
    pub paddle: PaddleSettings,
    /// Binary used to rasterise PDF pages.
    pub rasterizer_binary: String,
}

/// The built-in preprocessing policy table.
pub fn default_preprocessing() -> BTreeMap<ContentType, Vec<PreprocessStep>> {
    use PreprocessStep::*;
    BTreeMap::from([
        (ContentType::Text, vec![Deskew, NoiseRemoval]),
        (ContentType::Table, vec![Deskew, LineDetection]),
        (
            ContentType::Mixed,
            vec![Deskew, NoiseRemoval, ContrastEnhancement],
        ),
    ])
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_text_length: 10,
            confidence_threshold: 60.0,
            max_workers: 4,
            dpi: 300,
            enabled_engines: vec![EngineKind::Tesseract, EngineKind::Paddle],
            engine_priority: vec![EngineKind::Tesseract, EngineKind::Paddle],
            preprocessing: default_preprocessing(),
            use_cache: true,
            cache_dir: None,
            substitution_cleanup: false,
            tesseract: TesseractSettings::default(),
            paddle: PaddleSettings::default(),
            rasterizer_binary: "pdftoppm".to_owned(),
        }
    }
}

impl ExtractionConfig {
    /// Parse a JSON document. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a JSON configuration file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&raw)
    }

    /// Reject settings no run could use.
    pub fn validate(&self) -> Result<()> {
        if self.dpi == 0 {
            return Err(PagesiftError::Config("dpi must be positive".into()));
        }
        if self.enabled_engines.is_empty() {
            return Err(PagesiftError::Config(
                "at least one recognition engine must be enabled".into(),
            ));
        }
        if !(0.0..=100.0).contains(&self.confidence_threshold) {
            return Err(PagesiftError::Config(format!(
                "confidence_threshold {} outside [0, 100]",
                self.confidence_threshold
            )));
        }
        Ok(())
    }

    /// Worker pool size, never below one.
    pub fn workers(&self) -> usize {
        self.max_workers.max(1)
    }

    /// Tie-break rank of an engine; lower wins.
    pub fn engine_rank(&self, engine: EngineKind) -> usize {
        self.engine_priority
            .iter()
            .position(|e| *e == engine)
            .unwrap_or(self.engine_priority.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = ExtractionConfig::default();
        assert_eq!(config.min_text_length, 10);
        assert_eq!(config.max_workers, 4);
        assert_eq!(config.dpi, 300);
        assert!(config.use_cache);
        assert!(!config.substitution_cleanup);
        assert!(!config.preprocessing.contains_key(&ContentType::Image));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config =
            ExtractionConfig::from_json_str(r#"{"max_workers": 8, "tesseract": {"psm": 3}}"#)
                .unwrap();
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.tesseract.psm, 3);
        assert_eq!(config.tesseract.language, "rus+eng");
        assert_eq!(config.min_text_length, 10);
    }

    #[test]
    fn preprocessing_table_parses_from_json() {
        let config = ExtractionConfig::from_json_str(
            r#"{"preprocessing": {"image": ["deskew", "contrast_enhancement"]}}"#,
        )
        .unwrap();
        assert_eq!(
            config.preprocessing[&ContentType::Image],
            vec![PreprocessStep::Deskew, PreprocessStep::ContrastEnhancement]
        );
    }

    #[test]
    fn validate_rejects_empty_engine_list() {
        let err = ExtractionConfig::from_json_str(r#"{"enabled_engines": []}"#).unwrap_err();
        assert!(matches!(err, PagesiftError::Config(_)));
    }

    #[test]
    fn validate_rejects_out_of_range_threshold() {
        let config = ExtractionConfig {
            confidence_threshold: 120.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn zero_workers_clamps_to_one() {
        let config = ExtractionConfig {
            max_workers: 0,
            ..Default::default()
        };
        assert_eq!(config.workers(), 1);
    }

    #[test]
    fn unlisted_engine_ranks_last() {
        let config = ExtractionConfig {
            engine_priority: vec![EngineKind::Paddle],
            ..Default::default()
        };
        assert_eq!(config.engine_rank(EngineKind::Paddle), 0);
        assert_eq!(config.engine_rank(EngineKind::Tesseract), 1);
    }
}
