// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PaddleOCR engine via `paddle-ocr-rs` (ONNX Runtime).
//
// Only compiled with the `paddle` feature. Models are loaded once from the
// configured directory; a missing directory leaves the engine unavailable.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use image::DynamicImage;
use paddle_ocr_rs::ocr_lite::OcrLite;
use pagesift_core::config::PaddleSettings;
use pagesift_core::error::{PagesiftError, Result};
use pagesift_core::types::{EngineKind, EngineStatus};
use tracing::{debug, info, instrument, warn};

use super::engine::{RawRecognition, ScoredToken, TextRecognizer, write_temp_png};

const DET_MODEL_NAME: &str = "ch_PP-OCRv4_det_infer.onnx";
const CLS_MODEL_NAME: &str = "ch_ppocr_mobile_v2.0_cls_infer.onnx";
const REC_MODEL_NAME: &str = "ch_PP-OCRv4_rec_infer.onnx";

/// PaddleOCR detection + recognition.
pub struct PaddleRecognizer {
    /// `detect_from_path` needs `&mut self`.
    engine: Option<Mutex<OcrLite>>,
    detail: String,
}

impl PaddleRecognizer {
    pub fn new(settings: &PaddleSettings) -> Self {
        match settings.model_dir.as_deref() {
            None => {
                warn!("PaddleOCR model directory not configured");
                Self {
                    engine: None,
                    detail: "paddle.model_dir not configured".to_owned(),
                }
            }
            Some(dir) => match load_engine(dir, settings.threads) {
                Ok(engine) => {
                    info!(model_dir = %dir.display(), "PaddleOCR models loaded");
                    Self {
                        engine: Some(Mutex::new(engine)),
                        detail: format!("models from {}", dir.display()),
                    }
                }
                Err(err) => {
                    warn!(error = %err, "PaddleOCR unavailable");
                    Self {
                        engine: None,
                        detail: err.to_string(),
                    }
                }
            },
        }
    }
}

fn model_path(dir: &Path, name: &str) -> Result<String> {
    let path: PathBuf = dir.join(name);
    if !path.exists() {
        return Err(PagesiftError::EngineUnavailable(format!(
            "PaddleOCR model missing: {}",
            path.display()
        )));
    }
    Ok(path.to_string_lossy().into_owned())
}

fn load_engine(dir: &Path, threads: usize) -> Result<OcrLite> {
    let det = model_path(dir, DET_MODEL_NAME)?;
    let cls = model_path(dir, CLS_MODEL_NAME)?;
    let rec = model_path(dir, REC_MODEL_NAME)?;

    let mut ocr = OcrLite::new();
    ocr.init_models(&det, &cls, &rec, threads.max(1))
        .map_err(|err| {
            PagesiftError::EngineUnavailable(format!("failed to init PaddleOCR: {}", err))
        })?;
    Ok(ocr)
}

impl TextRecognizer for PaddleRecognizer {
    fn kind(&self) -> EngineKind {
        EngineKind::Paddle
    }

    fn is_available(&self) -> bool {
        self.engine.is_some()
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            engine: EngineKind::Paddle,
            available: self.engine.is_some(),
            detail: self.detail.clone(),
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition> {
        let engine = self.engine.as_ref().ok_or_else(|| {
            PagesiftError::EngineUnavailable(self.detail.clone())
        })?;

        let file = write_temp_png(image)?;
        let path = file.path().to_string_lossy().into_owned();

        let mut ocr = engine.lock().map_err(|err| {
            PagesiftError::EngineFailed(format!("PaddleOCR engine lock poisoned: {}", err))
        })?;
        let result = ocr
            .detect_from_path(&path, 50, 1024, 0.5, 0.3, 1.6, false, false)
            .map_err(|err| {
                PagesiftError::EngineFailed(format!("PaddleOCR detection failed: {}", err))
            })?;

        let detections: Vec<ScoredToken> = result
            .text_blocks
            .iter()
            .map(|block| ScoredToken::new(block.text.clone(), block.text_score as f64))
            .collect();
        debug!(detections = detections.len(), "PaddleOCR finished");
        Ok(RawRecognition::Detections(detections))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unconfigured_model_dir_is_unavailable() {
        let recognizer = PaddleRecognizer::new(&PaddleSettings::default());
        assert!(!recognizer.is_available());
        assert!(!recognizer.status().available);
    }

    #[test]
    fn missing_models_are_reported() {
        let dir = tempfile::tempdir().unwrap();
        let recognizer = PaddleRecognizer::new(&PaddleSettings {
            model_dir: Some(dir.path().to_path_buf()),
            threads: 1,
        });
        assert!(!recognizer.is_available());
        assert!(recognizer.status().detail.contains("model missing"));
    }
}
