// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Uniform `image -> (text, confidence)` adapters over recognition engines,
// and the set of adapters a run uses.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use image::DynamicImage;
use pagesift_core::ExtractionConfig;
use pagesift_core::types::{EngineKind, EngineStatus};
use tracing::{info, warn};

use super::clean::substitute_artifacts;
use super::engine::{TextRecognizer, aggregate};
use super::tesseract::TesseractRecognizer;

/// Wraps one engine so that every failure becomes `("", 0)`.
#[derive(Clone)]
pub struct RecognitionAdapter {
    recognizer: Arc<dyn TextRecognizer>,
    substitution_cleanup: bool,
}

impl RecognitionAdapter {
    pub fn new(recognizer: Arc<dyn TextRecognizer>, substitution_cleanup: bool) -> Self {
        Self {
            recognizer,
            substitution_cleanup,
        }
    }

    pub fn engine(&self) -> EngineKind {
        self.recognizer.kind()
    }

    /// Recognise `image`. Never fails: an unavailable engine, an engine
    /// error, or an engine panic all yield empty text with confidence 0.
    pub fn extract(&self, image: &DynamicImage) -> (String, f64) {
        let engine = self.recognizer.kind();
        if !self.recognizer.is_available() {
            return (String::new(), 0.0);
        }

        let raw = match catch_unwind(AssertUnwindSafe(|| self.recognizer.recognize(image))) {
            Ok(Ok(raw)) => raw,
            Ok(Err(err)) => {
                warn!(engine = engine.as_str(), error = %err, "Recognition failed");
                return (String::new(), 0.0);
            }
            Err(_) => {
                warn!(engine = engine.as_str(), "Recognition engine panicked");
                return (String::new(), 0.0);
            }
        };

        let (text, confidence) = aggregate(&raw);
        if self.substitution_cleanup {
            (substitute_artifacts(&text), confidence)
        } else {
            (text, confidence)
        }
    }
}

/// The engines available to a run, in tie-break priority order.
#[derive(Clone)]
pub struct RecognitionSet {
    adapters: Vec<RecognitionAdapter>,
    statuses: Vec<EngineStatus>,
}

impl RecognitionSet {
    /// Build the engines listed in `enabled_engines`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        let mut recognizers: Vec<Arc<dyn TextRecognizer>> = Vec::new();
        let mut missing = Vec::new();

        for engine in &config.enabled_engines {
            match engine {
                EngineKind::Tesseract => recognizers.push(Arc::new(TesseractRecognizer::new(
                    config.tesseract.clone(),
                ))),
                #[cfg(feature = "paddle")]
                EngineKind::Paddle => recognizers.push(Arc::new(
                    super::paddle::PaddleRecognizer::new(&config.paddle),
                )),
                #[cfg(not(feature = "paddle"))]
                EngineKind::Paddle => missing.push(EngineStatus {
                    engine: EngineKind::Paddle,
                    available: false,
                    detail: "built without the `paddle` feature".to_owned(),
                }),
            }
        }

        let mut set = Self::from_recognizers(recognizers, config);
        set.statuses.append(&mut missing);
        set
    }

    /// Keep the available recognizers, ordered by `engine_priority`.
    /// Unavailable ones are reported in [`engine_status`](Self::engine_status)
    /// and contribute no candidates.
    pub fn from_recognizers(
        recognizers: Vec<Arc<dyn TextRecognizer>>,
        config: &ExtractionConfig,
    ) -> Self {
        let mut statuses = Vec::with_capacity(recognizers.len());
        let mut adapters = Vec::with_capacity(recognizers.len());

        for recognizer in recognizers {
            let status = recognizer.status();
            if status.available {
                adapters.push(RecognitionAdapter::new(
                    recognizer,
                    config.substitution_cleanup,
                ));
            } else {
                warn!(engine = status.engine.as_str(), detail = %status.detail, "Engine unavailable; skipping");
            }
            statuses.push(status);
        }

        adapters.sort_by_key(|adapter| config.engine_rank(adapter.engine()));
        info!(
            engines = ?adapters.iter().map(|a| a.engine().as_str()).collect::<Vec<_>>(),
            "Recognition engines ready"
        );

        Self { adapters, statuses }
    }

    pub fn adapters(&self) -> &[RecognitionAdapter] {
        &self.adapters
    }

    pub fn engine_status(&self) -> &[EngineStatus] {
        &self.statuses
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}
