// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for page classification, recognition, and scoring.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::PagesiftError;

/// Coarse structural classification of a page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Enough native text that recognition is not required.
    Text,
    /// At least one table region was detected.
    Table,
    /// Embedded images and (almost) no native text, typically a scan.
    Image,
    /// Little native text and nothing else conclusive.
    Mixed,
}

impl ContentType {
    /// Every content type, in declaration order.
    pub const ALL: [ContentType; 4] = [Self::Text, Self::Table, Self::Image, Self::Mixed];

    /// Lowercase keyword used in records, cache keys, and configuration.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Table => "table",
            Self::Image => "image",
            Self::Mixed => "mixed",
        }
    }
}

impl FromStr for ContentType {
    type Err = PagesiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "table" => Ok(Self::Table),
            "image" => Ok(Self::Image),
            "mixed" => Ok(Self::Mixed),
            other => Err(PagesiftError::Config(format!("unknown content type: {other}"))),
        }
    }
}

impl std::fmt::Display for ContentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of inspecting a single page. Produced once, never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentClassification {
    /// Zero-based page index.
    pub page_index: usize,
    pub content_type: ContentType,
    /// Character count of the trimmed native text layer.
    pub native_text_length: usize,
    pub has_tables: bool,
    pub table_count: usize,
    pub has_images: bool,
    pub image_count: usize,
    /// `true` when the native text is shorter than the minimum text length.
    pub needs_ocr: bool,
}

impl ContentClassification {
    /// Classification used when a page probe fails: treat the page as mixed
    /// content and force recognition.
    pub fn degraded(page_index: usize) -> Self {
        Self {
            page_index,
            content_type: ContentType::Mixed,
            native_text_length: 0,
            has_tables: false,
            table_count: 0,
            has_images: false,
            image_count: 0,
            needs_ocr: true,
        }
    }
}

/// Recognition engines pagesift knows how to drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineKind {
    /// Tesseract via its command-line interface (word-level confidences).
    Tesseract,
    /// PaddleOCR via ONNX Runtime (per-detection probabilities).
    Paddle,
}

impl EngineKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tesseract => "tesseract",
            Self::Paddle => "paddle",
        }
    }
}

impl FromStr for EngineKind {
    type Err = PagesiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tesseract" => Ok(Self::Tesseract),
            "paddle" | "paddleocr" => Ok(Self::Paddle),
            other => Err(PagesiftError::Config(format!("unknown engine: {other}"))),
        }
    }
}

impl std::fmt::Display for EngineKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single image transform applied before recognition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreprocessStep {
    Deskew,
    NoiseRemoval,
    ContrastEnhancement,
    LineDetection,
}

impl PreprocessStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Deskew => "deskew",
            Self::NoiseRemoval => "noise_removal",
            Self::ContrastEnhancement => "contrast_enhancement",
            Self::LineDetection => "line_detection",
        }
    }
}

/// Which version of the page image an engine was run against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VariantKind {
    NoPreprocessing,
    WithPreprocessing,
}

impl VariantKind {
    /// Evaluation order. Also the first half of the scorer's tie-break.
    pub const ALL: [VariantKind; 2] = [Self::NoPreprocessing, Self::WithPreprocessing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoPreprocessing => "no_preprocessing",
            Self::WithPreprocessing => "with_preprocessing",
        }
    }
}

impl std::fmt::Display for VariantKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of one engine on one preprocessing variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineResult {
    #[serde(rename = "engine_name")]
    pub engine: EngineKind,
    pub text: String,
    /// Mean confidence in `[0, 100]`.
    pub confidence: f64,
}

/// All engine results for one preprocessing variant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VariantResults {
    pub variant: VariantKind,
    pub results: Vec<EngineResult>,
}

/// Best-of-all-candidates extraction result for one page image.
///
/// This is the value memoised by the result cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComprehensiveResult {
    pub best_text: String,
    pub best_confidence: f64,
    /// `"{engine}_{variant}"`, or `"none"` when nothing was meaningful.
    pub best_method: String,
    /// Wall-clock seconds spent on recognition and scoring.
    pub processing_time: f64,
    pub all_variant_results: Vec<VariantResults>,
    pub text_length: usize,
    pub is_meaningful: bool,
    pub document_type: ContentType,
}

/// Extraction method labels carried by [`PageRecord::method`].
pub mod method {
    /// Native text layer was long enough; no recognition performed.
    pub const NATIVE_TEXT: &str = "native_text";
    /// Recognition ran but the native text was longer and won.
    pub const NATIVE: &str = "native";
    /// The page could not be rasterised; the (short) native text is reported.
    pub const NATIVE_FALLBACK: &str = "native_fallback";
    /// The page failed outright; see [`PageRecord::error`](super::PageRecord::error).
    pub const FAILED: &str = "failed";
    /// No candidate passed the meaningful-text filter.
    pub const NONE: &str = "none";
}

/// Rows of cells extracted from one table region.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub rows: Vec<Vec<String>>,
}

impl TableData {
    pub fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|row| row.is_empty())
    }
}

/// Final per-page record handed to downstream document assembly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub page_index: usize,
    pub text: String,
    pub confidence: f64,
    pub method: String,
    pub content_type: ContentType,
    /// Wall-clock seconds spent on this page.
    pub processing_time: f64,
    /// Captured error text for degraded pages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classification: Option<ContentClassification>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ocr_details: Option<ComprehensiveResult>,
}

impl PageRecord {
    /// Record for a page whose processing failed outright.
    pub fn failed(page_index: usize, content_type: ContentType, error: impl Into<String>) -> Self {
        Self {
            page_index,
            text: String::new(),
            confidence: 0.0,
            method: method::FAILED.to_owned(),
            content_type,
            processing_time: 0.0,
            error: Some(error.into()),
            classification: None,
            ocr_details: None,
        }
    }
}

/// Availability report for a configured recognition engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub engine: EngineKind,
    pub available: bool,
    /// Version string when available, otherwise what is missing.
    pub detail: String,
}
