// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagesift-extract — Per-page text extraction for pagesift.
//
// Classifies PDF pages by content, accepts native text where it suffices, and
// otherwise rasterises, preprocesses, and runs every configured recognition
// engine on raw and preprocessed variants, keeping the best-scoring result.
// Results are memoised by page fingerprint.

pub mod cache;
pub mod classify;
pub mod extractor;
pub mod image;
pub mod markdown;
pub mod pdf;
mod pool;
pub mod preprocess;
pub mod recognize;
pub mod score;

// Re-export the primary structs so callers can use `pagesift_extract::Extractor` etc.
pub use cache::{DiskCache, MemoryCache, ResultCache};
pub use classify::PageClassifier;
pub use extractor::Extractor;
pub use crate::image::processor::ImageProcessor;
pub use pdf::{PageSource, PdfDocument, Rasterizer};
pub use preprocess::{PageEnhancer, PreprocessPolicy};
pub use recognize::{RecognitionAdapter, RecognitionSet, TesseractRecognizer, TextRecognizer};

#[cfg(feature = "paddle")]
pub use recognize::PaddleRecognizer;
