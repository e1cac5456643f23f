// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Recognition — engine trait, Tesseract and PaddleOCR engines, output
// aggregation, and text cleanup.
//
// # Feature Gate
//
// The PaddleOCR engine is only compiled with the `paddle` feature:
//
// ```toml
// pagesift-extract = { path = "crates/pagesift-extract", features = ["paddle"] }
// ```

pub mod adapter;
pub mod clean;
pub mod engine;
pub mod tesseract;

#[cfg(feature = "paddle")]
pub mod paddle;

pub use adapter::{RecognitionAdapter, RecognitionSet};
pub use engine::{RawRecognition, ScoredToken, TextRecognizer, aggregate};
pub use tesseract::TesseractRecognizer;

#[cfg(feature = "paddle")]
pub use paddle::PaddleRecognizer;
