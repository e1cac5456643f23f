// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for pagesift.

use thiserror::Error;

/// Top-level error type for all pagesift operations.
///
/// Only [`PagesiftError::PdfError`] raised while loading a document is fatal
/// to a run; every other variant is recovered at page level into a degraded
/// [`PageRecord`](crate::types::PageRecord).
#[derive(Debug, Error)]
pub enum PagesiftError {
    // -- Document errors --
    #[error("PDF operation failed: {0}")]
    PdfError(String),

    #[error("page rendering failed: {0}")]
    RenderError(String),

    #[error("image processing failed: {0}")]
    ImageError(String),

    #[error("page classification failed: {0}")]
    ClassificationError(String),

    // -- Recognition engines --
    #[error("recognition engine unavailable: {0}")]
    EngineUnavailable(String),

    #[error("recognition engine failed: {0}")]
    EngineFailed(String),

    // -- Cache / persistence --
    #[error("cache error: {0}")]
    CacheError(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PagesiftError>;
