// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The page-level interface the classifier and extractor consume.

use image::DynamicImage;
use pagesift_core::error::Result;
use pagesift_core::types::TableData;

/// A paged document: native text, table regions, embedded images, and
/// rasterisation, all addressed by zero-based page index.
///
/// Shared across worker threads for the duration of a run.
pub trait PageSource: Send + Sync {
    fn page_count(&self) -> usize;

    fn native_text(&self, page_index: usize) -> Result<String>;

    fn table_regions(&self, page_index: usize) -> Result<Vec<TableData>>;

    fn embedded_image_count(&self, page_index: usize) -> Result<usize>;

    fn rasterize(&self, page_index: usize, dpi: u32) -> Result<DynamicImage>;
}
