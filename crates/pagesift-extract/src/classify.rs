// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page content classifier.
//
// Precedence, first match wins: tables -> table; images with little native
// text -> image; little native text -> mixed; otherwise text. A failing probe
// never aborts the batch: the page is classified as mixed and sent to
// recognition.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use pagesift_core::ExtractionConfig;
use pagesift_core::error::Result;
use pagesift_core::types::{ContentClassification, ContentType};
use tracing::{debug, info, instrument, warn};

use crate::pdf::PageSource;
use crate::pool::run_indexed;

#[derive(Debug, Clone)]
pub struct PageClassifier {
    min_text_length: usize,
}

impl PageClassifier {
    pub fn new(config: &ExtractionConfig) -> Self {
        Self {
            min_text_length: config.min_text_length,
        }
    }

    /// Classify one page. Never fails.
    #[instrument(skip(self, source), fields(page_index))]
    pub fn classify(&self, source: &dyn PageSource, page_index: usize) -> ContentClassification {
        match catch_unwind(AssertUnwindSafe(|| self.probe(source, page_index))) {
            Ok(Ok(classification)) => {
                debug!(
                    content_type = classification.content_type.as_str(),
                    needs_ocr = classification.needs_ocr,
                    "Page classified"
                );
                classification
            }
            Ok(Err(err)) => {
                warn!(error = %err, "Page probe failed; treating as mixed");
                ContentClassification::degraded(page_index)
            }
            Err(_) => {
                warn!("Page probe panicked; treating as mixed");
                ContentClassification::degraded(page_index)
            }
        }
    }

    fn probe(&self, source: &dyn PageSource, page_index: usize) -> Result<ContentClassification> {
        let native_text_length = source.native_text(page_index)?.trim().chars().count();
        let table_count = source.table_regions(page_index)?.len();
        let image_count = source.embedded_image_count(page_index)?;

        let short_text = native_text_length < self.min_text_length;
        let content_type = if table_count > 0 {
            ContentType::Table
        } else if image_count > 0 && short_text {
            ContentType::Image
        } else if short_text {
            ContentType::Mixed
        } else {
            ContentType::Text
        };

        Ok(ContentClassification {
            page_index,
            content_type,
            native_text_length,
            has_tables: table_count > 0,
            table_count,
            has_images: image_count > 0,
            image_count,
            needs_ocr: short_text,
        })
    }

    /// Classify every page of `source` on a bounded worker pool. The result is
    /// ordered by page index.
    pub async fn classify_all(
        &self,
        source: Arc<dyn PageSource>,
        max_workers: usize,
    ) -> Vec<ContentClassification> {
        let count = source.page_count();
        info!(pages = count, workers = max_workers, "Classifying pages");

        let classifier = self.clone();
        run_indexed(
            count,
            max_workers,
            move |page_index| classifier.classify(source.as_ref(), page_index),
            |page_index, _| ContentClassification::degraded(page_index),
        )
        .await
    }
}
