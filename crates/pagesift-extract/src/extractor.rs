// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Extraction orchestrator.
//
// Per page: classify, then either accept the native text layer or rasterise,
// preprocess, recognise with every engine on every variant, score, and cache.
// Every page ends in a record; only a document that cannot be opened at all
// is an error, and that happens before the orchestrator is reached.

use std::sync::Arc;
use std::time::Instant;

use image::DynamicImage;
use pagesift_core::error::Result;
use pagesift_core::types::{
    ComprehensiveResult, ContentClassification, ContentType, EngineResult, EngineStatus,
    PageRecord, VariantKind, VariantResults, method,
};
use pagesift_core::{BatchReport, ExtractionConfig};
use tracing::{debug, info, instrument, warn};

use crate::cache::{DiskCache, MemoryCache, ResultCache, fingerprint_image};
use crate::classify::PageClassifier;
use crate::markdown::{combine_text_and_tables, tables_to_markdown};
use crate::pdf::PageSource;
use crate::pool::run_indexed;
use crate::preprocess::{PreprocessPolicy, preprocess};
use crate::recognize::RecognitionSet;
use crate::recognize::clean::is_meaningful;
use crate::score::choose_best;

/// Drives extraction for whole documents or loose page images.
///
/// Cheap to clone; clones share engines and cache.
#[derive(Clone)]
pub struct Extractor {
    config: Arc<ExtractionConfig>,
    recognizers: RecognitionSet,
    cache: Option<Arc<dyn ResultCache>>,
    policy: PreprocessPolicy,
    classifier: PageClassifier,
}

impl Extractor {
    /// Assemble an extractor from explicit parts. `cache` is ignored when
    /// `config.use_cache` is off.
    pub fn new(
        config: ExtractionConfig,
        recognizers: RecognitionSet,
        cache: Option<Arc<dyn ResultCache>>,
    ) -> Self {
        let cache = if config.use_cache { cache } else { None };
        Self {
            policy: PreprocessPolicy::from_config(&config),
            classifier: PageClassifier::new(&config),
            config: Arc::new(config),
            recognizers,
            cache,
        }
    }

    /// Validate `config`, build the enabled engines, and open the configured
    /// cache (on disk when `cache_dir` is set, otherwise in memory).
    pub fn from_config(config: ExtractionConfig) -> Result<Self> {
        config.validate()?;
        let recognizers = RecognitionSet::from_config(&config);
        if recognizers.is_empty() {
            warn!("No recognition engine available; scanned pages will yield no text");
        }

        let cache: Option<Arc<dyn ResultCache>> = match (&config.cache_dir, config.use_cache) {
            (_, false) => None,
            (Some(dir), true) => Some(Arc::new(DiskCache::open(dir)?)),
            (None, true) => Some(Arc::new(MemoryCache::new())),
        };

        Ok(Self::new(config, recognizers, cache))
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    pub fn engine_status(&self) -> &[EngineStatus] {
        self.recognizers.engine_status()
    }

    // -- Single image -----------------------------------------------------------

    /// Best text for one page image: cache lookup, then every engine on the
    /// raw and the preprocessed image, scored.
    #[instrument(skip_all, fields(content_type = content_type.as_str()))]
    pub fn extract_comprehensive(
        &self,
        image: &DynamicImage,
        content_type: ContentType,
    ) -> ComprehensiveResult {
        let started = Instant::now();

        let key = self
            .cache
            .as_ref()
            .map(|_| fingerprint_image(image, content_type));
        if let (Some(cache), Some(key)) = (&self.cache, &key)
            && let Some(hit) = cache.get(key)
        {
            debug!(key = %key, "Cache hit");
            return hit;
        }

        let steps = self.policy.steps_for(content_type);
        let preprocessed = preprocess(image, &steps);

        let all_variant_results = vec![
            VariantResults {
                variant: VariantKind::NoPreprocessing,
                results: self.recognize_all(image),
            },
            VariantResults {
                variant: VariantKind::WithPreprocessing,
                results: self.recognize_all(&preprocessed),
            },
        ];

        let best = choose_best(
            &all_variant_results,
            self.config.min_text_length,
            &self.config.engine_priority,
        );

        let result = ComprehensiveResult {
            text_length: best.text.chars().count(),
            is_meaningful: is_meaningful(&best.text, self.config.min_text_length),
            best_text: best.text,
            best_confidence: best.confidence,
            best_method: best.method,
            processing_time: started.elapsed().as_secs_f64(),
            all_variant_results,
            document_type: content_type,
        };

        if let (Some(cache), Some(key)) = (&self.cache, &key) {
            cache.put(key, &result);
        }
        debug!(
            method = %result.best_method,
            confidence = result.best_confidence,
            "Comprehensive extraction finished"
        );
        result
    }

    /// Run every engine on `image`, concurrently, returning results in
    /// engine-priority order.
    fn recognize_all(&self, image: &DynamicImage) -> Vec<EngineResult> {
        let adapters = self.recognizers.adapters();
        std::thread::scope(|scope| {
            let handles: Vec<_> = adapters
                .iter()
                .map(|adapter| (adapter.engine(), scope.spawn(move || adapter.extract(image))))
                .collect();

            handles
                .into_iter()
                .map(|(engine, handle)| {
                    let (text, confidence) = handle.join().unwrap_or_else(|_| {
                        warn!(engine = engine.as_str(), "Recognition thread panicked");
                        (String::new(), 0.0)
                    });
                    EngineResult {
                        engine,
                        text,
                        confidence,
                    }
                })
                .collect()
        })
    }

    // -- Single page ------------------------------------------------------------

    /// Produce the final record for one classified page. Never fails.
    #[instrument(skip_all, fields(page_index = classification.page_index))]
    pub fn extract_page(
        &self,
        source: &dyn PageSource,
        classification: &ContentClassification,
    ) -> PageRecord {
        let started = Instant::now();
        let page_index = classification.page_index;
        let content_type = classification.content_type;

        let mut record = match self.run_page(source, classification) {
            Ok(record) => record,
            Err(err) => {
                warn!(error = %err, "Page extraction failed");
                PageRecord::failed(page_index, content_type, err.to_string())
            }
        };
        record.processing_time = started.elapsed().as_secs_f64();
        record.classification = Some(classification.clone());
        record
    }

    fn run_page(
        &self,
        source: &dyn PageSource,
        classification: &ContentClassification,
    ) -> Result<PageRecord> {
        let page_index = classification.page_index;
        let content_type = classification.content_type;
        let record = |text: String, confidence: f64, method: &str| PageRecord {
            page_index,
            text,
            confidence,
            method: method.to_owned(),
            content_type,
            processing_time: 0.0,
            error: None,
            classification: None,
            ocr_details: None,
        };

        let native = match source.native_text(page_index) {
            Ok(text) => text.trim().to_owned(),
            Err(err) => {
                warn!(error = %err, "Native text unavailable");
                String::new()
            }
        };
        let native_length = native.chars().count();

        if !classification.needs_ocr && native_length >= self.config.min_text_length {
            debug!(native_length, "Native text sufficient");
            return Ok(record(native, 100.0, method::NATIVE_TEXT));
        }

        let image = match source.rasterize(page_index, self.config.dpi) {
            Ok(image) => image,
            Err(err) => {
                warn!(error = %err, "Rasterisation failed; falling back to native text");
                let confidence = if native.is_empty() { 0.0 } else { 50.0 };
                let mut fallback = record(native, confidence, method::NATIVE_FALLBACK);
                fallback.error = Some(err.to_string());
                return Ok(fallback);
            }
        };

        let ocr = self.extract_comprehensive(&image, content_type);
        let (mut text, chosen_method) = if ocr.best_text.chars().count() > native_length {
            (ocr.best_text.clone(), ocr.best_method.clone())
        } else {
            (native, method::NATIVE.to_owned())
        };

        if content_type == ContentType::Table {
            let tables = source.table_regions(page_index).unwrap_or_else(|err| {
                warn!(error = %err, "Table regions unavailable; keeping recognised text");
                Vec::new()
            });
            if !tables.is_empty() {
                text = combine_text_and_tables(&text, &tables_to_markdown(&tables));
            }
        }

        let mut page = record(text, ocr.best_confidence, &chosen_method);
        page.ocr_details = Some(ocr);
        Ok(page)
    }

    // -- Batches ----------------------------------------------------------------

    /// Classify and extract every page of `source`, each stage on its own
    /// bounded pool. Records come back ordered by page index.
    #[instrument(skip_all, fields(pages = source.page_count()))]
    pub async fn process_document(&self, source: Arc<dyn PageSource>) -> Vec<PageRecord> {
        let workers = self.config.workers();
        let classifications = Arc::new(
            self.classifier
                .classify_all(Arc::clone(&source), workers)
                .await,
        );

        info!(pages = classifications.len(), workers, "Extracting pages");
        let this = self.clone();
        let job_classes = Arc::clone(&classifications);
        let mut records = run_indexed(
            classifications.len(),
            workers,
            move |page_index| this.extract_page(source.as_ref(), &job_classes[page_index]),
            |page_index, message| {
                PageRecord::failed(
                    page_index,
                    classifications[page_index].content_type,
                    message,
                )
            },
        )
        .await;

        records.sort_by_key(|record| record.page_index);
        info!(pages = records.len(), "Document processed");
        records
    }

    /// Extract loose page images. `document_types[i]` applies to `images[i]`;
    /// missing entries default to `mixed`. Records are indexed by position.
    pub async fn batch_extract(
        &self,
        images: Vec<DynamicImage>,
        document_types: &[ContentType],
    ) -> Vec<PageRecord> {
        let types: Arc<Vec<ContentType>> = Arc::new(
            (0..images.len())
                .map(|i| document_types.get(i).copied().unwrap_or(ContentType::Mixed))
                .collect(),
        );
        let images = Arc::new(images);

        let this = self.clone();
        let job_types = Arc::clone(&types);
        let mut records = run_indexed(
            images.len(),
            self.config.workers(),
            move |index| {
                let started = Instant::now();
                let result = this.extract_comprehensive(&images[index], job_types[index]);
                PageRecord {
                    page_index: index,
                    text: result.best_text.clone(),
                    confidence: result.best_confidence,
                    method: result.best_method.clone(),
                    content_type: job_types[index],
                    processing_time: started.elapsed().as_secs_f64(),
                    error: None,
                    classification: None,
                    ocr_details: Some(result),
                }
            },
            |index, message| PageRecord::failed(index, types[index], message),
        )
        .await;

        records.sort_by_key(|record| record.page_index);
        records
    }

    /// Wrap finished records with their batch statistics.
    pub fn report(&self, records: Vec<PageRecord>) -> BatchReport {
        BatchReport::new(records, self.config.confidence_threshold)
    }
}
