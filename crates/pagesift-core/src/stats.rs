// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Batch statistics over completed page records.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::PageRecord;

/// Summary of a finished batch, for progress reporting and document headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchStatistics {
    pub total_pages: usize,
    /// Pages whose final text is non-empty.
    pub successful_extractions: usize,
    /// Mean over pages with a positive confidence.
    pub average_confidence: f64,
    pub method_distribution: BTreeMap<String, usize>,
    pub content_type_distribution: BTreeMap<String, usize>,
    pub total_text_length: usize,
    /// Sum of per-page processing time, in seconds.
    pub processing_time: f64,
    /// Pages below the confidence threshold or without text.
    pub problem_pages: Vec<usize>,
}

impl BatchStatistics {
    pub fn from_records(records: &[PageRecord], confidence_threshold: f64) -> Self {
        let mut method_distribution = BTreeMap::new();
        let mut content_type_distribution = BTreeMap::new();
        let mut confident = Vec::new();
        let mut problem_pages = Vec::new();
        let mut successful_extractions = 0;
        let mut total_text_length = 0;
        let mut processing_time = 0.0;

        for record in records {
            *method_distribution.entry(record.method.clone()).or_insert(0) += 1;
            *content_type_distribution
                .entry(record.content_type.as_str().to_owned())
                .or_insert(0) += 1;

            let has_text = !record.text.trim().is_empty();
            if has_text {
                successful_extractions += 1;
            }
            if record.confidence > 0.0 {
                confident.push(record.confidence);
            }
            if record.confidence < confidence_threshold || !has_text {
                problem_pages.push(record.page_index);
            }
            total_text_length += record.text.chars().count();
            processing_time += record.processing_time;
        }

        let average_confidence = if confident.is_empty() {
            0.0
        } else {
            confident.iter().sum::<f64>() / confident.len() as f64
        };

        Self {
            total_pages: records.len(),
            successful_extractions,
            average_confidence,
            method_distribution,
            content_type_distribution,
            total_text_length,
            processing_time,
            problem_pages,
        }
    }

    /// Share of pages with text, in percent.
    pub fn success_rate(&self) -> f64 {
        if self.total_pages == 0 {
            0.0
        } else {
            self.successful_extractions as f64 / self.total_pages as f64 * 100.0
        }
    }
}

/// Ordered page records plus their statistics, ready for serialisation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub generated_at: DateTime<Utc>,
    pub statistics: BatchStatistics,
    pub pages: Vec<PageRecord>,
}

impl BatchReport {
    pub fn new(pages: Vec<PageRecord>, confidence_threshold: f64) -> Self {
        Self {
            generated_at: Utc::now(),
            statistics: BatchStatistics::from_records(&pages, confidence_threshold),
            pages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{ContentType, method};

    fn record(page_index: usize, text: &str, confidence: f64, method: &str) -> PageRecord {
        PageRecord {
            page_index,
            text: text.to_owned(),
            confidence,
            method: method.to_owned(),
            content_type: ContentType::Text,
            processing_time: 0.5,
            error: None,
            classification: None,
            ocr_details: None,
        }
    }

    #[test]
    fn statistics_over_mixed_batch() {
        let records = vec![
            record(0, "native page text", 100.0, method::NATIVE_TEXT),
            record(1, "ocr text", 40.0, "tesseract_no_preprocessing"),
            record(2, "", 0.0, method::FAILED),
        ];
        let stats = BatchStatistics::from_records(&records, 60.0);

        assert_eq!(stats.total_pages, 3);
        assert_eq!(stats.successful_extractions, 2);
        assert!((stats.average_confidence - 70.0).abs() < 1e-9);
        assert_eq!(stats.problem_pages, vec![1, 2]);
        assert_eq!(stats.method_distribution[method::FAILED], 1);
        assert_eq!(stats.content_type_distribution["text"], 3);
        assert!((stats.processing_time - 1.5).abs() < 1e-9);
        assert!((stats.success_rate() - 200.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn empty_batch_has_zero_rates() {
        let stats = BatchStatistics::from_records(&[], 60.0);
        assert_eq!(stats.total_pages, 0);
        assert_eq!(stats.average_confidence, 0.0);
        assert_eq!(stats.success_rate(), 0.0);
    }

    #[test]
    fn report_serialises_pages_in_order() {
        let report = BatchReport::new(
            vec![record(0, "a", 90.0, "x"), record(1, "b", 80.0, "y")],
            60.0,
        );
        let value = serde_json::to_value(&report).unwrap();
        assert_eq!(value["pages"][1]["page_index"], 1);
        assert_eq!(value["statistics"]["total_pages"], 2);
    }
}
