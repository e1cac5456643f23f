// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result scorer — reduces every (variant, engine) candidate to one winner.

use pagesift_core::types::{EngineKind, EngineResult, VariantKind, VariantResults, method};

use crate::recognize::clean::is_meaningful;

/// The winning candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct BestCandidate {
    pub text: String,
    pub confidence: f64,
    /// `"{engine}_{variant}"`, or `"none"`.
    pub method: String,
}

impl BestCandidate {
    fn none() -> Self {
        Self {
            text: String::new(),
            confidence: 0.0,
            method: method::NONE.to_owned(),
        }
    }
}

/// `confidence * 0.7 + min(chars / 100, 1) * 30`.
pub fn quality(text: &str, confidence: f64) -> f64 {
    let length_score = (text.chars().count() as f64 / 100.0).min(1.0);
    confidence * 0.7 + length_score * 30.0
}

/// Pick the highest-quality meaningful candidate.
///
/// Candidates are visited in variant order (`no_preprocessing` first), then
/// by position in `priority` (unlisted engines last). A later candidate only
/// replaces the current best with a strictly greater quality, so ties go to
/// the first one visited.
pub fn choose_best(
    variants: &[VariantResults],
    min_length: usize,
    priority: &[EngineKind],
) -> BestCandidate {
    let variant_rank = |kind: VariantKind| {
        VariantKind::ALL
            .iter()
            .position(|v| *v == kind)
            .unwrap_or(VariantKind::ALL.len())
    };
    let engine_rank = |engine: EngineKind| {
        priority
            .iter()
            .position(|e| *e == engine)
            .unwrap_or(priority.len())
    };

    let mut ordered: Vec<(VariantKind, &EngineResult)> = variants
        .iter()
        .flat_map(|v| v.results.iter().map(move |r| (v.variant, r)))
        .collect();
    ordered.sort_by_key(|(variant, result)| (variant_rank(*variant), engine_rank(result.engine)));

    let mut best: Option<(f64, VariantKind, &EngineResult)> = None;
    for (variant, result) in ordered {
        if !is_meaningful(&result.text, min_length) {
            continue;
        }
        let score = quality(&result.text, result.confidence);
        if best.as_ref().is_none_or(|(top, _, _)| score > *top) {
            best = Some((score, variant, result));
        }
    }

    match best {
        Some((_, variant, result)) => BestCandidate {
            text: result.text.clone(),
            confidence: result.confidence.clamp(0.0, 100.0),
            method: format!("{}_{}", result.engine.as_str(), variant.as_str()),
        },
        None => BestCandidate::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PRIORITY: [EngineKind; 2] = [EngineKind::Tesseract, EngineKind::Paddle];

    fn result(engine: EngineKind, text: &str, confidence: f64) -> EngineResult {
        EngineResult {
            engine,
            text: text.to_owned(),
            confidence,
        }
    }

    #[test]
    fn quality_weights_confidence_and_length() {
        assert!((quality("Hello world", 90.0) - 66.3).abs() < 1e-9);
        assert!((quality("Hello", 95.0) - 68.0).abs() < 1e-9);
        assert!((quality(&"a".repeat(500), 50.0) - 65.0).abs() < 1e-9);
    }

    #[test]
    fn higher_confidence_beats_longer_text() {
        let variants = vec![VariantResults {
            variant: VariantKind::NoPreprocessing,
            results: vec![
                result(EngineKind::Tesseract, "Hello world", 90.0),
                result(EngineKind::Paddle, "Hello", 95.0),
            ],
        }];
        let best = choose_best(&variants, 5, &PRIORITY);
        assert_eq!(best.text, "Hello");
        assert_eq!(best.confidence, 95.0);
        assert_eq!(best.method, "paddle_no_preprocessing");
    }

    #[test]
    fn nothing_meaningful_yields_none() {
        let variants = vec![
            VariantResults {
                variant: VariantKind::NoPreprocessing,
                results: vec![
                    result(EngineKind::Tesseract, "abc", 99.0),
                    result(EngineKind::Paddle, "", 0.0),
                ],
            },
            VariantResults {
                variant: VariantKind::WithPreprocessing,
                results: vec![result(EngineKind::Tesseract, "#### ----", 80.0)],
            },
        ];
        let best = choose_best(&variants, 10, &PRIORITY);
        assert_eq!(best.method, "none");
        assert_eq!(best.text, "");
        assert_eq!(best.confidence, 0.0);
    }

    #[test]
    fn ties_follow_variant_then_priority_order() {
        let text = "identical output";
        // Listed out of order on purpose.
        let variants = vec![
            VariantResults {
                variant: VariantKind::WithPreprocessing,
                results: vec![result(EngineKind::Tesseract, text, 80.0)],
            },
            VariantResults {
                variant: VariantKind::NoPreprocessing,
                results: vec![
                    result(EngineKind::Paddle, text, 80.0),
                    result(EngineKind::Tesseract, text, 80.0),
                ],
            },
        ];
        let best = choose_best(&variants, 10, &PRIORITY);
        assert_eq!(best.method, "tesseract_no_preprocessing");

        let best = choose_best(&variants, 10, &[EngineKind::Paddle]);
        assert_eq!(best.method, "paddle_no_preprocessing");
    }

    #[test]
    fn preprocessed_variant_wins_when_better() {
        let variants = vec![
            VariantResults {
                variant: VariantKind::NoPreprocessing,
                results: vec![result(EngineKind::Tesseract, "blurry scan text", 40.0)],
            },
            VariantResults {
                variant: VariantKind::WithPreprocessing,
                results: vec![result(EngineKind::Tesseract, "clean scan text", 85.0)],
            },
        ];
        let best = choose_best(&variants, 10, &PRIORITY);
        assert_eq!(best.method, "tesseract_with_preprocessing");
        assert_eq!(best.text, "clean scan text");
    }

    #[test]
    fn best_confidence_never_exceeds_candidates() {
        let variants = vec![VariantResults {
            variant: VariantKind::NoPreprocessing,
            results: vec![result(EngineKind::Tesseract, "some long enough text", 140.0)],
        }];
        let best = choose_best(&variants, 10, &PRIORITY);
        assert_eq!(best.confidence, 100.0);
    }
}
