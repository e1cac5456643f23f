// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Criterion benchmarks for the preprocessing pipeline and scorer in the
// pagesift-extract crate, on small synthetic page images.

use criterion::{Criterion, black_box, criterion_group, criterion_main};
use image::{DynamicImage, GrayImage, Luma};

use pagesift_core::types::{ContentType, EngineKind, EngineResult, VariantKind, VariantResults};
use pagesift_extract::PreprocessPolicy;
use pagesift_extract::preprocess::preprocess;
use pagesift_extract::score::choose_best;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// A 200x200 light page with a dark text-like bar rotated by a few degrees,
/// so deskew has real work to do.
fn skewed_page() -> DynamicImage {
    let (sin, cos) = 4.0f32.to_radians().sin_cos();
    DynamicImage::ImageLuma8(GrayImage::from_fn(200, 200, |x, y| {
        let dx = x as f32 - 100.0;
        let dy = y as f32 - 100.0;
        let u = cos * dx + sin * dy;
        let v = -sin * dx + cos * dy;
        if u.abs() <= 70.0 && v.abs() <= 12.0 {
            Luma([25u8])
        } else {
            Luma([230u8])
        }
    }))
}

// ---------------------------------------------------------------------------
// Benchmarks
// ---------------------------------------------------------------------------

/// Every content type's preprocessing policy on the same skewed page.
fn bench_preprocessing(c: &mut Criterion) {
    let page = skewed_page();
    let policy = PreprocessPolicy::default();

    let mut group = c.benchmark_group("preprocess (200x200)");
    for content_type in [ContentType::Text, ContentType::Table, ContentType::Mixed] {
        let steps = policy.steps_for(content_type);
        group.bench_function(content_type.as_str(), |b| {
            b.iter(|| black_box(preprocess(black_box(&page), &steps)));
        });
    }
    group.finish();
}

/// Scoring a full two-variant, two-engine candidate set.
fn bench_scoring(c: &mut Criterion) {
    let result = |engine, text: &str, confidence| EngineResult {
        engine,
        text: text.to_owned(),
        confidence,
    };
    let variants = vec![
        VariantResults {
            variant: VariantKind::NoPreprocessing,
            results: vec![
                result(EngineKind::Tesseract, "Quarterly revenue summary", 71.0),
                result(EngineKind::Paddle, "Quarterly revenue summary.", 83.0),
            ],
        },
        VariantResults {
            variant: VariantKind::WithPreprocessing,
            results: vec![
                result(EngineKind::Tesseract, "Quarterly revenue summary", 88.0),
                result(EngineKind::Paddle, "Quarter1y revenue sumnary", 64.0),
            ],
        },
    ];
    let priority = [EngineKind::Tesseract, EngineKind::Paddle];

    c.bench_function("choose_best (2x2)", |b| {
        b.iter(|| black_box(choose_best(black_box(&variants), 10, &priority)));
    });
}

criterion_group!(benches, bench_preprocessing, bench_scoring);
criterion_main!(benches);
