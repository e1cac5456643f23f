// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing policy and step runner.

use std::collections::BTreeMap;
use std::panic::{AssertUnwindSafe, catch_unwind};

use image::DynamicImage;
use pagesift_core::ExtractionConfig;
use pagesift_core::config::default_preprocessing;
use pagesift_core::error::PagesiftError;
use pagesift_core::types::{ContentType, PreprocessStep};
use tracing::{debug, warn};

use super::enhance::PageEnhancer;

/// Maps a content type to the ordered steps applied before recognition.
#[derive(Debug, Clone)]
pub struct PreprocessPolicy {
    table: BTreeMap<ContentType, Vec<PreprocessStep>>,
}

impl Default for PreprocessPolicy {
    fn default() -> Self {
        Self::new(default_preprocessing())
    }
}

impl PreprocessPolicy {
    pub fn new(table: BTreeMap<ContentType, Vec<PreprocessStep>>) -> Self {
        Self { table }
    }

    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.preprocessing.clone())
    }

    /// Steps for `content_type`. Unmapped types use the `mixed` entry; a table
    /// without a `mixed` entry falls back to the built-in `mixed` list.
    pub fn steps_for(&self, content_type: ContentType) -> Vec<PreprocessStep> {
        if let Some(steps) = self.table.get(&content_type) {
            return steps.clone();
        }
        if let Some(steps) = self.table.get(&ContentType::Mixed) {
            return steps.clone();
        }
        default_preprocessing()
            .remove(&ContentType::Mixed)
            .unwrap_or_default()
    }
}

/// Apply `steps` in order. Never fails: a step that errors or panics is
/// skipped and the image produced by the previous step carries on.
pub fn preprocess(image: &DynamicImage, steps: &[PreprocessStep]) -> DynamicImage {
    let mut current = image.clone();

    for &step in steps {
        let input = current.clone();
        match catch_unwind(AssertUnwindSafe(|| apply_step(input, step))) {
            Ok(Ok(next)) => {
                debug!(step = step.as_str(), "Preprocessing step applied");
                current = next;
            }
            Ok(Err(err)) => {
                warn!(step = step.as_str(), error = %err, "Preprocessing step failed; keeping previous image");
            }
            Err(_) => {
                warn!(step = step.as_str(), "Preprocessing step panicked; keeping previous image");
            }
        }
    }

    current
}

fn apply_step(image: DynamicImage, step: PreprocessStep) -> Result<DynamicImage, PagesiftError> {
    let enhancer = PageEnhancer::from_dynamic(image);
    let enhanced = match step {
        PreprocessStep::Deskew => enhancer.deskew()?,
        PreprocessStep::NoiseRemoval => enhancer.remove_noise()?,
        PreprocessStep::ContrastEnhancement => enhancer.enhance_contrast()?,
        PreprocessStep::LineDetection => enhancer.enhance_lines()?,
    };
    Ok(enhanced.into_dynamic())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    #[test]
    fn unmapped_type_falls_back_to_mixed() {
        let policy = PreprocessPolicy::default();
        assert_eq!(
            policy.steps_for(ContentType::Image),
            policy.steps_for(ContentType::Mixed)
        );
        assert_eq!(
            policy.steps_for(ContentType::Mixed),
            vec![
                PreprocessStep::Deskew,
                PreprocessStep::NoiseRemoval,
                PreprocessStep::ContrastEnhancement
            ]
        );
    }

    #[test]
    fn table_policy_uses_line_detection() {
        let policy = PreprocessPolicy::default();
        assert_eq!(
            policy.steps_for(ContentType::Table),
            vec![PreprocessStep::Deskew, PreprocessStep::LineDetection]
        );
    }

    #[test]
    fn missing_mixed_entry_uses_builtin_list() {
        let policy = PreprocessPolicy::new(BTreeMap::from([(
            ContentType::Text,
            vec![PreprocessStep::Deskew],
        )]));
        assert_eq!(policy.steps_for(ContentType::Text), vec![PreprocessStep::Deskew]);
        assert_eq!(policy.steps_for(ContentType::Table).len(), 3);
    }

    #[test]
    fn failing_steps_keep_the_input_image() {
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let out = preprocess(
            &empty,
            &[PreprocessStep::Deskew, PreprocessStep::NoiseRemoval],
        );
        assert_eq!(out, empty);
    }

    #[test]
    fn empty_step_list_is_identity() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(8, 8, Luma([100u8])));
        assert_eq!(preprocess(&img, &[]), img);
    }

    #[test]
    fn full_mixed_pipeline_preserves_dimensions() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_fn(64, 48, |x, _| {
            Luma([if x % 8 < 2 { 10u8 } else { 240u8 }])
        }));
        let steps = PreprocessPolicy::default().steps_for(ContentType::Mixed);
        let out = preprocess(&img, &steps);
        assert_eq!((out.width(), out.height()), (64, 48));
    }
}
