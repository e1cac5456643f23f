// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page enhancement steps — deskew, noise removal, contrast enhancement, and
// table-line reinforcement applied to rasterised pages before recognition.

use image::{DynamicImage, GrayImage, Luma};
use imageproc::contours::{BorderType, find_contours};
use imageproc::filter::median_filter;
use imageproc::geometry::{contour_area, min_area_rect};
use imageproc::morphology::{Mask, grayscale_dilate, grayscale_erode};
use pagesift_core::error::PagesiftError;
use tracing::{debug, instrument};

use crate::image::processor::ImageProcessor;

/// Skew below this many degrees is left alone.
const MIN_SKEW_DEGREES: f32 = 0.5;

/// Contrast multiplier used by [`PageEnhancer::enhance_contrast`].
const CONTRAST_FACTOR: f32 = 1.5;

/// Length of the horizontal and vertical structuring elements used to pick
/// out ruling lines.
const LINE_KERNEL_LENGTH: u32 = 25;

/// Weight of the detected line mask when blended back onto the page.
const LINE_BLEND_WEIGHT: f32 = 0.2;

/// Enhances a rasterised page for recognition.
///
/// Every step consumes the enhancer and hands back a new one, mirroring
/// [`ImageProcessor`]. Steps return `Err` only when the input cannot be
/// processed at all (for example a zero-sized image); the pipeline in
/// [`super::pipeline`] then keeps the previous image.
pub struct PageEnhancer {
    /// The working image.
    image: DynamicImage,
}

impl PageEnhancer {
    /// Wrap an existing `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    /// Consume the enhancer and return the underlying image.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    fn ensure_non_empty(&self, step: &str) -> Result<(), PagesiftError> {
        if self.image.width() == 0 || self.image.height() == 0 {
            return Err(PagesiftError::ImageError(format!(
                "{step}: image has zero size"
            )));
        }
        Ok(())
    }

    // -- Deskew -----------------------------------------------------------------

    /// Straighten a rotated page.
    ///
    /// Binarises with Otsu's threshold, takes the largest outer contour of the
    /// ink, measures the angle of its minimum-area bounding rectangle, and
    /// rotates back when the skew exceeds half a degree. The canvas keeps its
    /// size and borders are replicated.
    #[instrument(skip(self))]
    pub fn deskew(self) -> Result<Self, PagesiftError> {
        self.ensure_non_empty("deskew")?;

        let gray = self.image.to_luma8();
        let Some(angle) = estimate_skew(&gray) else {
            debug!("No foreground contour; deskew skipped");
            return Ok(self);
        };

        if angle.abs() <= MIN_SKEW_DEGREES {
            debug!(angle, "Skew below threshold; deskew skipped");
            return Ok(self);
        }

        debug!(angle, "Correcting skew");
        let rotated = ImageProcessor::from_dynamic(self.image)
            .rotate_replicate(angle)
            .into_dynamic();
        Ok(Self {
            image: DynamicImage::ImageRgb8(rotated.to_rgb8()),
        })
    }

    // -- Noise removal ----------------------------------------------------------

    /// Grayscale plus a 3x3 median filter. Colour input comes back as RGB so
    /// downstream engines see the channel count they were given.
    #[instrument(skip(self))]
    pub fn remove_noise(self) -> Result<Self, PagesiftError> {
        self.ensure_non_empty("noise_removal")?;

        let had_color = self.image.color().has_color();
        let filtered = median_filter(&self.image.to_luma8(), 1, 1);
        let filtered = DynamicImage::ImageLuma8(filtered);

        let image = if had_color {
            DynamicImage::ImageRgb8(filtered.to_rgb8())
        } else {
            filtered
        };
        Ok(Self { image })
    }

    // -- Contrast ---------------------------------------------------------------

    /// Boost contrast by a fixed factor of 1.5.
    pub fn enhance_contrast(self) -> Result<Self, PagesiftError> {
        self.ensure_non_empty("contrast_enhancement")?;
        let image = ImageProcessor::from_dynamic(self.image)
            .adjust_contrast(CONTRAST_FACTOR)
            .into_dynamic();
        Ok(Self { image })
    }

    // -- Table lines ------------------------------------------------------------

    /// Reinforce horizontal and vertical ruling lines.
    ///
    /// Morphological opening (two erosions, then two dilations) with long
    /// horizontal and vertical structuring elements isolates straight runs;
    /// their average is blended onto the grayscale page at weight 0.2.
    #[instrument(skip(self))]
    pub fn enhance_lines(self) -> Result<Self, PagesiftError> {
        self.ensure_non_empty("line_detection")?;

        let gray = self.image.to_luma8();

        let horizontal_kernel =
            GrayImage::from_pixel(LINE_KERNEL_LENGTH, 1, Luma([255u8]));
        let vertical_kernel = GrayImage::from_pixel(1, LINE_KERNEL_LENGTH, Luma([255u8]));
        let centre = (LINE_KERNEL_LENGTH / 2) as u8;
        let horizontal_mask = Mask::from_image(&horizontal_kernel, centre, 0);
        let vertical_mask = Mask::from_image(&vertical_kernel, 0, centre);

        let horizontal = open_twice(&gray, &horizontal_mask);
        let vertical = open_twice(&gray, &vertical_mask);

        let blended = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let lines = 0.5 * horizontal.get_pixel(x, y).0[0] as f32
                + 0.5 * vertical.get_pixel(x, y).0[0] as f32;
            let base = gray.get_pixel(x, y).0[0] as f32;
            let value = (1.0 - LINE_BLEND_WEIGHT) * base + LINE_BLEND_WEIGHT * lines;
            Luma([value.round().clamp(0.0, 255.0) as u8])
        });

        Ok(Self {
            image: DynamicImage::ImageRgb8(DynamicImage::ImageLuma8(blended).to_rgb8()),
        })
    }
}

/// Opening with two iterations: erode, erode, dilate, dilate.
fn open_twice(gray: &GrayImage, mask: &Mask) -> GrayImage {
    let eroded = grayscale_erode(&grayscale_erode(gray, mask), mask);
    grayscale_dilate(&grayscale_dilate(&eroded, mask), mask)
}

// -- Skew estimation -----------------------------------------------------------

/// Estimate page skew in degrees, in `[-45, 45)`.
///
/// Positive values mean the content is rotated clockwise on screen and needs
/// a counter-clockwise correction. Returns `None` when the page has no ink.
pub fn estimate_skew(gray: &GrayImage) -> Option<f32> {
    let ink = binarize_ink(gray);

    let contours = find_contours::<i32>(&ink);
    let largest = contours
        .iter()
        .filter(|c| c.border_type == BorderType::Outer && c.parent.is_none())
        .max_by(|a, b| {
            contour_area(&a.points)
                .partial_cmp(&contour_area(&b.points))
                .unwrap_or(std::cmp::Ordering::Equal)
        })?;

    if largest.points.len() < 3 {
        return None;
    }

    let rect = min_area_rect(&largest.points);
    let dx = (rect[1].x - rect[0].x) as f32;
    let dy = (rect[1].y - rect[0].y) as f32;
    if dx == 0.0 && dy == 0.0 {
        return None;
    }

    Some(normalize_skew_angle(dy.atan2(dx).to_degrees()))
}

/// Fold an edge angle onto `[-45, 45)`.
///
/// The angle is first brought into `[-90, 0)`, the range a rectangle side
/// angle is reported in, then angles below -45 are shifted by +90.
fn normalize_skew_angle(degrees: f32) -> f32 {
    let mut angle = degrees.rem_euclid(90.0) - 90.0;
    if angle < -45.0 {
        angle += 90.0;
    }
    angle
}

/// Otsu binarisation with ink (pixels darker than the threshold) as
/// foreground (255) and paper as background (0).
fn binarize_ink(gray: &GrayImage) -> GrayImage {
    let threshold = otsu_threshold(gray);
    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        let val = gray.get_pixel(x, y).0[0];
        Luma([if val <= threshold { 255u8 } else { 0u8 }])
    })
}

/// Compute the Otsu threshold for a grayscale image.
///
/// Finds the threshold value that maximises the between-class variance of
/// the dark and light pixel groups.
fn otsu_threshold(gray: &GrayImage) -> u8 {
    // Build histogram.
    let mut histogram = [0u64; 256];
    for pixel in gray.pixels() {
        histogram[pixel.0[0] as usize] += 1;
    }

    let total_pixels = gray.width() as u64 * gray.height() as u64;
    if total_pixels == 0 {
        return 128;
    }

    let mut sum_total: f64 = 0.0;
    for (i, &count) in histogram.iter().enumerate() {
        sum_total += i as f64 * count as f64;
    }

    let mut sum_background: f64 = 0.0;
    let mut weight_background: u64 = 0;
    let mut max_variance: f64 = 0.0;
    let mut best_threshold: u8 = 0;

    for (t, &count) in histogram.iter().enumerate() {
        weight_background += count;
        if weight_background == 0 {
            continue;
        }
        let weight_foreground = total_pixels - weight_background;
        if weight_foreground == 0 {
            break;
        }

        sum_background += t as f64 * count as f64;
        let mean_background = sum_background / weight_background as f64;
        let mean_foreground =
            (sum_total - sum_background) / weight_foreground as f64;

        let between_variance = weight_background as f64
            * weight_foreground as f64
            * (mean_background - mean_foreground).powi(2);

        if between_variance > max_variance {
            max_variance = between_variance;
            best_threshold = t as u8;
        }
    }

    best_threshold
}

// -- Tests --------------------------------------------------------------------
