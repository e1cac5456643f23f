// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image processor — contrast adjustment and border-replicating rotation for
// rasterised pages. Operates on in-memory images using the `image` crate.

use image::{DynamicImage, Rgba};
use imageproc::geometric_transformations::{Interpolation, warp_with};
use tracing::{debug, instrument};

/// Distance kept from the last row and column when clamping sample points.
const EDGE_INSET: f32 = 1e-3;

/// Image processing pipeline operating on a single in-memory page image.
///
/// All operations are non-destructive: each method consumes `self` and returns a
/// new `ImageProcessor` wrapping the transformed image, enabling method chaining.
///
/// ```ignore
/// let page = ImageProcessor::from_dynamic(page)
///     .rotate_replicate(2.5)
///     .adjust_contrast(1.5)
///     .into_dynamic();
/// ```
pub struct ImageProcessor {
    /// The current working image.
    image: DynamicImage,
}

impl ImageProcessor {
    // -- Construction ---------------------------------------------------------

    /// Wrap an already-decoded `DynamicImage`.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self { image }
    }

    // -- Accessors ------------------------------------------------------------

    /// Consume the processor and return the underlying `DynamicImage`.
    pub fn into_dynamic(self) -> DynamicImage {
        self.image
    }

    // -- Transformations (consume self, return new Self) -----------------------

    /// Adjust contrast by a factor. Values > 1.0 increase contrast; values
    /// < 1.0 decrease it. A value of 1.0 is a no-op.
    ///
    /// Channels are stretched away from the image's mean luminance, so a page
    /// keeps its overall brightness while ink and paper move apart.
    #[instrument(skip(self), fields(factor))]
    pub fn adjust_contrast(self, factor: f32) -> Self {
        let pivot = mean_luminance(&self.image);
        debug!(factor, pivot, "Adjusting contrast");

        let rgba = self.image.to_rgba8();

        let contrasted =
            image::ImageBuffer::from_fn(rgba.width(), rgba.height(), |x, y| {
                let pixel = rgba.get_pixel(x, y);
                let Rgba([r, g, b, a]) = *pixel;
                let adjust = |channel: u8| -> u8 {
                    let val = factor * (channel as f32 - pivot) + pivot;
                    val.round().clamp(0.0, 255.0) as u8
                };
                Rgba([adjust(r), adjust(g), adjust(b), a])
            });

        Self {
            image: DynamicImage::ImageRgba8(contrasted),
        }
    }

    /// Rotate the image by `degrees` counter-clockwise about its centre,
    /// keeping the canvas size.
    ///
    /// Uses bilinear sampling. Source coordinates are clamped to the image, so
    /// pixels that would come from outside take the nearest edge pixel and no
    /// blank wedges appear in the corners.
    #[instrument(skip(self), fields(degrees))]
    pub fn rotate_replicate(self, degrees: f32) -> Self {
        if degrees.abs() < f32::EPSILON {
            return self;
        }

        let rgba = self.image.to_rgba8();
        let (width, height) = rgba.dimensions();
        if width < 2 || height < 2 {
            return Self {
                image: DynamicImage::ImageRgba8(rgba),
            };
        }

        let (sin, cos) = degrees.to_radians().sin_cos();
        let cx = (width / 2) as f32;
        let cy = (height / 2) as f32;
        // Bilinear sampling needs the right/bottom neighbour inside the image.
        let max_x = (width - 1) as f32 - EDGE_INSET;
        let max_y = (height - 1) as f32 - EDGE_INSET;

        let rotated = warp_with(
            &rgba,
            move |x, y| {
                let dx = x - cx;
                let dy = y - cy;
                let src_x = cx + cos * dx - sin * dy;
                let src_y = cy + sin * dx + cos * dy;
                (src_x.clamp(0.0, max_x), src_y.clamp(0.0, max_y))
            },
            Interpolation::Bilinear,
            Rgba([255, 255, 255, 255]),
        );

        debug!("Rotation applied with replicated border");
        Self {
            image: DynamicImage::ImageRgba8(rotated),
        }
    }
}

/// Mean luma of an image, 128 for an empty one.
fn mean_luminance(image: &DynamicImage) -> f32 {
    let gray = image.to_luma8();
    let count = gray.width() as u64 * gray.height() as u64;
    if count == 0 {
        return 128.0;
    }
    let sum: u64 = gray.pixels().map(|p| p.0[0] as u64).sum();
    sum as f32 / count as f32
}
