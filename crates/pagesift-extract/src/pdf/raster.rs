// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Page rasterisation through poppler's `pdftoppm`.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::DynamicImage;
use pagesift_core::ExtractionConfig;
use pagesift_core::error::{PagesiftError, Result};
use tempfile::TempDir;
use tracing::{debug, instrument};

/// Renders single PDF pages to images with `pdftoppm -png`.
#[derive(Debug, Clone)]
pub struct Rasterizer {
    binary: String,
}

impl Rasterizer {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Rasteriser using `config.rasterizer_binary`.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new(config.rasterizer_binary.clone())
    }

    pub fn binary(&self) -> &str {
        &self.binary
    }

    /// Render 1-based `page_number` of the PDF at `pdf_path`.
    #[instrument(skip(self, pdf_path), fields(page_number, dpi))]
    pub fn render_page(&self, pdf_path: &Path, page_number: u32, dpi: u32) -> Result<DynamicImage> {
        let out_dir = TempDir::new()?;
        let page = page_number.to_string();
        let prefix = out_dir.path().join("page");

        let status = Command::new(&self.binary)
            .args(["-png", "-r", &dpi.to_string(), "-f", &page, "-l", &page])
            .arg(pdf_path)
            .arg(&prefix)
            .status();

        match status {
            Ok(s) if s.success() => {}
            Ok(s) => {
                return Err(PagesiftError::RenderError(format!(
                    "{} exited with {} on page {}",
                    self.binary, s, page_number
                )));
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(PagesiftError::RenderError(format!(
                    "{} not installed. Install with: apt install poppler-utils",
                    self.binary
                )));
            }
            Err(err) => return Err(err.into()),
        }

        let path = find_page_image(out_dir.path(), page_number).ok_or_else(|| {
            PagesiftError::RenderError(format!("no image generated for page {}", page_number))
        })?;
        let image = image::open(&path).map_err(|err| {
            PagesiftError::RenderError(format!("failed to decode {}: {}", path.display(), err))
        })?;
        debug!(width = image.width(), height = image.height(), "Page rasterised");
        Ok(image)
    }
}

/// Locate the file `pdftoppm` wrote for `page_number`. The zero padding
/// depends on the document's page count.
pub fn find_page_image(dir: &Path, page_number: u32) -> Option<PathBuf> {
    (1..=4)
        .map(|digits| dir.join(format!("page-{:0width$}.png", page_number, width = digits)))
        .find(|path| path.exists())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_padded_output_names() {
        let dir = TempDir::new().unwrap();
        assert!(find_page_image(dir.path(), 3).is_none());

        let path = dir.path().join("page-003.png");
        std::fs::write(&path, b"png").unwrap();
        assert_eq!(find_page_image(dir.path(), 3), Some(path));
    }

    #[test]
    fn finds_unpadded_output_name() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("page-7.png");
        std::fs::write(&path, b"png").unwrap();
        assert_eq!(find_page_image(dir.path(), 7), Some(path));
    }

    #[test]
    fn binary_comes_from_config() {
        let config = ExtractionConfig {
            rasterizer_binary: "/opt/poppler/bin/pdftoppm".into(),
            ..Default::default()
        };
        assert_eq!(Rasterizer::from_config(&config).binary(), "/opt/poppler/bin/pdftoppm");
        assert_eq!(Rasterizer::from_config(&ExtractionConfig::default()).binary(), "pdftoppm");
    }

    #[test]
    fn missing_binary_is_a_render_error() {
        let raster = Rasterizer::new("pagesift-no-such-pdftoppm");
        let err = raster
            .render_page(Path::new("/nonexistent.pdf"), 1, 72)
            .unwrap_err();
        assert!(matches!(err, PagesiftError::RenderError(_)));
    }
}
