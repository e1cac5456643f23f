// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Tesseract engine, driven through its command-line interface.
//
// The page is written to a temporary PNG and Tesseract is asked for TSV
// output, which carries a per-word confidence column.

use std::path::Path;
use std::process::Command;

use image::DynamicImage;
use pagesift_core::config::TesseractSettings;
use pagesift_core::error::{PagesiftError, Result};
use pagesift_core::types::{EngineKind, EngineStatus};
use tracing::{debug, info, instrument, warn};

use super::engine::{RawRecognition, ScoredToken, TextRecognizer, write_temp_png};

/// Tesseract via `tesseract <image> stdout ... tsv`.
pub struct TesseractRecognizer {
    settings: TesseractSettings,
    /// First line of `tesseract --version`, or `None` when the probe failed.
    version: Option<String>,
}

impl TesseractRecognizer {
    /// Build the recognizer and probe the binary once.
    pub fn new(settings: TesseractSettings) -> Self {
        let version = probe_version(&settings.binary);
        match &version {
            Some(v) => info!(binary = %settings.binary, version = %v, "Tesseract available"),
            None => warn!(binary = %settings.binary, "Tesseract not found"),
        }
        Self { settings, version }
    }

    fn run(&self, image_path: &Path) -> Result<String> {
        let output = Command::new(&self.settings.binary)
            .arg(image_path)
            .arg("stdout")
            .args(["-l", &self.settings.language])
            .args(["--oem", &self.settings.oem.to_string()])
            .args(["--psm", &self.settings.psm.to_string()])
            .arg("tsv")
            .output();

        match output {
            Ok(output) if output.status.success() => {
                Ok(String::from_utf8_lossy(&output.stdout).into_owned())
            }
            Ok(output) => Err(PagesiftError::EngineFailed(format!(
                "tesseract exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ))),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Err(PagesiftError::EngineUnavailable(format!(
                    "{} not found (install tesseract-ocr)",
                    self.settings.binary
                )))
            }
            Err(err) => Err(PagesiftError::Io(err)),
        }
    }
}

impl TextRecognizer for TesseractRecognizer {
    fn kind(&self) -> EngineKind {
        EngineKind::Tesseract
    }

    fn is_available(&self) -> bool {
        self.version.is_some()
    }

    fn status(&self) -> EngineStatus {
        EngineStatus {
            engine: EngineKind::Tesseract,
            available: self.version.is_some(),
            detail: self.version.clone().unwrap_or_else(|| {
                format!(
                    "{} not installed. Install with: apt install tesseract-ocr",
                    self.settings.binary
                )
            }),
        }
    }

    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition> {
        let file = write_temp_png(image)?;

        let tsv = self.run(file.path())?;
        let tokens = parse_tsv(&tsv);
        debug!(tokens = tokens.len(), "Tesseract finished");
        Ok(RawRecognition::Tokens(tokens))
    }
}

fn probe_version(binary: &str) -> Option<String> {
    let output = Command::new(binary).arg("--version").output().ok()?;
    if !output.status.success() {
        return None;
    }
    // Older releases print the banner on stderr.
    let banner = if output.stdout.is_empty() {
        output.stderr
    } else {
        output.stdout
    };
    let text = String::from_utf8_lossy(&banner);
    Some(text.lines().next().unwrap_or("tesseract").trim().to_owned())
}

/// Parse Tesseract TSV into word tokens.
///
/// Columns: level, page, block, paragraph, line, word, left, top, width,
/// height, conf, text. Rows whose confidence is not a number (the header) are
/// skipped; structural rows carry `-1` and are left for the aggregator to drop.
pub fn parse_tsv(tsv: &str) -> Vec<ScoredToken> {
    tsv.lines()
        .filter_map(|line| {
            let mut columns = line.splitn(12, '\t');
            let conf = columns.nth(10)?.trim().parse::<f64>().ok()?;
            let text = columns.next().unwrap_or("").trim();
            Some(ScoredToken::new(text, conf))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recognize::engine::aggregate;

    const SAMPLE_TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext\n\
1\t1\t0\t0\t0\t0\t0\t0\t640\t480\t-1\t\n\
4\t1\t1\t1\t1\t0\t10\t10\t200\t20\t-1\t\n\
5\t1\t1\t1\t1\t1\t10\t10\t60\t20\t96.5\tInvoice\n\
5\t1\t1\t1\t1\t2\t80\t10\t40\t20\t88.5\tTotal\n\
5\t1\t1\t1\t1\t3\t130\t10\t10\t20\t0\t~\n";

    #[test]
    fn parse_tsv_skips_header_and_keeps_scores() {
        let tokens = parse_tsv(SAMPLE_TSV);
        assert_eq!(tokens.len(), 5);
        assert_eq!(tokens[2], ScoredToken::new("Invoice", 96.5));
        assert_eq!(tokens[0].confidence, -1.0);
    }

    #[test]
    fn tsv_aggregates_to_confident_words() {
        let (text, conf) = aggregate(&RawRecognition::Tokens(parse_tsv(SAMPLE_TSV)));
        assert_eq!(text, "Invoice Total");
        assert!((conf - 92.5).abs() < 1e-9);
    }

    #[test]
    fn blank_word_rows_are_ignored_in_confidence() {
        let tsv = "5\t1\t1\t1\t1\t1\t10\t10\t60\t20\t50\tInvoice\n\
5\t1\t1\t1\t1\t2\t80\t10\t40\t20\t95\t \n";
        let (text, conf) = aggregate(&RawRecognition::Tokens(parse_tsv(tsv)));
        assert_eq!(text, "Invoice");
        assert_eq!(conf, 50.0);
    }

    #[test]
    fn missing_binary_reports_unavailable() {
        let recognizer = TesseractRecognizer::new(TesseractSettings {
            binary: "pagesift-no-such-tesseract".into(),
            ..Default::default()
        });
        assert!(!recognizer.is_available());
        let status = recognizer.status();
        assert!(!status.available);
        assert!(status.detail.contains("not installed"));
    }
}
