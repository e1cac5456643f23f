// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF reader — opens a document with `lopdf`, probes every page's native
// text and embedded images up front, and rasterises pages on demand with
// `pdftoppm`.

use std::path::{Path, PathBuf};

use image::DynamicImage;
use lopdf::{Dictionary, Document, Object, ObjectId};
use pagesift_core::ExtractionConfig;
use pagesift_core::error::{PagesiftError, Result};
use pagesift_core::types::TableData;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};

use super::raster::Rasterizer;
use super::source::PageSource;
use super::tables::detect_tables;

/// Bound on `/Parent` hops when looking for inherited resources.
const MAX_PAGE_TREE_DEPTH: usize = 32;

/// What one page's probes produced. Failures are kept as messages and
/// surfaced when the page is queried.
#[derive(Debug, Clone)]
struct PageProbe {
    native_text: std::result::Result<String, String>,
    image_count: std::result::Result<usize, String>,
}

/// Where `pdftoppm` reads the document from.
enum Backing {
    File(PathBuf),
    /// In-memory input spilled to disk; removed on drop.
    Spilled(NamedTempFile),
}

impl Backing {
    fn path(&self) -> &Path {
        match self {
            Self::File(path) => path,
            Self::Spilled(file) => file.path(),
        }
    }
}

/// A PDF opened for extraction.
///
/// All `lopdf` work happens in [`PdfDocument::open`] / [`PdfDocument::from_bytes`],
/// so the value is plain data and can be shared across worker threads.
pub struct PdfDocument {
    pages: Vec<PageProbe>,
    backing: Backing,
    rasterizer: Rasterizer,
}

impl PdfDocument {
    // -- Construction ---------------------------------------------------------

    /// Open a PDF from the filesystem with the default configuration.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &ExtractionConfig::default())
    }

    /// Open a PDF from the filesystem, rasterising with
    /// `config.rasterizer_binary`. Failure here is fatal for the run.
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn open_with_config(path: impl AsRef<Path>, config: &ExtractionConfig) -> Result<Self> {
        let path_ref = path.as_ref();
        info!("Opening PDF: {}", path_ref.display());

        let document = Document::load(path_ref).map_err(|err| {
            PagesiftError::PdfError(format!("failed to open {}: {}", path_ref.display(), err))
        })?;

        Ok(Self {
            pages: probe_pages(&document),
            backing: Backing::File(path_ref.to_path_buf()),
            rasterizer: Rasterizer::from_config(config),
        })
    }

    /// Load a PDF already in memory with the default configuration.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_config(data, &ExtractionConfig::default())
    }

    /// Load a PDF already in memory. The bytes are spilled to a temporary
    /// file for the rasteriser.
    #[instrument(skip_all, fields(bytes_len = data.len()))]
    pub fn from_bytes_with_config(data: &[u8], config: &ExtractionConfig) -> Result<Self> {
        let document = Document::load_mem(data).map_err(|err| {
            PagesiftError::PdfError(format!("failed to load PDF from memory: {}", err))
        })?;

        let spilled = tempfile::Builder::new()
            .prefix("pagesift-")
            .suffix(".pdf")
            .tempfile()?;
        std::fs::write(spilled.path(), data)?;

        Ok(Self {
            pages: probe_pages(&document),
            backing: Backing::Spilled(spilled),
            rasterizer: Rasterizer::from_config(config),
        })
    }

    /// Path handed to the rasteriser.
    pub fn source_path(&self) -> &Path {
        self.backing.path()
    }

    fn probe(&self, page_index: usize) -> Result<&PageProbe> {
        self.pages.get(page_index).ok_or_else(|| {
            PagesiftError::PdfError(format!(
                "page {} out of range (document has {} pages)",
                page_index,
                self.pages.len()
            ))
        })
    }
}

impl PageSource for PdfDocument {
    fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn native_text(&self, page_index: usize) -> Result<String> {
        self.probe(page_index)?
            .native_text
            .clone()
            .map_err(PagesiftError::ClassificationError)
    }

    fn table_regions(&self, page_index: usize) -> Result<Vec<TableData>> {
        Ok(detect_tables(&self.native_text(page_index)?))
    }

    fn embedded_image_count(&self, page_index: usize) -> Result<usize> {
        self.probe(page_index)?
            .image_count
            .clone()
            .map_err(PagesiftError::ClassificationError)
    }

    fn rasterize(&self, page_index: usize, dpi: u32) -> Result<DynamicImage> {
        self.probe(page_index)?;
        self.rasterizer
            .render_page(self.backing.path(), page_index as u32 + 1, dpi)
    }
}

// -- Probing -------------------------------------------------------------------

fn probe_pages(document: &Document) -> Vec<PageProbe> {
    let pages = document.get_pages();
    let mut numbered: Vec<(u32, ObjectId)> = pages.into_iter().collect();
    numbered.sort_by_key(|(number, _)| *number);

    let probes: Vec<PageProbe> = numbered
        .into_iter()
        .map(|(number, page_id)| {
            let native_text = document
                .extract_text(&[number])
                .map_err(|err| format!("text extraction failed on page {}: {}", number, err));
            let image_count = count_page_images(document, page_id)
                .map_err(|err| format!("image probe failed on page {}: {}", number, err));
            if let Err(err) = native_text.as_ref().and(image_count.as_ref()) {
                warn!(page = number, error = %err, "Page probe failed");
            }
            PageProbe {
                native_text,
                image_count,
            }
        })
        .collect();

    debug!(pages = probes.len(), "PDF pages probed");
    probes
}

fn resolve_dict<'a>(document: &'a Document, object: &'a Object) -> lopdf::Result<&'a Dictionary> {
    let (_, object) = document.dereference(object)?;
    object.as_dict()
}

/// The page's `/Resources`, following `/Parent` when it is inherited.
fn page_resources(document: &Document, page_id: ObjectId) -> lopdf::Result<Option<&Dictionary>> {
    let mut node = document.get_dictionary(page_id)?;
    for _ in 0..MAX_PAGE_TREE_DEPTH {
        if let Ok(resources) = node.get(b"Resources") {
            return resolve_dict(document, resources).map(Some);
        }
        match node.get(b"Parent") {
            Ok(parent) => node = resolve_dict(document, parent)?,
            Err(_) => return Ok(None),
        }
    }
    Ok(None)
}

/// Count `/Subtype /Image` XObjects referenced from the page's resources.
fn count_page_images(document: &Document, page_id: ObjectId) -> lopdf::Result<usize> {
    let Some(resources) = page_resources(document, page_id)? else {
        return Ok(0);
    };
    let xobjects = match resources.get(b"XObject") {
        Ok(object) => resolve_dict(document, object)?,
        Err(_) => return Ok(0),
    };

    let mut count = 0;
    for (_, value) in xobjects.iter() {
        let (_, object) = document.dereference(value)?;
        if let Ok(stream) = object.as_stream() {
            let is_image = stream
                .dict
                .get(b"Subtype")
                .and_then(|subtype| subtype.as_name())
                .is_ok_and(|name| name == b"Image");
            if is_image {
                count += 1;
            }
        }
    }
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{Stream, dictionary};

    /// One-page PDF with a line of Courier text, resources inherited from the
    /// page tree, and optionally a 1x1 image XObject.
    fn sample_pdf(with_image: bool) -> Vec<u8> {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        });
        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        if with_image {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 1,
                    "Height" => 1,
                    "ColorSpace" => "DeviceGray",
                    "BitsPerComponent" => 8,
                },
                vec![0u8],
            ));
            resources.set("XObject", dictionary! { "Im1" => image_id });
        }
        let resources_id = doc.add_object(resources);

        let content = Content {
            operations: vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 24.into()]),
                Operation::new("Td", vec![100.into(), 600.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello pagesift")]),
                Operation::new("ET", vec![]),
            ],
        };
        let content_id =
            doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => vec![0.into(), 0.into(), 595.into(), 842.into()],
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut bytes = Vec::new();
        doc.save_to(&mut bytes).unwrap();
        bytes
    }

    #[test]
    fn probes_text_and_inherited_images() {
        let pdf = PdfDocument::from_bytes(&sample_pdf(true)).unwrap();
        assert_eq!(pdf.page_count(), 1);
        assert!(pdf.native_text(0).unwrap().contains("Hello"));
        assert_eq!(pdf.embedded_image_count(0).unwrap(), 1);
        assert!(pdf.table_regions(0).unwrap().is_empty());
    }

    #[test]
    fn text_only_page_has_no_images() {
        let pdf = PdfDocument::from_bytes(&sample_pdf(false)).unwrap();
        assert_eq!(pdf.embedded_image_count(0).unwrap(), 0);
    }

    #[test]
    fn out_of_range_page_is_an_error() {
        let pdf = PdfDocument::from_bytes(&sample_pdf(false)).unwrap();
        assert!(pdf.native_text(3).is_err());
        assert!(pdf.rasterize(3, 72).is_err());
    }

    #[test]
    fn garbage_input_fails_to_load() {
        let err = PdfDocument::from_bytes(b"definitely not a pdf").err().unwrap();
        assert!(matches!(err, PagesiftError::PdfError(_)));
    }

    #[test]
    fn rasterizer_binary_follows_config() {
        let config = ExtractionConfig {
            rasterizer_binary: "pagesift-no-such-pdftoppm".into(),
            ..Default::default()
        };
        let pdf = PdfDocument::from_bytes_with_config(&sample_pdf(false), &config).unwrap();
        match pdf.rasterize(0, 72) {
            Err(PagesiftError::RenderError(message)) => {
                assert!(message.contains("pagesift-no-such-pdftoppm"))
            }
            other => panic!("expected render error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn spilled_copy_exists_for_rasteriser() {
        let pdf = PdfDocument::from_bytes(&sample_pdf(false)).unwrap();
        assert!(pdf.source_path().exists());
    }
}
