// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — the page-source interface, the lopdf-backed reader, table
// detection in native text, and pdftoppm rasterisation.

pub mod raster;
pub mod reader;
pub mod source;
pub mod tables;

pub use raster::Rasterizer;
pub use reader::PdfDocument;
pub use source::PageSource;
