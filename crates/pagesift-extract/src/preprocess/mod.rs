// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Preprocessing — per-content-type image transforms applied to rasterised
// pages before recognition (deskew, noise removal, contrast, table lines).

pub mod enhance;
pub mod pipeline;

pub use enhance::{PageEnhancer, estimate_skew};
pub use pipeline::{PreprocessPolicy, preprocess};
