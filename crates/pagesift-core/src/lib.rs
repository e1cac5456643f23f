// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// pagesift — Core types, configuration, and error definitions shared by the
// extraction crate and its downstream consumers.

pub mod config;
pub mod error;
pub mod stats;
pub mod types;

pub use config::ExtractionConfig;
pub use error::PagesiftError;
pub use stats::{BatchReport, BatchStatistics};
pub use types::*;
