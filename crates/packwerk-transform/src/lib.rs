// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// packwerk-transform — The per-file transforms of the Packwerk pipeline.
//
// Provides image re-encoding (bounded JPEG at a chosen quality), PDF page
// downscaling with object-stream re-serialisation, and ZIP packing of
// arbitrary files.

pub mod archive;
pub mod image;
pub mod pdf;

// Re-export the primary entry points so callers can use
// `packwerk_transform::compress_image` etc.
pub use archive::ArchivePacker;
pub use self::image::{ImageProcessor, compress_image};
pub use pdf::{DocumentOutcome, PdfScaler, compress_pdf};
