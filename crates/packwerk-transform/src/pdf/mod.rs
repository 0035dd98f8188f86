// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// PDF module — oversized page downscaling and optimized re-serialisation.

pub mod scaler;
pub mod transform;

pub use scaler::PdfScaler;
pub use transform::{DocumentOutcome, compress_pdf};
