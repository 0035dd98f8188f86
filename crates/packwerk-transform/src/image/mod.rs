// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image module — decode, bound, and re-encode raster images as JPEG.

pub mod processor;
pub mod transform;

pub use processor::ImageProcessor;
pub use transform::compress_image;
