// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Image transform — any decodable raster in, bounded JPEG out.

use packwerk_core::error::{PackwerkError, Result};
use packwerk_core::{InputFile, OutputFile, PipelineConfig, ProcessingOptions};
use tracing::{debug, instrument};

use super::processor::ImageProcessor;

/// Media type of every image transform output.
pub const OUTPUT_MIME_TYPE: &str = "image/jpeg";

/// Re-encode one image as JPEG at the requested quality.
///
/// Reads the source, decodes it, shrinks it to `config.max_image_dimension`
/// if needed, and encodes it. Decoding and encoding run on the blocking pool.
///
/// Errors: `Read` if the source cannot be read, `Decode` if it is not a
/// decodable image, `Encode` if the encoder fails or produces nothing.
#[instrument(skip_all, fields(name = %file.name, quality = options.quality))]
pub async fn compress_image(
    file: &InputFile,
    options: &ProcessingOptions,
    config: &PipelineConfig,
) -> Result<OutputFile> {
    let bytes = file.read_bytes().await?;
    let max_dimension = config.max_image_dimension;
    let quality = options.jpeg_quality();

    let encoded = tokio::task::spawn_blocking(move || {
        ImageProcessor::from_bytes(&bytes)?
            .fit_within(max_dimension)
            .to_jpeg_bytes(quality)
    })
    .await
    .map_err(|err| PackwerkError::Task(format!("image transform task: {err}")))??;

    debug!(
        input_bytes = file.byte_size,
        output_bytes = encoded.len(),
        "Image re-encoded"
    );
    Ok(OutputFile::new(jpeg_name(&file.name), OUTPUT_MIME_TYPE, encoded))
}

/// Swap the final extension for `.jpg`. Names without an extension (or
/// ending in a bare dot) are returned unchanged.
pub fn jpeg_name(name: &str) -> String {
    match name.rfind('.') {
        Some(pos) if pos + 1 < name.len() => format!("{}.jpg", &name[..pos]),
        _ => name.to_string(),
    }
}
