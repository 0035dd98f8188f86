// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document transform — best-effort page downscaling.
//
// Parse, scale, or serialise failures never escape: the original bytes are
// returned unchanged and `was_optimized` is cleared so callers can tell a real
// rewrite from the fallback.

use packwerk_core::error::{PackwerkError, Result};
use packwerk_core::{InputFile, OutputFile, PipelineConfig};
use tracing::{debug, instrument, warn};

use super::scaler::PdfScaler;

/// Media type of every document transform output.
pub const OUTPUT_MIME_TYPE: &str = "application/pdf";

/// Result of [`compress_pdf`].
#[derive(Debug, Clone)]
pub struct DocumentOutcome {
    pub file: OutputFile,
    /// False when the original bytes were returned as a fallback.
    pub was_optimized: bool,
    pub pages_scaled: usize,
}

/// Downscale the oversized pages of a PDF and re-serialise it.
///
/// Content problems never surface: parse, scale, and serialise failures all
/// return the original bytes with `was_optimized = false`.
///
/// The one exception is `Read`. When the source itself cannot be read there
/// are no bytes to fall back to, so this item fails like an unreadable image
/// would, instead of being reported as a successful no-op.
#[instrument(skip_all, fields(name = %file.name))]
pub async fn compress_pdf(file: &InputFile, config: &PipelineConfig) -> Result<DocumentOutcome> {
    let bytes = file.read_bytes().await?;
    let max_dimension = config.max_page_dimension;

    let joined = tokio::task::spawn_blocking(move || {
        let optimized = optimize(&bytes, max_dimension);
        (bytes, optimized)
    })
    .await;

    let (original, err) = match joined {
        Ok((_, Ok((optimized, pages_scaled)))) => {
            debug!(
                input_bytes = file.byte_size,
                output_bytes = optimized.len(),
                pages_scaled,
                "PDF re-serialised"
            );
            return Ok(DocumentOutcome {
                file: OutputFile::new(file.name.clone(), OUTPUT_MIME_TYPE, optimized),
                was_optimized: true,
                pages_scaled,
            });
        }
        Ok((original, Err(err))) => (original, err),
        // A panic inside the parser consumed the bytes; read them again.
        Err(join_err) => (
            file.read_bytes().await?,
            PackwerkError::Task(format!("PDF transform task: {join_err}")),
        ),
    };

    warn!(error = %err, "PDF could not be optimized, keeping the original");
    Ok(DocumentOutcome {
        file: OutputFile::new(file.name.clone(), file.mime_type.clone(), original),
        was_optimized: false,
        pages_scaled: 0,
    })
}

fn optimize(bytes: &[u8], max_dimension: f64) -> Result<(Vec<u8>, usize)> {
    let mut scaler = PdfScaler::from_bytes(bytes)?;
    let pages_scaled = scaler.scale_oversized_pages(max_dimension)?;
    let optimized = scaler.to_optimized_bytes()?;
    Ok((optimized, pages_scaled))
}
