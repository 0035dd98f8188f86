// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive packer — combine input files, unmodified, into one ZIP container.

use std::io::{Cursor, Write};
use std::path::Path;

use packwerk_core::error::{PackwerkError, Result};
use packwerk_core::{InputFile, OutputFile, PipelineConfig};
use tracing::{debug, info, instrument};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Media type of the packed archive.
pub const ARCHIVE_MIME_TYPE: &str = "application/zip";

/// Packs files into a DEFLATE-compressed ZIP archive.
pub struct ArchivePacker {
    /// DEFLATE level, 0-9.
    level: i32,
    /// File name given to the packed output.
    archive_name: String,
}

impl ArchivePacker {
    pub fn new(level: i32, archive_name: impl Into<String>) -> Self {
        Self {
            level: level.clamp(0, 9),
            archive_name: archive_name.into(),
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.zip_compression_level, config.archive_name.clone())
    }

    /// Pack `files` in order, each under its base name with its bytes
    /// untouched.
    ///
    /// A later file with a name already in the archive replaces the earlier
    /// entry's content but keeps the earlier position.
    #[instrument(skip_all, fields(files = files.len(), level = self.level))]
    pub async fn pack(&self, files: &[InputFile]) -> Result<OutputFile> {
        let mut entries: Vec<(String, Vec<u8>)> = Vec::with_capacity(files.len());

        for (index, file) in files.iter().enumerate() {
            let bytes = file.read_bytes().await.map_err(|err| {
                PackwerkError::Pack(format!(
                    "cannot read {}: {}",
                    file.name,
                    err.detail().unwrap_or("unknown error")
                ))
            })?;
            let name = sanitize_entry_name(&file.name, &format!("unnamed_{index}"));

            match entries.iter_mut().find(|(existing, _)| *existing == name) {
                Some(entry) => {
                    debug!(name = %name, "duplicate entry name, replacing earlier content");
                    entry.1 = bytes;
                }
                None => entries.push((name, bytes)),
            }
        }

        let level = self.level;
        let entry_count = entries.len();
        let packed = tokio::task::spawn_blocking(move || write_zip(&entries, level))
            .await
            .map_err(|err| PackwerkError::Task(format!("archive task: {err}")))??;

        info!(entries = entry_count, archive_bytes = packed.len(), "Archive packed");
        Ok(OutputFile::new(self.archive_name.clone(), ARCHIVE_MIME_TYPE, packed))
    }

    /// The per-item archive result: an unmodified copy of the input.
    pub async fn identity(file: &InputFile) -> Result<OutputFile> {
        let bytes = file.read_bytes().await?;
        Ok(OutputFile::new(file.name.clone(), file.mime_type.clone(), bytes))
    }
}

fn write_zip(entries: &[(String, Vec<u8>)], level: i32) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .compression_level(Some(level))
        .unix_permissions(0o644);

    for (name, bytes) in entries {
        zip.start_file(name.as_str(), options)
            .map_err(|err| PackwerkError::Pack(format!("failed to add {name}: {err}")))?;
        zip.write_all(bytes)
            .map_err(|err| PackwerkError::Pack(format!("failed to write {name}: {err}")))?;
    }

    let cursor = zip
        .finish()
        .map_err(|err| PackwerkError::Pack(format!("failed to finalize archive: {err}")))?;
    Ok(cursor.into_inner())
}

/// Base name of `name`, so entries cannot escape the archive root. Empty and
/// dot-only names fall back to `fallback`.
fn sanitize_entry_name(name: &str, fallback: &str) -> String {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|s| !s.is_empty() && *s != "." && *s != "..")
        .unwrap_or(fallback)
        .to_string()
}
