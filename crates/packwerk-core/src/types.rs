// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Packwerk file-processing pipeline.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{PackwerkError, Result};
use crate::sizes::reduction_percent;

/// Unique identifier for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunId(pub Uuid);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The tool selected for a run. Determines the acceptance rule, the
/// transform, and whether the results are packed into an archive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    Image,
    Document,
    Archive,
}

impl ToolKind {
    /// Whether a file with the declared media type may enter a run of this tool.
    pub fn accepts(&self, mime_type: &str) -> bool {
        match self {
            Self::Image => mime_type.starts_with("image/"),
            Self::Document => mime_type == "application/pdf",
            Self::Archive => true,
        }
    }

    /// Short lowercase label, also the accepted `FromStr` spelling.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Image => "image",
            Self::Document => "pdf",
            Self::Archive => "archive",
        }
    }
}

impl std::fmt::Display for ToolKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ToolKind {
    type Err = PackwerkError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "image" | "images" => Ok(Self::Image),
            "pdf" | "document" => Ok(Self::Document),
            "archive" | "zip" => Ok(Self::Archive),
            other => Err(PackwerkError::Config(format!("unknown tool: {other}"))),
        }
    }
}

/// Media type for a file extension. Unknown extensions map to
/// `application/octet-stream`.
pub fn media_type_for_extension(ext: &str) -> &'static str {
    match ext.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "ico" => "image/x-icon",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        _ => "application/octet-stream",
    }
}

/// Where the raw bytes of an [`InputFile`] live.
#[derive(Clone)]
pub enum FileSource {
    /// Bytes already held in memory.
    Memory(Vec<u8>),
    /// Bytes read lazily from disk when the item is processed.
    Path(PathBuf),
}

impl std::fmt::Debug for FileSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory(bytes) => write!(f, "Memory({} bytes)", bytes.len()),
            Self::Path(path) => write!(f, "Path({})", path.display()),
        }
    }
}

/// A user-selected file. Never mutated by the pipeline.
#[derive(Debug, Clone)]
pub struct InputFile {
    pub name: String,
    pub mime_type: String,
    pub byte_size: u64,
    pub source: FileSource,
}

impl InputFile {
    /// Wrap bytes already in memory.
    pub fn from_bytes(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            byte_size: bytes.len() as u64,
            source: FileSource::Memory(bytes),
        }
    }

    /// Describe a file on disk. Only metadata is read here; the content is
    /// read when the item is processed. The media type is inferred from the
    /// extension.
    pub async fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let metadata = tokio::fs::metadata(path)
            .await
            .map_err(|err| PackwerkError::Read(format!("{}: {}", path.display(), err)))?;

        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_string();
        let mime_type = path
            .extension()
            .and_then(|e| e.to_str())
            .map(media_type_for_extension)
            .unwrap_or("application/octet-stream");

        Ok(Self {
            name,
            mime_type: mime_type.to_string(),
            byte_size: metadata.len(),
            source: FileSource::Path(path.to_path_buf()),
        })
    }

    /// Read the full content of the file.
    pub async fn read_bytes(&self) -> Result<Vec<u8>> {
        match &self.source {
            FileSource::Memory(bytes) => Ok(bytes.clone()),
            FileSource::Path(path) => tokio::fs::read(path)
                .await
                .map_err(|err| PackwerkError::Read(format!("{}: {}", path.display(), err))),
        }
    }
}

/// A file produced by a transform or by archive packing.
#[derive(Clone)]
pub struct OutputFile {
    pub name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
    pub last_modified: DateTime<Utc>,
}

impl OutputFile {
    /// New output stamped with the current time.
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes,
            last_modified: Utc::now(),
        }
    }

    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

// Serialised without the payload; the size is derived from it.
impl Serialize for OutputFile {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("OutputFile", 4)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("mime_type", &self.mime_type)?;
        state.serialize_field("byte_size", &self.byte_size())?;
        state.serialize_field("last_modified", &self.last_modified)?;
        state.end()
    }
}

impl std::fmt::Debug for OutputFile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputFile")
            .field("name", &self.name)
            .field("mime_type", &self.mime_type)
            .field("byte_size", &self.byte_size())
            .field("last_modified", &self.last_modified)
            .finish()
    }
}

/// Per-run options. `quality` only matters for [`ToolKind::Image`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingOptions {
    pub quality: f32,
}

impl ProcessingOptions {
    /// Options with `quality` clamped into [0.0, 1.0]. NaN falls back to 0.8.
    pub fn new(quality: f32) -> Self {
        let quality = if quality.is_nan() { 0.8 } else { quality.clamp(0.0, 1.0) };
        Self { quality }
    }

    /// Quality on the JPEG encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        (self.quality * 100.0).round().clamp(1.0, 100.0) as u8
    }
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self::new(0.8)
    }
}

/// Lifecycle state of one item within a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemState {
    Pending,
    /// Coarse progress percentage (0, 30, 100).
    InProgress(u8),
    Done,
    Failed(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResultStatus {
    Success,
    Failed,
}

/// Outcome of processing one item (or the consolidated archive at index 0).
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingResult {
    /// Position in the original input list.
    pub index: usize,
    pub output: Option<OutputFile>,
    pub status: ResultStatus,
    pub error_message: Option<String>,
    /// Size of the input (sum of inputs for a consolidated archive).
    pub original_size: u64,
    /// False when a document transform fell back to the original bytes.
    pub was_optimized: bool,
}

impl ProcessingResult {
    pub fn success(index: usize, output: OutputFile, original_size: u64, was_optimized: bool) -> Self {
        Self {
            index,
            output: Some(output),
            status: ResultStatus::Success,
            error_message: None,
            original_size,
            was_optimized,
        }
    }

    pub fn failed(index: usize, error_message: impl Into<String>, original_size: u64) -> Self {
        Self {
            index,
            output: None,
            status: ResultStatus::Failed,
            error_message: Some(error_message.into()),
            original_size,
            was_optimized: false,
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ResultStatus::Success
    }

    /// Display-only size reduction; 0 for failures and for outputs that grew.
    pub fn reduction_percent(&self) -> u8 {
        match &self.output {
            Some(out) => reduction_percent(self.original_size, out.byte_size()),
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_acceptance_rules() {
        assert!(ToolKind::Image.accepts("image/png"));
        assert!(ToolKind::Image.accepts("image/webp"));
        assert!(!ToolKind::Image.accepts("text/plain"));
        assert!(ToolKind::Document.accepts("application/pdf"));
        assert!(!ToolKind::Document.accepts("application/pdf+x"));
        assert!(ToolKind::Archive.accepts(""));
        assert!(ToolKind::Archive.accepts("application/octet-stream"));
    }

    #[test]
    fn tool_parses_from_label() {
        assert_eq!("image".parse::<ToolKind>().unwrap(), ToolKind::Image);
        assert_eq!("PDF".parse::<ToolKind>().unwrap(), ToolKind::Document);
        assert_eq!("zip".parse::<ToolKind>().unwrap(), ToolKind::Archive);
        assert!("video".parse::<ToolKind>().is_err());
    }

    #[test]
    fn quality_is_clamped() {
        assert_eq!(ProcessingOptions::new(1.7).quality, 1.0);
        assert_eq!(ProcessingOptions::new(-0.2).quality, 0.0);
        assert_eq!(ProcessingOptions::new(f32::NAN).quality, 0.8);
        assert_eq!(ProcessingOptions::new(0.0).jpeg_quality(), 1);
        assert_eq!(ProcessingOptions::new(0.8).jpeg_quality(), 80);
        assert_eq!(ProcessingOptions::new(1.0).jpeg_quality(), 100);
    }

    #[test]
    fn output_size_follows_its_bytes() {
        let mut out = OutputFile::new("photo.jpg", "image/jpeg", vec![0u8; 3]);
        assert_eq!(out.byte_size(), 3);
        out.bytes.extend_from_slice(&[1, 2]);
        assert_eq!(out.byte_size(), 5);

        let json = serde_json::to_value(&out).expect("serialize");
        assert_eq!(json["byte_size"], 5);
        assert_eq!(json["name"], "photo.jpg");
        assert!(json.get("bytes").is_none());
    }

    #[test]
    fn media_types_from_extensions() {
        assert_eq!(media_type_for_extension("JPG"), "image/jpeg");
        assert_eq!(media_type_for_extension("pdf"), "application/pdf");
        assert_eq!(media_type_for_extension("xyz"), "application/octet-stream");
    }

    #[tokio::test]
    async fn path_source_reads_lazily() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"hello").expect("write");

        let file = InputFile::from_path(&path).await.expect("from_path");
        assert_eq!(file.name, "notes.txt");
        assert_eq!(file.mime_type, "text/plain");
        assert_eq!(file.byte_size, 5);

        std::fs::remove_file(&path).expect("remove");
        let err = file.read_bytes().await.unwrap_err();
        assert!(matches!(err, PackwerkError::Read(_)));
        assert_eq!(err.to_string(), "Failed to read file");
    }

    #[test]
    fn failed_result_has_no_reduction() {
        let r = ProcessingResult::failed(2, "Failed to load image", 1000);
        assert_eq!(r.reduction_percent(), 0);
        assert!(!r.is_success());
    }
}
