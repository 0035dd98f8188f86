// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Result staging — finished outputs addressable by index, and transient
// download files derived from them.

use std::io::Write;
use std::path::{Path, PathBuf};

use packwerk_core::error::{PackwerkError, Result};
use packwerk_core::{ItemState, Notice, OutputFile, ProcessingResult, RunId, ToolKind};
use serde::Serialize;
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument};

/// Everything a finished run produced.
#[derive(Debug, Serialize)]
pub struct ResultSet {
    pub run_id: RunId,
    pub tool: ToolKind,
    /// Number of accepted inputs the run processed.
    pub input_count: usize,
    results: Vec<ProcessingResult>,
    /// Terminal state per result index.
    pub states: Vec<ItemState>,
    /// Per-item results were replaced by a single packed archive.
    pub consolidated: bool,
    pub notices: Vec<Notice>,
    #[serde(skip)]
    download_prefix: String,
}

impl ResultSet {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        run_id: RunId,
        tool: ToolKind,
        input_count: usize,
        results: Vec<ProcessingResult>,
        states: Vec<ItemState>,
        consolidated: bool,
        notices: Vec<Notice>,
        download_prefix: String,
    ) -> Self {
        Self {
            run_id,
            tool,
            input_count,
            results,
            states,
            consolidated,
            notices,
            download_prefix,
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    pub fn results(&self) -> &[ProcessingResult] {
        &self.results
    }

    /// Successful results, in index order.
    pub fn successes(&self) -> impl Iterator<Item = &ProcessingResult> {
        self.results.iter().filter(|r| r.is_success())
    }

    /// The output at `index`. Only results that reached `Done` have one.
    pub fn get_result(&self, index: usize) -> Result<&OutputFile> {
        let result = self
            .results
            .get(index)
            .ok_or(PackwerkError::IndexOutOfRange {
                index,
                len: self.results.len(),
            })?;
        result
            .output
            .as_ref()
            .ok_or(PackwerkError::ResultNotReady(index))
    }

    /// File name the result at `index` is offered under.
    pub fn download_name(&self, index: usize) -> Result<String> {
        let output = self.get_result(index)?;
        if self.consolidated {
            return Ok(output.name.clone());
        }
        Ok(download_name(&output.name, &self.download_prefix))
    }

    /// Write the result at `index` to a transient file inside `staging_dir`.
    ///
    /// The file disappears when the returned handle is dropped unless it is
    /// persisted first.
    #[instrument(skip(self, staging_dir), fields(run_id = %self.run_id))]
    pub fn download_result(&self, index: usize, staging_dir: impl AsRef<Path>) -> Result<StagedDownload> {
        let output = self.get_result(index)?;
        let file_name = self.download_name(index)?;

        let mut temp = tempfile::Builder::new()
            .prefix(".packwerk-")
            .tempfile_in(staging_dir.as_ref())?;
        temp.write_all(&output.bytes)?;
        temp.flush()?;

        debug!(file_name = %file_name, bytes = output.byte_size(), "Download staged");
        Ok(StagedDownload { file_name, temp })
    }
}

/// `prefix` + `name`, unless `name` already starts with `prefix`.
pub fn download_name(name: &str, prefix: &str) -> String {
    if name.starts_with(prefix) {
        name.to_string()
    } else {
        format!("{prefix}{name}")
    }
}

/// A result written to disk under a temporary name.
#[derive(Debug)]
pub struct StagedDownload {
    file_name: String,
    temp: NamedTempFile,
}

impl StagedDownload {
    /// Name the download will take when persisted.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Current (temporary) location.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// Rename the staged file to its download name in the same directory.
    ///
    /// Existing files are never replaced: when the name is taken the file is
    /// saved as `name (1).ext`, `name (2).ext`, and so on.
    pub fn persist(self) -> Result<PathBuf> {
        let dir = self
            .temp
            .path()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        let mut temp = self.temp;
        for attempt in 0..MAX_NAME_ATTEMPTS {
            let target = dir.join(numbered_name(&self.file_name, attempt));
            match temp.persist_noclobber(&target) {
                Ok(_) => {
                    info!(path = %target.display(), "Download saved");
                    return Ok(target);
                }
                Err(err) if err.error.kind() == std::io::ErrorKind::AlreadyExists => {
                    debug!(path = %target.display(), "name taken, trying the next one");
                    temp = err.file;
                }
                Err(err) => return Err(PackwerkError::Io(err.error)),
            }
        }

        Err(PackwerkError::Io(std::io::Error::new(
            std::io::ErrorKind::AlreadyExists,
            format!("no free name for {} in {}", self.file_name, dir.display()),
        )))
    }
}

/// Upper bound on `name (n)` variants tried before giving up.
const MAX_NAME_ATTEMPTS: usize = 10_000;

/// `name` for attempt 0, otherwise `stem (n).ext`.
fn numbered_name(name: &str, attempt: usize) -> String {
    if attempt == 0 {
        return name.to_string();
    }
    match name.rfind('.') {
        Some(pos) if pos > 0 => format!("{} ({attempt}){}", &name[..pos], &name[pos..]),
        _ => format!("{name} ({attempt})"),
    }
}
