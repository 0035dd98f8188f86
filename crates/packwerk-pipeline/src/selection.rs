// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pending selection — the file list for one tool before a run starts.

use packwerk_core::error::{PackwerkError, Result};
use packwerk_core::{InputFile, Notice, PipelineConfig, ProcessingOptions, ToolKind};
use tracing::debug;

use crate::acceptance::accept_files;
use crate::progress::ProgressObserver;
use crate::run;
use crate::staging::ResultSet;

/// What a call to [`Selection::select`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionReport {
    pub accepted: usize,
    pub rejected: usize,
    pub notices: Vec<Notice>,
}

/// Files chosen for one tool, in selection order.
#[derive(Debug)]
pub struct Selection {
    tool: ToolKind,
    files: Vec<InputFile>,
}

impl Selection {
    pub fn new(tool: ToolKind) -> Self {
        Self {
            tool,
            files: Vec::new(),
        }
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn files(&self) -> &[InputFile] {
        &self.files
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Filter `candidates` for this tool and make the accepted ones the
    /// current selection.
    pub fn select(&mut self, candidates: Vec<InputFile>) -> SelectionReport {
        let acceptance = accept_files(self.tool, candidates);
        let report = SelectionReport {
            accepted: acceptance.accepted.len(),
            rejected: acceptance.rejected_count(),
            notices: acceptance.notices,
        };
        self.files = acceptance.accepted;
        report
    }

    /// Drop the file at `index`; later files move up by one.
    pub fn remove_item(&mut self, index: usize) -> Result<InputFile> {
        if index >= self.files.len() {
            return Err(PackwerkError::IndexOutOfRange {
                index,
                len: self.files.len(),
            });
        }
        let removed = self.files.remove(index);
        debug!(index, name = %removed.name, remaining = self.files.len(), "Item removed");
        Ok(removed)
    }

    /// Run the selected files. The selection is consumed.
    pub async fn start_run(
        self,
        options: ProcessingOptions,
        config: &PipelineConfig,
        observer: &dyn ProgressObserver,
    ) -> Result<ResultSet> {
        run::start_run(self.tool, self.files, options, config, observer).await
    }
}
