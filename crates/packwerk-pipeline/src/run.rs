// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Pipeline orchestrator.
//
// A run owns its inputs, per-item states, and results; nothing is shared
// between runs. Items are processed strictly one after another in index
// order:
//
//   Pending → InProgress(0) → InProgress(30) → InProgress(100) → Done | Failed
//
// Archive runs with more than one item then collapse all per-item results
// into a single packed archive at index 0.

use packwerk_core::error::Result;
use packwerk_core::{
    InputFile, ItemState, Notice, OutputFile, PipelineConfig, ProcessingOptions,
    ProcessingResult, RunId, ToolKind,
};
use packwerk_transform::{ArchivePacker, compress_image, compress_pdf};
use tracing::{debug, error, info, instrument, warn};

use crate::acceptance::accept_files;
use crate::progress::{PROGRESS_COMPLETE, PROGRESS_ISSUED, PROGRESS_STARTED, ProgressObserver};
use crate::staging::ResultSet;

/// Validate `candidates` for `tool` and run the accepted files.
///
/// Returns `NoValidFiles` (after reporting the notices) when nothing passes
/// the tool's filter; every other failure is recorded in the returned
/// [`ResultSet`].
pub async fn start_run(
    tool: ToolKind,
    candidates: Vec<InputFile>,
    options: ProcessingOptions,
    config: &PipelineConfig,
    observer: &dyn ProgressObserver,
) -> Result<ResultSet> {
    let acceptance = accept_files(tool, candidates);
    for notice in &acceptance.notices {
        observer.on_notice(notice);
    }
    let notices = acceptance.notices.clone();
    let files = acceptance.into_files()?;

    let mut run = PipelineRun::new(tool, files, options, config.clone());
    run.notices = notices;
    Ok(run.execute(observer).await)
}

/// State of one invocation of the pipeline.
pub struct PipelineRun {
    id: RunId,
    tool: ToolKind,
    options: ProcessingOptions,
    config: PipelineConfig,
    inputs: Vec<InputFile>,
    states: Vec<ItemState>,
    results: Vec<ProcessingResult>,
    notices: Vec<Notice>,
    consolidated: bool,
}

impl PipelineRun {
    /// A run over files that already passed acceptance for `tool`. All items
    /// start `Pending`.
    pub(crate) fn new(
        tool: ToolKind,
        inputs: Vec<InputFile>,
        options: ProcessingOptions,
        config: PipelineConfig,
    ) -> Self {
        let states = vec![ItemState::Pending; inputs.len()];
        Self {
            id: RunId::new(),
            tool,
            options,
            config,
            inputs,
            states,
            results: Vec::new(),
            notices: Vec::new(),
            consolidated: false,
        }
    }

    /// Process every item, consolidate archives, and hand back the results.
    #[instrument(skip_all, fields(run_id = %self.id, tool = %self.tool, items = self.inputs.len()))]
    pub async fn execute(mut self, observer: &dyn ProgressObserver) -> ResultSet {
        info!("Run started");
        observer.on_run_started(self.id, self.tool, self.inputs.len());

        for index in 0..self.inputs.len() {
            let file = &self.inputs[index];
            advance(&mut self.states, index, ItemState::InProgress(PROGRESS_STARTED), observer);

            let outcome = match self.tool {
                ToolKind::Image => {
                    advance(&mut self.states, index, ItemState::InProgress(PROGRESS_ISSUED), observer);
                    compress_image(file, &self.options, &self.config)
                        .await
                        .map(|out| (out, true))
                }
                ToolKind::Document => {
                    advance(&mut self.states, index, ItemState::InProgress(PROGRESS_ISSUED), observer);
                    compress_pdf(file, &self.config)
                        .await
                        .map(|outcome| (outcome.file, outcome.was_optimized))
                }
                ToolKind::Archive => ArchivePacker::identity(file).await.map(|out| (out, false)),
            };
            advance(&mut self.states, index, ItemState::InProgress(PROGRESS_COMPLETE), observer);

            let result = match outcome {
                Ok((output, was_optimized)) => {
                    debug!(
                        index,
                        name = %output.name,
                        original_bytes = file.byte_size,
                        output_bytes = output.byte_size(),
                        "Item done"
                    );
                    advance(&mut self.states, index, ItemState::Done, observer);
                    ProcessingResult::success(index, output, file.byte_size, was_optimized)
                }
                Err(err) => {
                    let message = err.to_string();
                    warn!(index, name = %file.name, error = %message, detail = ?err.detail(), "Item failed");
                    advance(&mut self.states, index, ItemState::Failed(message.clone()), observer);
                    ProcessingResult::failed(index, message, file.byte_size)
                }
            };

            observer.on_item_done(index, &result);
            self.results.push(result);
        }

        if self.tool == ToolKind::Archive && self.inputs.len() > 1 {
            self.consolidate(observer).await;
        }

        let produced = self.results.iter().filter(|r| r.is_success()).count();
        if produced > 0 {
            let notice = Notice::complete();
            observer.on_notice(&notice);
            self.notices.push(notice);
        }

        info!(produced, consolidated = self.consolidated, "Run finished");
        observer.on_run_finished(self.id, produced);

        ResultSet::new(
            self.id,
            self.tool,
            self.inputs.len(),
            self.results,
            self.states,
            self.consolidated,
            self.notices,
            self.config.download_prefix,
        )
    }

    /// Replace all per-item results with one packed archive. On failure the
    /// per-item results stay and an error notice is raised.
    async fn consolidate(&mut self, observer: &dyn ProgressObserver) {
        let packer = ArchivePacker::from_config(&self.config);
        match packer.pack(&self.inputs).await {
            Ok(archive) => {
                let original_size: u64 = self.inputs.iter().map(|f| f.byte_size).sum();
                info!(
                    items = self.inputs.len(),
                    original_bytes = original_size,
                    archive_bytes = archive.byte_size(),
                    "Results consolidated into archive"
                );
                let result = consolidated_result(archive, original_size);
                observer.on_consolidated(&result, self.inputs.len());
                self.results = vec![result];
                self.states = vec![ItemState::Done];
                self.consolidated = true;
            }
            Err(err) => {
                error!(error = %err, "Archive packing failed");
                let notice = Notice::pack_failed(&err);
                observer.on_notice(&notice);
                self.notices.push(notice);
            }
        }
    }
}

fn consolidated_result(archive: OutputFile, original_size: u64) -> ProcessingResult {
    ProcessingResult::success(0, archive, original_size, true)
}

/// Move item `index` to `state`, reporting in-progress percentages.
fn advance(states: &mut [ItemState], index: usize, state: ItemState, observer: &dyn ProgressObserver) {
    if let ItemState::InProgress(percent) = state {
        observer.on_item_progress(index, percent);
    }
    states[index] = state;
}
