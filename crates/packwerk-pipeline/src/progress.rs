// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Progress reporting — observer callbacks and the event stream built on them.

use std::sync::Mutex;

use packwerk_core::{Notice, ProcessingResult, ResultStatus, RunId, ToolKind};
use serde::Serialize;
use tokio::sync::mpsc;

/// Progress marker when an item starts.
pub const PROGRESS_STARTED: u8 = 0;
/// Progress marker once the transform call has been issued.
pub const PROGRESS_ISSUED: u8 = 30;
/// Progress marker when the item's transform has returned.
pub const PROGRESS_COMPLETE: u8 = 100;

/// Receives run progress. All methods default to no-ops.
pub trait ProgressObserver: Send + Sync {
    fn on_run_started(&self, _run_id: RunId, _tool: ToolKind, _items: usize) {}

    fn on_item_progress(&self, _index: usize, _percent: u8) {}

    fn on_item_done(&self, _index: usize, _result: &ProcessingResult) {}

    /// The per-item results were replaced by one packed archive.
    fn on_consolidated(&self, _result: &ProcessingResult, _items: usize) {}

    fn on_notice(&self, _notice: &Notice) {}

    fn on_run_finished(&self, _run_id: RunId, _produced: usize) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl ProgressObserver for NullObserver {}

/// Byte-free view of a result, small enough to send as an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResultSummary {
    pub index: usize,
    pub status: ResultStatus,
    pub output_name: Option<String>,
    pub output_size: Option<u64>,
    pub original_size: u64,
    pub reduction_percent: u8,
    pub error_message: Option<String>,
}

impl From<&ProcessingResult> for ResultSummary {
    fn from(result: &ProcessingResult) -> Self {
        Self {
            index: result.index,
            status: result.status,
            output_name: result.output.as_ref().map(|o| o.name.clone()),
            output_size: result.output.as_ref().map(|o| o.byte_size()),
            original_size: result.original_size,
            reduction_percent: result.reduction_percent(),
            error_message: result.error_message.clone(),
        }
    }
}

/// Everything an observer can see, as data.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunStarted { run_id: RunId, tool: ToolKind, items: usize },
    ItemProgress { index: usize, percent: u8 },
    ItemDone { summary: ResultSummary },
    Consolidated { summary: ResultSummary, items: usize },
    Notice { notice: Notice },
    RunFinished { run_id: RunId, produced: usize },
}

/// Forwards every callback into an unbounded channel. Events are dropped
/// once the receiver is gone.
pub struct ChannelObserver {
    tx: mpsc::UnboundedSender<PipelineEvent>,
}

impl ChannelObserver {
    pub fn new(tx: mpsc::UnboundedSender<PipelineEvent>) -> Self {
        Self { tx }
    }

    /// Observer plus the receiving end of its channel.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<PipelineEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(tx), rx)
    }

    fn send(&self, event: PipelineEvent) {
        let _ = self.tx.send(event);
    }
}

impl ProgressObserver for ChannelObserver {
    fn on_run_started(&self, run_id: RunId, tool: ToolKind, items: usize) {
        self.send(PipelineEvent::RunStarted { run_id, tool, items });
    }

    fn on_item_progress(&self, index: usize, percent: u8) {
        self.send(PipelineEvent::ItemProgress { index, percent });
    }

    fn on_item_done(&self, _index: usize, result: &ProcessingResult) {
        self.send(PipelineEvent::ItemDone {
            summary: result.into(),
        });
    }

    fn on_consolidated(&self, result: &ProcessingResult, items: usize) {
        self.send(PipelineEvent::Consolidated {
            summary: result.into(),
            items,
        });
    }

    fn on_notice(&self, notice: &Notice) {
        self.send(PipelineEvent::Notice {
            notice: notice.clone(),
        });
    }

    fn on_run_finished(&self, run_id: RunId, produced: usize) {
        self.send(PipelineEvent::RunFinished { run_id, produced });
    }
}

/// Keeps every event in memory.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<PipelineEvent>>,
}

impl RecordingObserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events seen so far.
    pub fn events(&self) -> Vec<PipelineEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }

    /// Progress percentages reported for one item, in order.
    pub fn progress_of(&self, index: usize) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::ItemProgress { index: i, percent } if i == index => Some(percent),
                _ => None,
            })
            .collect()
    }

    pub fn notices(&self) -> Vec<Notice> {
        self.events()
            .into_iter()
            .filter_map(|event| match event {
                PipelineEvent::Notice { notice } => Some(notice),
                _ => None,
            })
            .collect()
    }

    fn push(&self, event: PipelineEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

impl ProgressObserver for RecordingObserver {
    fn on_run_started(&self, run_id: RunId, tool: ToolKind, items: usize) {
        self.push(PipelineEvent::RunStarted { run_id, tool, items });
    }

    fn on_item_progress(&self, index: usize, percent: u8) {
        self.push(PipelineEvent::ItemProgress { index, percent });
    }

    fn on_item_done(&self, _index: usize, result: &ProcessingResult) {
        self.push(PipelineEvent::ItemDone {
            summary: result.into(),
        });
    }

    fn on_consolidated(&self, result: &ProcessingResult, items: usize) {
        self.push(PipelineEvent::Consolidated {
            summary: result.into(),
            items,
        });
    }

    fn on_notice(&self, notice: &Notice) {
        self.push(PipelineEvent::Notice {
            notice: notice.clone(),
        });
    }

    fn on_run_finished(&self, run_id: RunId, produced: usize) {
        self.push(PipelineEvent::RunFinished { run_id, produced });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packwerk_core::OutputFile;

    #[tokio::test]
    async fn channel_observer_forwards_events() {
        let (observer, mut rx) = ChannelObserver::channel();
        observer.on_item_progress(2, PROGRESS_ISSUED);
        observer.on_notice(&Notice::complete());
        drop(observer);

        assert_eq!(
            rx.recv().await,
            Some(PipelineEvent::ItemProgress {
                index: 2,
                percent: 30
            })
        );
        assert_eq!(
            rx.recv().await,
            Some(PipelineEvent::Notice {
                notice: Notice::complete()
            })
        );
        assert_eq!(rx.recv().await, None);
    }

    #[test]
    fn channel_observer_survives_dropped_receiver() {
        let (observer, rx) = ChannelObserver::channel();
        drop(rx);
        observer.on_item_progress(0, PROGRESS_STARTED);
    }

    #[test]
    fn summary_drops_bytes_but_keeps_sizes() {
        let result = ProcessingResult::success(
            1,
            OutputFile::new("x.jpg", "image/jpeg", vec![0u8; 250]),
            1000,
            true,
        );
        let summary = ResultSummary::from(&result);
        assert_eq!(summary.output_name.as_deref(), Some("x.jpg"));
        assert_eq!(summary.output_size, Some(250));
        assert_eq!(summary.reduction_percent, 75);
    }

    #[test]
    fn recording_observer_filters_by_item() {
        let observer = RecordingObserver::new();
        observer.on_item_progress(0, PROGRESS_STARTED);
        observer.on_item_progress(1, PROGRESS_STARTED);
        observer.on_item_progress(0, PROGRESS_COMPLETE);
        assert_eq!(observer.progress_of(0), vec![0, 100]);
        assert_eq!(observer.progress_of(1), vec![0]);
    }
}
