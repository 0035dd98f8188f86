// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Packwerk pipeline — selection, sequential runs, progress events, and
// download staging.

pub mod acceptance;
pub mod progress;
pub mod run;
pub mod selection;
pub mod staging;

pub use acceptance::{Acceptance, accept_files};
pub use progress::{
    ChannelObserver, NullObserver, PipelineEvent, ProgressObserver, RecordingObserver,
    ResultSummary,
};
pub use run::{PipelineRun, start_run};
pub use selection::{Selection, SelectionReport};
pub use staging::{ResultSet, StagedDownload, download_name};
