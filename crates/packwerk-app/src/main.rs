// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Packwerk — compress images, downscale PDFs, or pack files into a ZIP.
//
// Entry point. Parses arguments, initialises logging, runs the pipeline over
// the given files, and saves every finished result into the output directory.

mod logging;

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use packwerk_core::notices::humanize_error;
use packwerk_core::sizes::SizeSummary;
use packwerk_core::{
    InputFile, Notice, NoticeLevel, PackwerkError, PipelineConfig, ProcessingOptions, ToolKind,
};
use packwerk_pipeline::{ChannelObserver, PipelineEvent, ResultSet, Selection};
use tracing::{debug, error, info, warn};

/// Packwerk - re-encode images, shrink PDF pages, or pack files into a ZIP.
#[derive(Parser, Debug)]
#[command(name = "packwerk")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Tool to run: image, pdf, or archive
    tool: ToolKind,

    /// Files to process
    #[arg(required = true)]
    files: Vec<PathBuf>,

    /// Image quality between 0.0 and 1.0, clamped (image tool only)
    #[arg(short, long)]
    quality: Option<f32>,

    /// Directory the results are saved into
    #[arg(short, long, default_value = ".")]
    out: PathBuf,

    /// JSON configuration file; defaults apply when it does not exist
    #[arg(short, long, env = "PACKWERK_CONFIG", default_value = "packwerk.json")]
    config: PathBuf,

    /// Enable verbose (debug) logging
    #[arg(short, long)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long)]
    json_logs: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!(error = %format!("{err:#}"), "packwerk failed");
            eprintln!("{}", exit_notice(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = PipelineConfig::load_or_default(&cli.config)
        .with_context(|| format!("failed to load config {}", cli.config.display()))?;
    let options = ProcessingOptions::new(cli.quality.unwrap_or(config.default_quality));
    debug!(tool = %cli.tool, quality = options.quality, "Packwerk starting");

    let mut candidates = Vec::with_capacity(cli.files.len());
    for path in &cli.files {
        match InputFile::from_path(path).await {
            Ok(file) => candidates.push(file),
            Err(err) => warn!(path = %path.display(), error = ?err.detail(), "skipping unreadable file"),
        }
    }

    let mut selection = Selection::new(cli.tool);
    let report = selection.select(candidates);
    info!(accepted = report.accepted, rejected = report.rejected, "files selected");
    for notice in report.notices.iter().filter(|n| n.level != NoticeLevel::Error) {
        println!("{notice}");
    }

    let (observer, mut events) = ChannelObserver::channel();
    let logger = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            log_event(&event);
        }
    });

    let outcome = selection.start_run(options, &config, &observer).await;
    drop(observer);
    logger.await.context("event logger task failed")?;
    let set = outcome?;

    tokio::fs::create_dir_all(&cli.out)
        .await
        .with_context(|| format!("failed to create {}", cli.out.display()))?;
    save_results(&set, &cli.out)?;

    for notice in &set.notices {
        println!("{notice}");
    }
    Ok(())
}

/// The line shown to the user when the run cannot finish.
fn exit_notice(err: &anyhow::Error) -> Notice {
    match err.downcast_ref::<PackwerkError>() {
        Some(err) => humanize_error(err),
        None => Notice::error(format!("{err:#}")),
    }
}

/// Print one line per result and persist the successful ones into `out`.
fn save_results(set: &ResultSet, out: &std::path::Path) -> anyhow::Result<()> {
    for result in set.results() {
        let Some(output) = &result.output else {
            println!(
                "[{}] failed: {}",
                result.index,
                result.error_message.as_deref().unwrap_or("unknown error")
            );
            continue;
        };

        let staged = set.download_result(result.index, out)?;
        let path = staged.persist()?;
        println!(
            "[{}] {} | {}",
            result.index,
            path.display(),
            SizeSummary::describe(result.original_size, output.byte_size())
        );
    }
    Ok(())
}

fn log_event(event: &PipelineEvent) {
    match event {
        PipelineEvent::RunStarted { run_id, tool, items } => {
            info!(run_id = %run_id, tool = %tool, items, "run started");
        }
        PipelineEvent::ItemProgress { index, percent } => {
            debug!(index, percent, "item progress");
        }
        PipelineEvent::ItemDone { summary } => {
            info!(
                index = summary.index,
                status = ?summary.status,
                output = summary.output_name.as_deref().unwrap_or("-"),
                reduction_percent = summary.reduction_percent,
                "item finished"
            );
        }
        PipelineEvent::Consolidated { summary, items } => {
            info!(
                items,
                output = summary.output_name.as_deref().unwrap_or("-"),
                bytes = summary.output_size.unwrap_or_default(),
                "results packed"
            );
        }
        PipelineEvent::Notice { notice } => {
            info!(level = ?notice.level, message = %notice.message, "notice");
        }
        PipelineEvent::RunFinished { run_id, produced } => {
            info!(run_id = %run_id, produced, "run finished");
        }
    }
}
