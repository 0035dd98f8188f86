// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Unified error types for Packwerk.

use thiserror::Error;

/// Top-level error type for all Packwerk operations.
///
/// Item-level variants (`Read`, `Decode`, `Encode`) are recorded against a
/// single item and never abort a run. Run-level variants (`NoValidFiles`,
/// `Pack`) abort only their own phase.
#[derive(Debug, Error)]
pub enum PackwerkError {
    // -- Per-item transform errors --
    #[error("Failed to read file")]
    Read(String),

    #[error("Failed to load image")]
    Decode(String),

    #[error("Canvas conversion failed")]
    Encode(String),

    #[error("PDF operation failed: {0}")]
    Pdf(String),

    // -- Run-level errors --
    #[error("no valid files selected for the {0} tool")]
    NoValidFiles(String),

    #[error("archive packing failed: {0}")]
    Pack(String),

    // -- Result access --
    #[error("index {index} out of range (have {len} items)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("result {0} has not completed successfully")]
    ResultNotReady(usize),

    // -- Configuration --
    #[error("invalid configuration: {0}")]
    Config(String),

    // -- Runtime --
    #[error("background task failed: {0}")]
    Task(String),

    #[error("file I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl PackwerkError {
    /// Underlying detail carried by the error, if any.
    ///
    /// The display text of the item-level variants is fixed so it can be shown
    /// to the user as-is; the detail is what goes into the logs.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Read(d)
            | Self::Decode(d)
            | Self::Encode(d)
            | Self::Pdf(d)
            | Self::Pack(d)
            | Self::Config(d)
            | Self::Task(d) => Some(d),
            _ => None,
        }
    }
}

/// Alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, PackwerkError>;
