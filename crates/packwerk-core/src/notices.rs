// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Transient user notices.
//
// Every user-visible failure or milestone is delivered as a short notice with a
// level that drives its presentation. Notices never block the pipeline.

use serde::{Deserialize, Serialize};

use crate::error::PackwerkError;
use crate::types::ToolKind;

/// Presentation level of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// A short message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Some candidates did not match the tool's type filter.
    pub fn filtered(tool: ToolKind) -> Self {
        match tool {
            ToolKind::Image => {
                Self::warning("Some files were filtered out. Only image files are supported.")
            }
            ToolKind::Document => Self::warning("Only PDF files are supported."),
            // Archive accepts everything, so this is never emitted in practice.
            ToolKind::Archive => Self::warning("Some files were filtered out."),
        }
    }

    /// Nothing survived the type filter.
    pub fn no_valid_files() -> Self {
        Self::error("No valid files selected.")
    }

    /// Packing the consolidated archive failed.
    pub fn pack_failed(err: &PackwerkError) -> Self {
        let message = err.detail().map(str::to_string).unwrap_or_else(|| err.to_string());
        Self::error(format!("Error creating ZIP archive: {message}"))
    }

    /// The run finished and produced at least one output.
    pub fn complete() -> Self {
        Self::info("Processing complete! Click Download to save your files.")
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.message)
    }
}

/// Map any error to a notice a user can act on.
pub fn humanize_error(err: &PackwerkError) -> Notice {
    match err {
        PackwerkError::Read(_) | PackwerkError::Decode(_) | PackwerkError::Encode(_) => {
            Notice::error(err.to_string())
        }
        PackwerkError::Pdf(_) => Notice::warning("This PDF could not be optimized."),
        PackwerkError::NoValidFiles(_) => Notice::no_valid_files(),
        PackwerkError::Pack(_) => Notice::pack_failed(err),
        PackwerkError::IndexOutOfRange { .. } | PackwerkError::ResultNotReady(_) => {
            Notice::warning("This file is not ready for download.")
        }
        PackwerkError::Config(detail) => Notice::error(format!("Settings problem: {detail}")),
        PackwerkError::Task(_) | PackwerkError::Io(_) | PackwerkError::Serialization(_) => {
            Notice::error(format!("Something went wrong: {err}"))
        }
    }
}
