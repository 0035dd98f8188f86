// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// File acceptance — split candidates by the selected tool's type filter.

use packwerk_core::error::{PackwerkError, Result};
use packwerk_core::{InputFile, Notice, ToolKind};
use tracing::{debug, instrument, warn};

/// Candidates split by the tool's type filter.
#[derive(Debug)]
pub struct Acceptance {
    pub tool: ToolKind,
    /// Accepted files, in candidate order.
    pub accepted: Vec<InputFile>,
    /// Names of the rejected candidates, in candidate order.
    pub rejected: Vec<String>,
    /// Warning for rejected files, error when nothing was accepted.
    pub notices: Vec<Notice>,
}

impl Acceptance {
    pub fn rejected_count(&self) -> usize {
        self.rejected.len()
    }

    /// The accepted files, or `NoValidFiles` when there are none.
    pub fn into_files(self) -> Result<Vec<InputFile>> {
        if self.accepted.is_empty() {
            return Err(PackwerkError::NoValidFiles(self.tool.to_string()));
        }
        Ok(self.accepted)
    }
}

/// Apply the tool's acceptance rule to `candidates`.
///
/// Image accepts `image/*`, Document accepts exactly `application/pdf`,
/// Archive accepts everything.
#[instrument(skip(candidates), fields(tool = %tool, candidates = candidates.len()))]
pub fn accept_files(tool: ToolKind, candidates: Vec<InputFile>) -> Acceptance {
    let (accepted, rejected): (Vec<InputFile>, Vec<InputFile>) = candidates
        .into_iter()
        .partition(|file| tool.accepts(&file.mime_type));

    let mut notices = Vec::new();
    if !rejected.is_empty() {
        warn!(
            rejected = rejected.len(),
            accepted = accepted.len(),
            "files filtered out by type"
        );
        notices.push(Notice::filtered(tool));
    }
    if accepted.is_empty() {
        warn!("no valid files selected");
        notices.push(Notice::no_valid_files());
    } else {
        debug!(accepted = accepted.len(), "files accepted");
    }

    Acceptance {
        tool,
        accepted,
        rejected: rejected.into_iter().map(|file| file.name).collect(),
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use packwerk_core::NoticeLevel;

    fn file(name: &str, mime: &str) -> InputFile {
        InputFile::from_bytes(name, mime, vec![0u8; 4])
    }

    fn mixed() -> Vec<InputFile> {
        vec![
            file("a.png", "image/png"),
            file("b.pdf", "application/pdf"),
            file("c.txt", "text/plain"),
            file("d.jpg", "image/jpeg"),
        ]
    }

    #[test]
    fn counts_always_add_up() {
        for tool in [ToolKind::Image, ToolKind::Document, ToolKind::Archive] {
            let acceptance = accept_files(tool, mixed());
            assert_eq!(acceptance.accepted.len() + acceptance.rejected_count(), 4);
            assert!(acceptance.accepted.iter().all(|f| tool.accepts(&f.mime_type)));
        }
    }

    #[test]
    fn image_tool_keeps_order_and_warns() {
        let acceptance = accept_files(ToolKind::Image, mixed());
        let names: Vec<&str> = acceptance.accepted.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["a.png", "d.jpg"]);
        assert_eq!(acceptance.rejected, ["b.pdf", "c.txt"]);
        assert_eq!(acceptance.notices, vec![Notice::filtered(ToolKind::Image)]);
    }

    #[test]
    fn archive_accepts_everything_silently() {
        let acceptance = accept_files(ToolKind::Archive, mixed());
        assert_eq!(acceptance.accepted.len(), 4);
        assert!(acceptance.notices.is_empty());
    }

    #[test]
    fn text_file_under_image_tool_is_a_validation_error() {
        let acceptance = accept_files(ToolKind::Image, vec![file("notes.txt", "text/plain")]);
        let levels: Vec<NoticeLevel> = acceptance.notices.iter().map(|n| n.level).collect();
        assert_eq!(levels, [NoticeLevel::Warning, NoticeLevel::Error]);
        assert!(matches!(
            acceptance.into_files(),
            Err(PackwerkError::NoValidFiles(_))
        ));
    }

    #[test]
    fn empty_candidate_list_is_rejected() {
        let acceptance = accept_files(ToolKind::Archive, Vec::new());
        assert_eq!(acceptance.notices, vec![Notice::no_valid_files()]);
        assert!(acceptance.into_files().is_err());
    }
}
