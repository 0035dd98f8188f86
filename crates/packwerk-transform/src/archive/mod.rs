// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Archive module — pack a file list into a single DEFLATE-compressed ZIP.

pub mod packer;

pub use packer::ArchivePacker;
