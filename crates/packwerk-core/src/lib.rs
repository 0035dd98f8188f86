// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Packwerk — Core types, errors, and configuration shared across all crates.

pub mod config;
pub mod error;
pub mod notices;
pub mod sizes;
pub mod types;

pub use config::PipelineConfig;
pub use error::PackwerkError;
pub use notices::{Notice, NoticeLevel};
pub use types::*;
