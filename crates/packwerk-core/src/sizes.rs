// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Size arithmetic and human-readable size strings for result display.

const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];

/// Percentage by which `output` is smaller than `original`.
///
/// Never negative: returns 0 whenever the output is the same size or larger.
pub fn reduction_percent(original: u64, output: u64) -> u8 {
    if original == 0 || output >= original {
        return 0;
    }
    let ratio = output as f64 / original as f64;
    ((1.0 - ratio) * 100.0).round().clamp(0.0, 100.0) as u8
}

/// Format a byte count using base-1024 units, rounded to two decimals.
///
/// `0` → `"0 Bytes"`, `1536` → `"1.5 KB"`, `2097152` → `"2 MB"`. Sizes past
/// the gigabyte range stay in GB.
pub fn format_file_size(bytes: u64) -> String {
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let exponent = ((bytes as f64).ln() / 1024f64.ln()).floor() as usize;
    let exponent = exponent.min(UNITS.len() - 1);
    let scaled = bytes as f64 / 1024f64.powi(exponent as i32);
    let rounded = (scaled * 100.0).round() / 100.0;
    format!("{} {}", rounded, UNITS[exponent])
}

/// The per-item size line shown next to a finished result.
pub struct SizeSummary;

impl SizeSummary {
    pub fn describe(original: u64, output: u64) -> String {
        let reduction = reduction_percent(original, output);
        if reduction > 0 {
            format!(
                "Original: {} → Compressed: {} ({}% smaller)",
                format_file_size(original),
                format_file_size(output),
                reduction
            )
        } else {
            format!("Size: {} (Optimized)", format_file_size(output))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reduction_is_never_negative() {
        assert_eq!(reduction_percent(1000, 1000), 0);
        assert_eq!(reduction_percent(1000, 5000), 0);
        assert_eq!(reduction_percent(0, 0), 0);
        assert_eq!(reduction_percent(1000, 250), 75);
        assert_eq!(reduction_percent(1000, 0), 100);
        // 1 - 0.996 = 0.4% rounds down.
        assert_eq!(reduction_percent(1000, 996), 0);
        assert_eq!(reduction_percent(1000, 994), 1);
    }

    #[test]
    fn file_sizes_are_human_readable() {
        assert_eq!(format_file_size(0), "0 Bytes");
        assert_eq!(format_file_size(512), "512 Bytes");
        assert_eq!(format_file_size(1024), "1 KB");
        assert_eq!(format_file_size(1536), "1.5 KB");
        assert_eq!(format_file_size(2 * 1024 * 1024), "2 MB");
        assert_eq!(format_file_size(5 * 1024 * 1024 * 1024), "5 GB");
        assert_eq!(format_file_size(3 * 1024 * 1024 * 1024 * 1024), "3072 GB");
    }

    #[test]
    fn summary_mentions_reduction_only_when_smaller() {
        assert_eq!(
            SizeSummary::describe(2048, 1024),
            "Original: 2 KB → Compressed: 1 KB (50% smaller)"
        );
        assert_eq!(SizeSummary::describe(1024, 2048), "Size: 2 KB (Optimized)");
    }
}
