//! Run configuration for the report pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Rows of export metadata preceding the header line.
pub const DEFAULT_SKIP_ROWS: usize = 5;

/// Trailing footnote rows appended below the data.
pub const DEFAULT_FOOTER_ROWS: usize = 4;

/// Configuration for a single report run.
///
/// The equity exclusion list is deliberately explicit configuration rather
/// than an inline literal: the default excludes the District of Columbia,
/// a single-district jurisdiction whose dispersion ratio is degenerate, but
/// the list accepts any number of states.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Path to the delimited finance export.
    pub input_path: PathBuf,
    /// Directory receiving the report HTML and chart PNGs.
    pub output_dir: PathBuf,
    /// Leading metadata rows to skip before the header.
    pub skip_rows: usize,
    /// Trailing footnote rows to drop.
    pub footer_rows: usize,
    /// States excluded from the equity analysis (title-cased names).
    pub equity_excluded_states: Vec<String>,
}

impl ReportConfig {
    pub fn new(input_path: PathBuf, output_dir: PathBuf) -> Self {
        Self {
            input_path,
            output_dir,
            skip_rows: DEFAULT_SKIP_ROWS,
            footer_rows: DEFAULT_FOOTER_ROWS,
            equity_excluded_states: vec!["District Of Columbia".to_string()],
        }
    }
}
