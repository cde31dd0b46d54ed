//! Data Cleaner Module
//! Renames the verbose export headers to semantic names, normalizes state
//! casing, parses dollar strings, and drops incomplete districts.

use polars::prelude::*;
use thiserror::Error;
use tracing::{info, warn};

// Source headers as they appear in the export. A rename map rather than
// positional access: schema drift fails loudly.
pub const SRC_SCHOOL_NAME: &str = "Agency Name [District] Latest available year";
pub const SRC_STATE: &str = "State Name [District] Latest available year";
pub const SRC_REV_20_21: &str = "Total Revenue (TR) per Pupil (V33) [District Finance] 2020-21";
pub const SRC_REV_21_22: &str = "Total Revenue (TR) per Pupil (V33) [District Finance] 2021-22";
pub const SRC_SUPP_20_21: &str =
    "Total Expenditures - Support Services (E17) per Pupil [District Finance] 2020-21";
pub const SRC_SUPP_21_22: &str =
    "Total Expenditures - Support Services (E17) per Pupil [District Finance] 2021-22";
pub const SRC_BEN_20_21: &str =
    "Total Current Expenditures - Benefits (E11D) per Pupil [District Finance] 2020-21";
pub const SRC_BEN_21_22: &str =
    "Total Current Expenditures - Benefits (E11D) per Pupil [District Finance] 2021-22";

#[derive(Error, Debug)]
pub enum CleanError {
    #[error("expected column missing from input (schema drift): {0}")]
    MissingColumn(String),
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// One school district with all six per-pupil metrics present.
#[derive(Debug, Clone, PartialEq)]
pub struct DistrictRecord {
    pub state: String,
    pub school_name: String,
    pub rev_20_21: f64,
    pub rev_21_22: f64,
    pub supp_20_21: f64,
    pub supp_21_22: f64,
    pub ben_20_21: f64,
    pub ben_21_22: f64,
}

/// Cleaned records plus the counts the completeness filter removed.
#[derive(Debug)]
pub struct CleanOutcome {
    pub records: Vec<DistrictRecord>,
    /// Rows dropped because at least one metric was missing or unparseable.
    pub dropped_incomplete: usize,
    /// Individual cells that failed numeric parsing (each also leaves a gap
    /// counted in `dropped_incomplete`).
    pub parse_failures: usize,
}

/// Lowercase then title-case each whitespace-separated word, so "NEW YORK"
/// and "new york" both group as "New York". Idempotent.
pub fn normalize_state(raw: &str) -> String {
    raw.split_whitespace()
        .map(|word| {
            let lower = word.to_lowercase();
            let mut chars = lower.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a dollar amount, tolerating currency symbols and thousands
/// separators ("$1,234.56" -> 1234.56). Returns None for anything else;
/// foreign formatting is defensive, not fatal.
fn parse_dollars(raw: &str) -> Option<f64> {
    let stripped: String = raw
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if stripped.is_empty() {
        return None;
    }
    stripped.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn column<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column, CleanError> {
    df.column(name)
        .map_err(|_| CleanError::MissingColumn(name.to_string()))
}

fn cell_string(col: &Column, idx: usize) -> Option<String> {
    let val = col.as_materialized_series().get(idx).ok()?;
    if val.is_null() {
        None
    } else {
        Some(val.to_string().trim_matches('"').to_string())
    }
}

/// Produce `DistrictRecord`s from the raw table.
///
/// The filter is a strict AND across all six metrics: partial districts are
/// excluded entirely, since the downstream per-pupil math needs complete
/// year pairs. Drops are counted, not silent.
pub fn clean(df: &DataFrame) -> Result<CleanOutcome, CleanError> {
    let school = column(df, SRC_SCHOOL_NAME)?;
    let state = column(df, SRC_STATE)?;
    let metric_cols = [
        column(df, SRC_REV_20_21)?,
        column(df, SRC_REV_21_22)?,
        column(df, SRC_SUPP_20_21)?,
        column(df, SRC_SUPP_21_22)?,
        column(df, SRC_BEN_20_21)?,
        column(df, SRC_BEN_21_22)?,
    ];

    let mut records: Vec<DistrictRecord> = Vec::with_capacity(df.height());
    let mut dropped_incomplete = 0usize;
    let mut parse_failures = 0usize;

    for i in 0..df.height() {
        let (state_raw, school_name) = match (cell_string(state, i), cell_string(school, i)) {
            (Some(s), Some(n)) => (s, n),
            _ => {
                dropped_incomplete += 1;
                continue;
            }
        };

        let mut values = [0.0f64; 6];
        let mut complete = true;
        for (slot, col) in values.iter_mut().zip(metric_cols.iter()) {
            match cell_string(col, i) {
                Some(raw) => match parse_dollars(&raw) {
                    Some(v) => *slot = v,
                    None => {
                        parse_failures += 1;
                        complete = false;
                    }
                },
                None => complete = false,
            }
        }

        if !complete {
            dropped_incomplete += 1;
            continue;
        }

        records.push(DistrictRecord {
            state: normalize_state(&state_raw),
            school_name,
            rev_20_21: values[0],
            rev_21_22: values[1],
            supp_20_21: values[2],
            supp_21_22: values[3],
            ben_20_21: values[4],
            ben_21_22: values[5],
        });
    }

    records.sort_by(|a, b| a.state.cmp(&b.state));

    if parse_failures > 0 {
        warn!(parse_failures, "cells failed numeric parsing");
    }
    info!(
        kept = records.len(),
        dropped = dropped_incomplete,
        "completeness filter applied"
    );

    Ok(CleanOutcome {
        records,
        dropped_incomplete,
        parse_failures,
    })
}
