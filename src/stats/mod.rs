//! Statistics module - change and equity analyzers plus shared estimators.

mod change;
mod equity;

pub use change::{analyze_changes, pct_change, ChangeAnalysis, ChangeExtremum, StateChangeSummary};
pub use equity::{analyze_equity, EquityAnalysis, EquityExtremum, StateEquityRatio};

use crate::data::DistrictRecord;
use statrs::statistics::{Data, OrderStatistics};

/// The three per-pupil metric families tracked across both school years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Revenue,
    Support,
    Benefits,
}

impl MetricFamily {
    pub const ALL: [MetricFamily; 3] = [
        MetricFamily::Revenue,
        MetricFamily::Support,
        MetricFamily::Benefits,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MetricFamily::Revenue => "Revenue",
            MetricFamily::Support => "Support services",
            MetricFamily::Benefits => "Benefits",
        }
    }

    pub fn value(&self, record: &DistrictRecord, year: SchoolYear) -> f64 {
        match (self, year) {
            (MetricFamily::Revenue, SchoolYear::Y2020_21) => record.rev_20_21,
            (MetricFamily::Revenue, SchoolYear::Y2021_22) => record.rev_21_22,
            (MetricFamily::Support, SchoolYear::Y2020_21) => record.supp_20_21,
            (MetricFamily::Support, SchoolYear::Y2021_22) => record.supp_21_22,
            (MetricFamily::Benefits, SchoolYear::Y2020_21) => record.ben_20_21,
            (MetricFamily::Benefits, SchoolYear::Y2021_22) => record.ben_21_22,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchoolYear {
    Y2020_21,
    Y2021_22,
}

/// Median of a sample; None on an empty slice.
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut data = Data::new(values.to_vec());
    Some(data.median())
}

/// Percentile of pre-sorted values using linear interpolation (NumPy
/// compatible).
pub fn percentile(sorted_values: &[f64], p: f64) -> f64 {
    let n = sorted_values.len();
    if n == 0 {
        return f64::NAN;
    }
    if n == 1 {
        return sorted_values[0];
    }

    let rank = (p / 100.0) * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;

    if lower == upper {
        sorted_values[lower]
    } else {
        sorted_values[lower] * (1.0 - frac) + sorted_values[upper] * frac
    }
}
