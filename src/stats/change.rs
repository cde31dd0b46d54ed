//! Change Analyzer
//! Year-over-year percent change per district, per-state medians, national
//! medians of per-state medians, and per-family extrema.

use super::{median, MetricFamily, SchoolYear};
use crate::data::DistrictRecord;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Median percent change per metric family for one state. A family is None
/// when no district in the state has a defined percent change for it.
#[derive(Debug, Clone, PartialEq)]
pub struct StateChangeSummary {
    pub state: String,
    pub revenue_pct: Option<f64>,
    pub support_pct: Option<f64>,
    pub benefits_pct: Option<f64>,
}

impl StateChangeSummary {
    pub fn pct(&self, family: MetricFamily) -> Option<f64> {
        match family {
            MetricFamily::Revenue => self.revenue_pct,
            MetricFamily::Support => self.support_pct,
            MetricFamily::Benefits => self.benefits_pct,
        }
    }
}

/// Highest/lowest state and national median for one metric family.
#[derive(Debug, Clone, PartialEq)]
pub struct ChangeExtremum {
    pub family: MetricFamily,
    pub highest_state: String,
    pub highest_pct: f64,
    pub lowest_state: String,
    pub lowest_pct: f64,
    pub national_median: f64,
}

#[derive(Debug)]
pub struct ChangeAnalysis {
    pub per_state: Vec<StateChangeSummary>,
    pub extrema: Vec<ChangeExtremum>,
}

/// `(new/old - 1) * 100`. Undefined when old == 0: excluded from medians,
/// never treated as zero or infinity.
pub fn pct_change(year1: f64, year2: f64) -> Option<f64> {
    if year1 == 0.0 {
        return None;
    }
    let pct = (year2 / year1 - 1.0) * 100.0;
    pct.is_finite().then_some(pct)
}

fn family_pcts(records: &[&DistrictRecord], family: MetricFamily) -> Vec<f64> {
    records
        .iter()
        .filter_map(|r| {
            pct_change(
                family.value(r, SchoolYear::Y2020_21),
                family.value(r, SchoolYear::Y2021_22),
            )
        })
        .collect()
}

/// Run the full change analysis over cleaned records.
///
/// States are grouped in ascending name order, which doubles as the
/// documented tie-break for extrema: on an exact tie the first state wins.
pub fn analyze_changes(records: &[DistrictRecord]) -> ChangeAnalysis {
    let mut by_state: BTreeMap<&str, Vec<&DistrictRecord>> = BTreeMap::new();
    for record in records {
        by_state.entry(record.state.as_str()).or_default().push(record);
    }

    let grouped: Vec<(&str, Vec<&DistrictRecord>)> = by_state.into_iter().collect();
    let per_state: Vec<StateChangeSummary> = grouped
        .par_iter()
        .map(|(state, districts)| StateChangeSummary {
            state: state.to_string(),
            revenue_pct: median(&family_pcts(districts, MetricFamily::Revenue)),
            support_pct: median(&family_pcts(districts, MetricFamily::Support)),
            benefits_pct: median(&family_pcts(districts, MetricFamily::Benefits)),
        })
        .collect();

    let mut extrema = Vec::with_capacity(MetricFamily::ALL.len());
    for family in MetricFamily::ALL {
        let series: Vec<(&str, f64)> = per_state
            .iter()
            .filter_map(|s| s.pct(family).map(|v| (s.state.as_str(), v)))
            .collect();
        if series.is_empty() {
            continue;
        }

        let national = median(&series.iter().map(|&(_, v)| v).collect::<Vec<_>>())
            .unwrap_or(f64::NAN);

        // Strict comparisons keep the first state on ties.
        let mut highest = series[0];
        let mut lowest = series[0];
        for &(state, v) in &series[1..] {
            if v > highest.1 {
                highest = (state, v);
            }
            if v < lowest.1 {
                lowest = (state, v);
            }
        }

        extrema.push(ChangeExtremum {
            family,
            highest_state: highest.0.to_string(),
            highest_pct: highest.1,
            lowest_state: lowest.0.to_string(),
            lowest_pct: lowest.1,
            national_median: national,
        });
    }

    info!(states = per_state.len(), "change analysis complete");
    ChangeAnalysis { per_state, extrema }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district(state: &str, rev1: f64, rev2: f64) -> DistrictRecord {
        DistrictRecord {
            state: state.to_string(),
            school_name: format!("{state} district"),
            rev_20_21: rev1,
            rev_21_22: rev2,
            supp_20_21: 50.0,
            supp_21_22: 55.0,
            ben_20_21: 20.0,
            ben_21_22: 24.0,
        }
    }

    #[test]
    fn pct_change_basic() {
        assert_eq!(pct_change(100.0, 150.0), Some(50.0));
        assert_eq!(pct_change(200.0, 100.0), Some(-50.0));
    }

    #[test]
    fn pct_change_zero_base_is_undefined() {
        assert_eq!(pct_change(0.0, 150.0), None);
    }

    #[test]
    fn zero_base_districts_excluded_from_state_median() {
        // One valid district (+50%) and one undefined; median must be 50,
        // not pulled toward zero or infinity.
        let records = vec![district("Ohio", 100.0, 150.0), district("Ohio", 0.0, 150.0)];
        let analysis = analyze_changes(&records);
        assert_eq!(analysis.per_state.len(), 1);
        assert_eq!(analysis.per_state[0].revenue_pct, Some(50.0));
    }

    #[test]
    fn national_median_is_median_of_state_medians() {
        // Per-state revenue medians 2, 4, 6 -> national 4.
        let records = vec![
            district("Alabama", 100.0, 102.0),
            district("Ohio", 100.0, 104.0),
            district("Wyoming", 100.0, 106.0),
        ];
        let analysis = analyze_changes(&records);
        let revenue = analysis
            .extrema
            .iter()
            .find(|e| e.family == MetricFamily::Revenue)
            .expect("revenue extremum");
        assert!((revenue.national_median - 4.0).abs() < 1e-9);
    }

    #[test]
    fn extrema_pick_max_and_min_states() {
        // Benefit medians: IL -20, IN +60, OH +10.
        let mk = |state: &str, ben2: f64| DistrictRecord {
            ben_20_21: 100.0,
            ben_21_22: ben2,
            ..district(state, 100.0, 100.0)
        };
        let records = vec![
            mk("Illinois", 80.0),
            mk("Indiana", 160.0),
            mk("Ohio", 110.0),
        ];
        let analysis = analyze_changes(&records);
        let benefits = analysis
            .extrema
            .iter()
            .find(|e| e.family == MetricFamily::Benefits)
            .expect("benefits extremum");
        assert_eq!(benefits.highest_state, "Indiana");
        assert!((benefits.highest_pct - 60.0).abs() < 1e-9);
        assert_eq!(benefits.lowest_state, "Illinois");
        assert!((benefits.lowest_pct - -20.0).abs() < 1e-9);
    }

    #[test]
    fn ties_resolve_to_first_state_in_order() {
        let records = vec![district("Alabama", 100.0, 150.0), district("Ohio", 100.0, 150.0)];
        let analysis = analyze_changes(&records);
        let revenue = analysis
            .extrema
            .iter()
            .find(|e| e.family == MetricFamily::Revenue)
            .expect("revenue extremum");
        assert_eq!(revenue.highest_state, "Alabama");
        assert_eq!(revenue.lowest_state, "Alabama");
    }
}
