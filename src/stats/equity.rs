//! Equity Analyzer
//! Within-state 90th/10th percentile funding ratios for one school year,
//! with per-family lowest / nearest-to-median / highest states.

use super::{median, percentile, MetricFamily, SchoolYear};
use crate::data::DistrictRecord;
use rayon::prelude::*;
use std::collections::BTreeMap;
use tracing::info;

/// Dispersion ratio for one state and metric family: 90th percentile of the
/// per-district values divided by the 10th.
#[derive(Debug, Clone, PartialEq)]
pub struct StateEquityRatio {
    pub state: String,
    pub family: MetricFamily,
    pub ratio: f64,
}

/// Per-family summary across states. `median_state` is the state whose
/// ratio is numerically closest to the cross-state median ratio, not a
/// statistical median; it always names a real state.
#[derive(Debug, Clone, PartialEq)]
pub struct EquityExtremum {
    pub family: MetricFamily,
    pub lowest_state: String,
    pub lowest_ratio: f64,
    pub median_state: String,
    pub median_ratio: f64,
    pub highest_state: String,
    pub highest_ratio: f64,
}

#[derive(Debug)]
pub struct EquityAnalysis {
    pub ratios: Vec<StateEquityRatio>,
    pub extrema: Vec<EquityExtremum>,
}

fn state_ratio(districts: &[&DistrictRecord], family: MetricFamily, year: SchoolYear) -> Option<f64> {
    let mut values: Vec<f64> = districts.iter().map(|r| family.value(r, year)).collect();
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let p10 = percentile(&values, 10.0);
    let p90 = percentile(&values, 90.0);
    let ratio = p90 / p10;
    // A zero or negative 10th percentile makes the ratio meaningless.
    (ratio.is_finite() && ratio > 0.0).then_some(ratio)
}

/// Compute per-state dispersion ratios and per-family extrema for `year`.
///
/// `excluded_states` (title-cased names) are dropped before any ratio is
/// computed and never appear in the output.
pub fn analyze_equity(
    records: &[DistrictRecord],
    year: SchoolYear,
    excluded_states: &[String],
) -> EquityAnalysis {
    let mut by_state: BTreeMap<&str, Vec<&DistrictRecord>> = BTreeMap::new();
    for record in records {
        if excluded_states.iter().any(|s| s == &record.state) {
            continue;
        }
        by_state.entry(record.state.as_str()).or_default().push(record);
    }

    let grouped: Vec<(&str, Vec<&DistrictRecord>)> = by_state.into_iter().collect();
    let ratios: Vec<StateEquityRatio> = grouped
        .par_iter()
        .flat_map_iter(|(state, districts)| {
            MetricFamily::ALL.into_iter().filter_map(move |family| {
                state_ratio(districts, family, year).map(|ratio| StateEquityRatio {
                    state: state.to_string(),
                    family,
                    ratio,
                })
            })
        })
        .collect();

    let mut extrema = Vec::with_capacity(MetricFamily::ALL.len());
    for family in MetricFamily::ALL {
        let series: Vec<&StateEquityRatio> =
            ratios.iter().filter(|r| r.family == family).collect();
        if series.is_empty() {
            continue;
        }

        let mut lowest = series[0];
        let mut highest = series[0];
        for r in &series[1..] {
            if r.ratio < lowest.ratio {
                lowest = r;
            }
            if r.ratio > highest.ratio {
                highest = r;
            }
        }

        let cross_median = median(&series.iter().map(|r| r.ratio).collect::<Vec<_>>())
            .unwrap_or(f64::NAN);
        // Nearest-to-median lookup; first state in order wins exact ties.
        let mut nearest = series[0];
        for r in &series[1..] {
            if (r.ratio - cross_median).abs() < (nearest.ratio - cross_median).abs() {
                nearest = r;
            }
        }

        extrema.push(EquityExtremum {
            family,
            lowest_state: lowest.state.clone(),
            lowest_ratio: lowest.ratio,
            median_state: nearest.state.clone(),
            median_ratio: nearest.ratio,
            highest_state: highest.state.clone(),
            highest_ratio: highest.ratio,
        });
    }

    info!(
        state_metric_pairs = ratios.len(),
        excluded = excluded_states.len(),
        "equity analysis complete"
    );
    EquityAnalysis { ratios, extrema }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn district(state: &str, rev2: f64) -> DistrictRecord {
        DistrictRecord {
            state: state.to_string(),
            school_name: format!("{state} {rev2}"),
            rev_20_21: 100.0,
            rev_21_22: rev2,
            supp_20_21: 50.0,
            supp_21_22: 55.0,
            ben_20_21: 20.0,
            ben_21_22: 24.0,
        }
    }

    fn spread(state: &str, values: &[f64]) -> Vec<DistrictRecord> {
        values.iter().map(|&v| district(state, v)).collect()
    }

    #[test]
    fn ratios_are_at_least_one_for_nonnegative_metrics() {
        let mut records = spread("Ohio", &[100.0, 200.0, 300.0, 400.0, 500.0]);
        records.extend(spread("Iowa", &[250.0, 250.0, 250.0]));
        let analysis = analyze_equity(&records, SchoolYear::Y2021_22, &[]);
        for r in &analysis.ratios {
            assert!(r.ratio >= 1.0, "{}/{:?} ratio {}", r.state, r.family, r.ratio);
        }
    }

    #[test]
    fn zero_tenth_percentile_excluded() {
        let records = spread("Ohio", &[0.0, 0.0, 0.0, 100.0]);
        let analysis = analyze_equity(&records, SchoolYear::Y2021_22, &[]);
        assert!(!analysis
            .ratios
            .iter()
            .any(|r| r.state == "Ohio" && r.family == MetricFamily::Revenue));
    }

    #[test]
    fn excluded_state_never_appears() {
        let mut records = spread("Ohio", &[100.0, 200.0, 300.0]);
        records.extend(spread("District Of Columbia", &[100.0, 900.0]));
        let analysis = analyze_equity(
            &records,
            SchoolYear::Y2021_22,
            &["District Of Columbia".to_string()],
        );
        assert!(!analysis.ratios.iter().any(|r| r.state == "District Of Columbia"));
        for e in &analysis.extrema {
            assert_ne!(e.lowest_state, "District Of Columbia");
            assert_ne!(e.median_state, "District Of Columbia");
            assert_ne!(e.highest_state, "District Of Columbia");
        }
    }

    #[test]
    fn median_state_is_nearest_to_cross_state_median() {
        // Revenue ratios: Alabama 5 (100..500), Iowa 2 (100..200),
        // Ohio 9 (100..900). Cross-state median 5 -> Alabama.
        let mut records = spread("Alabama", &[100.0, 300.0, 500.0]);
        records.extend(spread("Iowa", &[100.0, 150.0, 200.0]));
        records.extend(spread("Ohio", &[100.0, 500.0, 900.0]));
        let analysis = analyze_equity(&records, SchoolYear::Y2021_22, &[]);
        let revenue = analysis
            .extrema
            .iter()
            .find(|e| e.family == MetricFamily::Revenue)
            .expect("revenue extremum");
        assert_eq!(revenue.lowest_state, "Iowa");
        assert_eq!(revenue.highest_state, "Ohio");
        assert_eq!(revenue.median_state, "Alabama");
        assert!((revenue.median_ratio - revenue.lowest_ratio).abs() > 1e-9);
    }
}
