//! Report assembly
//! Orchestrates the pipeline (load -> clean -> analyze -> render) and writes
//! the final HTML document embedding both charts and the narrative summary.

use crate::charts::{render_change_chart, render_equity_chart};
use crate::config::ReportConfig;
use crate::data::{clean, load_raw};
use crate::stats::{analyze_changes, analyze_equity, ChangeAnalysis, EquityAnalysis, SchoolYear};
use anyhow::{bail, Context, Result};
use std::fmt::Write as _;
use std::fs;
use tracing::info;

const CHANGE_CHART_FILE: &str = "change_chart.png";
const EQUITY_CHART_FILE: &str = "equity_chart.png";
const REPORT_FILE: &str = "report.html";

/// Run the full report pipeline. Any fatal error aborts with no partial
/// report written.
pub fn run(config: &ReportConfig) -> Result<()> {
    fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("cannot create output dir {}", config.output_dir.display())
    })?;

    let raw = load_raw(&config.input_path, config.skip_rows, config.footer_rows)
        .context("loading the finance export")?;
    let outcome = clean(&raw).context("cleaning the finance export")?;
    if outcome.records.is_empty() {
        bail!("no complete district records after cleaning");
    }

    let change = analyze_changes(&outcome.records);
    let equity = analyze_equity(
        &outcome.records,
        SchoolYear::Y2021_22,
        &config.equity_excluded_states,
    );

    let change_chart = config.output_dir.join(CHANGE_CHART_FILE);
    let equity_chart = config.output_dir.join(EQUITY_CHART_FILE);
    render_change_chart(&change.extrema, &change_chart)?;
    render_equity_chart(&equity.extrema, &equity_chart)?;

    let html = render_document(&change, &equity, &config.equity_excluded_states);
    let report_path = config.output_dir.join(REPORT_FILE);
    fs::write(&report_path, html)
        .with_context(|| format!("writing {}", report_path.display()))?;

    info!("report written to {}", report_path.display());
    Ok(())
}

/// Narrative paragraphs for the change analysis.
pub fn change_narrative(analysis: &ChangeAnalysis) -> String {
    let mut text = String::from(
        "Between the 2020-21 and 2021-22 school years, per-pupil revenue and \
         expenditure shifted unevenly across states. For each state the median \
         district-level percent change is shown below; the national figure is \
         the median of those state medians.",
    );
    for e in &analysis.extrema {
        let _ = write!(
            text,
            " {}: {} saw the largest median increase ({:+.1}%), {} the smallest \
             ({:+.1}%), against a national median of {:+.1}%.",
            e.family.label(),
            e.highest_state,
            e.highest_pct,
            e.lowest_state,
            e.lowest_pct,
            e.national_median
        );
    }
    text
}

/// Narrative paragraphs for the equity analysis.
pub fn equity_narrative(analysis: &EquityAnalysis, excluded: &[String]) -> String {
    let mut text = String::from(
        "Funding equity within each state is measured as the ratio of the 90th \
         to the 10th percentile of district per-pupil values in 2021-22; a \
         ratio near 1 indicates districts are funded alike.",
    );
    if !excluded.is_empty() {
        let _ = write!(text, " Excluded from this analysis: {}.", excluded.join(", "));
    }
    for e in &analysis.extrema {
        let _ = write!(
            text,
            " {}: most even in {} ({:.2}), widest spread in {} ({:.2}); {} \
             ({:.2}) sits closest to the cross-state median.",
            e.family.label(),
            e.lowest_state,
            e.lowest_ratio,
            e.highest_state,
            e.highest_ratio,
            e.median_state,
            e.median_ratio
        );
    }
    text
}

fn render_document(
    change: &ChangeAnalysis,
    equity: &EquityAnalysis,
    excluded: &[String],
) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>School District Finance Report</title>
<style>
body {{ font-family: sans-serif; max-width: 64rem; margin: 2rem auto; color: #222; }}
figure {{ margin: 1.5rem 0; text-align: center; }}
img {{ max-width: 100%; }}
</style>
</head>
<body>
<h1>School District Finance Report</h1>
<h2>Year-over-year change</h2>
<p>{change_prose}</p>
<figure>
  <img src="{change_img}" alt="Grouped bar chart of median per-pupil percent change by metric">
  <figcaption>Lowest state, national median, and highest state per metric family.</figcaption>
</figure>
<h2>Within-state funding equity</h2>
<p>{equity_prose}</p>
<figure>
  <img src="{equity_img}" alt="Grouped bar chart of within-state 90th/10th percentile funding ratios">
  <figcaption>Lowest, nearest-to-median, and highest dispersion ratios per metric family.</figcaption>
</figure>
</body>
</html>
"#,
        change_prose = change_narrative(change),
        equity_prose = equity_narrative(equity, excluded),
        change_img = CHANGE_CHART_FILE,
        equity_img = EQUITY_CHART_FILE,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stats::{ChangeExtremum, EquityExtremum, MetricFamily};

    fn change_analysis() -> ChangeAnalysis {
        ChangeAnalysis {
            per_state: Vec::new(),
            extrema: vec![ChangeExtremum {
                family: MetricFamily::Revenue,
                highest_state: "Indiana".into(),
                highest_pct: 60.0,
                lowest_state: "Illinois".into(),
                lowest_pct: -20.0,
                national_median: 10.0,
            }],
        }
    }

    fn equity_analysis() -> EquityAnalysis {
        EquityAnalysis {
            ratios: Vec::new(),
            extrema: vec![EquityExtremum {
                family: MetricFamily::Revenue,
                lowest_state: "Iowa".into(),
                lowest_ratio: 1.2,
                median_state: "Alabama".into(),
                median_ratio: 1.8,
                highest_state: "Ohio".into(),
                highest_ratio: 3.4,
            }],
        }
    }

    #[test]
    fn change_narrative_names_extrema() {
        let text = change_narrative(&change_analysis());
        assert!(text.contains("Indiana"));
        assert!(text.contains("+60.0%"));
        assert!(text.contains("Illinois"));
    }

    #[test]
    fn equity_narrative_mentions_exclusions() {
        let text = equity_narrative(&equity_analysis(), &["District Of Columbia".into()]);
        assert!(text.contains("District Of Columbia"));
        assert!(text.contains("Alabama"));
    }

    #[test]
    fn document_embeds_both_charts() {
        let html = render_document(&change_analysis(), &equity_analysis(), &[]);
        assert!(html.contains(CHANGE_CHART_FILE));
        assert!(html.contains(EQUITY_CHART_FILE));
        assert!(html.contains("<figure>"));
    }
}
