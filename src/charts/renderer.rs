//! Static Chart Renderer
//! Draws the two grouped bar charts with plotters: year-over-year change
//! extrema and within-state equity ratios, one bar triplet per metric
//! family, with a text label above (or below) every bar.

use crate::stats::{ChangeExtremum, EquityExtremum};
use anyhow::{anyhow, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use tracing::info;

const LOW_COLOR: RGBColor = RGBColor(46, 204, 113); // Green
const MID_COLOR: RGBColor = RGBColor(52, 152, 219); // Blue
const HIGH_COLOR: RGBColor = RGBColor(231, 76, 60); // Red
const SERIES_COLORS: [RGBColor; 3] = [LOW_COLOR, MID_COLOR, HIGH_COLOR];

const BAR_OFFSETS: [f64; 3] = [-0.28, 0.0, 0.28];
const BAR_HALF_WIDTH: f64 = 0.12;

struct Bar {
    value: f64,
    label: String,
}

struct BarGroup {
    name: String,
    bars: [Bar; 3],
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("chart rendering failed: {e}")
}

fn draw_grouped_bars(
    path: &Path,
    title: &str,
    y_desc: &str,
    series_names: [&str; 3],
    groups: &[BarGroup],
) -> Result<()> {
    let mut y_min = 0.0f64;
    let mut y_max = 0.0f64;
    for group in groups {
        for bar in &group.bars {
            y_min = y_min.min(bar.value);
            y_max = y_max.max(bar.value);
        }
    }
    if y_max == y_min {
        y_max = y_min + 1.0;
    }
    let span = y_max - y_min;
    // Extra headroom above so the per-bar labels stay inside the plot.
    let y_range = (y_min - span * 0.10)..(y_max + span * 0.18);

    let root = BitMapBackend::new(path, (960, 600)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let n = groups.len() as f64;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 26))
        .margin(18)
        .x_label_area_size(42)
        .y_label_area_size(64)
        .build_cartesian_2d(-0.6f64..(n - 0.4), y_range)
        .map_err(draw_err)?;

    let group_names: Vec<String> = groups.iter().map(|g| g.name.clone()).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .y_desc(y_desc)
        .x_labels(groups.len())
        .x_label_formatter(&|x| {
            let nearest = x.round();
            let idx = nearest as usize;
            if (x - nearest).abs() < 1e-6 && nearest >= 0.0 && idx < group_names.len() {
                group_names[idx].clone()
            } else {
                String::new()
            }
        })
        .label_style(("sans-serif", 15))
        .draw()
        .map_err(draw_err)?;

    for (s, series_name) in series_names.iter().enumerate() {
        let color = SERIES_COLORS[s];
        chart
            .draw_series(groups.iter().enumerate().map(|(i, group)| {
                let cx = i as f64 + BAR_OFFSETS[s];
                let value = group.bars[s].value;
                let (y0, y1) = if value >= 0.0 { (0.0, value) } else { (value, 0.0) };
                Rectangle::new(
                    [(cx - BAR_HALF_WIDTH, y0), (cx + BAR_HALF_WIDTH, y1)],
                    color.filled(),
                )
            }))
            .map_err(draw_err)?
            .label(*series_name)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], color.filled())
            });
    }

    // Baseline at zero; visible when any bar goes negative.
    chart
        .draw_series(std::iter::once(PathElement::new(
            vec![(-0.6, 0.0), (n - 0.4, 0.0)],
            BLACK.stroke_width(1),
        )))
        .map_err(draw_err)?;

    let label_font = ("sans-serif", 14).into_font().color(&BLACK);
    let above = label_font.pos(Pos::new(HPos::Center, VPos::Bottom));
    let below = ("sans-serif", 14)
        .into_font()
        .color(&BLACK)
        .pos(Pos::new(HPos::Center, VPos::Top));
    let pad = span * 0.015;

    let mut labels = Vec::new();
    for (i, group) in groups.iter().enumerate() {
        for (s, bar) in group.bars.iter().enumerate() {
            let cx = i as f64 + BAR_OFFSETS[s];
            if bar.value >= 0.0 {
                labels.push(Text::new(bar.label.clone(), (cx, bar.value + pad), above.clone()));
            } else {
                labels.push(Text::new(bar.label.clone(), (cx, bar.value - pad), below.clone()));
            }
        }
    }
    chart.draw_series(labels).map_err(draw_err)?;

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperRight)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(("sans-serif", 15))
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Grouped bars for the change analysis: lowest state, national median,
/// highest state per metric family. Extrema bars carry the state name; the
/// national bar carries the formatted percentage.
pub fn render_change_chart(extrema: &[ChangeExtremum], path: &Path) -> Result<()> {
    let groups: Vec<BarGroup> = extrema
        .iter()
        .map(|e| BarGroup {
            name: e.family.label().to_string(),
            bars: [
                Bar {
                    value: e.lowest_pct,
                    label: e.lowest_state.clone(),
                },
                Bar {
                    value: e.national_median,
                    label: format!("{:+.1}%", e.national_median),
                },
                Bar {
                    value: e.highest_pct,
                    label: e.highest_state.clone(),
                },
            ],
        })
        .collect();

    draw_grouped_bars(
        path,
        "Change in per-pupil finances, 2020-21 to 2021-22",
        "Median percent change",
        ["Lowest state", "National median", "Highest state"],
        &groups,
    )
}

/// Grouped bars for the equity analysis: lowest, nearest-to-median, and
/// highest dispersion-ratio states per metric family, state names as bar
/// labels.
pub fn render_equity_chart(extrema: &[EquityExtremum], path: &Path) -> Result<()> {
    let groups: Vec<BarGroup> = extrema
        .iter()
        .map(|e| BarGroup {
            name: e.family.label().to_string(),
            bars: [
                Bar {
                    value: e.lowest_ratio,
                    label: e.lowest_state.clone(),
                },
                Bar {
                    value: e.median_ratio,
                    label: e.median_state.clone(),
                },
                Bar {
                    value: e.highest_ratio,
                    label: e.highest_state.clone(),
                },
            ],
        })
        .collect();

    draw_grouped_bars(
        path,
        "Within-state funding equity, 2021-22",
        "90th / 10th percentile ratio",
        ["Lowest ratio", "Nearest to median", "Highest ratio"],
        &groups,
    )
}
