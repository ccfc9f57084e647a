//! Boxplot rendering
//!
//! Draws one box per condition at x = 1..=K with the group mean overlaid as an
//! `x` marker. Output goes to a PNG file, or SVG when the path ends in `.svg`.

use crate::config::PlotConfig;
use crate::error::{AnalysisError, Result};
use crate::normalize::ObservationTable;
use crate::summary::{quantile, DescriptiveSummary};
use log::info;
use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

const BOX_HALF_WIDTH: f64 = 0.25;
const CAP_HALF_WIDTH: f64 = 0.125;
const WHISKER_IQR: f64 = 1.5;

const BOX_COLOR: RGBColor = RGBColor(0, 0, 0);
const MEDIAN_COLOR: RGBColor = RGBColor(255, 127, 14);
const MEAN_COLOR: RGBColor = RGBColor(31, 119, 180);

/// Five-number box geometry plus the points beyond the whiskers
#[derive(Debug, Clone, PartialEq)]
pub struct BoxStats {
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    /// Smallest value within `q1 - 1.5 * IQR`
    pub whisker_low: f64,
    /// Largest value within `q3 + 1.5 * IQR`
    pub whisker_high: f64,
    pub fliers: Vec<f64>,
}

impl BoxStats {
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let q1 = quantile(&sorted, 0.25);
        let median = quantile(&sorted, 0.5);
        let q3 = quantile(&sorted, 0.75);
        let iqr = q3 - q1;
        let low_fence = q1 - WHISKER_IQR * iqr;
        let high_fence = q3 + WHISKER_IQR * iqr;

        let whisker_low = sorted
            .iter()
            .copied()
            .find(|v| *v >= low_fence)
            .unwrap_or(q1);
        let whisker_high = sorted
            .iter()
            .rev()
            .copied()
            .find(|v| *v <= high_fence)
            .unwrap_or(q3);
        let fliers = sorted
            .iter()
            .copied()
            .filter(|v| *v < low_fence || *v > high_fence)
            .collect();

        Some(BoxStats {
            q1,
            median,
            q3,
            whisker_low,
            whisker_high,
            fliers,
        })
    }
}

struct BoxGroup<'a> {
    label: &'a str,
    stats: BoxStats,
    mean: f64,
}

/// Render the grouped boxplot with mean markers to `config.output`
pub fn render_boxplot(
    table: &ObservationTable,
    summary: &DescriptiveSummary,
    config: &PlotConfig,
) -> Result<()> {
    let mut groups = Vec::with_capacity(summary.groups.len());
    for group in &summary.groups {
        let values = table
            .conditions
            .code(&group.condition)
            .map(|code| table.values_for(code))
            .unwrap_or_default();
        if let Some(stats) = BoxStats::from_values(&values) {
            groups.push(BoxGroup {
                label: &group.condition,
                stats,
                mean: group.mean,
            });
        }
    }

    if groups.is_empty() {
        return Err(AnalysisError::Plot("no data to plot".into()));
    }

    let path = config.output.as_path();
    let size = (config.width, config.height);
    let is_svg = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("svg"));

    if is_svg {
        draw(SVGBackend::new(path, size).into_drawing_area(), &groups, config)?;
    } else {
        draw(BitMapBackend::new(path, size).into_drawing_area(), &groups, config)?;
    }

    info!("boxplot written to {}", path.display());
    Ok(())
}

fn draw<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    groups: &[BoxGroup<'_>],
    config: &PlotConfig,
) -> Result<()> {
    let plot_err = |e: DrawingAreaErrorKind<DB::ErrorType>| AnalysisError::Plot(e.to_string());

    root.fill(&WHITE).map_err(plot_err)?;

    let (y_min, y_max) = y_extent(groups);
    let k = groups.len();

    let mut chart = ChartBuilder::on(&root)
        .caption(&config.title, ("sans-serif", 24))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5..(k as f64 + 0.5), y_min..y_max)
        .map_err(plot_err)?;

    let labels: Vec<&str> = groups.iter().map(|g| g.label).collect();
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(k)
        .x_label_formatter(&|x| {
            let pos = x.round();
            if (x - pos).abs() < 1e-6 && pos >= 1.0 && pos as usize <= labels.len() {
                labels[pos as usize - 1].to_string()
            } else {
                String::new()
            }
        })
        .x_desc(config.x_label.as_str())
        .y_desc(config.y_label.as_str())
        .draw()
        .map_err(plot_err)?;

    let box_style = BOX_COLOR.stroke_width(1);

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = (i + 1) as f64;
            Rectangle::new(
                [(x - BOX_HALF_WIDTH, g.stats.q1), (x + BOX_HALF_WIDTH, g.stats.q3)],
                box_style,
            )
        }))
        .map_err(plot_err)?;

    // Whiskers and caps
    chart
        .draw_series(groups.iter().enumerate().flat_map(|(i, g)| {
            let x = (i + 1) as f64;
            let s = &g.stats;
            [
                vec![(x, s.q1), (x, s.whisker_low)],
                vec![(x, s.q3), (x, s.whisker_high)],
                vec![(x - CAP_HALF_WIDTH, s.whisker_low), (x + CAP_HALF_WIDTH, s.whisker_low)],
                vec![(x - CAP_HALF_WIDTH, s.whisker_high), (x + CAP_HALF_WIDTH, s.whisker_high)],
            ]
            .into_iter()
            .map(move |points| PathElement::new(points, box_style))
        }))
        .map_err(plot_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            let x = (i + 1) as f64;
            PathElement::new(
                vec![
                    (x - BOX_HALF_WIDTH, g.stats.median),
                    (x + BOX_HALF_WIDTH, g.stats.median),
                ],
                MEDIAN_COLOR.stroke_width(2),
            )
        }))
        .map_err(plot_err)?;

    chart
        .draw_series(groups.iter().enumerate().flat_map(|(i, g)| {
            let x = (i + 1) as f64;
            g.stats
                .fliers
                .iter()
                .map(move |&v| Circle::new((x, v), 3, BOX_COLOR.stroke_width(1)))
        }))
        .map_err(plot_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, g)| {
            Cross::new(((i + 1) as f64, g.mean), 5, MEAN_COLOR.stroke_width(2))
        }))
        .map_err(plot_err)?;

    root.present().map_err(plot_err)?;
    Ok(())
}

fn y_extent(groups: &[BoxGroup<'_>]) -> (f64, f64) {
    let values = groups.iter().flat_map(|g| {
        [g.stats.whisker_low, g.stats.whisker_high, g.mean]
            .into_iter()
            .chain(g.stats.fliers.iter().copied())
    });
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    let pad = if hi > lo { (hi - lo) * 0.05 } else { 1.0 };
    (lo - pad, hi + pad)
}
