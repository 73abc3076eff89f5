//! SVG charts (plotters)
//!
//! Charts render into an in-memory SVG string. Styling is plain and is
//! not part of any contract beyond "a valid SVG document".

use plotters::prelude::*;

use crate::config::ChartConfig;
use crate::sample::{Sample, SLOPE};
use crate::{Error, Result};

fn render_err(e: impl std::fmt::Display) -> Error {
    Error::Render(e.to_string())
}

/// Y-axis range covering every point plus a small margin.
fn y_range(sample: &Sample) -> (f64, f64) {
    let (lo, hi) = sample
        .y()
        .iter()
        .fold((0.0_f64, SLOPE), |(lo, hi), &y| (lo.min(y), hi.max(y)));
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

/// Scatter plot of `y` against `x`, with the noise-free line `y = 2x`.
///
/// # Errors
///
/// Returns `Error::Render` if plotters fails to draw
pub fn scatter_svg(sample: &Sample, config: &ChartConfig) -> Result<String> {
    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let (y_min, y_max) = y_range(sample);
        let mut chart = ChartBuilder::on(&root)
            .caption("Scatter of y vs. x", ("sans-serif", 18))
            .margin(12)
            .x_label_area_size(32)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0_f64..1.0_f64, y_min..y_max)
            .map_err(render_err)?;

        chart
            .configure_mesh()
            .x_desc("x")
            .y_desc("y")
            .light_line_style(BLACK.mix(0.08))
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(LineSeries::new(
                [(0.0, 0.0), (1.0, SLOPE)],
                BLACK.mix(0.4).stroke_width(1),
            ))
            .map_err(render_err)?;

        chart
            .draw_series(
                sample
                    .points()
                    .map(|point| Circle::new(point, 3, BLUE.mix(0.8).filled())),
            )
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}

/// Vertical bar chart of labelled counts (e.g. a category histogram).
///
/// # Errors
///
/// Returns `Error::InvalidInput` if there are no bars, `Error::Render` if
/// plotters fails to draw
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn bar_chart_svg(
    title: &str,
    x_desc: &str,
    bars: &[(String, usize)],
    config: &ChartConfig,
) -> Result<String> {
    if bars.is_empty() {
        return Err(Error::InvalidInput("bar chart needs at least one bar".to_string()));
    }
    let tallest = bars.iter().map(|(_, count)| *count).max().unwrap_or(0);
    let y_max = (tallest + 1) as f64;
    let labels: Vec<&str> = bars.iter().map(|(label, _)| label.as_str()).collect();

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, (config.width, config.height))
            .into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let mut chart = ChartBuilder::on(&root)
            .caption(title, ("sans-serif", 18))
            .margin(12)
            .x_label_area_size(40)
            .y_label_area_size(40)
            .build_cartesian_2d(0.0_f64..bars.len() as f64, 0.0_f64..y_max)
            .map_err(render_err)?;

        let label_at = |v: &f64| {
            let slot = v.floor();
            if slot < 0.0 || (v - slot - 0.5).abs() > 0.25 {
                return String::new();
            }
            labels.get(slot as usize).map_or_else(String::new, |l| (*l).to_string())
        };

        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(bars.len() * 2 + 1)
            .x_label_formatter(&label_at)
            .x_desc(x_desc)
            .y_desc("Count")
            .draw()
            .map_err(render_err)?;

        chart
            .draw_series(bars.iter().enumerate().map(|(i, (_, count))| {
                let left = i as f64 + 0.15;
                let right = i as f64 + 0.85;
                Rectangle::new(
                    [(left, 0.0), (right, *count as f64)],
                    Palette99::pick(i).filled(),
                )
            }))
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }
    Ok(svg)
}
