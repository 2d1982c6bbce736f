//! Plotters-powered density chart widget for Ratatui.
//!
//! We render Plotters output into the Ratatui buffer using `plotters-ratatui-backend`,
//! so the terminal view draws the same elements as the SVG export.

use plotters::prelude::*;
use plotters_ratatui_backend::widget_fn;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Style},
    widgets::Widget,
};

use crate::app::pipeline::RunOutput;
use crate::plot::{chart_bounds, xy_pairs};

/// Everything the chart draws, precomputed outside `render()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChartSeries {
    /// Fitted line across the band's x range.
    pub fit_line: Vec<(f64, f64)>,
    pub band_lower: Vec<(f64, f64)>,
    pub band_upper: Vec<(f64, f64)>,
    /// Measurements.
    pub points: Vec<(f64, f64)>,
    /// `(x - dx, x + dx)` at the measured mass.
    pub x_bars: Vec<[(f64, f64); 2]>,
    /// `(y - dy, y + dy)` at the measured volume.
    pub y_bars: Vec<[(f64, f64); 2]>,
    pub x_bounds: [f64; 2],
    pub y_bounds: [f64; 2],
}

impl ChartSeries {
    /// Build the series for a run, or `None` when there is nothing finite to frame.
    pub fn from_run(run: &RunOutput) -> Option<Self> {
        let (x_bounds, y_bounds) = chart_bounds(&run.dataset, &run.band)?;
        let band = &run.band;

        let fit_line = xy_pairs(&band.x, &band.y_fit);
        let band_lower = xy_pairs(&band.x, &band.lower);
        let band_upper = xy_pairs(&band.x, &band.upper);

        let points = run.dataset.iter().map(|m| (m.x, m.y)).collect();
        let x_bars = run
            .dataset
            .iter()
            .map(|m| [(m.x - m.sigma_x, m.y), (m.x + m.sigma_x, m.y)])
            .collect();
        let y_bars = run
            .dataset
            .iter()
            .map(|m| [(m.x, m.y - m.sigma_y), (m.x, m.y + m.sigma_y)])
            .collect();

        Some(Self {
            fit_line,
            band_lower,
            band_upper,
            points,
            x_bars,
            y_bars,
            x_bounds,
            y_bounds,
        })
    }
}

pub struct DensityChart<'a> {
    pub series: &'a ChartSeries,
}

impl<'a> Widget for DensityChart<'a> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // Plotters cannot lay out a mesh in a tiny area.
        if area.width < 20 || area.height < 8 {
            buf.set_string(
                area.x,
                area.y,
                "Chart area too small (resize terminal).",
                Style::default().fg(Color::Yellow),
            );
            return;
        }

        let s = self.series;
        let [x0, x1] = s.x_bounds;
        let [y0, y1] = s.y_bounds;

        let widget = widget_fn(move |root| {
            let mut chart = ChartBuilder::on(&root)
                .margin(1)
                .set_label_area_size(LabelAreaPosition::Left, 7)
                .set_label_area_size(LabelAreaPosition::Bottom, 3)
                .build_cartesian_2d(x0..x1, y0..y1)?;

            chart
                .configure_mesh()
                .disable_x_mesh()
                .disable_y_mesh()
                .x_desc("Volume (mL)")
                .y_desc("Mass (g)")
                .x_labels(5)
                .y_labels(5)
                .x_label_formatter(&|v| format!("{v:.0}"))
                .y_label_formatter(&|v| format!("{v:.0}"))
                .label_style(("sans-serif", 10).into_font().color(&WHITE))
                .axis_style(&WHITE)
                .draw()?;

            let band_color = RGBColor(120, 120, 120);
            let fit_color = RGBColor(0, 255, 255);
            let bar_color = RGBColor(255, 160, 0);

            chart.draw_series(LineSeries::new(s.band_lower.iter().copied(), &band_color))?;
            chart.draw_series(LineSeries::new(s.band_upper.iter().copied(), &band_color))?;
            chart.draw_series(LineSeries::new(s.fit_line.iter().copied(), &fit_color))?;

            chart.draw_series(
                s.x_bars
                    .iter()
                    .chain(s.y_bars.iter())
                    .map(|bar| PathElement::new(bar.to_vec(), &bar_color)),
            )?;

            // Circle radii are mis-scaled by the ratatui backend; a Pixel reads as a dot.
            chart.draw_series(s.points.iter().map(|&(x, y)| Pixel::new((x, y), WHITE)))?;

            Ok(())
        });

        widget.render(area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::pipeline::run_fit;
    use crate::domain::RunConfig;

    #[test]
    fn series_match_run() {
        let run = run_fit(&RunConfig {
            seed: Some(4),
            ..RunConfig::default()
        })
        .unwrap();
        let series = ChartSeries::from_run(&run).unwrap();

        assert_eq!(series.points.len(), run.dataset.len());
        assert_eq!(series.x_bars.len(), run.dataset.len());
        assert_eq!(series.fit_line.len(), run.band.len());
        assert!(series.fit_line.windows(2).all(|w| w[0].0 <= w[1].0));
        for (lo, hi) in series.band_lower.iter().zip(series.band_upper.iter()) {
            assert!(lo.1 <= hi.1);
        }
        for &(x, y) in &series.points {
            assert!(x > series.x_bounds[0] && x < series.x_bounds[1]);
            assert!(y > series.y_bounds[0] && y < series.y_bounds[1]);
        }
    }

    #[test]
    fn renders_into_buffer() {
        let run = run_fit(&RunConfig {
            seed: Some(4),
            ..RunConfig::default()
        })
        .unwrap();
        let series = ChartSeries::from_run(&run).unwrap();
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        DensityChart { series: &series }.render(area, &mut buf);

        let tiny = Rect::new(0, 0, 10, 4);
        let mut small = Buffer::empty(tiny);
        DensityChart { series: &series }.render(tiny, &mut small);
        let first_row: String = (0..tiny.width)
            .map(|x| small[(x, 0)].symbol().to_string())
            .collect();
        assert_eq!(first_row, "Chart area");
    }
}
