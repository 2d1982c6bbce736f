//! Plotters chart rendered to SVG.
//!
//! The chart shows the measurements with volume and mass error bars, the best
//! fit line and the shaded uncertainty band, plus a legend.

use std::fs;
use std::path::Path;

use plotters::coord::Shift;
use plotters::drawing::DrawingAreaErrorKind;
use plotters::prelude::*;

use crate::domain::{Dataset, FitResult, UncertaintyBand};
use crate::error::AppError;
use crate::fit::uncertainty_band;
use crate::plot::{chart_bounds, xy_pairs};
use crate::report::fit_label;

pub const CHART_TITLE: &str = "Least Squares Regression: Mass vs. Volume";
pub const DEFAULT_SVG_SIZE: (u32, u32) = (800, 500);

/// Render the chart into an SVG document.
pub fn render_svg_chart(
    dataset: &Dataset,
    fit: &FitResult,
    size: (u32, u32),
) -> Result<String, AppError> {
    let band = uncertainty_band(dataset, fit)?;
    let (x_bounds, y_bounds) = chart_bounds(dataset, &band)
        .ok_or_else(|| AppError::new(4, "Cannot plot: dataset has no finite extent."))?;

    let mut svg = String::new();
    {
        let root = SVGBackend::with_string(&mut svg, size).into_drawing_area();
        draw_chart(&root, dataset, fit, &band, x_bounds, y_bounds)
            .and_then(|_| root.present())
            .map_err(|e| AppError::new(4, format!("Failed to render chart: {e}")))?;
    }
    Ok(svg)
}

/// Render the chart and write it to `path`.
pub fn write_svg_chart(
    path: &Path,
    dataset: &Dataset,
    fit: &FitResult,
    size: (u32, u32),
) -> Result<(), AppError> {
    let svg = render_svg_chart(dataset, fit, size)?;
    fs::write(path, svg).map_err(|e| {
        AppError::new(
            2,
            format!("Failed to write chart '{}': {e}", path.display()),
        )
    })?;
    log::info!("chart written to {}", path.display());
    Ok(())
}

fn draw_chart(
    root: &DrawingArea<SVGBackend<'_>, Shift>,
    dataset: &Dataset,
    fit: &FitResult,
    band: &UncertaintyBand,
    [x0, x1]: [f64; 2],
    [y0, y1]: [f64; 2],
) -> Result<(), DrawingAreaErrorKind<std::io::Error>> {
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(root)
        .caption(CHART_TITLE, ("sans-serif", 20))
        .margin(12)
        .x_label_area_size(40)
        .y_label_area_size(56)
        .build_cartesian_2d(x0..x1, y0..y1)?;

    chart
        .configure_mesh()
        .x_desc("Volume (mL)")
        .y_desc("Mass (g)")
        .draw()?;

    // Band outline: upper edge left to right, lower edge back.
    let mut outline = xy_pairs(&band.x, &band.upper);
    outline.extend(xy_pairs(&band.x, &band.lower).into_iter().rev());
    let band_style = BLUE.mix(0.2).filled();
    chart
        .draw_series(std::iter::once(Polygon::new(outline, band_style)))?
        .label("Uncertainty Band")
        .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 20, y + 5)], band_style));

    chart
        .draw_series(DashedLineSeries::new(
            xy_pairs(&band.x, &band.y_fit).into_iter(),
            8,
            4,
            BLUE.stroke_width(2),
        ))?
        .label(format!("Best Fit: {}", fit_label(fit)))
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE.stroke_width(2)));

    chart.draw_series(dataset.iter().map(|m| {
        let (lo, hi) = (m.x - m.sigma_x, m.x + m.sigma_x);
        ErrorBar::new_horizontal(m.y, lo, m.x, hi, BLACK.filled(), 4)
    }))?;
    chart.draw_series(dataset.iter().map(|m| {
        let (lo, hi) = (m.y - m.sigma_y, m.y + m.sigma_y);
        ErrorBar::new_vertical(m.x, lo, m.y, hi, BLACK.filled(), 4)
    }))?;
    let points = dataset.iter().map(|m| (m.x, m.y));
    chart
        .draw_series(points.map(|p| Circle::new(p, 3, BLACK.filled())))?
        .label("Experimental Data")
        .legend(|(x, y)| Circle::new((x + 10, y), 3, BLACK.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{generate_dataset, sample_rng};
    use crate::domain::{ReferenceConstants, SampleSpec};
    use crate::fit::fit_dataset;

    #[test]
    fn renders_svg_document() {
        let reference = ReferenceConstants::default();
        let spec = SampleSpec::default();
        let data = generate_dataset(&mut sample_rng(4), &reference, &spec).unwrap();
        let fit = fit_dataset(&data, &reference).unwrap();

        let svg = render_svg_chart(&data, &fit, DEFAULT_SVG_SIZE).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("Least Squares Regression"));
        assert!(svg.contains("Volume (mL)"));
        assert!(svg.contains("Uncertainty Band"));
    }

    #[test]
    fn writes_svg_file() {
        let reference = ReferenceConstants::default();
        let spec = SampleSpec::default();
        let data = generate_dataset(&mut sample_rng(8), &reference, &spec).unwrap();
        let fit = fit_dataset(&data, &reference).unwrap();
        let name = format!("dfit_chart_{}.svg", std::process::id());
        let path = std::env::temp_dir().join(name);

        write_svg_chart(&path, &data, &fit, (400, 300)).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert!(svg.contains("<svg"));
    }
}
