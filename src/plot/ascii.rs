//! ASCII plotting for terminal output.
//!
//! This is intentionally "dumb" (fixed-size grid), optimized for:
//! - quick visual sanity checks in a terminal
//! - deterministic output (helpful for golden tests)
//!
//! Plot elements, from lowest to highest drawing priority:
//! - uncertainty band: `:`
//! - fitted line: `-`
//! - error bars: `=` (volume), `|` (mass)
//! - measurements: `o`

use crate::domain::{Dataset, FitFile, FitResult, UncertaintyBand};
use crate::error::AppError;
use crate::fit::uncertainty_band;
use crate::plot::chart_bounds;

/// Render a plot for an in-memory fit.
pub fn render_ascii_plot(
    dataset: &Dataset,
    fit: &FitResult,
    width: usize,
    height: usize,
) -> Result<String, AppError> {
    let band = uncertainty_band(dataset, fit)?;
    Ok(render_ascii_plot_with_band(dataset, &band, width, height))
}

/// Render a plot from a saved fit file.
pub fn render_ascii_plot_from_fit_file(file: &FitFile, width: usize, height: usize) -> String {
    render_ascii_plot_with_band(&file.measurements, &file.band, width, height)
}

/// Render a plot around a band that has already been computed for `dataset`.
pub fn render_ascii_plot_with_band(
    dataset: &Dataset,
    band: &UncertaintyBand,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let ([x_min, x_max], [y_min, y_max]) =
        chart_bounds(dataset, band).unwrap_or(([0.0, 1.0], [0.0, 1.0]));
    let frame = Frame {
        x_min,
        x_max,
        y_min,
        y_max,
        width,
        height,
    };

    let mut grid = vec![vec![' '; width]; height];

    draw_band(&mut grid, band, &frame);
    draw_curve(&mut grid, band, &frame);

    for m in dataset {
        let col = frame.col(m.x);
        let row = frame.row(m.y);
        for c in frame.col(m.x - m.sigma_x)..=frame.col(m.x + m.sigma_x) {
            put(&mut grid, c, row, '=');
        }
        for r in frame.row(m.y + m.sigma_y)..=frame.row(m.y - m.sigma_y) {
            put(&mut grid, col, r, '|');
        }
    }
    for m in dataset {
        put(&mut grid, frame.col(m.x), frame.row(m.y), 'o');
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: V=[{x_min:.2}, {x_max:.2}] mL | M=[{y_min:.2}, {y_max:.2}] g\n"
    ));

    for row in grid {
        out.push_str(&row.into_iter().collect::<String>());
        out.push('\n');
    }

    out
}

struct Frame {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
    width: usize,
    height: usize,
}

impl Frame {
    fn col(&self, x: f64) -> usize {
        let u = ((x - self.x_min) / (self.x_max - self.x_min)).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }

    fn row(&self, y: f64) -> usize {
        let u = ((y - self.y_min) / (self.y_max - self.y_min)).clamp(0.0, 1.0);
        // y=top is max -> row 0
        (self.height as f64 - 1.0 - (u * (self.height as f64 - 1.0))).round() as usize
    }

    /// Data-space x at the centre of a column.
    fn x_at(&self, col: usize) -> f64 {
        self.x_min + col as f64 / (self.width as f64 - 1.0) * (self.x_max - self.x_min)
    }
}

fn priority(ch: char) -> u8 {
    match ch {
        ' ' => 0,
        ':' => 1,
        '-' => 2,
        '=' | '|' => 3,
        _ => 4,
    }
}

fn put(grid: &mut [Vec<char>], col: usize, row: usize, ch: char) {
    if let Some(cell) = grid.get_mut(row).and_then(|r| r.get_mut(col)) {
        if priority(ch) >= priority(*cell) {
            *cell = ch;
        }
    }
}

/// Shade every column inside the band's x-extent between its lower and upper edge.
fn draw_band(grid: &mut [Vec<char>], band: &UncertaintyBand, frame: &Frame) {
    if band.len() < 2 {
        return;
    }
    for col in 0..frame.width {
        let x = frame.x_at(col);
        let lo = interp(&band.x, &band.lower, x);
        let hi = interp(&band.x, &band.upper, x);
        let (Some(lo), Some(hi)) = (lo, hi) else {
            continue;
        };
        // Zero-width band: nothing to shade.
        if !(hi > lo) {
            continue;
        }
        for row in frame.row(hi)..=frame.row(lo) {
            put(grid, col, row, ':');
        }
    }
}

fn draw_curve(grid: &mut [Vec<char>], band: &UncertaintyBand, frame: &Frame) {
    if band.len() < 2 {
        return;
    }

    let mut prev = None;
    for (&x, &y) in band.x.iter().zip(band.y_fit.iter()) {
        let col = frame.col(x);
        let row = frame.row(y);
        if let Some((c0, r0)) = prev {
            draw_line(grid, c0, r0, col, row, '-');
        } else {
            put(grid, col, row, '-');
        }
        prev = Some((col, row));
    }
}

/// Linear interpolation on sorted knots; `None` outside `[xs[0], xs[last]]`.
fn interp(xs: &[f64], ys: &[f64], x: f64) -> Option<f64> {
    let first = *xs.first()?;
    let last = *xs.last()?;
    if !(x >= first && x <= last) {
        return None;
    }
    for (xw, yw) in xs.windows(2).zip(ys.windows(2)) {
        if x >= xw[0] && x <= xw[1] {
            let span = xw[1] - xw[0];
            if span.abs() < 1e-12 {
                return Some(yw[0]);
            }
            let u = (x - xw[0]) / span;
            return Some(yw[0] + u * (yw[1] - yw[0]));
        }
    }
    None
}

/// Integer line drawing (Bresenham-ish).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if x0 >= 0 && y0 >= 0 {
            put(grid, x0 as usize, y0 as usize, ch);
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}
