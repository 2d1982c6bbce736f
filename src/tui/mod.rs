//! Ratatui-based terminal UI.
//!
//! The TUI provides a settings panel (point count, noise, seed), refits on every
//! change, and renders the chart next to the fit parameters.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::pipeline::{RunOutput, run_fit, run_fit_with_dataset};
use crate::data::{MIN_POINTS, generate_dataset, resolve_seed, sample_rng};
use crate::domain::RunConfig;
use crate::error::AppError;
use crate::plot::DEFAULT_SVG_SIZE;
use crate::report::{DataSource, fit_label};

mod plotters_chart;

use plotters_chart::{ChartSeries, DensityChart};

const DEFAULT_LATEX_PATH: &str = "dfit_table.tex";
const DEFAULT_SVG_PATH: &str = "dfit_chart.svg";
const NOISE_STEP: f64 = 0.5;

/// Start the TUI.
pub fn run(config: RunConfig) -> Result<(), AppError> {
    let mut app = App::new(config);

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Points,
    Noise,
    Seed,
}

impl Field {
    const ALL: [Field; 3] = [Field::Points, Field::Noise, Field::Seed];
}

struct App {
    config: RunConfig,
    seed: u64,
    selected: usize,
    status: String,
    run: Option<RunOutput>,
    series: Option<ChartSeries>,
}

impl App {
    fn new(config: RunConfig) -> Self {
        let seed = resolve_seed(config.seed);
        let mut app = Self {
            config,
            seed,
            selected: 0,
            status: String::new(),
            run: None,
            series: None,
        };
        app.refit();
        app
    }

    fn event_loop<B: ratatui::backend::Backend>(
        &mut self,
        terminal: &mut Terminal<B>,
    ) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Apply a key press; returns `true` when the app should quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Up => self.selected = self.selected.saturating_sub(1),
            KeyCode::Down => self.selected = (self.selected + 1).min(Field::ALL.len() - 1),
            KeyCode::Left => self.adjust(-1),
            KeyCode::Right => self.adjust(1),
            KeyCode::Char('r') => {
                self.seed = resolve_seed(None);
                self.refit();
            }
            KeyCode::Char('e') => self.export(),
            _ => {}
        }
        false
    }

    fn adjust(&mut self, delta: i64) {
        match Field::ALL[self.selected] {
            Field::Points => {
                let n = self.config.sample.n_points as i64 + delta;
                self.config.sample.n_points = n.max(MIN_POINTS as i64) as usize;
            }
            Field::Noise => {
                let noise = self.config.sample.noise + delta as f64 * NOISE_STEP;
                self.config.sample.noise = noise.max(0.0);
            }
            Field::Seed => self.seed = self.seed.wrapping_add_signed(delta),
        }
        self.refit();
    }

    /// Rebuild the run from the current settings; failures only update the status line.
    fn refit(&mut self) {
        let result = match self.config.input {
            Some(_) => run_fit(&self.config),
            None => {
                let mut rng = sample_rng(self.seed);
                let source = DataSource::Generated { seed: self.seed };
                generate_dataset(&mut rng, &self.config.reference, &self.config.sample)
                    .map_err(AppError::from)
                    .and_then(|dataset| run_fit_with_dataset(&self.config, dataset, source))
            }
        };

        match result {
            Ok(run) => {
                self.status = format!("n={} seed={}", run.fit.n, self.seed);
                self.series = ChartSeries::from_run(&run);
                self.run = Some(run);
            }
            Err(err) => {
                log::warn!("refit failed: {err}");
                self.status = format!("Fit failed: {err}");
                self.series = None;
                self.run = None;
            }
        }
    }

    fn export(&mut self) {
        let Some(run) = &self.run else {
            self.status = "Nothing to export.".to_string();
            return;
        };
        let latex_path = self
            .config
            .export_latex
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LATEX_PATH));
        let svg_path = self
            .config
            .export_svg
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SVG_PATH));

        let result = crate::report::build_table(&run.dataset, &run.fit)
            .and_then(|table| crate::report::export_latex_table(&table, Some(&latex_path)))
            .and_then(|_| {
                crate::plot::write_svg_chart(&svg_path, &run.dataset, &run.fit, DEFAULT_SVG_SIZE)
            });

        self.status = match result {
            Ok(()) => format!("Wrote {} and {}", latex_path.display(), svg_path.display()),
            Err(err) => format!("Export failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(3),
            ])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let r = &self.config.reference;
        let line = Line::from(vec![
            Span::styled("dfit", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " mass vs. volume | M0={} g V0={} mL rho={} g/mL",
                r.m0, r.v0, r.rho
            )),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);
        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(chunks[1]);

        self.draw_chart(frame, chunks[0]);
        self.draw_settings(frame, side[0]);
        self.draw_fit(frame, side[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default()
            .title("Mass vs. Volume")
            .borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        match &self.series {
            Some(series) => frame.render_widget(DensityChart { series }, inner),
            None => frame.render_widget(
                Paragraph::new("No fit to show.").style(Style::default().fg(Color::Yellow)),
                inner,
            ),
        }
    }

    fn draw_settings(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Field::ALL
            .iter()
            .map(|field| {
                ListItem::new(match field {
                    Field::Points => format!("Points: {}", self.config.sample.n_points),
                    Field::Noise => format!("Noise: ±{:.1} g", self.config.sample.noise),
                    Field::Seed => format!("Seed: {}", self.seed),
                })
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Settings").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_fit(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let lines = match &self.run {
            Some(run) => fit_lines(run),
            None => vec![Line::from("-")],
        };
        let block = Block::default().title("Fit").borders(Borders::ALL);
        let p = Paragraph::new(Text::from(lines)).block(block);
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "↑/↓ select  ←/→ adjust  r reseed  e export  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn fit_lines(run: &RunOutput) -> Vec<Line<'static>> {
    let fit = &run.fit;
    let mut lines = vec![
        Line::from(format!("a = {:.4} ± {:.4}", fit.a, fit.sigma_a)),
        Line::from(format!("b = {:.2} ± {:.2}", fit.b, fit.sigma_b)),
        Line::from(format!(
            "s = {:.3} g (dof={})",
            fit.sigma_y_resid,
            fit.n.saturating_sub(2)
        )),
        Line::from(format!(
            "expected a={} b={}",
            fit.reference.rho,
            fit.reference.intercept()
        )),
    ];
    if let Some(pull) = fit.slope_pull() {
        lines.push(Line::from(format!("pull {pull:+.2} sigma")));
    }
    lines.push(Line::from(Span::styled(fit_label(fit), Style::default().fg(Color::Cyan))));
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(RunConfig {
            seed: Some(12),
            ..RunConfig::default()
        })
    }

    #[test]
    fn starts_with_a_fit() {
        let app = app();
        assert_eq!(app.seed, 12);
        assert!(app.run.is_some());
        assert!(app.series.is_some());
    }

    #[test]
    fn arrows_adjust_selected_setting() {
        let mut app = app();
        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.config.sample.n_points, 11);
        assert_eq!(app.run.as_ref().unwrap().dataset.len(), 11);

        for _ in 0..20 {
            app.handle_key(KeyCode::Left);
        }
        assert_eq!(app.config.sample.n_points, MIN_POINTS);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Left);
        assert_eq!(app.config.sample.noise, 4.5);

        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Down);
        app.handle_key(KeyCode::Right);
        assert_eq!(app.seed, 13);
        assert_eq!(
            app.run.as_ref().unwrap().source,
            DataSource::Generated { seed: 13 }
        );
    }

    #[test]
    fn quit_keys() {
        let mut app = app();
        assert!(app.handle_key(KeyCode::Char('q')));
        assert!(app.handle_key(KeyCode::Esc));
        assert!(!app.handle_key(KeyCode::Char('x')));
    }

    #[test]
    fn failed_fit_keeps_running() {
        let mut app = app();
        app.config.sample.x_max = app.config.sample.x_min;
        app.refit();
        assert!(app.run.is_none());
        assert!(app.status.starts_with("Fit failed"));
    }

    #[test]
    fn draws_without_panicking() {
        let app = app();
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|f| app.draw(f)).unwrap();
        let buffer = terminal.backend().buffer().clone();
        let text: String = buffer.content().iter().map(|c| c.symbol()).collect();
        assert!(text.contains("Settings"));
        assert!(text.contains("Seed: 12"));
    }
}
