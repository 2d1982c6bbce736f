//! Command-line parsing for the density fitter.
//!
//! The goal of this module is to keep **argument parsing** and **command dispatch**
//! separate from the fitting/math code. Every generation option can also be set
//! through a `DFIT_*` environment variable (or a `.env` file).

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(
    name = "dfit",
    version,
    about = "Least-squares density fit of mass vs. volume"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate (or load) measurements, fit them, print results and optionally export.
    Fit(FitArgs),
    /// Print the LaTeX measurement table (or write it with `--export-latex`).
    Table(FitArgs),
    /// Re-render a fit JSON written by `dfit fit --export-fit`.
    Plot(PlotArgs),
    /// Launch the interactive TUI.
    ///
    /// This uses the same pipeline as `dfit fit`, but renders the chart and fit
    /// parameters in a terminal UI using Ratatui.
    Tui(FitArgs),
}

/// Options shared by `fit`, `table` and `tui`.
#[derive(Debug, Args, Clone)]
pub struct FitArgs {
    /// Number of generated measurements.
    #[arg(
        short = 'n',
        long = "points",
        env = "DFIT_POINTS",
        default_value_t = 10
    )]
    pub points: usize,

    /// Smallest generated volume (mL).
    #[arg(
        long,
        env = "DFIT_X_MIN",
        default_value_t = 110.0,
        allow_negative_numbers = true
    )]
    pub x_min: f64,

    /// Largest generated volume (mL).
    #[arg(
        long,
        env = "DFIT_X_MAX",
        default_value_t = 200.0,
        allow_negative_numbers = true
    )]
    pub x_max: f64,

    /// Relative mass uncertainty (fraction of each reading).
    #[arg(long, env = "DFIT_ERR_Y", default_value_t = 0.025)]
    pub err_y: f64,

    /// Relative volume uncertainty (fraction of each reading).
    #[arg(long, env = "DFIT_ERR_X", default_value_t = 0.10)]
    pub err_x: f64,

    /// Half-width of the uniform mass noise (g).
    #[arg(long, env = "DFIT_NOISE", default_value_t = 5.0)]
    pub noise: f64,

    /// Seed for the noise generator (random when omitted; the run reports it).
    #[arg(long, env = "DFIT_SEED")]
    pub seed: Option<u64>,

    /// Reference mass M0 (g).
    #[arg(
        long,
        env = "DFIT_M0",
        default_value_t = 300.0,
        allow_negative_numbers = true
    )]
    pub m0: f64,

    /// Reference volume V0 (mL).
    #[arg(
        long,
        env = "DFIT_V0",
        default_value_t = 100.0,
        allow_negative_numbers = true
    )]
    pub v0: f64,

    /// Reference density rho (g/mL).
    #[arg(
        long,
        env = "DFIT_RHO",
        default_value_t = 1.0,
        allow_negative_numbers = true
    )]
    pub rho: f64,

    /// Fit measurements from a CSV file instead of generating them.
    #[arg(long, value_name = "CSV")]
    pub input: Option<PathBuf>,

    /// Disable the terminal plot.
    #[arg(long)]
    pub no_plot: bool,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,

    /// Write the LaTeX measurement table.
    #[arg(long = "export-latex", value_name = "TEX")]
    pub export_latex: Option<PathBuf>,

    /// Write per-measurement results to CSV.
    #[arg(long = "export-csv", value_name = "CSV")]
    pub export_csv: Option<PathBuf>,

    /// Write the fit (measurements, parameters, band) to JSON.
    #[arg(long = "export-fit", value_name = "JSON")]
    pub export_fit: Option<PathBuf>,

    /// Write the chart as SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,
}

/// Options for plotting a saved fit.
#[derive(Debug, Args)]
pub struct PlotArgs {
    /// Fit JSON file produced by `dfit fit --export-fit`.
    #[arg(long, value_name = "JSON")]
    pub fit: PathBuf,

    /// Also write the chart as SVG.
    #[arg(long, value_name = "SVG")]
    pub svg: Option<PathBuf>,

    /// Plot width (columns).
    #[arg(long, default_value_t = 80)]
    pub width: usize,

    /// Plot height (rows).
    #[arg(long, default_value_t = 24)]
    pub height: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn fit_defaults() {
        let cli = Cli::try_parse_from(["dfit", "fit", "--seed", "7"]).unwrap();
        let Command::Fit(args) = cli.command else {
            panic!("expected fit");
        };
        assert_eq!(args.points, 10);
        assert_eq!(args.seed, Some(7));
        assert_eq!(args.x_min, 110.0);
        assert_eq!(args.rho, 1.0);
        assert!(!args.no_plot);
        assert!(args.export_latex.is_none());
    }

    #[test]
    fn plot_requires_fit_file() {
        assert!(Cli::try_parse_from(["dfit", "plot"]).is_err());
        let argv = ["dfit", "plot", "--fit", "run.json", "--svg", "run.svg"];
        let cli = Cli::try_parse_from(argv).unwrap();
        let Command::Plot(args) = cli.command else {
            panic!("expected plot");
        };
        assert_eq!(args.fit, PathBuf::from("run.json"));
        assert_eq!(args.svg, Some(PathBuf::from("run.svg")));
    }
}
