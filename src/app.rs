//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - runs the fit pipeline (generated or CSV measurements)
//! - prints summaries, tables and plots
//! - writes optional exports

use std::path::Path;

use clap::Parser;

use crate::cli::{Command, FitArgs, PlotArgs};
use crate::domain::{ReferenceConstants, RunConfig, SampleSpec};
use crate::error::AppError;
use crate::plot::DEFAULT_SVG_SIZE;

pub mod pipeline;

use pipeline::RunOutput;

/// Entry point for the `dfit` binary.
pub fn run() -> Result<(), AppError> {
    // A missing `.env` is the normal case.
    dotenvy::dotenv().ok();

    // We want `dfit` and `dfit -n 20` to behave like `dfit fit ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);

    match cli.command {
        Command::Fit(args) => handle_fit(args),
        Command::Table(args) => handle_table(args),
        Command::Plot(args) => handle_plot(args),
        Command::Tui(args) => handle_tui(args),
    }
}

fn handle_fit(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    println!(
        "{}",
        crate::report::format_run_summary(&run.dataset, &run.fit, &run.source)
    );
    let table = crate::report::format_measurements(&run.dataset, &run.fit)?;
    println!("{table}");

    if config.plot {
        let plot = crate::plot::render_ascii_plot_with_band(
            &run.dataset,
            &run.band,
            config.plot_width,
            config.plot_height,
        );
        println!("{plot}");
    }

    for line in write_exports(&run, &config)? {
        println!("{line}");
    }

    Ok(())
}

/// Write every export requested in `config`, returning one confirmation line per file.
fn write_exports(run: &RunOutput, config: &RunConfig) -> Result<Vec<String>, AppError> {
    let mut written = Vec::new();

    if let Some(path) = &config.export_latex {
        let table = crate::report::build_table(&run.dataset, &run.fit)?;
        crate::report::export_latex_table(&table, Some(path))?;
        written.push(exported("LaTeX table", path));
    }
    if let Some(path) = &config.export_csv {
        crate::io::write_measurements_csv(path, &run.dataset, &run.fit)?;
        written.push(exported("Measurements CSV", path));
    }
    if let Some(path) = &config.export_fit {
        crate::io::write_fit_json(path, &run.dataset, &run.fit)?;
        written.push(exported("Fit JSON", path));
    }
    if let Some(path) = &config.export_svg {
        crate::plot::write_svg_chart(path, &run.dataset, &run.fit, DEFAULT_SVG_SIZE)?;
        written.push(exported("SVG chart", path));
    }

    Ok(written)
}

fn exported(what: &str, path: &Path) -> String {
    format!("{what} exported to {}", path.display())
}

fn handle_table(args: FitArgs) -> Result<(), AppError> {
    let config = run_config_from_args(&args);
    let run = pipeline::run_fit(&config)?;

    let table = crate::report::build_table(&run.dataset, &run.fit)?;
    let path = config.export_latex.as_deref();
    let latex = crate::report::export_latex_table(&table, path)?;
    match path {
        Some(path) => println!("{}", exported("LaTeX table", path)),
        None => print!("{latex}"),
    }
    Ok(())
}

fn handle_tui(args: FitArgs) -> Result<(), AppError> {
    crate::tui::run(run_config_from_args(&args))
}

fn handle_plot(args: PlotArgs) -> Result<(), AppError> {
    let file = crate::io::read_fit_json(&args.fit)?;

    let plot = crate::plot::render_ascii_plot_from_fit_file(&file, args.width, args.height);
    println!("{plot}");

    if let Some(path) = &args.svg {
        crate::plot::write_svg_chart(path, &file.measurements, &file.fit, DEFAULT_SVG_SIZE)?;
    }
    Ok(())
}

pub fn run_config_from_args(args: &FitArgs) -> RunConfig {
    RunConfig {
        reference: ReferenceConstants {
            m0: args.m0,
            v0: args.v0,
            rho: args.rho,
        },
        sample: SampleSpec {
            n_points: args.points,
            x_min: args.x_min,
            x_max: args.x_max,
            err_y: args.err_y,
            err_x: args.err_x,
            noise: args.noise,
        },
        seed: args.seed,
        input: args.input.clone(),
        plot: !args.no_plot,
        plot_width: args.width,
        plot_height: args.height,
        export_latex: args.export_latex.clone(),
        export_csv: args.export_csv.clone(),
        export_fit: args.export_fit.clone(),
        export_svg: args.svg.clone(),
    }
}

/// Rewrite argv so `dfit` defaults to `dfit fit`.
///
/// Rules:
/// - `dfit`                      -> `dfit fit`
/// - `dfit -n 20 ...`            -> `dfit fit -n 20 ...`
/// - `dfit --help/--version/-h`  -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("fit".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    let is_subcommand = matches!(arg1.as_str(), "fit" | "table" | "plot" | "tui");
    if is_subcommand {
        return argv;
    }

    if arg1.starts_with('-') {
        argv.insert(1, "fit".to_string());
    }
    argv
}
