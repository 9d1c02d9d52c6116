//! Tile Placement Optimizer
//!
//! Places a required list of primary tiles on a grid and packs secondary
//! tiles around them, maximizing the number of touching primary/secondary
//! pairs. Prints the best plan found and can save it as a JSON layout.

use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgAction, Parser, Subcommand};
use tracing::{info, warn, Level};
use tracing_subscriber::prelude::*;

use tileplan::error::Result;
use tileplan::grid::{format_plan, labelled_tiles};
use tileplan::plan::{check_layout, Plan};
use tileplan::search::SearchLimits;
use tileplan::{optimize, persistence, Optimized, Problem};

/// Finds the best placement of primary and secondary tiles on a grid.
#[derive(Parser)]
#[command(name = "tileplan")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Optimize a problem and print the best plan.
    Solve {
        /// Problem JSON file. Uses the built-in demo when omitted.
        #[arg(short, long)]
        problem: Option<PathBuf>,
        /// Write the best layout to this JSON file.
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Stop searching after this many seconds.
        #[arg(long, value_parser = parse_seconds)]
        time_limit: Option<Duration>,
        /// Stop searching after visiting this many nodes.
        #[arg(long)]
        node_limit: Option<u64>,
    },
    /// Validate a saved layout against a problem and print it.
    Check {
        /// Problem JSON file. Uses the built-in demo when omitted.
        #[arg(short, long)]
        problem: Option<PathBuf>,
        /// Layout JSON file written by `solve --output`.
        #[arg(short, long)]
        layout: PathBuf,
    },
    /// Print the built-in demo problem as JSON.
    DemoProblem,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Command::Solve {
            problem,
            output,
            time_limit,
            node_limit,
        }) => run_solve(
            problem.as_deref(),
            output.as_deref(),
            SearchLimits {
                time_limit,
                node_limit,
            },
        ),
        Some(Command::Check { problem, layout }) => run_check(problem.as_deref(), &layout),
        Some(Command::DemoProblem) => run_demo_problem(),
        // default: optimize the demo with no limits
        None => run_solve(None, None, SearchLimits::default()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            let mut source = e.source();
            while let Some(cause) = source {
                eprintln!("  caused by: {cause}");
                source = cause.source();
            }
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(level))
        .init();
}

fn parse_seconds(value: &str) -> std::result::Result<Duration, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("'{value}' is not a number of seconds"))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| format!("invalid time limit '{value}': {e}"))
}

fn load(problem: Option<&Path>) -> Result<Problem> {
    match problem {
        Some(path) => persistence::load_problem(path),
        None => Problem::demo(),
    }
}

/// Optimizes the problem, prints the report and optionally saves the layout.
fn run_solve(problem: Option<&Path>, output: Option<&Path>, limits: SearchLimits) -> Result<()> {
    let problem = load(problem)?;
    let optimized = optimize(&problem, limits)?;
    info!(
        primary_nodes = optimized.stats.primary_nodes,
        secondary_nodes = optimized.stats.secondary_nodes,
        leaves = optimized.stats.leaves,
        improvements = optimized.stats.improvements.len(),
        "search statistics"
    );

    print!("{}", render_report(&problem, &optimized));

    if let Some(path) = output {
        persistence::save_layout(path, &optimized.layout(&problem.grid))?;
        println!("Wrote {}", path.display());
    }
    Ok(())
}

/// Re-realizes a saved layout and prints it with its recomputed score.
fn run_check(problem: Option<&Path>, layout_path: &Path) -> Result<()> {
    let problem = load(problem)?;
    let layout = persistence::load_layout(layout_path)?;
    if (layout.width, layout.height) != (problem.grid.width(), problem.grid.height()) {
        warn!(
            layout_width = layout.width,
            layout_height = layout.height,
            "layout was saved for a different grid size"
        );
    }

    let plan = check_layout(&problem.catalog, &problem.grid, &layout.placements)?;
    let score = plan.score();
    if let Some(saved) = layout.score {
        if (saved - score).abs() > 1e-9 {
            warn!(saved, recomputed = score, "saved score does not match layout");
        }
    }

    println!("layout ok, score {score:.2}");
    print!("{}", format_plan(&problem.grid, &plan));
    print!("{}", render_legend(&plan));
    Ok(())
}

fn run_demo_problem() -> Result<()> {
    let problem = Problem::demo()?;
    println!("{}", persistence::problem_to_json(&problem)?);
    Ok(())
}

/// Score line, grid drawing and tile legend for an optimization result.
fn render_report(problem: &Problem, optimized: &Optimized) -> String {
    let mut report = match optimized.score() {
        Some(score) => format!("score {score:.2}"),
        None => "no plan places every required tile".to_string(),
    };
    if !optimized.is_complete() {
        report.push_str(" (search limit reached)");
    }
    report.push('\n');

    if optimized.score().is_some() {
        report.push_str(&format_plan(&problem.grid, &optimized.plan));
        report.push_str(&render_legend(&optimized.plan));
    }
    report
}

fn render_legend(plan: &Plan) -> String {
    let mut legend = String::new();
    for (display_char, tile) in labelled_tiles(plan) {
        legend.push_str(&format!(
            "{} {} rotation {} at ({}, {})\n",
            display_char, tile.tile_id, tile.rotation, tile.anchor.0, tile.anchor.1
        ));
    }
    legend
}
