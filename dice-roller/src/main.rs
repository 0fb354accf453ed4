mod notation;
mod preset;
mod reports;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dice_engine::{DiceTray, LocalRollService, RollSession, ServiceLimits, entropy_seed};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::{Path, PathBuf};

use notation::{build_tray, parse_specs};
use preset::Preset;
use reports::RollReport;

#[derive(Debug, Parser)]
#[command(name = "dice-roller", version = "0.1.0")]
#[command(about = "Roll dice with rerolls, advantage and disadvantage, and a session history")]
struct Args {
    /// Dice groups (comma-separated), e.g. "2d6,d20:adv=2,3d8:reroll<2"
    #[arg(long, default_value = "1d6")]
    dice: String,

    /// JSON preset describing the dice tray (overrides --dice)
    #[arg(long)]
    preset: Option<PathBuf>,

    /// Number of roll actions to perform
    #[arg(long, default_value_t = 1)]
    times: usize,

    /// Seed for the dice and reroll streams (random when omitted)
    #[arg(long)]
    seed: Option<u64>,

    /// Output report format
    #[arg(long, default_value = "console")]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Show per-die reroll and adjustment details
    #[arg(short, long)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

/// Tray and service limits resolved from the command line.
struct RollSetup {
    tray: DiceTray,
    limits: ServiceLimits,
}

fn resolve_setup(args: &Args) -> Result<RollSetup> {
    if let Some(path) = &args.preset {
        let preset = Preset::load(path)?;
        let tray = build_tray(&preset.dice).context("building tray from preset")?;
        return Ok(RollSetup {
            tray,
            limits: preset.limits,
        });
    }
    let specs = parse_specs(&args.dice)?;
    let tray = build_tray(&specs)?;
    Ok(RollSetup {
        tray,
        limits: ServiceLimits::default(),
    })
}

/// Outcome of running every requested action.
struct RunSummary {
    session: RollSession,
    failures: Vec<String>,
}

async fn run_actions(setup: RollSetup, seed: u64, times: usize) -> RunSummary {
    let service = LocalRollService::with_limits(seed, setup.limits);
    let mut session = RollSession::from_seed(seed).with_tray(setup.tray);
    let mut failures = Vec::new();

    for action in 0..times {
        if let Err(err) = session.roll(&service).await {
            log::warn!("action {} of {times} failed", action + 1);
            failures.push(err.alert_message());
            break;
        }
    }

    RunSummary { session, failures }
}

/// Report destination: the given file, or stdout when no path is set.
fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(stdout().lock())));
    };
    let file =
        File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    Ok(Box::new(BufWriter::new(file)))
}

fn write_reports(args: &Args, seed: u64, summary: &RunSummary) -> Result<()> {
    let mut out = open_output(args.output.as_deref())?;
    let session = &summary.session;
    let configs = session.tray().configs();
    let report = RollReport {
        seed,
        configs,
        last_result: session.last_result(),
        origins: session.last_origins(),
        traces: session.last_traces(),
        history: session.history(),
        failures: &summary.failures,
    };

    match args.report.as_str() {
        "json" => reports::generate_json_report(out.as_mut(), &report)?,
        "markdown" => reports::generate_markdown_report(out.as_mut(), &report)?,
        _ => reports::generate_console_report(out.as_mut(), &report, args.verbose)?,
    }

    out.flush().context("flushing report output")?;
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let setup = resolve_setup(&args)?;
    let seed = args.seed.unwrap_or_else(entropy_seed);
    log::info!(
        "rolling {} dice in {} configuration(s) {} time(s) with seed {seed}",
        setup.tray.dice_count(),
        setup.tray.len(),
        args.times
    );

    let summary = run_actions(setup, seed, args.times).await;
    write_reports(&args, seed, &summary)?;

    if !summary.failures.is_empty() {
        for failure in &summary.failures {
            eprintln!("{}", failure.red());
        }
        std::process::exit(1);
    }

    Ok(())
}
