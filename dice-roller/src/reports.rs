use anyhow::Result;
use colored::Colorize;
use dice_engine::{DieConfig, History, RollOutcome, RollResponse, RollTrace, config_for_die};
use serde::Serialize;
use std::io::Write;

/// Everything a report needs about one run of the roller.
#[derive(Debug, Serialize)]
pub struct RollReport<'a> {
    pub seed: u64,
    pub configs: &'a [DieConfig],
    pub last_result: Option<&'a RollResponse>,
    /// Configuration index behind each roll of `last_result`.
    #[serde(skip_serializing_if = "<[usize]>::is_empty")]
    pub origins: &'a [usize],
    #[serde(skip_serializing_if = "<[RollTrace]>::is_empty")]
    pub traces: &'a [RollTrace],
    pub history: &'a History,
    #[serde(skip_serializing_if = "<[String]>::is_empty")]
    pub failures: &'a [String],
}

fn roll_label(configs: &[DieConfig], origins: &[usize], roll_index: usize) -> String {
    let config_index = origins.get(roll_index).copied().unwrap_or(roll_index);
    configs
        .get(config_index)
        .or_else(|| config_for_die(configs, config_index))
        .map_or_else(|| format!("roll {}", roll_index + 1), DieConfig::label)
}

fn chain_text(roll: &RollOutcome) -> String {
    roll.per_die
        .iter()
        .map(|die| {
            if die.original.len() > 1 || die.original.last() != Some(&die.final_value) {
                let chain: Vec<String> = die.original.iter().map(ToString::to_string).collect();
                format!("{} -> {}", chain.join("/"), die.final_value)
            } else {
                die.final_value.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

fn median_text(roll: &RollOutcome) -> String {
    roll.median
        .map_or_else(|| "-".to_string(), |median| format!("{median:.1}"))
}

fn spread_text(roll: &RollOutcome) -> String {
    roll.spread
        .map_or_else(|| "-".to_string(), |spread| spread.to_string())
}

pub fn generate_console_report(
    out: &mut dyn Write,
    report: &RollReport<'_>,
    verbose: bool,
) -> Result<()> {
    writeln!(out)?;
    writeln!(out, "{}", "🎲 Dice Roll Results".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())?;
    writeln!(out, "Seed: {}", report.seed)?;

    let Some(result) = report.last_result else {
        writeln!(out, "No rolls completed.")?;
        write_failures(out, report.failures)?;
        return Ok(());
    };

    for (idx, roll) in result.rolls.iter().enumerate() {
        writeln!(
            out,
            "{} [{}]  sum {}",
            roll_label(report.configs, report.origins, idx).bold(),
            chain_text(roll),
            roll.sum.to_string().green()
        )?;
        writeln!(
            out,
            "   average {:.2}  median {}  spread {}",
            roll.average,
            median_text(roll),
            spread_text(roll)
        )?;
        if verbose && let Some(trace) = report.traces.get(idx) {
            for (die_idx, die) in trace.dice.iter().enumerate() {
                writeln!(
                    out,
                    "     die {}: {} -> {} (rerolls {}, adjust {:+})",
                    die_idx + 1,
                    die.before,
                    die.after,
                    die.reroll_attempts,
                    die.advantage_delta
                )?;
            }
        }
    }
    writeln!(
        out,
        "Grand total: {}",
        result.grand_total().to_string().bright_green().bold()
    )?;

    writeln!(out)?;
    writeln!(out, "{}", "📜 Session History".bright_yellow().bold())?;
    writeln!(out, "{}", "=================".yellow())?;
    for entry in report.history.entries() {
        writeln!(out, "Roll {}  {}", entry.time.dimmed(), entry.summary.sum)?;
    }

    write_failures(out, report.failures)
}

fn write_failures(out: &mut dyn Write, failures: &[String]) -> Result<()> {
    for failure in failures {
        writeln!(out, "❌ {}", failure.red())?;
    }
    Ok(())
}

pub fn generate_json_report(out: &mut dyn Write, report: &RollReport<'_>) -> Result<()> {
    let json_output = serde_json::to_string_pretty(report)?;
    writeln!(out, "{json_output}")?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &RollReport<'_>) -> Result<()> {
    writeln!(out, "# Dice Roll Results\n")?;
    writeln!(out, "- **Seed**: {}", report.seed)?;
    writeln!(out, "- **Actions**: {}\n", report.history.len())?;

    match report.last_result {
        Some(result) => {
            writeln!(out, "## Latest Roll\n")?;
            writeln!(out, "| Dice | Faces | Sum | Average | Median | Spread |")?;
            writeln!(out, "|------|-------|-----|---------|--------|--------|")?;
            for (idx, roll) in result.rolls.iter().enumerate() {
                writeln!(
                    out,
                    "| {} | {} | {} | {:.2} | {} | {} |",
                    roll_label(report.configs, report.origins, idx),
                    chain_text(roll),
                    roll.sum,
                    roll.average,
                    median_text(roll),
                    spread_text(roll)
                )?;
            }
            writeln!(out, "\n**Grand total**: {}\n", result.grand_total())?;
        }
        None => writeln!(out, "_No rolls completed._\n")?,
    }

    if !report.history.is_empty() {
        writeln!(out, "## History\n")?;
        for entry in report.history.entries() {
            writeln!(out, "- {}: {}", entry.time, entry.summary.sum)?;
        }
        writeln!(out)?;
    }

    if !report.failures.is_empty() {
        writeln!(out, "## Failures\n")?;
        for failure in report.failures {
            writeln!(out, "- {failure}")?;
        }
    }
    Ok(())
}
