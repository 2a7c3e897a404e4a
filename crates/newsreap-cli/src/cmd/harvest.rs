//! Harvest subcommand - run the pipeline for the selected sources

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, CellAlignment, Color};

use newsreap_core::{
    Harvest, INTERRUPTED_EXIT_CODE, ScanOutcome, SharedProgress, Source, SourceJob,
    SourceSummary, TextFileSink, cleanup_tmp_files, fmt_num, install_signal_handlers,
    is_shutdown_requested,
};

use super::report::{count_files, print_counts};
use super::styled_table;
use crate::config::{Config, ResolvedSource};

#[derive(Args, Debug)]
pub struct HarvestArgs {
    /// Only harvest these sources (comma-separated, default: all configured)
    #[arg(short, long, value_delimiter = ',')]
    pub source: Vec<String>,

    /// Enrichment workers per source
    #[arg(short, long)]
    pub workers: Option<usize>,

    /// Articles to save per source (overrides every configured target)
    #[arg(short, long)]
    pub target: Option<usize>,

    /// Output directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: HarvestArgs, config: &Config, progress: &SharedProgress) -> Result<ExitCode> {
    install_signal_handlers().context("Failed to install signal handlers")?;

    let output_dir = args.output.unwrap_or_else(|| config.output.dir.clone());
    let workers = args.workers.unwrap_or(config.workers.count);
    let mut sources = config.resolve_sources(&args.source)?;
    if let Some(target) = args.target {
        for source in &mut sources {
            source.target = target;
        }
    }
    if sources.is_empty() {
        anyhow::bail!("No sources configured");
    }

    let adapters = build_adapters(&sources)?;

    log::info!("Harvesting {} source(s)", sources.len());
    log::info!("  Output: {}", output_dir.display());
    log::info!("  Workers per source: {workers}");

    let layout: Vec<(&str, &[String])> = sources
        .iter()
        .map(|s| (s.name.as_str(), s.categories.as_slice()))
        .collect();
    cleanup_tmp_files(&output_dir, layout.iter().copied())
        .with_context(|| format!("Failed to clean {}", output_dir.display()))?;
    let sink = TextFileSink::create(&output_dir, layout)
        .with_context(|| format!("Failed to prepare {}", output_dir.display()))?;

    let jobs: Vec<SourceJob<'_>> = adapters
        .iter()
        .zip(&sources)
        .map(|(adapter, resolved)| SourceJob {
            source: adapter.as_ref(),
            target: resolved.target,
        })
        .collect();

    let summaries = Harvest::new(workers, &sink)
        .with_progress(progress)
        .run_all(&jobs);

    print_summary(&summaries);
    print_counts(&count_files(&output_dir, &sources)?);

    if is_shutdown_requested() {
        log::warn!("Interrupted, partial results kept in {}", output_dir.display());
        return Ok(ExitCode::from(INTERRUPTED_EXIT_CODE));
    }
    Ok(ExitCode::SUCCESS)
}

fn build_adapters(sources: &[ResolvedSource]) -> Result<Vec<Box<dyn Source>>> {
    sources
        .iter()
        .map(|s| {
            newsreap_sites::build(&s.name, s.categories.clone(), s.page_size)
                .with_context(|| format!("No adapter for source '{}'", s.name))
        })
        .collect()
}

/// One row per source: saved/target, how its categories ended, discards, time
fn print_summary(summaries: &[SourceSummary]) {
    let mut table = styled_table(&["Source", "Saved", "Categories", "Discarded", "Time"]);
    for summary in summaries {
        let saved = Cell::new(format!(
            "{}/{}",
            fmt_num(summary.saved),
            fmt_num(summary.target)
        ))
        .set_alignment(CellAlignment::Right);
        let saved = if summary.under_delivered() {
            saved.fg(Color::Yellow)
        } else {
            saved.fg(Color::Green)
        };

        table.add_row(vec![
            Cell::new(&summary.source),
            saved,
            Cell::new(outcome_breakdown(summary)),
            Cell::new(fmt_num(summary.discarded.total())).set_alignment(CellAlignment::Right),
            Cell::new(format!("{:.1}s", summary.elapsed.as_secs_f64())),
        ]);
    }
    eprintln!("\n{table}");
}

/// e.g. `3 target met, 2 exhausted`
fn outcome_breakdown(summary: &SourceSummary) -> String {
    const OUTCOMES: [ScanOutcome; 5] = [
        ScanOutcome::TargetMet,
        ScanOutcome::Exhausted,
        ScanOutcome::RetriesExhausted,
        ScanOutcome::Cancelled,
        ScanOutcome::Aborted,
    ];
    let parts: Vec<String> = OUTCOMES
        .iter()
        .filter_map(|&outcome| match summary.count(outcome) {
            0 => None,
            n => Some(format!("{n} {outcome}")),
        })
        .collect();
    if parts.is_empty() {
        "none".to_string()
    } else {
        parts.join(", ")
    }
}
