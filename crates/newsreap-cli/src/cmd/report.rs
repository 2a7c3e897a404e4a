//! Report subcommand - count saved articles on disk

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{Cell, CellAlignment};

use newsreap_core::{CategoryCount, count_saved, fmt_num};

use super::styled_table;
use crate::config::{Config, ResolvedSource};

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Output directory to inspect
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

pub fn run(args: ReportArgs, config: &Config) -> Result<()> {
    let root = args.output.unwrap_or_else(|| config.output.dir.clone());
    let sources = config.resolve_sources(&[])?;
    let counts = count_files(&root, &sources)?;
    print_counts(&counts);
    Ok(())
}

pub(crate) fn count_files(root: &Path, sources: &[ResolvedSource]) -> Result<Vec<CategoryCount>> {
    let layout = sources
        .iter()
        .map(|s| (s.name.as_str(), s.categories.as_slice()));
    count_saved(root, layout).with_context(|| format!("Failed to scan {}", root.display()))
}

/// Per-category file counts with a total row
pub(crate) fn print_counts(counts: &[CategoryCount]) {
    let mut table = styled_table(&["Source", "Category", "Files"]);
    for count in counts {
        table.add_row(vec![
            Cell::new(&count.source),
            Cell::new(&count.category),
            Cell::new(fmt_num(count.files)).set_alignment(CellAlignment::Right),
        ]);
    }
    let total: usize = counts.iter().map(|c| c.files).sum();
    table.add_row(vec![
        Cell::new("total"),
        Cell::new(""),
        Cell::new(fmt_num(total)).set_alignment(CellAlignment::Right),
    ]);
    eprintln!("\n{table}");
}
