//! Run coordinator: wires scanners, the bounded channel and the worker pool
//!
//! One source run goes through three phases:
//!
//! 1. **Scanning & enriching**: `workers` worker threads and one scanner thread
//!    per category run against a channel of capacity `workers`. A full channel
//!    blocks scanners, which is the only backpressure in the pipeline.
//! 2. **Draining**: once every scanner has returned, its sender is gone and
//!    the channel is closed. Workers finish what is still queued.
//! 3. **Done**: every worker has returned; the summary is built.
//!
//! A run always reaches Done. Categories that are exhausted or keep failing
//! simply deliver less; nothing is surfaced beyond logs and the summary.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, mpsc};
use std::thread;
use std::time::{Duration, Instant};

use indicatif::ProgressBar;

use crate::article::Article;
use crate::progress::{ProgressContext, fmt_num, saved_message};
use crate::scanner::{self, ScanContext, ScanOutcome, ScanReport};
use crate::shutdown::shutdown_flag;
use crate::sink::Sink;
use crate::source::Source;
use crate::worker::{self, DiscardCounts, WorkerContext, WorkerStats};

/// One source and the number of articles to save from it
#[derive(Clone, Copy)]
pub struct SourceJob<'a> {
    pub source: &'a dyn Source,
    pub target: usize,
}

/// Result of one source run
#[derive(Debug, Clone)]
pub struct SourceSummary {
    pub source: String,
    pub target: usize,
    /// Final running total: articles the sink accepted
    pub saved: usize,
    pub categories: Vec<ScanReport>,
    pub discarded: DiscardCounts,
    pub elapsed: Duration,
}

impl SourceSummary {
    fn empty(source: &str, target: usize) -> Self {
        Self {
            source: source.to_string(),
            target,
            saved: 0,
            categories: Vec::new(),
            discarded: DiscardCounts::default(),
            elapsed: Duration::ZERO,
        }
    }

    /// Fewer articles saved than requested
    pub fn under_delivered(&self) -> bool {
        self.saved < self.target
    }

    /// Number of categories that stopped with `outcome`
    pub fn count(&self, outcome: ScanOutcome) -> usize {
        self.categories
            .iter()
            .filter(|r| r.outcome == outcome)
            .count()
    }

    /// Log the summary and per-category outcomes at info level
    pub fn log(&self) {
        log::info!(
            "{}: {} saved (target {}) in {:.1}s",
            self.source,
            fmt_num(self.saved),
            fmt_num(self.target),
            self.elapsed.as_secs_f64()
        );
        for report in &self.categories {
            log::info!(
                "  {}: {} after {} fetches ({} failed), {} queued",
                report.category,
                report.outcome,
                report.fetches,
                report.failures,
                report.queued
            );
        }
        if self.discarded.total() > 0 {
            log::info!(
                "  discarded: {} enrich errors, {} empty, {} save errors, {} skipped",
                self.discarded.enrich_failed,
                self.discarded.empty,
                self.discarded.save_failed,
                self.discarded.skipped
            );
        }
    }
}

/// Pipeline runner shared by all sources of one invocation
pub struct Harvest<'a> {
    workers: usize,
    sink: &'a dyn Sink,
    cancel: &'a AtomicBool,
    progress: Option<&'a ProgressContext>,
}

impl<'a> Harvest<'a> {
    /// Runner with `workers` enrichment workers per source.
    ///
    /// Cancellation defaults to the process-wide [`shutdown_flag`].
    pub fn new(workers: usize, sink: &'a dyn Sink) -> Self {
        Self {
            workers: workers.max(1),
            sink,
            cancel: shutdown_flag(),
            progress: None,
        }
    }

    /// Use a different cancellation flag
    pub fn with_cancel(mut self, cancel: &'a AtomicBool) -> Self {
        self.cancel = cancel;
        self
    }

    /// Show one status line per source
    pub fn with_progress(mut self, progress: &'a ProgressContext) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Run every job concurrently, one thread per source.
    ///
    /// Sources share only the sink and the cancellation flag. Summaries come
    /// back in job order.
    pub fn run_all(&self, jobs: &[SourceJob<'_>]) -> Vec<SourceSummary> {
        thread::scope(|s| {
            let handles: Vec<_> = jobs
                .iter()
                .map(|job| {
                    let handle = thread::Builder::new()
                        .name(format!("harvest/{}", job.source.name()))
                        .spawn_scoped(s, move || self.run_source(job.source, job.target));
                    (job, handle)
                })
                .collect();

            handles
                .into_iter()
                .map(|(job, handle)| {
                    let name = job.source.name();
                    match handle {
                        Ok(handle) => handle.join().unwrap_or_else(|_| {
                            log::error!("{name}: source run panicked");
                            SourceSummary::empty(name, job.target)
                        }),
                        Err(e) => {
                            log::error!("{name}: cannot start source run: {e}");
                            SourceSummary::empty(name, job.target)
                        }
                    }
                })
                .collect()
        })
    }

    /// Run one source until all of its scanners stop and the channel is drained.
    pub fn run_source(&self, source: &dyn Source, target: usize) -> SourceSummary {
        let start = Instant::now();
        let name = source.name();
        let categories = source.categories();
        let page_size = source.page_size();
        let page_size = if page_size == 0 {
            log::warn!("{name}: page size 0, using 1");
            1
        } else {
            page_size
        };

        log::info!(
            "{name}: starting {} workers, {} categories, target {}",
            self.workers,
            categories.len(),
            fmt_num(target)
        );

        let pb = match self.progress {
            Some(progress) => progress.source_line(name),
            None => ProgressBar::hidden(),
        };
        let total = AtomicUsize::new(0);
        let stats = WorkerStats::default();

        let worker_ctx = WorkerContext {
            source,
            sink: self.sink,
            total: &total,
            target,
            stats: &stats,
            cancel: self.cancel,
            progress: &pb,
        };
        let scan_ctx = ScanContext {
            source,
            page_size,
            target,
            total: &total,
            cancel: self.cancel,
        };

        let reports = thread::scope(|s| {
            let (tx, rx) = mpsc::sync_channel::<Article>(self.workers);
            // Workers own the receiver: if they all die, scanners see a closed channel
            let rx = Arc::new(Mutex::new(rx));

            let mut workers = Vec::with_capacity(self.workers);
            for i in 0..self.workers {
                let rx = Arc::clone(&rx);
                let ctx = &worker_ctx;
                match thread::Builder::new()
                    .name(format!("{name}/worker/{i}"))
                    .spawn_scoped(s, move || worker::run_worker(ctx, rx))
                {
                    Ok(handle) => workers.push(handle),
                    Err(e) => log::error!("{name}: cannot spawn worker {i}: {e}"),
                }
            }
            drop(rx);

            let mut scanners = Vec::with_capacity(categories.len());
            for category in categories {
                let tx = tx.clone();
                let ctx = &scan_ctx;
                match thread::Builder::new()
                    .name(format!("{name}/scan/{category}"))
                    .spawn_scoped(s, move || scanner::scan_category(ctx, category, tx))
                {
                    Ok(handle) => scanners.push((category, handle)),
                    Err(e) => log::error!("{name}: cannot spawn scanner for {category}: {e}"),
                }
            }
            // Last sender now lives in the scanners; the channel closes when they return
            drop(tx);

            let reports: Vec<ScanReport> = scanners
                .into_iter()
                .map(|(category, handle)| {
                    handle.join().unwrap_or_else(|_| {
                        log::error!("{name}: scanner for {category} panicked");
                        ScanReport::aborted(category)
                    })
                })
                .collect();

            log::info!("{name}: all categories finished, draining queue");
            for handle in workers {
                if handle.join().is_err() {
                    log::error!("{name}: worker panicked");
                }
            }
            reports
        });

        let saved = total.load(Ordering::Relaxed);
        pb.finish_with_message(format!(
            "{} in {:.0?}",
            saved_message(saved, target),
            start.elapsed()
        ));

        let summary = SourceSummary {
            source: name.to_string(),
            target,
            saved,
            categories: reports,
            discarded: stats.snapshot(),
            elapsed: start.elapsed(),
        };
        summary.log();
        summary
    }
}
