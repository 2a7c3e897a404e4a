//! Enrichment worker: turns queued stubs into saved articles or drops them

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex, PoisonError};

use indicatif::ProgressBar;

use crate::article::Article;
use crate::progress::saved_message;
use crate::sink::Sink;
use crate::source::Source;

/// What happened to one dequeued article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArticleOutcome {
    Saved,
    EnrichFailed,
    /// Enrichment succeeded but found no text
    Empty,
    SaveFailed,
    /// Dropped unprocessed after shutdown was requested
    Skipped,
}

/// Discard counters shared by the workers of one source run.
///
/// Saved articles are counted by the run's running total instead.
#[derive(Debug, Default)]
pub struct WorkerStats {
    enrich_failed: AtomicUsize,
    empty: AtomicUsize,
    save_failed: AtomicUsize,
    skipped: AtomicUsize,
}

/// Point-in-time copy of [`WorkerStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiscardCounts {
    pub enrich_failed: usize,
    pub empty: usize,
    pub save_failed: usize,
    pub skipped: usize,
}

impl DiscardCounts {
    pub fn total(&self) -> usize {
        self.enrich_failed + self.empty + self.save_failed + self.skipped
    }
}

impl WorkerStats {
    fn record(&self, outcome: ArticleOutcome) {
        let counter = match outcome {
            ArticleOutcome::Saved => return,
            ArticleOutcome::EnrichFailed => &self.enrich_failed,
            ArticleOutcome::Empty => &self.empty,
            ArticleOutcome::SaveFailed => &self.save_failed,
            ArticleOutcome::Skipped => &self.skipped,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> DiscardCounts {
        DiscardCounts {
            enrich_failed: self.enrich_failed.load(Ordering::Relaxed),
            empty: self.empty.load(Ordering::Relaxed),
            save_failed: self.save_failed.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
        }
    }
}

/// State shared by every worker of one source run
pub struct WorkerContext<'a> {
    pub source: &'a dyn Source,
    pub sink: &'a dyn Sink,
    /// Running total of saved articles, read by scanners
    pub total: &'a AtomicUsize,
    pub target: usize,
    pub stats: &'a WorkerStats,
    pub cancel: &'a AtomicBool,
    pub progress: &'a ProgressBar,
}

/// Enrich and save one article. No retries: every article is terminal here.
pub fn process_article(ctx: &WorkerContext<'_>, mut article: Article) -> ArticleOutcome {
    if ctx.cancel.load(Ordering::Relaxed) {
        log::debug!("{}: skipped, shutdown requested", article.url());
        return ArticleOutcome::Skipped;
    }

    if let Err(e) = ctx.source.enrich(&mut article) {
        log::warn!("{}: enrichment failed: {e}", article.url());
        return ArticleOutcome::EnrichFailed;
    }

    if !article.has_text() {
        log::debug!("{} has no text", article.url());
        return ArticleOutcome::Empty;
    }

    if let Err(e) = ctx.sink.save(ctx.source.name(), &article) {
        log::error!(
            "{}/{}/{}: save failed: {e}",
            ctx.source.name(),
            article.category(),
            article.id()
        );
        return ArticleOutcome::SaveFailed;
    }

    let saved = ctx.total.fetch_add(1, Ordering::Relaxed) + 1;
    ctx.progress.set_message(saved_message(saved, ctx.target));
    ArticleOutcome::Saved
}

/// Drain the shared channel until every sender is gone.
///
/// The receiver lock is held only while waiting for the next article, so each
/// article reaches exactly one worker. Returns how many articles this worker saved.
pub fn run_worker(ctx: &WorkerContext<'_>, rx: Arc<Mutex<Receiver<Article>>>) -> usize {
    let mut saved = 0;
    loop {
        let received = rx.lock().unwrap_or_else(PoisonError::into_inner).recv();
        let Ok(article) = received else {
            break;
        };
        let outcome = process_article(ctx, article);
        if outcome == ArticleOutcome::Saved {
            saved += 1;
        }
        ctx.stats.record(outcome);
    }
    log::debug!("channel drained, {saved} saved");
    saved
}
