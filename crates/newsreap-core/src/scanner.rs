//! Category scanner: paginates one (source, category) into the shared channel

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::mpsc::SyncSender;

use crate::article::Article;
use crate::error::FetchError;
use crate::source::Source;

/// Consecutive listing failures tolerated before a category is abandoned.
///
/// The scanner stops once the count *exceeds* this value, so an always-failing
/// category is fetched `MAX_CONSECUTIVE_FAILURES + 1` times.
pub const MAX_CONSECUTIVE_FAILURES: u32 = 100;

/// Why a scanner stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOutcome {
    /// The source's running total reached the target
    TargetMet,
    /// The adapter returned an empty page
    Exhausted,
    /// More than [`MAX_CONSECUTIVE_FAILURES`] listing errors in a row
    RetriesExhausted,
    /// Shutdown was requested
    Cancelled,
    /// No worker left to receive articles, or the scanner thread panicked
    Aborted,
}

impl std::fmt::Display for ScanOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::TargetMet => "target met",
            Self::Exhausted => "exhausted",
            Self::RetriesExhausted => "retries exhausted",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
        };
        f.write_str(s)
    }
}

/// What one scanner did before stopping
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub category: String,
    pub outcome: ScanOutcome,
    /// Listing requests issued, failed ones included
    pub fetches: usize,
    /// Listing requests that returned an error
    pub failures: usize,
    /// Article stubs pushed onto the channel
    pub queued: usize,
}

impl ScanReport {
    fn new(category: &str) -> Self {
        Self {
            category: category.to_string(),
            outcome: ScanOutcome::Exhausted,
            fetches: 0,
            failures: 0,
            queued: 0,
        }
    }

    /// Report for a scanner whose thread died before returning
    pub(crate) fn aborted(category: &str) -> Self {
        Self {
            outcome: ScanOutcome::Aborted,
            ..Self::new(category)
        }
    }
}

/// State shared by every scanner of one source run
pub struct ScanContext<'a> {
    pub source: &'a dyn Source,
    pub page_size: usize,
    pub target: usize,
    /// Running total of saved articles, incremented by workers
    pub total: &'a AtomicUsize,
    pub cancel: &'a AtomicBool,
}

/// Page through `category` until a stopping condition fires.
///
/// The running total is checked only before each listing request, so the
/// source may overshoot its target by whatever is already in flight. Failed
/// requests are retried at the same offset without delay. `tx` is dropped on
/// return; the channel closes once every scanner of the source has returned.
pub fn scan_category(ctx: &ScanContext<'_>, category: &str, tx: SyncSender<Article>) -> ScanReport {
    let mut report = ScanReport::new(category);
    let mut offset = 0usize;
    let mut consecutive_failures = 0u32;

    report.outcome = loop {
        if ctx.cancel.load(Ordering::Relaxed) {
            log::info!("{category}: shutdown requested, stopping at offset {offset}");
            break ScanOutcome::Cancelled;
        }
        if ctx.total.load(Ordering::Relaxed) >= ctx.target {
            log::info!("{category}: target of {} reached, finishing", ctx.target);
            break ScanOutcome::TargetMet;
        }

        report.fetches += 1;
        let articles = match ctx.source.list_category(category, offset) {
            Ok(articles) => articles,
            Err(e) => {
                consecutive_failures += 1;
                report.failures += 1;
                log::log!(
                    failure_level(&e, consecutive_failures),
                    "{category}: listing at offset {offset} failed \
                     ({consecutive_failures}/{MAX_CONSECUTIVE_FAILURES}): {e}"
                );
                if consecutive_failures > MAX_CONSECUTIVE_FAILURES {
                    log::warn!("{category}: retries exhausted, abandoning category");
                    break ScanOutcome::RetriesExhausted;
                }
                continue;
            }
        };
        consecutive_failures = 0;

        if articles.is_empty() {
            log::info!("{category}: got none at offset {offset}, finishing");
            break ScanOutcome::Exhausted;
        }

        log::debug!("{category}: {} articles at offset {offset}", articles.len());
        let mut disconnected = false;
        for article in articles {
            if tx.send(article).is_err() {
                disconnected = true;
                break;
            }
            report.queued += 1;
        }
        if disconnected {
            log::error!("{category}: no workers left, abandoning category");
            break ScanOutcome::Aborted;
        }

        offset += ctx.page_size;
    };

    report
}

/// Log level for a failed listing request.
///
/// Transient failures are always warnings. A permanent one (layout change,
/// missing page) is warned about once per streak; its repeats go to debug.
fn failure_level(error: &FetchError, streak: u32) -> log::Level {
    if streak <= 1 || error.is_retryable() {
        log::Level::Warn
    } else {
        log::Level::Debug
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::mpsc;

    /// Serves pre-recorded pages and records requested offsets
    struct Pages {
        categories: Vec<String>,
        pages: Vec<Result<usize, ()>>,
        calls: Mutex<Vec<usize>>,
    }

    impl Pages {
        fn new(pages: Vec<Result<usize, ()>>) -> Self {
            Self {
                categories: vec!["news".into()],
                pages,
                calls: Mutex::new(Vec::new()),
            }
        }

        fn offsets(&self) -> Vec<usize> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl Source for Pages {
        fn name(&self) -> &str {
            "pages"
        }

        fn categories(&self) -> &[String] {
            &self.categories
        }

        fn page_size(&self) -> usize {
            10
        }

        fn list_category(&self, category: &str, offset: usize) -> Result<Vec<Article>, FetchError> {
            let mut calls = self.calls.lock().unwrap();
            let call = calls.len();
            calls.push(offset);
            match self.pages.get(call).copied().unwrap_or(Ok(0)) {
                Ok(n) => Ok((0..n)
                    .map(|i| Article::new(category, format!("{call}-{i}"), "u"))
                    .collect()),
                Err(()) => Err(FetchError::Layout("scripted failure".into())),
            }
        }

        fn enrich(&self, _article: &mut Article) -> Result<(), FetchError> {
            Ok(())
        }
    }

    fn scan(source: &Pages, target: usize, total: usize) -> (ScanReport, Vec<Article>) {
        let total = AtomicUsize::new(total);
        let cancel = AtomicBool::new(false);
        let ctx = ScanContext {
            source,
            page_size: source.page_size(),
            target,
            total: &total,
            cancel: &cancel,
        };
        // Large enough that the scanner never blocks
        let (tx, rx) = mpsc::sync_channel(1024);
        let report = scan_category(&ctx, "news", tx);
        (report, rx.iter().collect())
    }

    #[test]
    fn stops_on_empty_page() {
        let source = Pages::new(vec![Ok(3), Ok(3), Ok(0)]);
        let (report, queued) = scan(&source, 1000, 0);

        assert_eq!(report.outcome, ScanOutcome::Exhausted);
        assert_eq!(report.fetches, 3);
        assert_eq!(report.queued, 6);
        assert_eq!(queued.len(), 6);
        assert_eq!(source.offsets(), vec![0, 10, 20]);
    }

    #[test]
    fn retries_same_offset() {
        let source = Pages::new(vec![Ok(2), Err(()), Err(()), Ok(2), Ok(0)]);
        let (report, _) = scan(&source, 1000, 0);

        assert_eq!(report.outcome, ScanOutcome::Exhausted);
        assert_eq!(report.failures, 2);
        assert_eq!(source.offsets(), vec![0, 10, 10, 10, 20]);
    }

    #[test]
    fn gives_up_after_threshold() {
        let source = Pages::new(vec![Err(()); 200]);
        let (report, queued) = scan(&source, 1000, 0);

        assert_eq!(report.outcome, ScanOutcome::RetriesExhausted);
        assert_eq!(report.fetches, MAX_CONSECUTIVE_FAILURES as usize + 1);
        assert!(queued.is_empty());
        assert!(source.offsets().iter().all(|&o| o == 0));
    }

    #[test]
    fn success_resets_failure_streak() {
        // 100 failures, one success, 100 failures, then the end of the category
        let mut pages = vec![Err(()); 100];
        pages.push(Ok(1));
        pages.extend(vec![Err(()); 100]);
        pages.push(Ok(0));
        let source = Pages::new(pages);
        let (report, _) = scan(&source, 1000, 0);

        assert_eq!(report.outcome, ScanOutcome::Exhausted);
        assert_eq!(report.failures, 200);
    }

    #[test]
    fn target_already_met_fetches_nothing() {
        let source = Pages::new(vec![Ok(5)]);
        let (report, _) = scan(&source, 4, 4);

        assert_eq!(report.outcome, ScanOutcome::TargetMet);
        assert_eq!(report.fetches, 0);
        assert!(source.offsets().is_empty());
    }

    #[test]
    fn zero_target_disables_category() {
        let source = Pages::new(vec![Ok(5)]);
        let (report, _) = scan(&source, 0, 0);
        assert_eq!(report.outcome, ScanOutcome::TargetMet);
        assert_eq!(report.fetches, 0);
    }

    #[test]
    fn cancelled_before_first_page() {
        let source = Pages::new(vec![Ok(5)]);
        let total = AtomicUsize::new(0);
        let cancel = AtomicBool::new(true);
        let ctx = ScanContext {
            source: &source,
            page_size: 10,
            target: 100,
            total: &total,
            cancel: &cancel,
        };
        let (tx, _rx) = mpsc::sync_channel(16);

        let report = scan_category(&ctx, "news", tx);
        assert_eq!(report.outcome, ScanOutcome::Cancelled);
        assert!(source.offsets().is_empty());
    }

    #[test]
    fn dropped_receiver_aborts() {
        let source = Pages::new(vec![Ok(3), Ok(3)]);
        let total = AtomicUsize::new(0);
        let cancel = AtomicBool::new(false);
        let ctx = ScanContext {
            source: &source,
            page_size: 10,
            target: 100,
            total: &total,
            cancel: &cancel,
        };
        let (tx, rx) = mpsc::sync_channel(16);
        drop(rx);

        let report = scan_category(&ctx, "news", tx);
        assert_eq!(report.outcome, ScanOutcome::Aborted);
        assert_eq!(report.queued, 0);
        assert_eq!(report.fetches, 1);
    }

    #[test]
    fn permanent_failures_log_quietly_after_the_first() {
        let layout = FetchError::Layout("no listing block".into());
        let timeout = FetchError::Http {
            status: None,
            message: "timed out".into(),
        };
        assert_eq!(failure_level(&layout, 1), log::Level::Warn);
        assert_eq!(failure_level(&layout, 2), log::Level::Debug);
        assert_eq!(failure_level(&timeout, 50), log::Level::Warn);
    }

    #[test]
    fn outcome_display() {
        assert_eq!(ScanOutcome::RetriesExhausted.to_string(), "retries exhausted");
        assert_eq!(ScanOutcome::TargetMet.to_string(), "target met");
    }
}
