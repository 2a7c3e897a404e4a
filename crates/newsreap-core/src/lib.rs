//! Newsreap Core - concurrent harvesting pipeline for news sites
//!
//! This crate provides the pipeline that drives site adapters
//! ([`Source`]) through a bounded fetch → enrich → persist flow, plus the
//! shared infrastructure the adapters and the CLI build on: HTTP access,
//! the text file sink, logging and progress display.

pub mod article;
pub mod coordinator;
pub mod error;
pub mod http;
pub mod logging;
pub mod progress;
pub mod scanner;
pub mod shutdown;
pub mod sink;
pub mod source;
pub mod worker;

// Re-exports for convenience
pub use article::Article;
pub use coordinator::{Harvest, SourceJob, SourceSummary};
pub use error::FetchError;
pub use http::{HttpConfig, get_json, get_text, set_http_config};
pub use logging::{IndicatifLogger, init_logging};
pub use progress::{ProgressContext, SharedProgress, fmt_num, saved_message};
pub use scanner::{MAX_CONSECUTIVE_FAILURES, ScanOutcome, ScanReport};
pub use shutdown::{
    INTERRUPTED_EXIT_CODE, install_signal_handlers, is_shutdown_requested, request_shutdown,
    shutdown_flag,
};
pub use sink::{CategoryCount, Sink, TextFileSink, cleanup_tmp_files, count_saved};
pub use source::Source;
pub use worker::{DiscardCounts, WorkerStats};
