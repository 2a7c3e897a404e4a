//! Site adapter contract

use crate::article::Article;
use crate::error::FetchError;

/// A news site the pipeline can harvest.
///
/// One implementation per site. The coordinator drives every source through
/// this trait only and calls it concurrently from scanner and worker threads.
pub trait Source: Send + Sync {
    /// Short name, used as the top-level storage key and in logs
    fn name(&self) -> &str;

    /// Categories to scan; one scanner thread runs per entry
    fn categories(&self) -> &[String];

    /// Listing page size; the scanner advances the offset by this much
    fn page_size(&self) -> usize;

    /// List the page of `category` starting at `offset`.
    ///
    /// An empty page marks the end of the category. Errors are treated as
    /// transient and the same offset is requested again.
    fn list_category(&self, category: &str, offset: usize) -> Result<Vec<Article>, FetchError>;

    /// Fetch the article page and fill in its text.
    ///
    /// Leaving the text empty means the page had no extractable body; that is
    /// not an error.
    fn enrich(&self, article: &mut Article) -> Result<(), FetchError>;
}
