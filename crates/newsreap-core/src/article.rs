//! Article: the unit of work flowing through the pipeline

/// A news article discovered by a [`Source`](crate::Source) listing.
///
/// `category`, `id` and `url` are fixed when the adapter builds the stub.
/// `text` starts empty and is filled by [`Source::enrich`](crate::Source::enrich).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    category: String,
    id: String,
    url: String,
    text: String,
}

impl Article {
    /// Build an article stub with empty text.
    pub fn new(category: impl Into<String>, id: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            id: id.into(),
            url: url.into(),
            text: String::new(),
        }
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    /// Key of the persisted record, unique within (source, category).
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Whether enrichment produced any persistable content
    pub fn has_text(&self) -> bool {
        !self.text.is_empty()
    }
}
