//! meduza.io: JSON search API for listings, JSON article API with an HTML body

use std::collections::BTreeMap;
use std::sync::LazyLock;

use newsreap_core::{Article, FetchError, Source, get_json};
use regex::Regex;
use scraper::{Html, Selector};
use serde::Deserialize;

use crate::html::{ClassRule, TextRules, collect_text};

pub const NAME: &str = "meduza";

const API_BASE: &str = "https://meduza.io/api/v3";

static BODY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[class="Body"]"#).expect("invalid built-in selector"));

static SPACES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" {2,}").expect("invalid built-in regex"));

const RULES: TextRules = TextRules {
    site: NAME,
    descend: &[
        "div", "p", "a", "span", "u", "ul", "li", "sup", "quote", "blockquote",
    ],
    skip: &[
        "em", "br", "hr", "h2", "h3", "h4", "strong", "figure", "script", "button", "style",
        "embed",
    ],
    skip_classes: &[ClassRule::any("Related"), ClassRule::any("Embed")],
};

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    documents: Option<BTreeMap<String, SearchDocument>>,
}

#[derive(Debug, Deserialize)]
struct SearchDocument {
    #[serde(default)]
    published_at: i64,
    #[serde(default)]
    url: String,
}

#[derive(Debug, Deserialize)]
struct ArticleResponse {
    root: Option<ArticleRoot>,
}

#[derive(Debug, Deserialize)]
struct ArticleRoot {
    content: Option<ArticleContent>,
    #[serde(default)]
    title: String,
}

#[derive(Debug, Deserialize)]
struct ArticleContent {
    #[serde(default)]
    body: String,
}

/// Adapter for meduza.io
#[derive(Debug, Clone)]
pub struct Meduza {
    categories: Vec<String>,
    page_size: usize,
}

impl Meduza {
    pub fn new(categories: Vec<String>, page_size: usize) -> Self {
        Self {
            categories,
            page_size: page_size.max(1),
        }
    }

    fn listing_url(&self, category: &str, offset: usize) -> String {
        format!(
            "{API_BASE}/search?chrono={category}&page={}&per_page={}&locale=ru",
            offset / self.page_size,
            self.page_size
        )
    }
}

impl Source for Meduza {
    fn name(&self) -> &str {
        NAME
    }

    fn categories(&self) -> &[String] {
        &self.categories
    }

    fn page_size(&self) -> usize {
        self.page_size
    }

    fn list_category(&self, category: &str, offset: usize) -> Result<Vec<Article>, FetchError> {
        let response: SearchResponse = get_json(&self.listing_url(category, offset))?;
        Ok(articles_from_search(category, response))
    }

    fn enrich(&self, article: &mut Article) -> Result<(), FetchError> {
        let response: ArticleResponse = get_json(article.url())?;
        let text = text_from_article(response)?;
        article.set_text(text);
        Ok(())
    }
}

/// Parse a search API response body into article stubs.
pub(crate) fn parse_listing(category: &str, body: &str) -> Result<Vec<Article>, FetchError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(articles_from_search(category, response))
}

/// Documents outside the category (cards, podcasts, other rubrics) are dropped.
fn articles_from_search(category: &str, response: SearchResponse) -> Vec<Article> {
    response
        .documents
        .unwrap_or_default()
        .into_values()
        .filter(|doc| doc.url.starts_with(category))
        .map(|doc| {
            Article::new(
                category,
                format!("{category}-@-{}", doc.published_at),
                format!("{API_BASE}/{}", doc.url),
            )
        })
        .collect()
}

/// Parse an article API response body into the article text (may be empty).
pub fn parse_article(body: &str) -> Result<String, FetchError> {
    let response: ArticleResponse = serde_json::from_str(body)?;
    text_from_article(response)
}

fn text_from_article(response: ArticleResponse) -> Result<String, FetchError> {
    let root = response
        .root
        .ok_or_else(|| FetchError::Layout("no root document".into()))?;
    let content = root
        .content
        .ok_or_else(|| FetchError::Layout("no content".into()))?;
    Ok(extract_text(&root.title, &content.body))
}

/// Title line followed by the text of the `Body` block; empty without one.
fn extract_text(title: &str, body_html: &str) -> String {
    let fragment = Html::parse_fragment(body_html);
    let Some(block) = fragment.select(&BODY).next() else {
        return String::new();
    };

    let mut text = format!("{title}\n");
    text.push_str(&collect_text(block, &RULES));
    SPACES
        .replace_all(text.trim_matches('\n'), "")
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEARCH: &str = r#"{
        "documents": {
            "news/2024/05/01/one": {
                "published_at": 1714550400,
                "title": "One",
                "url": "news/2024/05/01/one"
            },
            "feature/2024/05/01/two": {
                "published_at": 1714550500,
                "title": "Two",
                "url": "feature/2024/05/01/two"
            },
            "news/2024/05/01/three": {
                "published_at": 1714550600,
                "title": "Three",
                "url": "news/2024/05/01/three"
            }
        }
    }"#;

    #[test]
    fn listing_keeps_only_category() {
        let articles = parse_listing("news", SEARCH).unwrap();
        assert_eq!(articles.len(), 2);

        let one = articles
            .iter()
            .find(|a| a.id() == "news-@-1714550400")
            .unwrap();
        assert_eq!(one.category(), "news");
        assert_eq!(one.url(), "https://meduza.io/api/v3/news/2024/05/01/one");
        assert!(!one.has_text());
    }

    #[test]
    fn listing_without_documents_is_empty_page() {
        assert!(parse_listing("news", "{}").unwrap().is_empty());
        assert!(parse_listing("news", r#"{"documents": {}}"#).unwrap().is_empty());
    }

    #[test]
    fn listing_garbage_is_decode_error() {
        let err = parse_listing("news", "<html>").unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)));
    }

    #[test]
    fn listing_url_uses_page_number() {
        let meduza = Meduza::new(vec!["news".into()], 100);
        assert_eq!(
            meduza.listing_url("news", 300),
            "https://meduza.io/api/v3/search?chrono=news&page=3&per_page=100&locale=ru"
        );
    }

    #[test]
    fn article_text_has_title_and_body() {
        let body = r#"{
            "root": {
                "title": "Заголовок",
                "content": {
                    "body": "<div class=\"Body\"><p>Первый  абзац.</p><div class=\"RelatedRich\"><p>Читайте также</p></div><p>Второй <strong>важный</strong> абзац.</p><figure>img</figure></div>"
                }
            }
        }"#;
        let text = parse_article(body).unwrap();
        // runs of spaces left by dropped markup are squeezed out entirely
        assert_eq!(text, "Заголовок\nПервыйабзац.Второйабзац.");
    }

    #[test]
    fn article_without_body_block_is_empty() {
        let body = r#"{"root": {"title": "T", "content": {"body": "<div class=\"Other\"><p>x</p></div>"}}}"#;
        assert_eq!(parse_article(body).unwrap(), "");
    }

    #[test]
    fn article_without_root_is_layout_error() {
        let err = parse_article(r#"{"root": null}"#).unwrap_err();
        assert!(matches!(err, FetchError::Layout(_)));
    }
}
