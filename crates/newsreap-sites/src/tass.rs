//! tass.ru: JSON rubric API for listings, HTML articles

use std::sync::LazyLock;

use newsreap_core::{Article, FetchError, Source, get_json, get_text};
use regex::Regex;
use scraper::{Html, Node, Selector};
use serde::Deserialize;

use crate::html::{ClassRule, TextRules, collect_text};

pub const NAME: &str = "tass";

static TITLE_WRAP: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class="article__title-wrap"]"#).expect("invalid built-in selector")
});

static HEADER_TITLE: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class="news-header__title"]"#).expect("invalid built-in selector")
});

/// Body containers in order of preference, matched on the exact class value
static TEXT_BLOCKS: LazyLock<[Selector; 3]> = LazyLock::new(|| {
    [
        r#"[class="text-content"]"#,
        r#"[class="text-content text-content_article"]"#,
        r#"[class="text-block"]"#,
    ]
    .map(|s| Selector::parse(s).expect("invalid built-in selector"))
});

/// Dateline such as `МОСКВА, 1 мая. /ТАСС/. `
static DATELINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r".*/ТАСС/\. ").expect("invalid built-in regex"));

const RULES: TextRules = TextRules {
    site: NAME,
    descend: &["div", "p", "a", "span", "u", "ul", "ol", "li", "sup", "h1"],
    skip: &["em", "br", "hr", "h2", "strong"],
    skip_classes: &[ClassRule::on("div", "text-include")],
};

#[derive(Debug, Deserialize)]
struct RubricResponse {
    #[serde(default)]
    data: Option<RubricData>,
}

#[derive(Debug, Deserialize)]
struct RubricData {
    #[serde(default)]
    slug: String,
    #[serde(default)]
    news: Vec<Vec<RubricItem>>,
}

#[derive(Debug, Deserialize)]
struct RubricItem {
    id: i64,
    #[serde(default)]
    slug: String,
    #[serde(default)]
    theme: Option<String>,
}

/// Adapter for tass.ru
#[derive(Debug, Clone)]
pub struct Tass {
    categories: Vec<String>,
    page_size: usize,
}

impl Tass {
    pub fn new(categories: Vec<String>, page_size: usize) -> Self {
        Self {
            categories,
            page_size: page_size.max(1),
        }
    }

    fn listing_url(&self, category: &str, offset: usize) -> String {
        format!(
            "https://tass.ru/rubric/api/v1/rubric-articles?type=all&slug={category}&tuplesLimit={}&newsOffset={offset}",
            self.page_size
        )
    }
}

impl Source for Tass {
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
        let response: RubricResponse = get_json(&self.listing_url(category, offset))?;
        articles_from_rubric(category, response)
    }

    fn enrich(&self, article: &mut Article) -> Result<(), FetchError> {
        let body = get_text(article.url())?;
        let text = parse_article(&body)?;
        article.set_text(text);
        Ok(())
    }
}

/// Parse a rubric API response body into article stubs.
pub(crate) fn parse_listing(category: &str, body: &str) -> Result<Vec<Article>, FetchError> {
    let response: RubricResponse = serde_json::from_str(body)?;
    articles_from_rubric(category, response)
}

/// The API returns news in tuples; only the lead item of each is used. Maps
/// (themes mentioning "карто") and items from other rubrics are dropped.
fn articles_from_rubric(
    category: &str,
    response: RubricResponse,
) -> Result<Vec<Article>, FetchError> {
    let data = response
        .data
        .ok_or_else(|| FetchError::Layout(format!("no data for rubric {category}")))?;
    let rubric = if data.slug.is_empty() {
        category
    } else {
        data.slug.as_str()
    };

    let articles = data
        .news
        .iter()
        .filter_map(|tuple| tuple.first())
        .filter(|item| {
            !item
                .theme
                .as_deref()
                .is_some_and(|theme| theme.contains("карто"))
        })
        .filter(|item| item.slug == rubric)
        .map(|item| {
            Article::new(
                category,
                item.id.to_string(),
                format!("https://tass.ru/{}/{}/", item.slug, item.id),
            )
        })
        .collect();
    Ok(articles)
}

/// Parse an article page into `header\n\nbody` with the dateline removed.
///
/// A page with no recognisable body yields empty text; a page whose header
/// or body is blank is a [`FetchError::Layout`].
pub fn parse_article(body: &str) -> Result<String, FetchError> {
    let document = Html::parse_document(body);

    let header = extract_header(&document);
    if header.is_empty() {
        return Err(FetchError::Layout("no header".into()));
    }

    let Some(block) = TEXT_BLOCKS
        .iter()
        .find_map(|selector| document.select(selector).next())
    else {
        return Ok(String::new());
    };

    let text = collect_text(block, &RULES);
    if text.trim_matches('\n').is_empty() {
        return Err(FetchError::Layout("no text".into()));
    }

    let text = format!("{header}\n\n{text}");
    Ok(DATELINE.replace_all(&text, "").into_owned())
}

fn extract_header(document: &Html) -> String {
    if let Some(wrap) = document.select(&TITLE_WRAP).next() {
        let text = collect_text(wrap, &RULES);
        if !text.is_empty() {
            return text;
        }
    }

    document
        .select(&HEADER_TITLE)
        .next()
        .and_then(|h1| h1.first_child())
        .and_then(|child| match child.value() {
            Node::Text(text) => Some(String::from(&**text)),
            _ => None,
        })
        .unwrap_or_default()
}
