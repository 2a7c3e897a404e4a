//! russian.rt.com: HTML listing pages and HTML articles

use std::sync::LazyLock;

use newsreap_core::{Article, FetchError, Source, get_text};
use scraper::{ElementRef, Html, Selector};

use crate::html::{TextRules, collect_text};

pub const NAME: &str = "rt";

const BASE: &str = "https://russian.rt.com";

static LISTING_ROWS: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="listing__rows"]"#).expect("invalid built-in selector")
});

static CARD_HEADING: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="card__heading"]"#).expect("invalid built-in selector")
});

static ARTICLE_TEXT: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"[class*="article__text"]"#).expect("invalid built-in selector")
});

const RULES: TextRules = TextRules {
    site: NAME,
    descend: &[
        "div", "p", "a", "span", "u", "ul", "li", "sup", "quote", "blockquote",
    ],
    skip: &[
        "img", "em", "br", "hr", "h1", "h2", "h3", "h4", "strong", "figure", "script", "iframe",
    ],
    skip_classes: &[],
};

/// Adapter for russian.rt.com
#[derive(Debug, Clone)]
pub struct Rt {
    categories: Vec<String>,
    page_size: usize,
}

impl Rt {
    pub fn new(categories: Vec<String>, page_size: usize) -> Self {
        Self {
            categories,
            page_size: page_size.max(1),
        }
    }

    fn listing_url(&self, category: &str, offset: usize) -> String {
        format!(
            "{BASE}/listing/type.News.tag.novosty-glavnoe/prepare/{category}/{}/{}",
            self.page_size,
            offset / self.page_size
        )
    }
}

impl Source for Rt {
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
        let url = self.listing_url(category, offset);
        let body = get_text(&url)?;
        parse_listing(category, &body).map_err(|e| match e {
            FetchError::Layout(msg) => FetchError::Layout(format!("{msg}: {url}")),
            other => other,
        })
    }

    fn enrich(&self, article: &mut Article) -> Result<(), FetchError> {
        let body = get_text(article.url())?;
        article.set_text(parse_article(&body));
        Ok(())
    }
}

/// Parse a listing page into article stubs.
///
/// A page without the rows block means the layout changed (or the category
/// does not exist) and is reported as [`FetchError::Layout`].
pub(crate) fn parse_listing(category: &str, body: &str) -> Result<Vec<Article>, FetchError> {
    let document = Html::parse_document(body);
    let rows = document
        .select(&LISTING_ROWS)
        .next()
        .ok_or_else(|| FetchError::Layout("no listing rows".into()))?;

    let articles = rows
        .select(&CARD_HEADING)
        .filter_map(card_link)
        .filter_map(|href| {
            let Some(id) = article_id(href) else {
                log::debug!("{NAME}: unexpected link {href}");
                return None;
            };
            Some(Article::new(category, id, format!("{BASE}{href}")))
        })
        .collect();
    Ok(articles)
}

/// `href` of the first element inside a card heading
fn card_link(card: ElementRef<'_>) -> Option<&str> {
    card.children()
        .find_map(ElementRef::wrap)
        .and_then(|link| link.value().attr("href"))
}

/// `/world/news/838374-franciya-koronavirus` becomes `world-838374`.
fn article_id(href: &str) -> Option<String> {
    let mut parts = href.split('/').skip(1);
    let section = parts.next().filter(|s| !s.is_empty())?;
    let slug = parts.nth(1)?;
    let number = slug.split('-').next().filter(|n| !n.is_empty())?;
    Some(format!("{section}-{number}"))
}

/// Text of the article body, empty when the page has none.
pub fn parse_article(body: &str) -> String {
    let document = Html::parse_document(body);
    let Some(block) = document.select(&ARTICLE_TEXT).next() else {
        return String::new();
    };
    collect_text(block, &RULES).replace('.', ". ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = r#"<html><body>
        <div class="listing__rows listing__rows_all-news">
            <div class="card card_all-news">
                <div class="card__heading card__heading_all-news"><a class="link" href="/world/news/838374-franciya-koronavirus">Франция</a></div>
            </div>
            <div class="card card_all-news">
                <div class="card__heading card__heading_all-news"><a class="link" href="/russia/news/838375-moskva">Москва</a></div>
            </div>
            <div class="card card_all-news">
                <div class="card__heading card__heading_all-news"><span>no link</span></div>
            </div>
        </div>
    </body></html>"#;

    #[test]
    fn listing_extracts_cards() {
        let articles = parse_listing("all-news", LISTING).unwrap();
        let ids: Vec<_> = articles.iter().map(|a| a.id()).collect();
        assert_eq!(ids, ["world-838374", "russia-838375"]);
        assert_eq!(
            articles[0].url(),
            "https://russian.rt.com/world/news/838374-franciya-koronavirus"
        );
        assert_eq!(articles[1].category(), "all-news");
    }

    #[test]
    fn listing_without_rows_is_layout_error() {
        let err = parse_listing("all-news", "<html><body><p>404</p></body></html>").unwrap_err();
        assert!(matches!(err, FetchError::Layout(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn empty_rows_is_empty_page() {
        let body = r#"<div class="listing__rows"></div>"#;
        assert!(parse_listing("all-news", body).unwrap().is_empty());
    }

    #[test]
    fn id_from_href() {
        assert_eq!(
            article_id("/world/news/838374-franciya").as_deref(),
            Some("world-838374")
        );
        assert_eq!(article_id("/sport/news/1234567-x").as_deref(), Some("sport-1234567"));
        assert_eq!(article_id("/world").as_deref(), None);
        assert_eq!(article_id("").as_deref(), None);
    }

    #[test]
    fn listing_url_uses_page_number() {
        let rt = Rt::new(vec!["all-news".into()], 100);
        assert_eq!(
            rt.listing_url("all-news", 200),
            "https://russian.rt.com/listing/type.News.tag.novosty-glavnoe/prepare/all-news/100/2"
        );
    }

    #[test]
    fn article_text_spaces_sentences() {
        let body = r#"<html><body><h1>Title</h1>
            <div class="article__text article__text_article-page"><p>Первое.Второе<strong>!</strong></p><figure>x</figure><p><a href="/a">Ссылка</a>.</p></div>
        </body></html>"#;
        assert_eq!(parse_article(body), "Первое. ВтороеСсылка. ");
    }

    #[test]
    fn article_without_text_block() {
        assert_eq!(parse_article("<html><body><p>x</p></body></html>"), "");
    }
}
