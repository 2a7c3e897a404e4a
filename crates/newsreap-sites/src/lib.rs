//! Newsreap Sites - site adapters for the harvesting pipeline
//!
//! Each module implements [`newsreap_core::Source`] for one news site. Parsing
//! is kept in plain functions over response bodies so it can be tested without
//! network access; the `Source` impls only add the HTTP calls.

mod html;
pub mod meduza;
pub mod rt;
pub mod tass;

use newsreap_core::Source;

pub use meduza::Meduza;
pub use rt::Rt;
pub use tass::Tass;

/// Built-in defaults for one supported site
#[derive(Debug, Clone, Copy)]
pub struct SiteInfo {
    pub name: &'static str,
    pub categories: &'static [&'static str],
    pub page_size: usize,
}

/// Every site this crate can build an adapter for
pub const KNOWN_SITES: &[SiteInfo] = &[
    SiteInfo {
        name: tass::NAME,
        categories: &["obschestvo", "sport", "kultura", "politika", "ekonomika"],
        page_size: 200,
    },
    SiteInfo {
        name: meduza::NAME,
        categories: &["news"],
        page_size: 100,
    },
    SiteInfo {
        name: rt::NAME,
        categories: &["all-news"],
        page_size: 100,
    },
];

/// Defaults for a site by name
pub fn site_info(name: &str) -> Option<&'static SiteInfo> {
    KNOWN_SITES.iter().find(|site| site.name == name)
}

/// Build the adapter for `name`, or `None` for an unknown site
pub fn build(name: &str, categories: Vec<String>, page_size: usize) -> Option<Box<dyn Source>> {
    let source: Box<dyn Source> = match name {
        tass::NAME => Box::new(Tass::new(categories, page_size)),
        meduza::NAME => Box::new(Meduza::new(categories, page_size)),
        rt::NAME => Box::new(Rt::new(categories, page_size)),
        _ => return None,
    };
    Some(source)
}
