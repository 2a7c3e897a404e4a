//! Shared HTML text extraction

use scraper::{ElementRef, Node};

/// Which elements of an article body contribute text
pub(crate) struct TextRules {
    /// Site name for log lines
    pub site: &'static str,
    /// Elements whose children are walked
    pub descend: &'static [&'static str],
    /// Elements dropped with everything inside (inline markup, embeds, media)
    pub skip: &'static [&'static str],
    /// Elements dropped by class prefix (ads, related links)
    pub skip_classes: &'static [ClassRule],
}

/// Drops an element whose class starts with `prefix`
pub(crate) struct ClassRule {
    /// Only elements with this tag; `None` matches any tag
    pub tag: Option<&'static str>,
    pub prefix: &'static str,
}

impl ClassRule {
    pub const fn any(prefix: &'static str) -> Self {
        Self { tag: None, prefix }
    }

    pub const fn on(tag: &'static str, prefix: &'static str) -> Self {
        Self {
            tag: Some(tag),
            prefix,
        }
    }

    fn matches(&self, tag: &str, class: &str) -> bool {
        self.tag.is_none_or(|t| t == tag) && class.starts_with(self.prefix)
    }
}

/// Concatenate the text under `element` according to `rules`.
///
/// Unknown elements are dropped and logged at debug level so layout changes
/// show up without failing the article.
pub(crate) fn collect_text(element: ElementRef<'_>, rules: &TextRules) -> String {
    let mut out = String::new();
    walk(element, rules, &mut out);
    out
}

fn walk(element: ElementRef<'_>, rules: &TextRules, out: &mut String) {
    let value = element.value();
    let tag = value.name();
    if let Some(class) = value.attr("class") {
        if rules.skip_classes.iter().any(|rule| rule.matches(tag, class)) {
            return;
        }
    }

    if rules.skip.iter().any(|t| *t == tag) {
        return;
    }
    if !rules.descend.iter().any(|t| *t == tag) {
        log::debug!("{}: unknown element <{tag}>", rules.site);
        return;
    }

    for child in element.children() {
        match child.value() {
            Node::Text(text) => out.push_str(text),
            Node::Element(_) => {
                if let Some(child) = ElementRef::wrap(child) {
                    walk(child, rules, out);
                }
            }
            _ => {}
        }
    }
}
