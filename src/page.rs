//! Page - the queryable DOM snapshot a detection pass runs against
//!
//! A `Page` is parsed once per pass and only ever read. Matchers never touch
//! ambient state; everything they know about the page comes through here.

use once_cell::sync::Lazy;
use regex::Regex;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::{JobScoutError, Result};

static WHITESPACE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\s+").expect("Invalid whitespace regex pattern")
});

static SECTION_HEADING: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("h1, h2, h3, h4, h5, h6, strong, b").expect("Invalid heading selector")
});

static LIST_ITEM: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("li").expect("Invalid list item selector")
});

static EMPHASIS: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("strong, b").expect("Invalid emphasis selector")
});

static BODY: Lazy<Selector> = Lazy::new(|| {
    Selector::parse("body").expect("Invalid body selector")
});

/// Elements whose text never reaches the reader
const HIDDEN_TAGS: &[&str] = &["script", "style", "noscript", "template"];

const HEADING_TAGS: &[&str] = &["h1", "h2", "h3", "h4", "h5", "h6"];

/// Parsed HTML document
pub struct Page {
    document: Html,
}

impl Page {
    /// Parse a full HTML document
    pub fn parse(html: &str) -> Self {
        Self {
            document: Html::parse_document(html),
        }
    }

    /// All elements matching a CSS selector, in document order
    pub fn select<'a>(&'a self, css: &str) -> Result<Vec<ElementRef<'a>>> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).collect())
    }

    /// Whether any element matches the selector
    pub fn exists(&self, css: &str) -> Result<bool> {
        let selector = parse_selector(css)?;
        Ok(self.document.select(&selector).next().is_some())
    }

    /// Visible text of every matching element (whitespace collapsed, trimmed)
    pub fn texts(&self, css: &str) -> Result<Vec<String>> {
        Ok(self.select(css)?.into_iter().map(element_text).collect())
    }

    /// Attribute values of every matching element that carries the attribute
    pub fn attrs(&self, css: &str, attr: &str) -> Result<Vec<String>> {
        Ok(self
            .select(css)?
            .into_iter()
            .filter_map(|el| el.value().attr(attr))
            .map(normalize_whitespace)
            .collect())
    }

    /// All human-visible text in the document body, whitespace collapsed
    pub fn visible_text(&self) -> String {
        let root = self
            .document
            .select(&BODY)
            .next()
            .unwrap_or_else(|| self.document.root_element());
        element_text(root)
    }

    /// List items that follow the first heading mentioning any of `keywords`.
    ///
    /// Headings are `h1`-`h6` or a bold lead-in (`<p><strong>Benefits</strong></p>`).
    /// The scan stops at the next heading, including a container that opens
    /// with one.
    pub fn section_items(&self, keywords: &[&str]) -> Vec<String> {
        for heading in self.document.select(&SECTION_HEADING) {
            let label = element_text(heading).to_lowercase().replace('\u{2019}', "'");
            if label.is_empty() || label.len() > 80 {
                continue;
            }
            if !keywords.iter().any(|k| label.contains(k)) {
                continue;
            }

            let mut items = items_after(heading);
            // Bold lead-ins sit inside their paragraph; the list follows the paragraph
            if items.is_empty() && is_emphasis(heading) {
                if let Some(parent) = heading.parent().and_then(ElementRef::wrap) {
                    if matches!(parent.value().name(), "p" | "div" | "span") {
                        items = items_after(parent);
                    }
                }
            }
            if !items.is_empty() {
                return items;
            }
        }
        Vec::new()
    }
}

fn parse_selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| JobScoutError::SelectorError(format!("'{}': {:?}", css, e)))
}

/// Collect `li` text from the siblings after `anchor`, up to the next heading
fn items_after(anchor: ElementRef<'_>) -> Vec<String> {
    for sibling in anchor.next_siblings().filter_map(ElementRef::wrap) {
        if is_section_break(sibling) {
            break;
        }

        let items: Vec<String> = if matches!(sibling.value().name(), "li") {
            vec![element_text(sibling)]
        } else {
            sibling.select(&LIST_ITEM).map(element_text).collect()
        };
        let items: Vec<String> = items.into_iter().filter(|s| !s.is_empty()).collect();

        if !items.is_empty() {
            return items;
        }
    }
    Vec::new()
}

fn is_emphasis(el: ElementRef<'_>) -> bool {
    matches!(el.value().name(), "strong" | "b")
}

fn is_section_break(el: ElementRef<'_>) -> bool {
    let name = el.value().name();
    if HEADING_TAGS.contains(&name) {
        return true;
    }
    let opens_with_heading = el
        .children()
        .filter_map(ElementRef::wrap)
        .next()
        .map(|first| HEADING_TAGS.contains(&first.value().name()))
        .unwrap_or(false);
    if opens_with_heading {
        return true;
    }
    // A paragraph that opens with bold text is the next lead-in heading
    name == "p" && el.select(&EMPHASIS).next().is_some() && el.select(&LIST_ITEM).next().is_none()
}

/// Text content of an element, skipping script/style bodies
pub(crate) fn element_text(el: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in el.descendants() {
        if let Node::Text(text) = node.value() {
            let hidden = node.ancestors().any(|a| match a.value() {
                Node::Element(e) => HIDDEN_TAGS.contains(&e.name()),
                _ => false,
            });
            if !hidden {
                parts.push(&**text);
            }
        }
    }
    normalize_whitespace(&parts.join(" "))
}

/// Collapse runs of whitespace into single spaces and trim
pub(crate) fn normalize_whitespace(content: &str) -> String {
    WHITESPACE_RE.replace_all(content, " ").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_texts_collapse_whitespace() {
        let page = Page::parse("<html><body><h1>  Backend\n   <b>Engineer</b> </h1></body></html>");
        assert_eq!(page.texts("h1").unwrap(), vec!["Backend Engineer".to_string()]);
    }

    #[test]
    fn test_invalid_selector_is_an_error() {
        let page = Page::parse("<html><body></body></html>");
        assert!(matches!(page.exists("div[["), Err(JobScoutError::SelectorError(_))));
    }

    #[test]
    fn test_visible_text_skips_scripts() {
        let page = Page::parse(
            "<html><head><script>var apply = 'now';</script></head><body><p>Hello</p></body></html>",
        );
        assert_eq!(page.visible_text(), "Hello");
    }

    #[test]
    fn test_attrs() {
        let page = Page::parse(
            r#"<html><head><meta property="og:site_name" content="Acme"></head><body></body></html>"#,
        );
        assert_eq!(page.attrs("meta[property='og:site_name']", "content").unwrap(), vec!["Acme"]);
    }

    #[test]
    fn test_section_items_after_heading() {
        let page = Page::parse(
            r#"<html><body>
                <h3>Responsibilities</h3>
                <ul><li>Build APIs</li><li>Review code</li></ul>
                <h3>Requirements</h3>
                <ul><li>5 years of Rust</li></ul>
            </body></html>"#,
        );
        assert_eq!(page.section_items(&["requirement"]), vec!["5 years of Rust"]);
        assert_eq!(page.section_items(&["responsibilit"]), vec!["Build APIs", "Review code"]);
        assert!(page.section_items(&["benefit"]).is_empty());
    }

    #[test]
    fn test_section_items_stop_at_next_section_container() {
        let page = Page::parse(
            r#"<html><body>
                <div><h3>Benefits</h3><p>Ask us during the interview.</p></div>
                <div><h3>Requirements</h3><ul><li>5 years of Rust</li></ul></div>
            </body></html>"#,
        );
        assert!(page.section_items(&["benefit"]).is_empty());
        assert_eq!(page.section_items(&["requirement"]), vec!["5 years of Rust"]);
    }

    #[test]
    fn test_section_heading_with_typographic_apostrophe() {
        let page = Page::parse(
            "<html><body><h2>What you\u{2019}ll do</h2><ul><li>Ship features</li></ul></body></html>",
        );
        assert_eq!(page.section_items(&["what you'll do"]), vec!["Ship features"]);
    }

    #[test]
    fn test_visible_text_ignores_head() {
        let page = Page::parse(
            "<html><head><title>Responsibilities and qualifications</title></head><body><p>Hello</p></body></html>",
        );
        assert_eq!(page.visible_text(), "Hello");
    }

    #[test]
    fn test_section_items_after_bold_lead_in() {
        let page = Page::parse(
            r#"<html><body>
                <p><strong>What we offer</strong></p>
                <ul><li>Health insurance</li></ul>
            </body></html>"#,
        );
        assert_eq!(page.section_items(&["what we offer"]), vec!["Health insurance"]);
    }
}
