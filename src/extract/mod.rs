// src/extract/mod.rs

//! Multi-strategy field extraction.
//!
//! A field is located by an ordered chain of [`Locator`] strategies.
//! Strategies are evaluated strictly in order and the first one yielding a
//! non-empty value wins, even if a later strategy would also match. Absence
//! is never an error: an exhausted chain resolves to `None` (or a caller
//! default), keeping "field not found" as cheap as a normal branch.

pub mod text;

use regex::Regex;
use scraper::{ElementRef, Selector};

pub use text::{clean_text, parse_date, parse_number, parse_points};

/// A rule describing how to find a piece of data within a fragment.
#[derive(Debug, Clone, Copy)]
pub enum Locator {
    /// A heading tag (h1-h4) whose text matches the regex.
    Heading(&'static str),

    /// An element among `tags` (any tag when empty) whose `class`
    /// attribute matches the regex.
    ClassFragment {
        tags: &'static [&'static str],
        pattern: &'static str,
    },

    /// Any element whose own text nodes match the regex; yields the full
    /// text of that element (label and value together).
    TextPattern(&'static str),
}

/// A rule for locating an attribute value.
#[derive(Debug, Clone, Copy)]
pub struct AttrLocator {
    /// CSS selector for the carrying element
    pub selector: &'static str,

    /// Attribute name to read
    pub attr: &'static str,
}

/// Return the text of the first strategy in `chain` that matches within
/// `scope`, cleaned. `None` when the chain is exhausted.
pub fn first_text(scope: ElementRef<'_>, chain: &[Locator]) -> Option<String> {
    chain.iter().find_map(|locator| locate(scope, locator))
}

/// [`first_text`] with a caller-supplied default for an exhausted chain.
pub fn extract_text(scope: ElementRef<'_>, chain: &[Locator], default: &str) -> String {
    first_text(scope, chain).unwrap_or_else(|| default.to_string())
}

/// Return the first non-empty attribute value located by `chain`.
pub fn first_attr(scope: ElementRef<'_>, chain: &[AttrLocator]) -> Option<String> {
    chain.iter().find_map(|locator| {
        let selector = Selector::parse(locator.selector).ok()?;
        scope.select(&selector).find_map(|el| {
            el.value()
                .attr(locator.attr)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        })
    })
}

fn locate(scope: ElementRef<'_>, locator: &Locator) -> Option<String> {
    match locator {
        Locator::Heading(pattern) => {
            let selector = Selector::parse("h1, h2, h3, h4").ok()?;
            let re = Regex::new(pattern).ok()?;
            scope
                .select(&selector)
                .map(element_text)
                .find(|text| !text.is_empty() && re.is_match(text))
        }
        Locator::ClassFragment { tags, pattern } => {
            let selector = Selector::parse(&tag_selector(tags)).ok()?;
            let re = Regex::new(pattern).ok()?;
            scope
                .select(&selector)
                .filter(|el| {
                    el.value()
                        .attr("class")
                        .is_some_and(|class| re.is_match(class))
                })
                .map(element_text)
                .find(|text| !text.is_empty())
        }
        Locator::TextPattern(pattern) => {
            let selector = Selector::parse("*").ok()?;
            let re = Regex::new(pattern).ok()?;
            scope
                .select(&selector)
                .filter(|el| own_text_matches(el, &re))
                .map(element_text)
                .find(|text| !text.is_empty())
        }
    }
}

/// All elements among `tags` (any when empty) whose class matches the
/// regex. Used to locate cards/tables whose markup shape varies.
pub fn select_by_class<'a>(
    scope: ElementRef<'a>,
    tags: &[&str],
    pattern: &str,
) -> Vec<ElementRef<'a>> {
    let Ok(selector) = Selector::parse(&tag_selector(tags)) else {
        return Vec::new();
    };
    let Ok(re) = Regex::new(pattern) else {
        return Vec::new();
    };
    scope
        .select(&selector)
        .filter(|el| {
            el.value()
                .attr("class")
                .is_some_and(|class| re.is_match(class))
        })
        .collect()
}

/// All anchors whose `href` matches the regex.
pub fn select_by_href<'a>(scope: ElementRef<'a>, pattern: &str) -> Vec<ElementRef<'a>> {
    let Ok(selector) = Selector::parse("a[href]") else {
        return Vec::new();
    };
    let Ok(re) = Regex::new(pattern) else {
        return Vec::new();
    };
    scope
        .select(&selector)
        .filter(|el| el.value().attr("href").is_some_and(|href| re.is_match(href)))
        .collect()
}

/// Extract the value half of a "Label: value" element located by a label
/// regex: the label match and any separator punctuation are stripped.
pub fn labeled_value(scope: ElementRef<'_>, label: &'static str) -> Option<String> {
    let text = first_text(scope, &[Locator::TextPattern(label)])?;
    let re = Regex::new(label).ok()?;
    let value = re.replacen(&text, 1, "");
    let value = clean_text(value.trim_start_matches([':', '-', ' ']));
    if value.is_empty() { None } else { Some(value) }
}

/// Collected, cleaned text content of an element.
pub fn element_text(el: ElementRef<'_>) -> String {
    clean_text(&el.text().collect::<String>())
}

/// True when the element's direct text nodes (not descendants) match.
fn own_text_matches(el: &ElementRef<'_>, re: &Regex) -> bool {
    el.children()
        .filter_map(|node| node.value().as_text())
        .any(|text| re.is_match(text))
}

fn tag_selector(tags: &[&str]) -> String {
    if tags.is_empty() {
        "*".to_string()
    } else {
        tags.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    fn doc(html: &str) -> Html {
        Html::parse_document(html)
    }

    #[test]
    fn first_strategy_wins_even_when_later_also_matches() {
        let html = doc(
            r#"<div>
                <h3>Max Driver</h3>
                <span class="driver-name">Other Name</span>
            </div>"#,
        );
        let chain = [
            Locator::Heading(r"[A-Z][a-z]+\s+[A-Z][a-z]+"),
            Locator::ClassFragment {
                tags: &["span"],
                pattern: "name|driver",
            },
        ];
        assert_eq!(
            first_text(html.root_element(), &chain),
            Some("Max Driver".to_string())
        );
    }

    #[test]
    fn falls_back_when_primary_misses() {
        let html = doc(r#"<div><span class="driver-name">Max Driver</span></div>"#);
        let chain = [
            Locator::Heading(r"[A-Z][a-z]+\s+[A-Z][a-z]+"),
            Locator::ClassFragment {
                tags: &["span"],
                pattern: "name|driver",
            },
        ];
        assert_eq!(
            first_text(html.root_element(), &chain),
            Some("Max Driver".to_string())
        );
    }

    #[test]
    fn exhausted_chain_yields_default() {
        let html = doc("<div><p>nothing relevant</p></div>");
        let chain = [Locator::ClassFragment {
            tags: &[],
            pattern: "team",
        }];
        assert_eq!(first_text(html.root_element(), &chain), None);
        assert_eq!(extract_text(html.root_element(), &chain, "unknown"), "unknown");
    }

    #[test]
    fn text_pattern_yields_label_and_value() {
        let html = doc(r#"<div><p>Wins 12</p><p>Podiums 30</p></div>"#);
        let chain = [Locator::TextPattern(r"Wins?")];
        let text = first_text(html.root_element(), &chain).unwrap();
        assert!(text.contains("Wins"));
        assert_eq!(parse_number(&text), Some(12));
    }

    #[test]
    fn empty_matches_are_skipped() {
        let html = doc(r#"<div><h2></h2><h3>Grand Prix</h3></div>"#);
        let chain = [Locator::Heading(r".+")];
        assert_eq!(
            first_text(html.root_element(), &chain),
            Some("Grand Prix".to_string())
        );
    }

    #[test]
    fn first_attr_follows_chain_order() {
        let html = doc(r#"<div><a data-url="/x/1"></a><a href="/y/2">link</a></div>"#);
        let chain = [
            AttrLocator {
                selector: "a",
                attr: "href",
            },
            AttrLocator {
                selector: "a",
                attr: "data-url",
            },
        ];
        assert_eq!(
            first_attr(html.root_element(), &chain),
            Some("/y/2".to_string())
        );
    }

    #[test]
    fn first_attr_skips_empty_attribute_values() {
        let html = doc(r#"<div><a href=""></a><a href="/drivers/max.html">Max</a></div>"#);
        let chain = [AttrLocator {
            selector: "a",
            attr: "href",
        }];
        assert_eq!(
            first_attr(html.root_element(), &chain),
            Some("/drivers/max.html".to_string())
        );
    }

    #[test]
    fn first_attr_absent_without_match() {
        let html = doc("<div><span>no links</span></div>");
        let chain = [AttrLocator {
            selector: "a",
            attr: "href",
        }];
        assert_eq!(first_attr(html.root_element(), &chain), None);
    }

    #[test]
    fn select_by_class_matches_fragments() {
        let html = doc(
            r#"<main>
                <div class="driver-card promoted">one</div>
                <div class="listing-item">two</div>
                <div class="footer">three</div>
            </main>"#,
        );
        let cards = select_by_class(html.root_element(), &["div"], "driver.*card|listing.*item");
        assert_eq!(cards.len(), 2);
    }

    #[test]
    fn select_by_href_filters_anchors() {
        let html = doc(
            r#"<div>
                <a href="/drivers/max-driver.html">Max</a>
                <a href="/teams/red-team.html">Red</a>
            </div>"#,
        );
        let links = select_by_href(html.root_element(), "/drivers/");
        assert_eq!(links.len(), 1);
    }

    #[test]
    fn labeled_value_strips_the_label() {
        let html = doc(r#"<div><p>Nationality: Dutch</p></div>"#);
        assert_eq!(
            labeled_value(html.root_element(), r"Nationality|Country"),
            Some("Dutch".to_string())
        );
    }

    #[test]
    fn labeled_value_absent_when_only_label_present() {
        let html = doc(r#"<div><p>Nationality:</p></div>"#);
        assert_eq!(labeled_value(html.root_element(), r"Nationality"), None);
    }
}
