use super::text::{collect_text, normalize};
use scraper::node::Element;
use scraper::{ElementRef, Html, Selector};

/// Tags that never carry recipe content
const NOISE_TAGS: [&str; 8] = [
    "nav", "footer", "header", "aside", "iframe", "script", "style", "noscript",
];

/// Substrings of a class or id that mark boilerplate blocks
const NOISE_PATTERNS: [&str; 12] = [
    "recommend",
    "related",
    "advert",
    "banner",
    "social",
    "share",
    "comment",
    "sidebar",
    "popup",
    "modal",
    "newsletter",
    "promo",
];

/// Substrings of a class that mark the main article or recipe body
const CONTENT_CLASS_PATTERNS: [&str; 6] = [
    "recipe-content",
    "recipe-body",
    "article-body",
    "article-content",
    "post-content",
    "entry-content",
];

/// True when the element is boilerplate; several matching patterns still
/// mean a single removal of the subtree
pub fn is_noise(element: &Element) -> bool {
    if NOISE_TAGS.contains(&element.name()) {
        return true;
    }
    [element.attr("class"), element.id()]
        .into_iter()
        .flatten()
        .any(|value| contains_any(value, &NOISE_PATTERNS))
}

fn is_content_region(element: &Element) -> bool {
    matches!(element.name(), "article" | "main")
        || element
            .attr("role")
            .is_some_and(|role| role.eq_ignore_ascii_case("main"))
        || element
            .attr("class")
            .is_some_and(|class| contains_any(class, &CONTENT_CLASS_PATTERNS))
}

fn contains_any(value: &str, patterns: &[&str]) -> bool {
    let value = value.to_ascii_lowercase();
    patterns.iter().any(|pattern| value.contains(pattern))
}

/// First content region in document order, not descending into noise
fn find_content_region(element: ElementRef<'_>) -> Option<ElementRef<'_>> {
    for child in element.children().filter_map(ElementRef::wrap) {
        if is_noise(child.value()) {
            continue;
        }
        if is_content_region(child.value()) {
            return Some(child);
        }
        if let Some(region) = find_content_region(child) {
            return Some(region);
        }
    }
    None
}

/// Readable text of a rendered page
///
/// Boilerplate below `<body>` is ignored, then the text comes from the first
/// `article`, `main`, `[role=main]` or recipe/article body container, or
/// from the whole body when the page has none.
pub fn content_text(document: &Html) -> String {
    let body_selector = Selector::parse("body").unwrap();
    let body = document
        .select(&body_selector)
        .next()
        .unwrap_or_else(|| document.root_element());

    let region = find_content_region(body).unwrap_or(body);
    normalize(&collect_text(region, &is_noise))
}
