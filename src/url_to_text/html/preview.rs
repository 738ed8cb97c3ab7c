use scraper::{Html, Selector};

/// Social preview image: Open Graph first, then Twitter card, else empty
pub fn extract_preview_image(document: &Html) -> String {
    meta_content(document, "property", "og:image")
        .or_else(|| meta_content(document, "name", "twitter:image"))
        .unwrap_or_default()
}

/// `content` of the first non-empty `<meta>` whose `key` attribute equals
/// `value`, compared ASCII case-insensitively
fn meta_content(document: &Html, key: &str, value: &str) -> Option<String> {
    let selector = Selector::parse("meta").unwrap();
    document
        .select(&selector)
        .filter(|meta| {
            meta.value()
                .attr(key)
                .is_some_and(|v| v.trim().eq_ignore_ascii_case(value))
        })
        .filter_map(|meta| meta.value().attr("content"))
        .map(str::trim)
        .find(|content| !content.is_empty())
        .map(str::to_string)
}
