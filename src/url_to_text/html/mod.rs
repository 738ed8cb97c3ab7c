//! HTML extraction passes shared by the static and browser paths.

mod json_ld;
mod microdata;
mod noise;
mod preview;
mod text;

pub use json_ld::extract_json_ld;
pub use microdata::MicroDataExtractor;
pub use noise::{content_text, is_noise};
pub use preview::extract_preview_image;
pub use text::{clean_text, normalize, parse_for_text, STRIPPED_TAGS};

use crate::model::ExtractionResult;
use scraper::Html;

/// Runs the three static passes over a fetched body
pub fn extract_static(html: String) -> ExtractionResult {
    let document = Html::parse_document(&html);
    let structured_data = extract_json_ld(&document);
    let preview_image_url = extract_preview_image(&document);
    let clean_text = clean_text(&html);

    ExtractionResult {
        raw_html: html,
        clean_text,
        structured_data,
        preview_image_url,
        microdata: None,
    }
}

/// Runs the browser-path passes over the serialized post-interaction DOM
///
/// Microdata is read before any boilerplate is skipped. The text pass reads
/// its own parse so entity decoding matches the static path.
pub fn extract_rendered(html: String) -> ExtractionResult {
    let document = Html::parse_document(&html);
    let microdata = MicroDataExtractor.extract(&document);
    let structured_data = extract_json_ld(&document);
    let preview_image_url = extract_preview_image(&document);
    let clean_text = content_text(&parse_for_text(&html));

    ExtractionResult {
        raw_html: html,
        clean_text,
        structured_data,
        preview_image_url,
        microdata: Some(microdata),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><head>
            <title>Pancakes</title>
            <meta property="og:image" content="https://example.com/pancakes.jpg">
            <script type="application/ld+json">{"@type": "Recipe", "name": "Pancakes"}</script>
        </head><body>
            <header>My Blog</header>
            <main>
                <h1>Pancakes</h1>
                <ul><li itemprop="recipeIngredient">2 eggs</li></ul>
                <div class="related">More breakfasts</div>
            </main>
        </body></html>
    "#;

    #[test]
    fn test_extract_static() {
        let result = extract_static(PAGE.to_string());
        assert_eq!(result.raw_html, PAGE);
        assert_eq!(result.structured_data.len(), 1);
        assert_eq!(result.preview_image_url, "https://example.com/pancakes.jpg");
        assert_eq!(result.clean_text, "Pancakes Pancakes 2 eggs More breakfasts");
        assert!(result.microdata.is_none());
    }

    #[test]
    fn test_extract_rendered() {
        let result = extract_rendered(PAGE.to_string());
        assert_eq!(result.clean_text, "Pancakes 2 eggs");
        assert_eq!(result.structured_data.len(), 1);
        let microdata = result.microdata.unwrap().unwrap();
        assert_eq!(microdata.name, "Pancakes");
        assert_eq!(microdata.ingredients, vec!["2 eggs"]);
    }

    #[test]
    fn test_extract_rendered_keeps_entity_set() {
        let html = "<body><main><p>Tea &amp; scones&#8212;&eacute;</p></main></body>";
        let result = extract_rendered(html.to_string());
        assert_eq!(result.clean_text, "Tea & scones &eacute;");
    }

    #[test]
    fn test_extract_rendered_without_ingredients() {
        let result = extract_rendered("<body><p>No recipe</p></body>".to_string());
        assert_eq!(result.microdata, Some(None));
    }
}
