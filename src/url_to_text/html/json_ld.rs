use log::debug;
use scraper::{Html, Selector};
use serde_json::Value;

const JSON_LD_TYPE: &str = "application/ld+json";

/// Parses every `<script type="application/ld+json">` block in document order
///
/// Blocks that are not valid JSON are skipped; the scan carries on.
pub fn extract_json_ld(document: &Html) -> Vec<Value> {
    let selector = Selector::parse("script[type]").unwrap();

    document
        .select(&selector)
        .filter(|script| {
            script
                .value()
                .attr("type")
                .is_some_and(|t| t.trim().eq_ignore_ascii_case(JSON_LD_TYPE))
        })
        .enumerate()
        .filter_map(|(index, script)| {
            let raw = script.text().collect::<String>();
            match serde_json::from_str::<Value>(raw.trim()) {
                Ok(value) => Some(value),
                Err(e) => {
                    debug!("Skipping malformed JSON-LD block {}: {}", index, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_keeps_valid_blocks_in_order() {
        let html = r#"
            <html><head>
            <script type="application/ld+json">{"@type": "Organization", "name": "Site"}</script>
            <script type="application/ld+json">{"@type": "Recipe", "name": "Soup"</script>
            <script type="APPLICATION/LD+JSON">
                [{"@type": "BreadcrumbList"}]
            </script>
            <script type="text/javascript">{"not": "json-ld"}</script>
            <script>var x = 1;</script>
            </head><body></body></html>
        "#;

        let blocks = extract_json_ld(&Html::parse_document(html));
        assert_eq!(
            blocks,
            vec![
                json!({"@type": "Organization", "name": "Site"}),
                json!([{"@type": "BreadcrumbList"}]),
            ]
        );
    }

    #[test]
    fn test_no_blocks() {
        let blocks = extract_json_ld(&Html::parse_document("<p>nothing here</p>"));
        assert!(blocks.is_empty());
    }

    #[test]
    fn test_blocks_in_body_are_found() {
        let html = r#"<body><div><script type="application/ld+json">{"@type":"Recipe","recipeIngredient":["1 egg"]}</script></div></body>"#;
        let blocks = extract_json_ld(&Html::parse_document(html));
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0]["recipeIngredient"][0], "1 egg");
    }
}
