use super::url::require_url;
use crate::error::ScribeError;
use crate::model::ExtractionResult;
use crate::url_to_text::fetchers::ChromeFetcher;
use crate::url_to_text::html::extract_rendered;
use log::info;

/// Process a URL through the headless browser
///
/// This pipeline:
/// 1. Renders the page, scrolls it and expands collapsed sections
/// 2. Reads microdata from the rendered DOM
/// 3. Extracts JSON-LD, the preview image and the main-region text
///
/// The browser is closed before this returns, on success or failure.
pub async fn process(
    url: &str,
    fetcher: &ChromeFetcher,
) -> Result<ExtractionResult, ScribeError> {
    let url = require_url(url)?;
    let html = fetcher.fetch(url).await?;
    let result = extract_rendered(html);
    info!(
        "Browser extraction of {}: {} chars of text, microdata {}",
        url,
        result.clean_text.len(),
        if matches!(result.microdata, Some(Some(_))) {
            "found"
        } else {
            "absent"
        }
    );
    Ok(result)
}
