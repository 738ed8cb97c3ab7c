use crate::error::ScribeError;
use crate::model::ExtractionResult;
use crate::url_to_text::fetchers::RequestFetcher;
use crate::url_to_text::html::extract_static;
use log::info;

/// Process a URL through the static path
///
/// This pipeline:
/// 1. Fetches HTML once with browser-like headers
/// 2. Extracts clean text, JSON-LD blocks and the preview image
///
/// Nothing is retried; fetch failures surface as errors.
pub async fn process(
    url: &str,
    fetcher: &RequestFetcher,
) -> Result<ExtractionResult, ScribeError> {
    let url = require_url(url)?;
    let html = fetcher.fetch(url).await?;
    let result = extract_static(html);
    info!(
        "Static extraction of {}: {} chars of text, {} JSON-LD blocks",
        url,
        result.clean_text.len(),
        result.structured_data.len()
    );
    Ok(result)
}

/// Trimmed URL, or `MissingParameter` when there is none
pub(crate) fn require_url(url: &str) -> Result<&str, ScribeError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(ScribeError::MissingParameter("url"));
    }
    Ok(url)
}
