pub mod config;
pub mod error;
pub mod model;
pub mod pipelines;
pub mod providers;
pub mod server;
pub mod url_to_text;

pub use config::{load_config, BrowserConfig, FetchConfig, LlmConfig, ScriberConfig};
pub use error::ScribeError;
pub use model::{ExtractionResult, Microdata};
pub use url_to_text::fetchers::{BrowserLauncher, BrowserSession, ChromeFetcher, RequestFetcher};

/// Fetch a URL over plain HTTP and extract text, JSON-LD and preview image
///
/// # Example
/// ```no_run
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// use page_scriber::{fetch_static, FetchConfig};
///
/// let result = fetch_static("https://example.com/recipe", &FetchConfig::default()).await?;
/// println!("{}", result.clean_text);
/// # Ok(())
/// # }
/// ```
pub async fn fetch_static(
    url: &str,
    config: &FetchConfig,
) -> Result<ExtractionResult, ScribeError> {
    let fetcher = RequestFetcher::new(config)?;
    pipelines::url::process(url, &fetcher).await
}

/// Render a URL in headless Chromium and extract the same artifacts plus
/// microdata
pub async fn fetch_with_browser(
    url: &str,
    config: &BrowserConfig,
) -> Result<ExtractionResult, ScribeError> {
    let fetcher = ChromeFetcher::new(config);
    pipelines::browser::process(url, &fetcher).await
}
