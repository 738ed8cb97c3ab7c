use crate::config::FetchConfig;
use crate::error::ScribeError;
use log::debug;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Client;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Plain HTTP fetcher presenting itself as a desktop browser
pub struct RequestFetcher {
    client: Client,
}

impl RequestFetcher {
    pub fn new(config: &FetchConfig) -> Result<Self, ScribeError> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_str(&config.accept_language)
                .map_err(|e| ScribeError::Transport(format!("invalid Accept-Language: {e}")))?,
        );

        // Redirects are followed by reqwest's default policy
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .build()?;

        Ok(Self { client })
    }

    /// Body of `url`; a non-2xx answer is an error carrying its status
    pub async fn fetch(&self, url: &str) -> Result<String, ScribeError> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        debug!("GET {} -> {}", url, status);

        if !status.is_success() {
            return Err(ScribeError::upstream_fetch(status));
        }

        Ok(response.text().await?)
    }
}
