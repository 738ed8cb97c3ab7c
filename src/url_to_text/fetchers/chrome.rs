use super::chromium::ChromiumLauncher;
use crate::config::BrowserConfig;
use crate::error::ScribeError;
use async_trait::async_trait;
use log::{debug, info, warn};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Starts browser instances
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScribeError>;
}

/// One running browser with a single page
///
/// Whoever launches a session owns it and must call [`BrowserSession::close`]
/// on every path, including after a failed `navigate`.
#[async_trait]
pub trait BrowserSession: Send {
    /// Loads `url` and returns once the network is idle
    async fn navigate(&mut self, url: &str) -> Result<(), ScribeError>;

    /// Evaluates a script in the page and returns its JSON value
    async fn evaluate(&mut self, script: &str) -> Result<Value, ScribeError>;

    /// Serialized HTML of the current DOM
    async fn content(&mut self) -> Result<String, ScribeError>;

    /// Shuts the browser down
    async fn close(self: Box<Self>) -> Result<(), ScribeError>;
}

struct InteractionStep {
    name: &'static str,
    script: &'static str,
}

/// Scripted steps run after load and the first settle delay, in order, each
/// followed by another settle delay
const INTERACTION_STEPS: [InteractionStep; 2] = [
    InteractionStep {
        name: "scroll",
        script: r#"(function () {
            window.scrollTo(0, document.body ? document.body.scrollHeight : 0);
            return true;
        })()"#,
    },
    InteractionStep {
        name: "expand",
        script: r#"(function () {
            var opened = 0, clicked = 0, failed = 0;
            document.querySelectorAll('details:not([open])').forEach(function (el) {
                el.setAttribute('open', '');
                opened++;
            });
            var selector = '[class*="expand"], [class*="more"], [class*="toggle"], [class*="accordion"]';
            document.querySelectorAll(selector).forEach(function (el) {
                try {
                    el.click();
                    clicked++;
                } catch (e) {
                    failed++;
                }
            });
            return { opened: opened, clicked: clicked, failed: failed };
        })()"#,
    },
];

/// Renders pages in a headless browser before extraction
pub struct ChromeFetcher {
    launcher: Arc<dyn BrowserLauncher>,
    navigation_timeout: Duration,
    settle_delay: Duration,
}

impl ChromeFetcher {
    /// Fetcher backed by a local Chromium
    pub fn new(config: &BrowserConfig) -> Self {
        Self::with_launcher(Arc::new(ChromiumLauncher::new(config)), config)
    }

    pub fn with_launcher(launcher: Arc<dyn BrowserLauncher>, config: &BrowserConfig) -> Self {
        Self {
            launcher,
            navigation_timeout: config.navigation_timeout(),
            settle_delay: config.settle_delay(),
        }
    }

    /// HTML of `url` after load, lazy content and expanded sections
    ///
    /// Rendering runs in its own task that closes the browser when it
    /// finishes, so the browser is shut down even if this future is dropped.
    pub async fn fetch(&self, url: &str) -> Result<String, ScribeError> {
        info!("Rendering {} in headless browser", url);
        let mut session = self.launcher.launch().await?;

        let url = url.to_string();
        let navigation_timeout = self.navigation_timeout;
        let settle_delay = self.settle_delay;

        let task = tokio::spawn(async move {
            let outcome = render(session.as_mut(), &url, navigation_timeout, settle_delay).await;
            if let Err(e) = session.close().await {
                warn!("Failed to close browser: {}", e);
            }
            outcome
        });

        task.await
            .map_err(|e| ScribeError::Browser(format!("render task failed: {e}")))?
    }
}

async fn render(
    session: &mut dyn BrowserSession,
    url: &str,
    navigation_timeout: Duration,
    settle_delay: Duration,
) -> Result<String, ScribeError> {
    match timeout(navigation_timeout, session.navigate(url)).await {
        Ok(navigated) => navigated?,
        Err(_) => return Err(ScribeError::NavigationTimeout(navigation_timeout)),
    }
    sleep(settle_delay).await;

    for step in &INTERACTION_STEPS {
        match session.evaluate(step.script).await {
            Ok(value) => debug!("Interaction step '{}': {}", step.name, value),
            Err(e) => warn!("Interaction step '{}' failed: {}", step.name, e),
        }
        sleep(settle_delay).await;
    }

    session.content().await
}
