use super::chrome::{BrowserLauncher, BrowserSession};
use crate::config::BrowserConfig;
use crate::error::ScribeError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig as LaunchConfig};
use chromiumoxide::cdp::browser_protocol::network::{
    EventLoadingFailed, EventLoadingFinished, EventRequestWillBeSent,
};
use chromiumoxide::cdp::js_protocol::runtime::EvaluateParams;
use chromiumoxide::Page;
use futures::StreamExt;
use log::{debug, warn};
use serde_json::Value;
use std::collections::HashSet;
use std::path::PathBuf;
use std::time::Duration;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::Instant;

/// Flags for constrained containers; `no_sandbox` adds the sandbox ones
const LAUNCH_ARGS: [&str; 4] = [
    "--disable-gpu",
    "--disable-dev-shm-usage",
    "--single-process",
    "--no-zygote",
];

pub struct ChromiumLauncher {
    executable: Option<PathBuf>,
    request_timeout: Duration,
    max_idle_connections: usize,
    idle_window: Duration,
}

impl ChromiumLauncher {
    pub fn new(config: &BrowserConfig) -> Self {
        Self {
            executable: config.executable.clone(),
            // Protocol calls must outlive the navigation bound, which is
            // enforced by the caller
            request_timeout: config.navigation_timeout() + Duration::from_secs(5),
            max_idle_connections: config.max_idle_connections,
            idle_window: config.idle_window(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScribeError> {
        // Fresh profile per launch; removed when the session is dropped
        let profile = tempfile::Builder::new().prefix("page-scriber-").tempdir()?;

        let mut builder = LaunchConfig::builder()
            .no_sandbox()
            .user_data_dir(profile.path())
            .request_timeout(self.request_timeout)
            .args(LAUNCH_ARGS);
        if let Some(executable) = &self.executable {
            builder = builder.chrome_executable(executable);
        }
        let config = builder.build().map_err(ScribeError::Browser)?;

        let (browser, mut handler) = Browser::launch(config).await.map_err(cdp_error)?;
        let handler = tokio::spawn(async move { while handler.next().await.is_some() {} });
        debug!("Launched headless browser");

        Ok(Box::new(ChromiumSession {
            browser,
            handler,
            page: None,
            _profile: profile,
            max_idle_connections: self.max_idle_connections,
            idle_window: self.idle_window,
        }))
    }
}

struct ChromiumSession {
    browser: Browser,
    handler: JoinHandle<()>,
    page: Option<Page>,
    _profile: TempDir,
    max_idle_connections: usize,
    idle_window: Duration,
}

impl ChromiumSession {
    fn page(&self) -> Result<&Page, ScribeError> {
        self.page
            .as_ref()
            .ok_or_else(|| ScribeError::Browser("no page has been opened".to_string()))
    }
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    async fn navigate(&mut self, url: &str) -> Result<(), ScribeError> {
        let page = self.browser.new_page("about:blank").await.map_err(cdp_error)?;

        // Subscribe before navigating so no request slips past the tracker
        let mut started = page
            .event_listener::<EventRequestWillBeSent>()
            .await
            .map_err(cdp_error)?;
        let mut finished = page
            .event_listener::<EventLoadingFinished>()
            .await
            .map_err(cdp_error)?;
        let mut failed = page
            .event_listener::<EventLoadingFailed>()
            .await
            .map_err(cdp_error)?;

        page.goto(url).await.map_err(cdp_error)?;
        self.page = Some(page);

        let mut tracker =
            IdleTracker::new(self.max_idle_connections, self.idle_window, Instant::now());
        loop {
            let deadline = tracker.idle_deadline();
            tokio::select! {
                Some(event) = started.next() => {
                    tracker.request_started(event.request_id.inner().clone(), Instant::now());
                }
                Some(event) = finished.next() => {
                    tracker.request_finished(event.request_id.inner(), Instant::now());
                }
                Some(event) = failed.next() => {
                    tracker.request_finished(event.request_id.inner(), Instant::now());
                }
                _ = sleep_until(deadline) => {
                    if tracker.is_idle(Instant::now()) {
                        debug!("Network idle for {}", url);
                        return Ok(());
                    }
                }
            }
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, ScribeError> {
        let params = EvaluateParams::builder()
            .expression(script)
            .return_by_value(true)
            .build()
            .map_err(ScribeError::Browser)?;
        let result = self
            .page()?
            .evaluate_expression(params)
            .await
            .map_err(cdp_error)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn content(&mut self) -> Result<String, ScribeError> {
        self.page()?.content().await.map_err(cdp_error)
    }

    async fn close(mut self: Box<Self>) -> Result<(), ScribeError> {
        let closed = self.browser.close().await;
        if closed.is_err() {
            warn!("Browser did not close cleanly, killing the process");
            if let Some(Err(e)) = self.browser.kill().await {
                warn!("Failed to kill browser: {}", e);
            }
        }
        if let Err(e) = self.browser.wait().await {
            warn!("Failed to reap browser process: {}", e);
        }
        self.handler.abort();
        closed.map(|_| ()).map_err(cdp_error)
    }
}

impl Drop for ChromiumSession {
    fn drop(&mut self) {
        self.handler.abort();
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn cdp_error(err: chromiumoxide::error::CdpError) -> ScribeError {
    ScribeError::Browser(err.to_string())
}

/// Network-idle bookkeeping: idle once no more than `max_in_flight`
/// requests have been pending for a whole `window`
struct IdleTracker {
    in_flight: HashSet<String>,
    max_in_flight: usize,
    window: Duration,
    quiet_since: Option<Instant>,
}

impl IdleTracker {
    fn new(max_in_flight: usize, window: Duration, now: Instant) -> Self {
        Self {
            in_flight: HashSet::new(),
            max_in_flight,
            window,
            quiet_since: Some(now),
        }
    }

    fn request_started(&mut self, id: String, now: Instant) {
        self.in_flight.insert(id);
        self.update(now);
    }

    fn request_finished(&mut self, id: &str, now: Instant) {
        self.in_flight.remove(id);
        self.update(now);
    }

    fn update(&mut self, now: Instant) {
        if self.in_flight.len() > self.max_in_flight {
            self.quiet_since = None;
        } else if self.quiet_since.is_none() {
            self.quiet_since = Some(now);
        }
    }

    fn idle_deadline(&self) -> Option<Instant> {
        self.quiet_since.map(|since| since + self.window)
    }

    fn is_idle(&self, now: Instant) -> bool {
        self.idle_deadline().is_some_and(|deadline| deadline <= now)
    }
}
