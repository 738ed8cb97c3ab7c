#![allow(dead_code)]

use async_trait::async_trait;
use page_scriber::{BrowserLauncher, BrowserSession, ScribeError};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::time::Instant;

/// How the fake page behaves on navigation
#[derive(Clone, Copy, Debug)]
pub enum Navigation {
    Settles,
    NeverIdle,
    Fails,
}

/// Shared counters observed by tests after the browser is gone
#[derive(Clone, Default)]
pub struct Spy {
    launched: Arc<AtomicUsize>,
    closed: Arc<AtomicUsize>,
    scripts: Arc<Mutex<Vec<String>>>,
    page_calls: Arc<Mutex<Vec<Instant>>>,
}

impl Spy {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn scripts(&self) -> Vec<String> {
        self.scripts.lock().unwrap().clone()
    }

    /// When each `evaluate` and `content` call reached the page
    pub fn page_calls(&self) -> Vec<Instant> {
        self.page_calls.lock().unwrap().clone()
    }
}

pub struct FakeLauncher {
    pub html: String,
    pub navigation: Navigation,
    /// Scripts containing this text throw inside the page
    pub failing_script: Option<&'static str>,
    pub spy: Spy,
}

impl FakeLauncher {
    pub fn serving(html: &str) -> Self {
        Self {
            html: html.to_string(),
            navigation: Navigation::Settles,
            failing_script: None,
            spy: Spy::default(),
        }
    }
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, ScribeError> {
        self.spy.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(FakeSession {
            html: self.html.clone(),
            navigation: self.navigation,
            failing_script: self.failing_script,
            spy: self.spy.clone(),
        }))
    }
}

struct FakeSession {
    html: String,
    navigation: Navigation,
    failing_script: Option<&'static str>,
    spy: Spy,
}

#[async_trait]
impl BrowserSession for FakeSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), ScribeError> {
        match self.navigation {
            Navigation::Settles => Ok(()),
            Navigation::NeverIdle => std::future::pending().await,
            Navigation::Fails => Err(ScribeError::Browser("net::ERR_NAME_NOT_RESOLVED".to_string())),
        }
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value, ScribeError> {
        self.spy.page_calls.lock().unwrap().push(Instant::now());
        self.spy.scripts.lock().unwrap().push(script.to_string());
        match self.failing_script {
            Some(marker) if script.contains(marker) => Err(ScribeError::Browser(
                "Uncaught TypeError: handler is not a function".to_string(),
            )),
            _ => Ok(json!(true)),
        }
    }

    async fn content(&mut self) -> Result<String, ScribeError> {
        self.spy.page_calls.lock().unwrap().push(Instant::now());
        Ok(self.html.clone())
    }

    async fn close(self: Box<Self>) -> Result<(), ScribeError> {
        self.spy.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
