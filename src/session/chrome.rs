// src/session/chrome.rs

//! Headless-Chrome page session.
//!
//! Drives a Chrome instance over CDP via chromiumoxide. One browser per
//! session; the recycler decides when a session has served enough page
//! loads and asks the factory for a new one.

use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::page::Page;
use futures::StreamExt;
use tokio::task::JoinHandle;

use crate::error::{AppError, Result};
use crate::models::SessionConfig;
use crate::session::{PageSession, SessionFactory};

const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight)";

/// A [`PageSession`] backed by one headless Chrome instance.
pub struct ChromeSession {
    browser: Browser,
    page: Page,
    event_loop: JoinHandle<()>,
    settle_delay: Duration,
}

impl ChromeSession {
    /// Launch a browser and open a blank page.
    pub async fn launch(config: &SessionConfig) -> Result<Self> {
        let mut builder = BrowserConfig::builder();
        if !config.headless {
            builder = builder.with_head();
        }
        let browser_config = builder.build().map_err(AppError::Session)?;

        let (browser, mut handler) = Browser::launch(browser_config)
            .await
            .map_err(AppError::session)?;

        // CDP messages are pumped for the lifetime of the browser.
        let event_loop = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(AppError::session)?;

        Ok(Self {
            browser,
            page,
            event_loop,
            settle_delay: Duration::from_millis(config.settle_delay_ms),
        })
    }
}

#[async_trait]
impl PageSession for ChromeSession {
    async fn open(&mut self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(AppError::session)?;
        self.page
            .wait_for_navigation()
            .await
            .map_err(AppError::session)?;
        self.settle().await
    }

    async fn scroll(&mut self) -> Result<()> {
        self.page
            .evaluate(SCROLL_TO_BOTTOM)
            .await
            .map_err(AppError::session)?;
        Ok(())
    }

    async fn settle(&mut self) -> Result<()> {
        // Quiescence heuristic: a fixed delay for lazy content to land.
        tokio::time::sleep(self.settle_delay).await;
        Ok(())
    }

    async fn current_document(&mut self) -> Result<String> {
        self.page.content().await.map_err(AppError::session)
    }

    async fn find_sentinel(&mut self, selector: &str) -> Result<bool> {
        Ok(self.page.find_element(selector).await.is_ok())
    }

    async fn click(&mut self, selector: &str) -> Result<usize> {
        let elements = self
            .page
            .find_elements(selector)
            .await
            .unwrap_or_default();

        let mut clicked = 0;
        for element in &elements {
            match element.click().await {
                Ok(_) => clicked += 1,
                // elements can detach while the page keeps loading
                Err(e) => log::debug!("Click failed for '{}': {}", selector, e),
            }
        }
        Ok(clicked)
    }

    async fn close(&mut self) -> Result<()> {
        self.browser.close().await.map_err(AppError::session)?;
        let _ = self.browser.wait().await;
        self.event_loop.abort();
        Ok(())
    }
}

/// Launches one [`ChromeSession`] per request.
pub struct ChromeSessionFactory {
    config: SessionConfig,
}

impl ChromeSessionFactory {
    pub fn new(config: SessionConfig) -> Self {
        Self { config }
    }
}

#[async_trait]
impl SessionFactory for ChromeSessionFactory {
    async fn create(&self) -> Result<Box<dyn PageSession>> {
        Ok(Box::new(ChromeSession::launch(&self.config).await?))
    }
}
