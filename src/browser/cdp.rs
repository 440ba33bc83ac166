//! Chrome DevTools Protocol backend.

use std::sync::Arc;
use std::time::Duration;

use chromiumoxide::{
    cdp::browser_protocol::page::CaptureScreenshotFormat, error::CdpError,
    page::ScreenshotParams, Browser, BrowserConfig as CdpBrowserConfig, Element, Page,
};
use futures::StreamExt;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;

use crate::config::BrowserConfig;
use crate::error::{Error, Result};

use super::{BrowserEngine, BrowserLauncher, BrowserPage, ContentFormat, EngineKind};

/// Delay between selector polls while waiting for an element.
const POLL_INTERVAL: Duration = Duration::from_millis(100);

fn cdp_error(e: CdpError) -> Error {
    Error::Browser(e.to_string())
}

/// Launches local Chrome/Chromium processes.
///
/// Only [`EngineKind::Chromium`] speaks CDP; other kinds are rejected.
pub struct CdpLauncher {
    config: BrowserConfig,
}

impl CdpLauncher {
    /// Create a launcher.
    pub fn new(config: BrowserConfig) -> Self {
        Self { config }
    }
}

#[async_trait::async_trait]
impl BrowserLauncher for CdpLauncher {
    async fn launch(&self, kind: EngineKind) -> Result<Arc<dyn BrowserEngine>> {
        if kind != EngineKind::Chromium {
            return Err(Error::UnsupportedEngine(kind.to_string()));
        }

        let mut builder = CdpBrowserConfig::builder();
        // chromiumoxide is headless unless asked otherwise
        if !self.config.headless {
            builder = builder.with_head();
        }
        if let Some(path) = &self.config.chrome_path {
            builder = builder.chrome_executable(path);
        }
        let config = builder
            .arg("--disable-dev-shm-usage")
            .build()
            .map_err(|e| Error::Browser(format!("invalid browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| Error::Browser(format!("browser launch failed: {e}")))?;

        let events = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "browser event error");
                }
            }
            tracing::debug!("browser event handler exited");
        });

        tracing::info!(headless = self.config.headless, "launched chromium");

        Ok(Arc::new(CdpEngine {
            browser: Mutex::new(Some(browser)),
            events,
        }))
    }
}

struct CdpEngine {
    browser: Mutex<Option<Browser>>,
    events: JoinHandle<()>,
}

#[async_trait::async_trait]
impl BrowserEngine for CdpEngine {
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>> {
        let guard = self.browser.lock().await;
        let browser = guard
            .as_ref()
            .ok_or_else(|| Error::Browser("browser already closed".into()))?;
        let page = browser.new_page("about:blank").await.map_err(cdp_error)?;
        Ok(Box::new(CdpPage { page }))
    }

    async fn close(&self) -> Result<()> {
        let Some(mut browser) = self.browser.lock().await.take() else {
            return Ok(());
        };
        browser.close().await.map_err(cdp_error)?;
        let _ = browser.wait().await;
        self.events.abort();
        Ok(())
    }
}

struct CdpPage {
    page: Page,
}

impl CdpPage {
    async fn wait_for_element(&self, selector: &str, timeout: Duration) -> Result<Element> {
        let poll = async {
            loop {
                match self.page.find_element(selector).await {
                    Ok(element) => return element,
                    Err(_) => tokio::time::sleep(POLL_INTERVAL).await,
                }
            }
        };

        tokio::time::timeout(timeout, poll).await.map_err(|_| {
            Error::Browser(format!(
                "Timeout {}ms exceeded waiting for selector \"{selector}\"",
                timeout.as_millis()
            ))
        })
    }
}

#[async_trait::async_trait]
impl BrowserPage for CdpPage {
    async fn goto(&self, url: &str) -> Result<()> {
        self.page.goto(url).await.map_err(cdp_error)?;
        Ok(())
    }

    async fn title(&self) -> Result<String> {
        Ok(self
            .page
            .get_title()
            .await
            .map_err(cdp_error)?
            .unwrap_or_default())
    }

    async fn url(&self) -> Result<String> {
        Ok(self.page.url().await.map_err(cdp_error)?.unwrap_or_default())
    }

    async fn content(&self, format: ContentFormat, selector: Option<&str>) -> Result<String> {
        let text = match (format, selector) {
            (ContentFormat::Html, None) => Some(self.page.content().await.map_err(cdp_error)?),
            (ContentFormat::Text, None) => self
                .page
                .find_element("body")
                .await
                .map_err(cdp_error)?
                .inner_text()
                .await
                .map_err(cdp_error)?,
            (ContentFormat::Html, Some(selector)) => self
                .page
                .find_element(selector)
                .await
                .map_err(cdp_error)?
                .inner_html()
                .await
                .map_err(cdp_error)?,
            (ContentFormat::Text, Some(selector)) => self
                .page
                .find_element(selector)
                .await
                .map_err(cdp_error)?
                .inner_text()
                .await
                .map_err(cdp_error)?,
        };
        Ok(text.unwrap_or_default())
    }

    async fn click(&self, selector: &str, timeout: Duration) -> Result<()> {
        let element = self.wait_for_element(selector, timeout).await?;
        element.click().await.map_err(cdp_error)?;
        tracing::debug!(selector, "clicked element");
        Ok(())
    }

    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> Result<()> {
        let element = self.wait_for_element(selector, timeout).await?;

        let clear = format!(
            "(() => {{ const el = document.querySelector({}); if (el) {{ el.value = ''; }} }})()",
            serde_json::to_string(selector)?
        );
        self.page
            .evaluate(clear.as_str())
            .await
            .map_err(cdp_error)?;

        element.click().await.map_err(cdp_error)?;
        element.type_str(value).await.map_err(cdp_error)?;
        tracing::debug!(selector, "filled input");
        Ok(())
    }

    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()> {
        self.wait_for_element(selector, timeout).await.map(|_| ())
    }

    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>> {
        self.page
            .screenshot(
                ScreenshotParams::builder()
                    .format(CaptureScreenshotFormat::Png)
                    .full_page(full_page)
                    .build(),
            )
            .await
            .map_err(cdp_error)
    }

    async fn close(&self) -> Result<()> {
        self.page.clone().close().await.map_err(cdp_error)
    }
}
