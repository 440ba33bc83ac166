//! Browser automation seam.
//!
//! Tools talk to [`SessionController`], which caches engines produced by a
//! [`BrowserLauncher`]. [`CdpLauncher`] drives Chrome/Chromium over the
//! DevTools protocol; tests plug in their own launcher.

pub mod cdp;
pub mod session;

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::error::{Error, Result};

pub use cdp::CdpLauncher;
pub use session::SessionController;

/// Browser engine family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum EngineKind {
    /// Chrome / Chromium.
    #[default]
    Chromium,
    /// Firefox.
    Firefox,
    /// WebKit.
    Webkit,
}

impl EngineKind {
    /// Lowercase name used in tool arguments.
    pub fn as_str(self) -> &'static str {
        match self {
            EngineKind::Chromium => "chromium",
            EngineKind::Firefox => "firefox",
            EngineKind::Webkit => "webkit",
        }
    }
}

impl fmt::Display for EngineKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EngineKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "chromium" => Ok(EngineKind::Chromium),
            "firefox" => Ok(EngineKind::Firefox),
            "webkit" => Ok(EngineKind::Webkit),
            _ => Err(Error::InvalidParams(format!("unknown browser: {s}"))),
        }
    }
}

/// What `get_page_content` returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentFormat {
    /// Rendered text.
    #[default]
    Text,
    /// Markup.
    Html,
}

impl FromStr for ContentFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "text" => Ok(ContentFormat::Text),
            "html" => Ok(ContentFormat::Html),
            _ => Err(Error::InvalidParams(format!("unknown content type: {s}"))),
        }
    }
}

/// Starts engines.
#[async_trait::async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh engine of the given kind.
    async fn launch(&self, kind: EngineKind) -> Result<Arc<dyn BrowserEngine>>;
}

/// A running browser process.
#[async_trait::async_trait]
pub trait BrowserEngine: Send + Sync {
    /// Open a blank page.
    async fn new_page(&self) -> Result<Box<dyn BrowserPage>>;

    /// Shut the engine down. Pages opened from it die with it.
    async fn close(&self) -> Result<()>;
}

/// One open tab.
#[async_trait::async_trait]
pub trait BrowserPage: Send + Sync {
    /// Navigate and wait for the load to finish.
    async fn goto(&self, url: &str) -> Result<()>;

    /// Document title.
    async fn title(&self) -> Result<String>;

    /// Current URL.
    async fn url(&self) -> Result<String>;

    /// Whole-page or element content.
    async fn content(&self, format: ContentFormat, selector: Option<&str>) -> Result<String>;

    /// Wait until `selector` matches, then click it.
    async fn click(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// Wait until `selector` matches, then replace its value with `value`.
    async fn fill(&self, selector: &str, value: &str, timeout: Duration) -> Result<()>;

    /// Wait until `selector` matches.
    async fn wait_for(&self, selector: &str, timeout: Duration) -> Result<()>;

    /// PNG screenshot.
    async fn screenshot(&self, full_page: bool) -> Result<Vec<u8>>;

    /// Close the tab.
    async fn close(&self) -> Result<()>;
}
