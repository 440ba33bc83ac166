//! Runtime settings for both server variants.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Default Notion REST endpoint.
pub const DEFAULT_NOTION_API_BASE: &str = "https://api.notion.com/v1";

/// Notion API version sent with every request.
pub const DEFAULT_NOTION_VERSION: &str = "2022-06-28";

/// Default timeout for selector-based browser operations.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Notion client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NotionConfig {
    /// Integration token. Opaque; sent as a bearer token.
    pub token: String,
    /// API base URL, without a trailing slash.
    pub api_base: String,
    /// Value of the `Notion-Version` header.
    pub notion_version: String,
}

impl Default for NotionConfig {
    fn default() -> Self {
        Self {
            token: String::new(),
            api_base: DEFAULT_NOTION_API_BASE.into(),
            notion_version: DEFAULT_NOTION_VERSION.into(),
        }
    }
}

impl NotionConfig {
    /// Settings for the public API with the given token.
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}

/// Browser session settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BrowserConfig {
    /// Run without a visible window.
    pub headless: bool,
    /// Explicit Chrome/Chromium executable.
    pub chrome_path: Option<PathBuf>,
    /// Timeout for selector waits, clicks and fills when the call gives none.
    pub default_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            chrome_path: None,
            default_timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}
